//! # horizon-api
//!
//! HTTP API server for horizon: identity extraction, routing, request
//! DTOs, and the error→status mapping over the repository and ingest
//! layers.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use response::{ListResponse, PaginationMeta};
pub use router::api_router;
pub use state::{AppState, GlobalRateLimiter};
