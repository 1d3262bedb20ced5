//! # horizon-core
//!
//! Core types, traits, and abstractions for horizon.
//!
//! This crate provides the domain models, the repository trait definitions,
//! and the authorization policy evaluator that the other horizon crates
//! depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod policy;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use policy::{evaluate, require, Action, Decision};
pub use traits::*;
pub use uuid_utils::new_v7;
