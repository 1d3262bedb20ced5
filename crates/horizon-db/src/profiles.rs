//! Profile repository implementation.
//!
//! Profiles are globally readable; only the profile itself may mutate its
//! row. Each profile carries an API key issued once at creation; only the
//! SHA-256 hash is stored.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use horizon_core::{
    new_v7, CreateProfileRequest, CreatedProfile, Error, Profile, ProfileRepository, Result,
    UpdateProfileRequest,
};

/// PostgreSQL implementation of ProfileRepository.
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn generate_secret(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a secret using SHA256.
    pub(crate) fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn profile_from_row(r: &sqlx::postgres::PgRow) -> Profile {
    Profile {
        id: r.get("id"),
        email: r.get("email"),
        full_name: r.get("full_name"),
        avatar_url: r.get("avatar_url"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get(&self, id: Uuid) -> Result<Profile> {
        let row = sqlx::query(
            "SELECT id, email, full_name, avatar_url, created_at, updated_at
             FROM profile WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| profile_from_row(&r))
            .ok_or_else(|| Error::NotFound("profile".to_string()))
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Profile>> {
        let hash = Self::hash_secret(api_key);

        let row = sqlx::query(
            "SELECT id, email, full_name, avatar_url, created_at, updated_at
             FROM profile WHERE api_key_hash = $1",
        )
        .bind(&hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| profile_from_row(&r)))
    }

    async fn create(&self, req: CreateProfileRequest) -> Result<CreatedProfile> {
        req.validate()?;

        let id = new_v7();
        let now = Utc::now();
        let api_key = format!("hz_key_{}", Self::generate_secret(32));
        let key_hash = Self::hash_secret(&api_key);

        sqlx::query(
            "INSERT INTO profile (id, email, full_name, avatar_url, api_key_hash, created_at, updated_at)
             VALUES ($1, $2, $3, NULL, $4, $5, $5)",
        )
        .bind(id)
        .bind(req.email.trim())
        .bind(&req.full_name)
        .bind(&key_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(CreatedProfile {
            profile: Profile {
                id,
                email: req.email.trim().to_string(),
                full_name: req.full_name,
                avatar_url: None,
                created_at: now,
                updated_at: now,
            },
            api_key,
        })
    }

    async fn update_self(&self, actor: Uuid, req: UpdateProfileRequest) -> Result<Profile> {
        let result = sqlx::query(
            "UPDATE profile
             SET full_name = COALESCE($2, full_name),
                 avatar_url = COALESCE($3, avatar_url),
                 updated_at = $4
             WHERE id = $1",
        )
        .bind(actor)
        .bind(&req.full_name)
        .bind(&req.avatar_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("profile".to_string()));
        }

        self.get(actor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_charset_and_length() {
        let secret = PgProfileRepository::generate_secret(32);
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_hash_secret_is_stable_hex() {
        let a = PgProfileRepository::hash_secret("hz_key_abc");
        let b = PgProfileRepository::hash_secret("hz_key_abc");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_secret_differs_per_key() {
        let a = PgProfileRepository::hash_secret("hz_key_abc");
        let b = PgProfileRepository::hash_secret("hz_key_abd");
        assert_ne!(a, b);
    }
}
