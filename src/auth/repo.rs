use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "subscription_tier", rename_all = "lowercase")]
pub enum Subscription {
    Starter,
    Pro,
    Business,
}

impl std::str::FromStr for Subscription {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(Subscription::Starter),
            "pro" => Ok(Subscription::Pro),
            "business" => Ok(Subscription::Business),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub subscription: Subscription,
    pub avatar_url: Option<String>,
    pub verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, email, password_hash, subscription, avatar_url, \
                            verified, verification_token, session_token, created_at";

impl User {
    /// Insert a new unverified user. The unique constraint on `email` makes
    /// the duplicate check atomic; a violation surfaces as `EmailInUse`.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        verification_token: &str,
    ) -> Result<User, ApiError> {
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, verification_token)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(email)
        .bind(password_hash)
        .bind(verification_token)
        .fetch_one(db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                Err(ApiError::EmailInUse)
            }
            Err(e) => Err(ApiError::Internal(e.into())),
        }
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Store the freshly issued session token, displacing any previous one.
    pub async fn set_session_token(
        db: &PgPool,
        id: Uuid,
        token: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET session_token = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Returns false when no such user exists.
    pub async fn clear_session_token(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE users SET session_token = NULL WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Single atomic compare-and-clear: the token is matched and nulled in
    /// one statement, so a second redemption finds zero rows.
    pub async fn confirm_verification(db: &PgPool, token: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET verified = TRUE, verification_token = NULL
            WHERE verification_token = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn set_verification_token(
        db: &PgPool,
        id: Uuid,
        token: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET verification_token = $2
            WHERE id = $1 AND verified = FALSE
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn set_subscription(
        db: &PgPool,
        id: Uuid,
        subscription: Subscription,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET subscription = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(subscription)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn set_avatar(
        db: &PgPool,
        id: Uuid,
        avatar_url: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET avatar_url = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(avatar_url)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
