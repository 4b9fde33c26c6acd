use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::state::AppState;

/// Session tokens expire ten hours after issuance.
pub const SESSION_TTL: Duration = Duration::hours(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_secret(&state.config.jwt.secret)
    }
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, user_id: Uuid, email: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: (now + SESSION_TTL).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session token signed");
        Ok(token)
    }

    /// Malformed, tampered, and expired tokens all come back as `Err`; the
    /// caller maps every failure to the same unauthorized rejection.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = JwtKeys::from_secret("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "a@x.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@x.com");
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn keys_from_state_use_the_configured_secret() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign(Uuid::new_v4(), "a@x.com").expect("sign");
        // fake() pins the secret to "test-secret"
        assert!(JwtKeys::from_secret("test-secret").verify(&token).is_ok());
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = JwtKeys::from_secret("secret-a")
            .sign(Uuid::new_v4(), "a@x.com")
            .expect("sign");
        assert!(JwtKeys::from_secret("secret-b").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = JwtKeys::from_secret("dev-secret");
        assert!(keys.verify("").is_err());
        assert!(keys.verify("not.a.jwt").is_err());
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let keys = JwtKeys::from_secret("dev-secret");
        let token = keys.sign(Uuid::new_v4(), "a@x.com").expect("sign");
        let mut parts: Vec<&str> = token.split('.').collect();
        let other = keys.sign(Uuid::new_v4(), "b@x.com").expect("sign");
        let other_payload = other.split('.').nth(1).unwrap().to_string();
        parts[1] = &other_payload;
        assert!(keys.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = JwtKeys::from_secret("dev-secret");
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".into(),
            iat: (now - Duration::hours(11)).unix_timestamp() as usize,
            exp: (now - Duration::hours(1)).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }
}
