use serde::{Deserialize, Serialize};

use crate::auth::repo::{Subscription, User};
use crate::error::ApiError;
use crate::validate::is_valid_email;

/// Request body for registration and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    /// Normalize first, then validate; lookups always use the lowercase form.
    pub fn normalize(&mut self) {
        self.email = self.email.trim().to_lowercase();
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation("email must be a valid address".into()));
        }
        if self.password.len() < 4 {
            return Err(ApiError::Validation(
                "password must be at least 4 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Request body for the verification resend.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Request body for the subscription change. The tier is parsed by hand so
/// an unknown value comes back as a 400, not a body-deserialization reject.
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    pub subscription: String,
}

impl SubscriptionRequest {
    pub fn tier(&self) -> Result<Subscription, ApiError> {
        self.subscription.parse::<Subscription>().map_err(|_| {
            ApiError::Validation("subscription must be one of starter, pro, business".into())
        })
    }
}

/// Public projection of a user; never carries hashes or tokens.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub subscription: Subscription,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            subscription: user.subscription,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_trims() {
        let mut req = CredentialsRequest {
            email: "  A@X.Com ".into(),
            password: "pass1".into(),
        };
        req.normalize();
        assert_eq!(req.email, "a@x.com");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_email_and_short_password() {
        let mut req = CredentialsRequest {
            email: "not-an-email".into(),
            password: "pass1".into(),
        };
        req.normalize();
        assert!(req.validate().is_err());

        let req = CredentialsRequest {
            email: "a@x.com".into(),
            password: "abc".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn subscription_request_parses_tier() {
        let req = SubscriptionRequest {
            subscription: "pro".into(),
        };
        assert_eq!(req.tier().unwrap(), Subscription::Pro);

        let req = SubscriptionRequest {
            subscription: "platinum".into(),
        };
        assert!(req.tier().is_err());
    }

    #[test]
    fn login_response_has_token_and_profile_only() {
        let response = LoginResponse {
            token: "jwt-here".into(),
            user: UserProfile {
                email: "a@x.com".into(),
                subscription: Subscription::Starter,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token"], "jwt-here");
        assert_eq!(json["user"]["email"], "a@x.com");
        assert_eq!(json["user"]["subscription"], "starter");
        assert!(json["user"].get("password_hash").is_none());
    }

    #[test]
    fn avatar_response_uses_camel_case_key() {
        let json = serde_json::to_value(AvatarResponse {
            avatar_url: "avatars/a.png".into(),
        })
        .unwrap();
        assert_eq!(json["avatarURL"], "avatars/a.png");
    }
}
