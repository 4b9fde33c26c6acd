use serde::Deserialize;

use crate::error::ApiError;
use crate::validate::is_valid_email;

fn valid_name(name: &str) -> bool {
    let len = name.trim().chars().count();
    (1..=30).contains(&len)
}

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub favorite: bool,
}

impl CreateContactRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !valid_name(&self.name) {
            return Err(ApiError::Validation(
                "name must be between 1 and 30 characters".into(),
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation("email must be a valid address".into()));
        }
        if self.phone.trim().is_empty() {
            return Err(ApiError::Validation("phone is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub favorite: Option<bool>,
}

impl UpdateContactRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.favorite.is_none()
        {
            return Err(ApiError::Validation(
                "Body must have at least one field".into(),
            ));
        }
        if let Some(name) = &self.name {
            if !valid_name(name) {
                return Err(ApiError::Validation(
                    "name must be between 1 and 30 characters".into(),
                ));
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(ApiError::Validation("email must be a valid address".into()));
            }
        }
        if let Some(phone) = &self.phone {
            if phone.trim().is_empty() {
                return Err(ApiError::Validation("phone must not be empty".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub favorite: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub favorite: Option<bool>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

impl ListQuery {
    /// Page size as bound into LIMIT; non-positive values clamp to 1 so a
    /// malformed query param never reaches Postgres as a negative LIMIT.
    pub fn limit(&self) -> i64 {
        self.limit.max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_accepts_long_international_phone() {
        let req = CreateContactRequest {
            name: "Jo Doe".into(),
            email: "jo@x.com".into(),
            phone: "+380000000000000".into(),
            favorite: false,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_accepts_two_letter_name() {
        // Short names like "Jo" are real names; only blank ones are rejected.
        let req = CreateContactRequest {
            name: "Jo".into(),
            email: "jo@x.com".into(),
            phone: "+380000000000000".into(),
            favorite: false,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_rejects_blank_name_and_bad_email() {
        let req = CreateContactRequest {
            name: "   ".into(),
            email: "jo@x.com".into(),
            phone: "+38000".into(),
            favorite: false,
        };
        assert!(req.validate().is_err());

        let req = CreateContactRequest {
            name: "Jo Doe".into(),
            email: "not-an-email".into(),
            phone: "+38000".into(),
            favorite: false,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let req = UpdateContactRequest {
            name: None,
            email: None,
            phone: None,
            favorite: None,
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), "Body must have at least one field");

        let req = UpdateContactRequest {
            name: None,
            email: None,
            phone: None,
            favorite: Some(true),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn list_query_defaults_and_offset() {
        let q: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 20);
        assert_eq!(q.offset(), 0);

        let q = ListQuery {
            page: 3,
            limit: 10,
            favorite: None,
        };
        assert_eq!(q.offset(), 20);

        // Nonsense pages clamp rather than go negative.
        let q = ListQuery {
            page: 0,
            limit: 10,
            favorite: None,
        };
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn non_positive_limits_clamp_to_one() {
        let q = ListQuery {
            page: 1,
            limit: -1,
            favorite: None,
        };
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 0);

        let q = ListQuery {
            page: 3,
            limit: 0,
            favorite: None,
        };
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 2);
    }
}
