use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    /// Public base URL used when building verification links.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    /// Root directory for stored files; avatars land under `avatars/`.
    pub public_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        // Missing signing secret must abort startup, not surface per-request.
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
        };
        let mail = MailConfig {
            smtp_host: std::env::var("SMTP_HOST")
                .unwrap_or_else(|_| "sandbox.smtp.mailtrap.io".into()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(2525),
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from: std::env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@contacts.app".into()),
            base_url: std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
        };
        let public_dir = std::env::var("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public"));
        Ok(Self {
            database_url,
            jwt,
            mail,
            public_dir,
        })
    }
}
