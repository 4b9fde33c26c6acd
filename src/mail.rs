use axum::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()>;
}

/// SMTP-backed sender; the transport is configured once at startup.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        let from = config.from.parse::<Mailbox>()?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(message.to.parse()?)
            .subject(message.subject)
            .multipart(MultiPart::alternative_plain_html(
                message.text,
                message.html,
            ))?;
        self.transport.send(email).await?;
        Ok(())
    }
}

/// Builds the verification email pointing at `GET /users/verify/:token`.
pub fn verification_message(config: &MailConfig, to: &str, token: &str) -> MailMessage {
    let link = format!(
        "{}/users/verify/{}",
        config.base_url.trim_end_matches('/'),
        token
    );
    MailMessage {
        to: to.to_string(),
        subject: "Please verify your email".into(),
        html: format!(r#"<p>Welcome! Follow <a href="{link}">this link</a> to verify your email.</p>"#),
        text: format!("Welcome! Open {link} to verify your email."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> MailConfig {
        MailConfig {
            smtp_host: "localhost".into(),
            smtp_port: 2525,
            username: String::new(),
            password: String::new(),
            from: "no-reply@contacts.app".into(),
            base_url: base_url.into(),
        }
    }

    #[test]
    fn verification_link_embeds_token() {
        let msg = verification_message(&config("https://api.example.com"), "jo@x.com", "tok123");
        assert_eq!(msg.to, "jo@x.com");
        assert!(msg.html.contains("https://api.example.com/users/verify/tok123"));
        assert!(msg.text.contains("https://api.example.com/users/verify/tok123"));
    }

    #[test]
    fn trailing_slash_in_base_url_does_not_double() {
        let msg = verification_message(&config("http://localhost:8080/"), "a@b.c", "t");
        assert!(msg.text.contains("http://localhost:8080/users/verify/t"));
        assert!(!msg.text.contains("8080//users"));
    }
}
