use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;

pub use extractors::AuthUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route("/users/logout", post(handlers::logout))
        .route("/users/current", get(handlers::current_user))
        .route("/users", post(handlers::update_subscription))
        .route(
            "/users/avatars",
            get(handlers::get_avatar).patch(handlers::upload_avatar),
        )
        .route("/users/verify/:token", get(handlers::verify_email))
        .route("/users/verify", post(handlers::resend_verification))
}
