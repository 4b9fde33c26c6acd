use axum::{
    extract::{FromRef, Multipart, Path, State},
    http::{header, StatusCode},
    Json,
};
use rand::{distributions::Alphanumeric, Rng};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::dto::{
    AvatarResponse, CredentialsRequest, EmailRequest, LoginResponse, MessageResponse,
    RegisterResponse, SubscriptionRequest, UserProfile,
};
use crate::auth::extractors::AuthUser;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::avatars::content_type_for;
use crate::error::ApiError;
use crate::mail::verification_message;
use crate::state::AppState;
use crate::validate::is_valid_email;

/// Opaque single-use token for the email-verification link; 48 alphanumeric
/// characters is well past 128 bits of entropy.
fn new_verification_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

async fn send_verification(state: &AppState, email: &str, token: &str) {
    let message = verification_message(&state.config.mail, email, token);
    // Mail transport failures are logged, not surfaced; the token stays
    // on the user and can be re-sent.
    if let Err(e) = state.mailer.send(message).await {
        warn!(error = %e, email = %email, "verification mail failed");
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    payload.normalize();
    payload.validate()?;

    let hash = hash_password(&payload.password)?;
    let token = new_verification_token();
    let user = User::create(&state.db, &payload.email, &hash, &token).await?;

    send_verification(&state, &user.email, &token).await;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserProfile::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.normalize();
    payload.validate()?;

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::WrongCredentials
        })?;

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::WrongCredentials);
    }

    if !user.verified {
        warn!(user_id = %user.id, "login before email verification");
        return Err(ApiError::EmailNotVerified);
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, &user.email)?;
    let user = User::set_session_token(&state.db, user.id, &token)
        .await?
        .ok_or(ApiError::WrongCredentials)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    if !User::clear_session_token(&state.db, auth.id).await? {
        return Err(ApiError::NotFound);
    }
    info!(user_id = %auth.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(UserProfile::from(&user)))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn update_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SubscriptionRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let tier = payload.tier()?;
    let user = User::set_subscription(&state.db, auth.id, tier)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    info!(user_id = %user.id, subscription = ?tier, "subscription updated");
    Ok(Json(UserProfile::from(&user)))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<([(header::HeaderName, &'static str); 1], Vec<u8>), ApiError> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    let relative = user.avatar_url.ok_or(ApiError::NotFound)?;
    let body = state.avatars.load(&relative).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&relative))], body))
}

#[instrument(skip(state, auth, multipart), fields(user_id = %auth.id))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("avatar") {
            continue;
        }
        let ext = field
            .file_name()
            .and_then(|n| n.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()));
        let body = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation("malformed multipart body".into()))?;

        let filename = match ext {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let relative = state.avatars.store(&filename, body).await?;
        let user = User::set_avatar(&state.db, auth.id, &relative)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        info!(user_id = %user.id, avatar = %relative, "avatar updated");
        return Ok(Json(AvatarResponse {
            avatar_url: relative,
        }));
    }
    Err(ApiError::Validation("file field \"avatar\" is required".into()))
}

#[instrument(skip(state))]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = User::confirm_verification(&state.db, &token)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(user_id = %user.id, email = %user.email, "email verified");
    Ok(Json(MessageResponse {
        message: "Verification successful",
    }))
}

#[instrument(skip(state, payload))]
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(mut payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("email must be a valid address".into()));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::NotFound)?;
    if user.verified {
        return Err(ApiError::AlreadyVerified);
    }

    let token = new_verification_token();
    // The verified guard in the UPDATE closes the race with a concurrent
    // confirmation.
    User::set_verification_token(&state.db, user.id, &token)
        .await?
        .ok_or(ApiError::AlreadyVerified)?;

    send_verification(&state, &user.email, &token).await;

    info!(user_id = %user.id, email = %user.email, "verification re-sent");
    Ok(Json(MessageResponse {
        message: "Verification email sent",
    }))
}
