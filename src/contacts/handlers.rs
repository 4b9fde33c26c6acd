use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{CreateContactRequest, FavoriteRequest, ListQuery, UpdateContactRequest};
use super::repo::Contact;

/// A malformed id reads the same as a missing contact.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn list_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = Contact::list_by_owner(
        &state.db,
        auth.id,
        query.favorite,
        query.limit(),
        query.offset(),
    )
    .await?;
    // An empty page surfaces as 404 at this boundary.
    if contacts.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(contacts))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    let id = parse_id(&id)?;
    let contact = Contact::find(&state.db, auth.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(contact))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn create_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    payload.validate()?;
    let contact = Contact::create(
        &state.db,
        auth.id,
        &payload.name,
        &payload.email,
        &payload.phone,
        payload.favorite,
    )
    .await?;
    info!(contact_id = %contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn update_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<Json<Contact>, ApiError> {
    let id = parse_id(&id)?;
    payload.validate()?;
    let contact = Contact::update(&state.db, auth.id, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(contact))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn update_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<FavoriteRequest>,
) -> Result<Json<Contact>, ApiError> {
    let id = parse_id(&id)?;
    let contact = Contact::set_favorite(&state.db, auth.id, id, payload.favorite)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(contact))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn delete_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    let id = parse_id(&id)?;
    let contact = Contact::delete(&state.db, auth.id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(contact_id = %contact.id, "contact deleted");
    Ok(Json(contact))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_read_as_not_found() {
        let err = parse_id("definitely-not-a-uuid").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
        assert!(parse_id("1d3f3f1e-0000-4000-8000-aaaaaaaaaaaa").is_ok());
    }
}
