use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::UpdateContactRequest;

/// A contact always belongs to exactly one owner, and every statement below
/// carries the owner in its WHERE clause. A foreign id is indistinguishable
/// from a missing one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub favorite: bool,
    #[serde(skip_serializing)]
    pub owner: Uuid,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
}

const CONTACT_COLUMNS: &str = "id, name, email, phone, favorite, owner, created_at";

impl Contact {
    pub async fn create(
        db: &PgPool,
        owner: Uuid,
        name: &str,
        email: &str,
        phone: &str,
        favorite: bool,
    ) -> anyhow::Result<Contact> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            r#"
            INSERT INTO contacts (owner, name, email, phone, favorite)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CONTACT_COLUMNS}
            "#,
        ))
        .bind(owner)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(favorite)
        .fetch_one(db)
        .await?;
        Ok(contact)
    }

    pub async fn list_by_owner(
        db: &PgPool,
        owner: Uuid,
        favorite: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Contact>> {
        let rows = match favorite {
            Some(favorite) => {
                sqlx::query_as::<_, Contact>(&format!(
                    r#"
                    SELECT {CONTACT_COLUMNS} FROM contacts
                    WHERE owner = $1 AND favorite = $2
                    ORDER BY created_at
                    LIMIT $3 OFFSET $4
                    "#,
                ))
                .bind(owner)
                .bind(favorite)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Contact>(&format!(
                    r#"
                    SELECT {CONTACT_COLUMNS} FROM contacts
                    WHERE owner = $1
                    ORDER BY created_at
                    LIMIT $2 OFFSET $3
                    "#,
                ))
                .bind(owner)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn find(db: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND owner = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }

    pub async fn update(
        db: &PgPool,
        owner: Uuid,
        id: Uuid,
        patch: &UpdateContactRequest,
    ) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            r#"
            UPDATE contacts SET
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                favorite = COALESCE($6, favorite)
            WHERE id = $1 AND owner = $2
            RETURNING {CONTACT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner)
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(patch.favorite)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }

    pub async fn set_favorite(
        db: &PgPool,
        owner: Uuid,
        id: Uuid,
        favorite: bool,
    ) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            r#"
            UPDATE contacts SET favorite = $3
            WHERE id = $1 AND owner = $2
            RETURNING {CONTACT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner)
        .bind(favorite)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }

    /// Returns the removed contact, matching the delete response shape.
    pub async fn delete(db: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "DELETE FROM contacts WHERE id = $1 AND owner = $2 RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(db)
        .await?;
        Ok(contact)
    }
}
