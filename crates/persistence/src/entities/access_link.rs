//! Access link entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::access_link::AccessLink;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for access links.
#[derive(Debug, Clone, FromRow)]
pub struct AccessLinkEntity {
    pub id: Uuid,
    pub room_id: Uuid,
    pub token: String,
    pub email: Option<String>,
    pub usage_limit: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub country: Option<String>,
    pub guest_first_name: Option<String>,
    pub guest_last_name: Option<String>,
    pub used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccessLinkEntity> for AccessLink {
    fn from(entity: AccessLinkEntity) -> Self {
        AccessLink {
            id: entity.id,
            room_id: entity.room_id,
            token: entity.token,
            email: entity.email,
            usage_limit: entity.usage_limit,
            expires_at: entity.expires_at,
            country: entity.country,
            guest_first_name: entity.guest_first_name,
            guest_last_name: entity.guest_last_name,
            used_at: entity.used_at,
            revoked_at: entity.revoked_at,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
