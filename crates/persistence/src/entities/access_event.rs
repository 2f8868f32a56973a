//! Access event entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::access_event::{AccessEvent, AccessOutcome};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for access audit events.
#[derive(Debug, Clone, FromRow)]
pub struct AccessEventEntity {
    pub id: Uuid,
    pub link_id: Uuid,
    pub room_id: Uuid,
    pub outcome: String,
    pub reason: Option<String>,
    pub email: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl From<AccessEventEntity> for AccessEvent {
    fn from(entity: AccessEventEntity) -> Self {
        AccessEvent {
            id: entity.id,
            link_id: entity.link_id,
            room_id: entity.room_id,
            outcome: entity.outcome.parse().unwrap_or(AccessOutcome::Denied),
            reason: entity.reason.and_then(|r| r.parse().ok()),
            email: entity.email,
            ip_address: entity.ip_address,
            user_agent: entity.user_agent,
            occurred_at: entity.occurred_at,
        }
    }
}
