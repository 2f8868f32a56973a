//! Data room entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::data_room::DataRoom;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for data rooms.
#[derive(Debug, Clone, FromRow)]
pub struct DataRoomEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DataRoomEntity> for DataRoom {
    fn from(entity: DataRoomEntity) -> Self {
        DataRoom {
            id: entity.id,
            owner_id: entity.owner_id,
            name: entity.name,
            description: entity.description,
            valid_until: entity.valid_until,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
