//! Room file entity for database operations.

use chrono::{DateTime, Utc};
use domain::models::room_file::RoomFile;
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for file metadata rows.
#[derive(Debug, Clone, FromRow)]
pub struct RoomFileEntity {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub storage_key: String,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<RoomFileEntity> for RoomFile {
    fn from(entity: RoomFileEntity) -> Self {
        RoomFile {
            id: entity.id,
            room_id: entity.room_id,
            name: entity.name,
            storage_key: entity.storage_key,
            content_type: entity.content_type,
            size_bytes: entity.size_bytes,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_file_entity_to_domain() {
        let entity = RoomFileEntity {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            name: "cap-table.xlsx".to_string(),
            storage_key: "rooms/abc/cap-table.xlsx".to_string(),
            content_type: Some("application/vnd.ms-excel".to_string()),
            size_bytes: Some(48_213),
            created_at: Utc::now(),
        };

        let file: RoomFile = entity.clone().into();
        assert_eq!(file.id, entity.id);
        assert_eq!(file.storage_key, "rooms/abc/cap-table.xlsx");
        assert_eq!(file.size_bytes, Some(48_213));
    }
}
