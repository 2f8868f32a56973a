//! Room file metadata models.
//!
//! Only metadata lives here; file bytes sit in external object storage under
//! `storage_key` and are never proxied by this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Metadata record for a document in a data room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RoomFile {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub storage_key: String,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for registering a file in a room.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterFileRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_storage_key"))]
    pub storage_key: String,

    #[validate(length(max = 255, message = "Content type must be at most 255 characters"))]
    pub content_type: Option<String>,

    #[validate(range(min = 0, message = "Size must be non-negative"))]
    pub size_bytes: Option<i64>,
}

/// Response representation of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RoomFileResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub storage_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<RoomFile> for RoomFileResponse {
    fn from(file: RoomFile) -> Self {
        Self {
            id: file.id,
            room_id: file.room_id,
            name: file.name,
            storage_key: file.storage_key,
            content_type: file.content_type,
            size_bytes: file.size_bytes,
            created_at: file.created_at,
        }
    }
}

/// Response for listing a room's files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListRoomFilesResponse {
    pub data: Vec<RoomFileResponse>,
    pub count: usize,
}
