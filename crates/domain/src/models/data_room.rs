//! Data room domain models: named collections of shared documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Represents a data room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DataRoom {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Owner-facing validity date. Informational: guest redemption is gated
    /// by the access link, not by this field.
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DataRoom {
    /// Whether the room's validity date has passed.
    pub fn is_past_validity(&self) -> bool {
        self.valid_until.is_some_and(|until| Utc::now() > until)
    }
}

/// Request payload for creating a data room.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateDataRoomRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Name must be between 1 and 200 characters"
    ))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_future_timestamp"))]
    pub valid_until: Option<DateTime<Utc>>,
}

/// Request payload for updating a data room.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateDataRoomRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Name must be between 1 and 200 characters"
    ))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub valid_until: Option<DateTime<Utc>>,
}

impl UpdateDataRoomRequest {
    /// True when no field is present to change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.valid_until.is_none()
    }
}

/// Owner-facing representation of a data room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DataRoomResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DataRoom> for DataRoomResponse {
    fn from(room: DataRoom) -> Self {
        Self {
            id: room.id,
            name: room.name,
            description: room.description,
            valid_until: room.valid_until,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

/// Query parameters for listing rooms.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListDataRoomsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Pagination metadata for room listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DataRoomPagination {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Response for listing rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListDataRoomsResponse {
    pub data: Vec<DataRoomResponse>,
    pub pagination: DataRoomPagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_room() -> DataRoom {
        DataRoom {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Q3 Diligence".to_string(),
            description: Some("Financials for the Q3 round".to_string()),
            valid_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_room_without_validity_never_past() {
        let room = test_room();
        assert!(!room.is_past_validity());
    }

    #[test]
    fn test_room_past_validity() {
        let mut room = test_room();
        room.valid_until = Some(Utc::now() - Duration::days(1));
        assert!(room.is_past_validity());

        room.valid_until = Some(Utc::now() + Duration::days(1));
        assert!(!room.is_past_validity());
    }

    #[test]
    fn test_create_request_validation() {
        let valid = CreateDataRoomRequest {
            name: "Deal Room".to_string(),
            description: Some("Documents for the acquisition".to_string()),
            valid_until: Some(Utc::now() + Duration::days(30)),
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateDataRoomRequest {
            name: "".to_string(),
            description: None,
            valid_until: None,
        };
        assert!(empty_name.validate().is_err());

        let past_validity = CreateDataRoomRequest {
            name: "Deal Room".to_string(),
            description: None,
            valid_until: Some(Utc::now() - Duration::days(1)),
        };
        assert!(past_validity.validate().is_err());
    }

    #[test]
    fn test_update_request_is_empty() {
        let empty = UpdateDataRoomRequest {
            name: None,
            description: None,
            valid_until: None,
        };
        assert!(empty.is_empty());

        let with_name = UpdateDataRoomRequest {
            name: Some("Renamed".to_string()),
            description: None,
            valid_until: None,
        };
        assert!(!with_name.is_empty());
    }

    #[test]
    fn test_update_request_validation() {
        let too_long = UpdateDataRoomRequest {
            name: Some("x".repeat(201)),
            description: None,
            valid_until: None,
        };
        assert!(too_long.validate().is_err());
    }
}
