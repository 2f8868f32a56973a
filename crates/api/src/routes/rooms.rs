//! Owner routes for managing data rooms.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::data_room::{
    CreateDataRoomRequest, DataRoomPagination, DataRoomResponse, ListDataRoomsQuery,
    ListDataRoomsResponse, UpdateDataRoomRequest,
};
use persistence::repositories::DataRoomRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Create a data room.
///
/// POST /api/v1/rooms
pub async fn create_room(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateDataRoomRequest>,
) -> Result<(StatusCode, Json<DataRoomResponse>), ApiError> {
    request.validate()?;

    let room = DataRoomRepository::new(state.pool.clone())
        .create(
            auth.user_id,
            &request.name,
            request.description.as_deref(),
            request.valid_until,
        )
        .await?;

    tracing::info!(room_id = %room.id, owner_id = %auth.user_id, "Data room created");

    Ok((StatusCode::CREATED, Json(room.into())))
}

/// List the authenticated owner's rooms, newest first.
///
/// GET /api/v1/rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListDataRoomsQuery>,
) -> Result<Json<ListDataRoomsResponse>, ApiError> {
    // Mirror the repository's normalization so the echo matches the page served
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);

    let (rooms, total) = DataRoomRepository::new(state.pool.clone())
        .list(auth.user_id, &query)
        .await?;

    Ok(Json(ListDataRoomsResponse {
        data: rooms.into_iter().map(DataRoomResponse::from).collect(),
        pagination: DataRoomPagination {
            page,
            per_page,
            total,
        },
    }))
}

/// Fetch one of the owner's rooms.
///
/// GET /api/v1/rooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(room_id): Path<Uuid>,
) -> Result<Json<DataRoomResponse>, ApiError> {
    let room = DataRoomRepository::new(state.pool.clone())
        .find_by_id_for_owner(auth.user_id, room_id)
        .await?
        .ok_or_else(room_not_found)?;

    Ok(Json(room.into()))
}

/// Update a room's name, description, or validity window.
///
/// PATCH /api/v1/rooms/{room_id}
pub async fn update_room(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(room_id): Path<Uuid>,
    Json(request): Json<UpdateDataRoomRequest>,
) -> Result<Json<DataRoomResponse>, ApiError> {
    request.validate()?;

    if request.is_empty() {
        return Err(ApiError::validation("No fields to update".to_string()));
    }

    let room = DataRoomRepository::new(state.pool.clone())
        .update(
            auth.user_id,
            room_id,
            request.name.as_deref(),
            request.description.as_deref(),
            request.valid_until,
        )
        .await?
        .ok_or_else(room_not_found)?;

    Ok(Json(room.into()))
}

/// Delete a room and everything under it.
///
/// DELETE /api/v1/rooms/{room_id}
///
/// Files, links, and access events go with the room via cascading deletes.
pub async fn delete_room(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(room_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = DataRoomRepository::new(state.pool.clone())
        .delete(auth.user_id, room_id)
        .await?;

    if !deleted {
        return Err(room_not_found());
    }

    tracing::info!(room_id = %room_id, owner_id = %auth.user_id, "Data room deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn room_not_found() -> ApiError {
    ApiError::NotFound("Room not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_create_room_request_validation() {
        let request = CreateDataRoomRequest {
            name: "Series B Diligence".to_string(),
            description: Some("Financial statements and cap table".to_string()),
            valid_until: Some(Utc::now() + Duration::days(30)),
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_room_request_empty_name() {
        let request = CreateDataRoomRequest {
            name: "".to_string(),
            description: None,
            valid_until: None,
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_room_request_past_validity() {
        let request = CreateDataRoomRequest {
            name: "Series B Diligence".to_string(),
            description: None,
            valid_until: Some(Utc::now() - Duration::hours(1)),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_room_request_empty_detection() {
        let request = UpdateDataRoomRequest {
            name: None,
            description: None,
            valid_until: None,
        };

        assert!(request.is_empty());

        let request = UpdateDataRoomRequest {
            name: Some("Renamed".to_string()),
            description: None,
            valid_until: None,
        };

        assert!(!request.is_empty());
    }

    #[test]
    fn test_pagination_normalization() {
        let query = ListDataRoomsQuery {
            page: Some(0),
            per_page: Some(500),
        };

        assert_eq!(query.page.unwrap_or(1).max(1), 1);
        assert_eq!(query.per_page.unwrap_or(50).clamp(1, 100), 100);
    }
}
