//! Owner routes for file metadata within a room.
//!
//! The service stores metadata only. Uploads happen against object storage
//! out of band; owners register the resulting key here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::room_file::{ListRoomFilesResponse, RegisterFileRequest, RoomFileResponse};
use persistence::repositories::{DataRoomRepository, RoomFileRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Register a file in one of the owner's rooms.
///
/// POST /api/v1/rooms/{room_id}/files
pub async fn register_file(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(room_id): Path<Uuid>,
    Json(request): Json<RegisterFileRequest>,
) -> Result<(StatusCode, Json<RoomFileResponse>), ApiError> {
    request.validate()?;

    let room = require_owned_room(&state, room_id, auth.user_id).await?;

    let file = RoomFileRepository::new(state.pool.clone())
        .create(
            room.id,
            &request.name,
            &request.storage_key,
            request.content_type.as_deref(),
            request.size_bytes,
        )
        .await?;

    tracing::info!(file_id = %file.id, room_id = %room.id, "File registered");

    Ok((StatusCode::CREATED, Json(file.into())))
}

/// List the files in one of the owner's rooms.
///
/// GET /api/v1/rooms/{room_id}/files
pub async fn list_files(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(room_id): Path<Uuid>,
) -> Result<Json<ListRoomFilesResponse>, ApiError> {
    let room = require_owned_room(&state, room_id, auth.user_id).await?;

    let files: Vec<RoomFileResponse> = RoomFileRepository::new(state.pool.clone())
        .list_by_room(room.id)
        .await?
        .into_iter()
        .map(RoomFileResponse::from)
        .collect();

    let count = files.len();

    Ok(Json(ListRoomFilesResponse { data: files, count }))
}

/// Remove a file's metadata record.
///
/// DELETE /api/v1/files/{file_id}
///
/// Only the metadata goes away; the object under `storage_key` is the
/// owner's to clean up.
pub async fn delete_file(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(file_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let files = RoomFileRepository::new(state.pool.clone());

    // Ownership is checked through the room join before anything is deleted
    let file = files
        .find_by_id_for_owner(auth.user_id, file_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    files.delete(file.id).await?;

    tracing::info!(file_id = %file.id, room_id = %file.room_id, "File removed");

    Ok(StatusCode::NO_CONTENT)
}

async fn require_owned_room(
    state: &AppState,
    room_id: Uuid,
    owner_id: Uuid,
) -> Result<domain::models::DataRoom, ApiError> {
    DataRoomRepository::new(state.pool.clone())
        .find_by_id_for_owner(owner_id, room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))
}
