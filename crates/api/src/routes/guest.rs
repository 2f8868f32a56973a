//! Guest-facing room endpoints.
//!
//! Guests authenticate with the token minted at redemption. The extractor
//! re-resolves the backing link on every request, so a revoked link locks
//! guests out immediately.

use axum::{extract::State, Json};
use serde::Serialize;

use domain::models::room_file::RoomFileResponse;
use persistence::repositories::{DataRoomRepository, RoomFileRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::GuestAccess;

/// Room contents as a guest sees them.
///
/// Deliberately narrower than the owner's view: no owner ID, no validity
/// window, no link inventory.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestRoomResponse {
    pub room_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_description: Option<String>,
    pub files: Vec<RoomFileResponse>,
}

/// View the room granted by the guest token.
///
/// GET /api/v1/guest/room
pub async fn view_room(
    State(state): State<AppState>,
    guest: GuestAccess,
) -> Result<Json<GuestRoomResponse>, ApiError> {
    let rooms = DataRoomRepository::new(state.pool.clone());
    let room = rooms
        .find_by_id(guest.link.room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    // An expired room is closed to guests even while their token is live
    if room.is_past_validity() {
        return Err(ApiError::NotFound("Room not found".to_string()));
    }

    let files = RoomFileRepository::new(state.pool.clone())
        .list_by_room(room.id)
        .await?
        .into_iter()
        .map(RoomFileResponse::from)
        .collect();

    Ok(Json(GuestRoomResponse {
        room_name: room.name,
        room_description: room.description,
        files,
    }))
}
