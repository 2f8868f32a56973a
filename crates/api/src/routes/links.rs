//! Owner routes for issuing and managing access links.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::access_link::{
    calculate_expiry, generate_token, share_url, AccessLinkPagination, AccessLinkResponse,
    CreateAccessLinkRequest, CreateAccessLinkResponse, ListAccessLinksQuery,
    ListAccessLinksResponse,
};
use persistence::repositories::{AccessLinkRepository, DataRoomRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::record_link_created;

/// Issue a new access link for a room.
///
/// POST /api/v1/rooms/{room_id}/links
pub async fn create_link(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(room_id): Path<Uuid>,
    Json(request): Json<CreateAccessLinkRequest>,
) -> Result<(StatusCode, Json<CreateAccessLinkResponse>), ApiError> {
    request.validate()?;

    let room = DataRoomRepository::new(state.pool.clone())
        .find_by_id_for_owner(auth.user_id, room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    // Allowlist comparison is case-insensitive; store the canonical form
    let email = request.email.as_ref().map(|e| e.trim().to_lowercase());
    let token = generate_token();
    let expires_at = request.expires_in_hours.map(calculate_expiry);

    let link = AccessLinkRepository::new(state.pool.clone())
        .create(
            room.id,
            &token,
            email.as_deref(),
            request.usage_limit,
            expires_at,
            request.country.as_deref(),
            request.guest_first_name.as_deref(),
            request.guest_last_name.as_deref(),
            auth.user_id,
        )
        .await?;

    record_link_created();
    tracing::info!(
        link_id = %link.id,
        room_id = %room.id,
        usage_limit = link.usage_limit,
        "Access link created"
    );

    let share_url = share_url(&state.config.server.app_base_url, &link.token);

    Ok((
        StatusCode::CREATED,
        Json(CreateAccessLinkResponse {
            link: link.into(),
            share_url,
        }),
    ))
}

/// List a room's access links.
///
/// GET /api/v1/rooms/{room_id}/links
///
/// Revoked links are hidden unless `include_revoked=true`.
pub async fn list_links(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(room_id): Path<Uuid>,
    Query(query): Query<ListAccessLinksQuery>,
) -> Result<Json<ListAccessLinksResponse>, ApiError> {
    let room = DataRoomRepository::new(state.pool.clone())
        .find_by_id_for_owner(auth.user_id, room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);

    let (links, total) = AccessLinkRepository::new(state.pool.clone())
        .list_by_room(room.id, &query)
        .await?;

    Ok(Json(ListAccessLinksResponse {
        data: links.into_iter().map(AccessLinkResponse::from).collect(),
        pagination: AccessLinkPagination {
            page,
            per_page,
            total,
        },
    }))
}

/// Fetch a single access link.
///
/// GET /api/v1/links/{link_id}
pub async fn get_link(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(link_id): Path<Uuid>,
) -> Result<Json<AccessLinkResponse>, ApiError> {
    let link = AccessLinkRepository::new(state.pool.clone())
        .find_by_id_for_owner(auth.user_id, link_id)
        .await?
        .ok_or_else(link_not_found)?;

    Ok(Json(link.into()))
}

/// Revoke an access link.
///
/// POST /api/v1/links/{link_id}/revoke
///
/// Revocation is permanent. Guests holding tokens minted from this link
/// lose access on their next request.
pub async fn revoke_link(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(link_id): Path<Uuid>,
) -> Result<Json<AccessLinkResponse>, ApiError> {
    let links = AccessLinkRepository::new(state.pool.clone());

    let link = links
        .find_by_id_for_owner(auth.user_id, link_id)
        .await?
        .ok_or_else(link_not_found)?;

    if link.is_revoked() {
        return Err(ApiError::Conflict("Link is already revoked".to_string()));
    }

    // The guard also catches a concurrent revocation of the same link
    if !links.revoke(link.id).await? {
        return Err(ApiError::Conflict("Link is already revoked".to_string()));
    }

    let revoked = links
        .find_by_id_for_owner(auth.user_id, link_id)
        .await?
        .ok_or_else(link_not_found)?;

    tracing::info!(link_id = %revoked.id, room_id = %revoked.room_id, "Access link revoked");

    Ok(Json(revoked.into()))
}

fn link_not_found() -> ApiError {
    ApiError::NotFound("Link not found".to_string())
}
