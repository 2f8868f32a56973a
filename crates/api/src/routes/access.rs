//! Public guest endpoints for resolving and redeeming access links.
//!
//! These routes are unauthenticated: the link token in the path is the
//! credential. Responses never reveal whether a failed token was absent,
//! revoked, or expired.

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use domain::models::access_link::{is_token_format, RedeemRequest, RedeemResponse, ResolveLinkResponse};
use domain::models::{AccessLink, AccessOutcome, DenialReason, NewAccessEvent};
use persistence::repositories::{AccessEventRepository, AccessLinkRepository, DataRoomRepository};
use shared::crypto::extract_token_prefix;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::user_auth::create_jwt_config;
use crate::extractors::ClientInfo;
use crate::middleware::record_link_redemption;

/// Resolve an access link token.
///
/// GET /api/v1/access/{token}
///
/// Returns room details for the landing page without consuming a use.
pub async fn resolve_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ResolveLinkResponse>, ApiError> {
    let link = resolve_token(&state, &token).await?;

    if !link.has_uses_remaining() {
        return Err(quota_exhausted());
    }

    let rooms = DataRoomRepository::new(state.pool.clone());
    let room = rooms
        .find_by_id(link.room_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Room missing for access link {}", link.id)))?;

    Ok(Json(ResolveLinkResponse {
        room_name: room.name,
        room_description: room.description,
        guest_first_name: link.guest_first_name.clone(),
        guest_last_name: link.guest_last_name.clone(),
        email_required: link.email_required(),
        remaining_uses: link.remaining_uses(),
    }))
}

/// Redeem an access link.
///
/// POST /api/v1/access/{token}/redeem
///
/// Checks the allowlist, consumes one use, records the outcome, and mints
/// a guest token for the room.
pub async fn redeem_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
    client: ClientInfo,
    Json(request): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>, ApiError> {
    request.validate()?;
    let supplied_email = request.email.trim().to_lowercase();

    // The token must still resolve at redemption time
    let link = resolve_token(&state, &token).await?;

    let events = AccessEventRepository::new(state.pool.clone());

    if !link.email_matches(&supplied_email) {
        record_link_redemption(DenialReason::EmailNotAuthorized.as_str());
        events.insert_async(
            NewAccessEvent::denied(link.id, link.room_id, DenialReason::EmailNotAuthorized)
                .with_email(&supplied_email)
                .with_request_context(client.ip, client.user_agent.clone()),
        );
        tracing::info!(
            link_id = %link.id,
            room_id = %link.room_id,
            "Redemption denied: email not authorized"
        );
        return Err(ApiError::EmailNotAuthorized(
            "The supplied email is not authorized for this link".to_string(),
        ));
    }

    // Quota check on the freshly loaded row
    if !link.has_uses_remaining() {
        record_denied_quota(&events, &link, &supplied_email, &client);
        return Err(quota_exhausted());
    }

    // Guarded decrement: no row comes back when a concurrent redemption
    // took the last use, or the link was revoked or expired in between
    let links = AccessLinkRepository::new(state.pool.clone());
    let used_at = match links.consume_use(link.id).await? {
        Some(used_at) => used_at,
        None => {
            record_denied_quota(&events, &link, &supplied_email, &client);
            return Err(quota_exhausted());
        }
    };

    // Granted events are written before the guest sees the token, stamped
    // with the decrement's timestamp
    record_link_redemption(AccessOutcome::Granted.as_str());
    events
        .insert(
            NewAccessEvent::granted(link.id, link.room_id, used_at)
                .with_email(&supplied_email)
                .with_request_context(client.ip, client.user_agent),
        )
        .await?;

    let jwt_config = create_jwt_config(&state.config.jwt).map_err(ApiError::Internal)?;
    let (guest_token, _) = jwt_config
        .generate_guest_token(link.id)
        .map_err(|e| ApiError::Internal(format!("Failed to mint guest token: {}", e)))?;

    tracing::info!(
        link_id = %link.id,
        room_id = %link.room_id,
        "Access link redeemed"
    );

    Ok(Json(RedeemResponse {
        guest_token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt.guest_token_expiry_secs,
        room_id: link.room_id,
        legal_notice: state.config.security.legal_notice.clone(),
    }))
}

/// Look up a token and apply the checks shared by resolve and redeem.
///
/// Missing, revoked, and expired links all collapse into the same 404 so
/// that a guest cannot probe which tokens once existed. Quota is left to
/// the callers: resolve and redeem report it differently.
async fn resolve_token(state: &AppState, token: &str) -> Result<AccessLink, ApiError> {
    // Malformed tokens can be rejected without touching storage
    if !is_token_format(token) {
        return Err(link_not_found());
    }

    let links = AccessLinkRepository::new(state.pool.clone());
    let link = match links.find_by_token(token).await? {
        Some(link) => link,
        None => {
            // Only the prefix is logged, never the full token
            tracing::debug!(
                token_prefix = extract_token_prefix(token).unwrap_or_default(),
                "Access link token not found"
            );
            return Err(link_not_found());
        }
    };

    if link.is_revoked() || link.is_expired() {
        return Err(link_not_found());
    }

    Ok(link)
}

/// Record a quota denial, metric and audit trail both.
fn record_denied_quota(
    events: &AccessEventRepository,
    link: &AccessLink,
    email: &str,
    client: &ClientInfo,
) {
    record_link_redemption(DenialReason::QuotaExhausted.as_str());
    events.insert_async(
        NewAccessEvent::denied(link.id, link.room_id, DenialReason::QuotaExhausted)
            .with_email(email)
            .with_request_context(client.ip, client.user_agent.clone()),
    );
    tracing::info!(
        link_id = %link.id,
        room_id = %link.room_id,
        "Redemption denied: quota exhausted"
    );
}

fn link_not_found() -> ApiError {
    ApiError::LinkNotFound("This link is invalid or no longer available".to_string())
}

fn quota_exhausted() -> ApiError {
    ApiError::QuotaExhausted("This link has no remaining uses".to_string())
}
