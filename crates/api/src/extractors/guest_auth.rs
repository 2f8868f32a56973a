//! Guest token authentication extractor.
//!
//! Guest tokens are minted at redemption and carry the access-link ID as
//! their subject. Every guest request re-resolves the link, so revoking a
//! link cuts off guests holding live tokens on their next request.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use domain::models::AccessLink;
use persistence::repositories::AccessLinkRepository;
use shared::jwt::extract_subject_id;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::user_auth::create_jwt_config;

/// Authenticated guest session backed by a still-active access link.
///
/// A link that has since run out of uses does not end the session: the
/// guest consumed a use to get here. Only revocation and expiry do.
#[derive(Debug, Clone)]
pub struct GuestAccess {
    /// The access link the guest redeemed, freshly loaded.
    pub link: AccessLink,
    /// JWT ID (jti) of the guest token.
    pub jti: String,
}

#[async_trait]
impl FromRequestParts<AppState> for GuestAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let jwt_config = create_jwt_config(&state.config.jwt).map_err(ApiError::Internal)?;

        let claims = jwt_config
            .validate_guest_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired guest token".to_string()))?;

        let link_id = extract_subject_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid guest token".to_string()))?;

        let repo = AccessLinkRepository::new(state.pool.clone());
        let link = repo
            .find_by_id(link_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Access link is no longer active".to_string()))?;

        if link.is_revoked() || link.is_expired() {
            tracing::debug!(link_id = %link.id, "Guest token presented for inactive link");
            return Err(ApiError::Unauthorized(
                "Access link is no longer active".to_string(),
            ));
        }

        Ok(GuestAccess {
            link,
            jti: claims.jti,
        })
    }
}
