//! Owner JWT authentication extractor.
//!
//! Provides an Axum extractor for validating JWT access tokens from requests.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use crate::error::ApiError;
use shared::jwt::JwtConfig;

/// Authenticated room owner information from JWT.
///
/// This extractor validates the Bearer token in the Authorization header
/// and provides access to the authenticated owner's details.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti) for session tracking.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns user authentication info.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_access_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token".to_string())?;

        Ok(UserAuth {
            user_id,
            jti: claims.jti,
        })
    }
}

/// Creates a JwtConfig from JwtAuthConfig.
///
/// The only construction point for JwtConfig: token minting and validation
/// must agree on the key material, normalization included.
pub fn create_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, String> {
    let private_key = normalize_pem_key(&config.private_key);
    let public_key = normalize_pem_key(&config.public_key);

    JwtConfig::with_leeway(
        &private_key,
        &public_key,
        config.access_token_expiry_secs,
        config.refresh_token_expiry_secs,
        config.guest_token_expiry_secs,
        config.leeway_secs,
    )
    .map_err(|e| format!("Failed to initialize JWT config: {}", e))
}

/// Normalize a PEM key by converting literal `\n` sequences to newlines.
///
/// Keys passed through environment variables often arrive single-line with
/// escaped newlines, sometimes quoted. Never log the key content here.
fn normalize_pem_key(key: &str) -> String {
    let key = key.trim_matches('"').trim_matches('\'');
    let normalized = key.replace("\\n", "\n");

    if !normalized.contains('\n') && normalized.len() > 100 {
        tracing::error!("PEM key missing newlines after normalization");
    }

    normalized
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
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

        let auth = UserAuth::validate(&jwt_config, token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(auth)
    }
}
