//! Authentication routes for owner registration, login, and token management.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::auth::{AuthError, AuthService};

/// Request body for owner registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Owner's email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Owner's password (min 8 chars, 1 upper, 1 lower, 1 digit)
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Owner's display name
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: String,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Request body for logout.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,

    /// End every session for the account, not just this one
    pub all_devices: Option<bool>,
}

/// Owner information in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

/// Token information in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Response body for registration and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokensResponse,
}

/// Register a new owner account.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let auth_service = auth_service(&state)?;

    let result = auth_service
        .register(&request.email, &request.password, &request.display_name)
        .await
        .map_err(map_auth_error)?;

    let response = AuthResponse {
        user: UserResponse {
            id: result.user_id.to_string(),
            email: result.email,
            display_name: result.display_name,
        },
        tokens: TokensResponse {
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: result.access_token_expires_in,
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let auth_service = auth_service(&state)?;

    let result = auth_service
        .login(&request.email, &request.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(AuthResponse {
        user: UserResponse {
            id: result.user_id.to_string(),
            email: result.email,
            display_name: result.display_name,
        },
        tokens: TokensResponse {
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: result.access_token_expires_in,
        },
    }))
}

/// Exchange a refresh token for a fresh token pair.
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokensResponse>, ApiError> {
    request.validate()?;

    let auth_service = auth_service(&state)?;

    let result = auth_service
        .refresh(&request.refresh_token)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(TokensResponse {
        access_token: result.access_token,
        refresh_token: result.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: result.expires_in,
    }))
}

/// End the current session, or every session for the account.
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    let auth_service = auth_service(&state)?;

    auth_service
        .logout(&request.refresh_token, request.all_devices.unwrap_or(false))
        .await
        .map_err(map_auth_error)?;

    Ok(StatusCode::NO_CONTENT)
}

fn auth_service(state: &AppState) -> Result<AuthService, ApiError> {
    AuthService::new(state.pool.clone(), &state.config.jwt)
        .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))
}

/// Collapse service errors into API responses.
///
/// Login failures all map to the same message so the response does not
/// reveal whether the email exists.
fn map_auth_error(e: AuthError) -> ApiError {
    match e {
        AuthError::EmailAlreadyExists => ApiError::Conflict("Email already registered".to_string()),
        AuthError::WeakPassword(msg) => ApiError::validation(msg),
        AuthError::InvalidCredentials | AuthError::UserNotFound => {
            ApiError::Unauthorized("Invalid email or password".to_string())
        }
        AuthError::UserDisabled => ApiError::Forbidden("Account is disabled".to_string()),
        AuthError::InvalidRefreshToken | AuthError::SessionNotFound => {
            ApiError::Unauthorized("Invalid or expired refresh token".to_string())
        }
        AuthError::DatabaseError(db_err) => ApiError::from(db_err),
        AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
        AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
        AuthError::Internal(msg) => ApiError::Internal(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            email: "owner@example.com".to_string(),
            password: "SecureP@ss1".to_string(),
            display_name: "Room Owner".to_string(),
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_invalid_email() {
        let request = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "SecureP@ss1".to_string(),
            display_name: "Room Owner".to_string(),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_empty_password() {
        let request = RegisterRequest {
            email: "owner@example.com".to_string(),
            password: "".to_string(),
            display_name: "Room Owner".to_string(),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_long_display_name() {
        let request = RegisterRequest {
            email: "owner@example.com".to_string(),
            password: "SecureP@ss1".to_string(),
            display_name: "A".repeat(101),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_login_request_requires_password() {
        let request = LoginRequest {
            email: "owner@example.com".to_string(),
            password: "".to_string(),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_refresh_request_requires_token() {
        let request = RefreshRequest {
            refresh_token: "".to_string(),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_map_auth_error_hides_account_existence() {
        let from_missing_user = map_auth_error(AuthError::UserNotFound);
        let from_bad_password = map_auth_error(AuthError::InvalidCredentials);

        match (from_missing_user, from_bad_password) {
            (ApiError::Unauthorized(a), ApiError::Unauthorized(b)) => assert_eq!(a, b),
            other => panic!("expected matching unauthorized errors, got {:?}", other),
        }
    }

    #[test]
    fn test_map_auth_error_conflict_on_duplicate_email() {
        assert!(matches!(
            map_auth_error(AuthError::EmailAlreadyExists),
            ApiError::Conflict(_)
        ));
    }
}
