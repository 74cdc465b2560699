/// Token endpoints
///
/// This module provides JWT issuance and maintenance:
/// - Obtain an access/refresh token pair with username and password
/// - Refresh an access token
/// - Verify a token
///
/// # Endpoints
///
/// - `POST /token` - Obtain token pair
/// - `POST /token/refresh` - Refresh access token
/// - `POST /token/verify` - Verify a token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tasklane_shared::{
    auth::{jwt, password},
    models::user::User,
};

/// Token obtain request
#[derive(Debug, Deserialize)]
pub struct ObtainTokenRequest {
    /// Username
    pub username: String,

    /// Password
    pub password: String,
}

/// Token obtain response
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Token refresh response
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Token verify request
#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    /// Token to verify (access or refresh)
    pub token: String,
}

/// Obtain a token pair
///
/// Authenticates a user by username and password and returns JWT tokens.
/// Unknown usernames and wrong passwords produce the same error so the
/// endpoint cannot be used to probe which accounts exist.
///
/// # Endpoint
///
/// ```text
/// POST /token
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn obtain_token_pair(
    State(state): State<AppState>,
    Json(req): Json<ObtainTokenRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let pair = jwt::issue_pair(user.id, &user.username, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "Token pair issued");

    Ok(Json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Refresh an access token
///
/// Exchanges a refresh token for a new access token.
///
/// # Endpoint
///
/// ```text
/// POST /token/refresh
/// Content-Type: application/json
///
/// {
///   "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiResult<Json<RefreshTokenResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshTokenResponse { access_token }))
}

/// Verify a token
///
/// Checks that a token (of either type) is well-formed, correctly signed,
/// and not expired. Returns an empty JSON object on success, mirroring the
/// obtain/refresh endpoints' error shape on failure.
///
/// # Endpoint
///
/// ```text
/// POST /token/verify
/// Content-Type: application/json
///
/// {
///   "token": "eyJ..."
/// }
/// ```
///
/// # Response
///
/// `200 OK` with `{}`
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired token
pub async fn verify_token(
    State(state): State<AppState>,
    Json(req): Json<VerifyTokenRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    jwt::validate_token(&req.token, state.jwt_secret())?;

    Ok(Json(serde_json::json!({})))
}
