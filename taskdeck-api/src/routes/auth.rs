/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Token issuance (login)
/// - Token refresh
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/token` - Exchange credentials for a token pair
/// - `POST /auth/token/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address (login key, matched case-insensitively)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Username (shown as task owner)
    #[validate(length(
        min = 1,
        max = 150,
        message = "Username must be between 1 and 150 characters"
    ))]
    pub username: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Username
    pub username: String,

    /// Staff flag (always false at registration)
    pub is_staff: bool,
}

/// Token request (login)
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Access token (short-lived)
    pub access: String,

    /// Refresh token (long-lived)
    pub refresh: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token
    pub access: String,
}

/// Register a new user
///
/// Creates a new user account. Registration never grants the staff
/// flag; staff accounts are promoted directly in the database.
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "username": "alice",
///   "password": "hunter22"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or email/username taken
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    // Validate request
    req.validate()?;

    // Duplicate checks surface as field errors; the unique constraints
    // remain as a backstop against concurrent registrations
    let mut errors = Vec::new();
    if User::email_exists(&state.db, &req.email).await? {
        errors.push(ValidationErrorDetail {
            field: "email".to_string(),
            message: "A user with this email already exists".to_string(),
        });
    }
    if User::username_exists(&state.db, &req.username).await? {
        errors.push(ValidationErrorDetail {
            field: "username".to_string(),
            message: "A user with this username already exists".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::ValidationError(errors));
    }

    // Hash password
    let password_hash = password::hash_password(&req.password)?;

    // Create user
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            username: req.username,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Registered new user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            is_staff: user.is_staff,
        }),
    ))
}

/// Token issuance endpoint (login)
///
/// Authenticates a user by email and password and returns a JWT pair.
/// Both unknown-email and wrong-password failures produce the same
/// response so the endpoint cannot be used to probe for accounts.
///
/// # Endpoint
///
/// ```text
/// POST /auth/token
/// Content-Type: application/json
///
/// {
///   "email": "alice@example.com",
///   "password": "hunter22"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access": "eyJ...",
///   "refresh": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    // Validate request
    req.validate()?;

    // Find user by email
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    // Verify password
    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    // Generate token pair
    let access_claims = jwt::AccessClaims::new(
        user.id,
        user.username.clone(),
        user.email.clone(),
        Duration::minutes(state.config.jwt.access_ttl_minutes),
    );
    let refresh_claims =
        jwt::RefreshClaims::new(user.id, Duration::days(state.config.jwt.refresh_ttl_days));

    let access = jwt::create_access_token(&access_claims, state.jwt_secret())?;
    let refresh = jwt::create_refresh_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(TokenResponse { access, refresh }))
}

/// Token refresh endpoint
///
/// Exchanges a valid refresh token for a new access token. The user is
/// reloaded so the new token carries current identity claims, and a
/// refresh token for a deleted account is rejected.
///
/// # Endpoint
///
/// ```text
/// POST /auth/token/refresh
/// Content-Type: application/json
///
/// {
///   "refresh": "eyJ..."
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
/// - `500 Internal Server Error`: Server error
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    // Validate the refresh token
    let claims = jwt::validate_refresh_token(&req.refresh, state.jwt_secret())?;

    // Reload the user for current username/email claims
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;

    // Mint a fresh access token
    let access_claims = jwt::AccessClaims::new(
        user.id,
        user.username,
        user.email,
        Duration::minutes(state.config.jwt.access_ttl_minutes),
    );
    let access = jwt::create_access_token(&access_claims, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access }))
}
