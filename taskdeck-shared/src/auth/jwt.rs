/// JWT token generation and validation module
///
/// Taskdeck identity is stateless: every request carries a signed,
/// self-contained claim set and no session state exists server-side.
/// Validity is determined solely by signature and expiry.
///
/// # Token Types
///
/// - **Access Token**: short-lived (minutes), embeds user id, username,
///   and email; proves caller identity for a single request window
/// - **Refresh Token**: longer-lived (days), embeds only the user id;
///   used solely to mint new access tokens
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Validation**: signature, expiration, issuer, and token-type checks
/// - **Secret Management**: secrets should be at least 32 bytes
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::{create_access_token, validate_access_token, AccessClaims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "taskdeck-test-secret-at-least-32-bytes!!";
/// let claims = AccessClaims::new(
///     Uuid::new_v4(),
///     "alice".to_string(),
///     "a@x.com".to_string(),
///     Duration::minutes(15),
/// );
/// let token = create_access_token(&claims, secret)?;
/// let validated = validate_access_token(&token, secret)?;
/// assert_eq!(validated.username, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

/// Token issuer embedded in every claim set
pub const ISSUER: &str = "taskdeck";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token failed validation (bad signature, issuer, format, or type)
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived)
    Access,

    /// Refresh token (long-lived)
    Refresh,
}

impl TokenType {
    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// Claims carried by an access token
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskdeck")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
///
/// # Custom Claims
///
/// - `username` / `email`: the stable identity bound to every request
/// - `token_type`: always `Access`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Username (custom claim)
    pub username: String,

    /// Email address (custom claim)
    pub email: String,

    /// Issuer - Always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl AccessClaims {
    /// Creates access claims expiring after `expires_in`
    pub fn new(user_id: Uuid, username: String, email: String, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            username,
            email,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            token_type: TokenType::Access,
        }
    }
}

/// Claims carried by a refresh token
///
/// Refresh tokens deliberately embed only the user id. The current
/// username, email, and privilege flag are re-read from the store when a
/// new access token is minted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl RefreshClaims {
    /// Creates refresh claims expiring after `expires_in`
    pub fn new(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            token_type: TokenType::Refresh,
        }
    }
}

fn encode_claims<C: Serialize>(claims: &C, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

fn decode_claims<C: DeserializeOwned>(token: &str, secret: &str) -> Result<C, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<C>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Signs an access token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_access_token(claims: &AccessClaims, secret: &str) -> Result<String, JwtError> {
    encode_claims(claims, secret)
}

/// Signs a refresh token from claims
pub fn create_refresh_token(claims: &RefreshClaims, secret: &str) -> Result<String, JwtError> {
    encode_claims(claims, secret)
}

/// Validates an access token and extracts its claims
///
/// Verifies the signature, expiry, issuer, and that the token is an
/// access token (a refresh token presented here is rejected).
///
/// # Errors
///
/// - `JwtError::Expired` if past `exp`
/// - `JwtError::Invalid` for bad signature, issuer, format, or type
pub fn validate_access_token(token: &str, secret: &str) -> Result<AccessClaims, JwtError> {
    let claims: AccessClaims = decode_claims(token, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::Invalid(
            "Expected access token, got refresh token".to_string(),
        ));
    }

    Ok(claims)
}

/// Validates a refresh token and extracts its claims
///
/// Verifies the signature, expiry, issuer, and that the token is a
/// refresh token (an access token presented here is rejected).
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<RefreshClaims, JwtError> {
    let claims: RefreshClaims = decode_claims(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::Invalid(
            "Expected refresh token, got access token".to_string(),
        ));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn access_claims(expires_in: Duration) -> AccessClaims {
        AccessClaims::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "alice@example.com".to_string(),
            expires_in,
        )
    }

    #[test]
    fn test_access_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = AccessClaims::new(
            user_id,
            "alice".to_string(),
            "alice@example.com".to_string(),
            Duration::minutes(15),
        );

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_claims_carry_only_user_id() {
        let user_id = Uuid::new_v4();
        let claims = RefreshClaims::new(user_id, Duration::days(7));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(json.get("username").is_none());
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_create_and_validate_access_token() {
        let claims = access_claims(Duration::minutes(15));
        let token = create_access_token(&claims, SECRET).expect("Should create token");

        let validated = validate_access_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, claims.sub);
        assert_eq!(validated.username, "alice");
        assert_eq!(validated.email, "alice@example.com");
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = access_claims(Duration::minutes(15));
        let token = create_access_token(&claims, SECRET).expect("Should create token");

        assert!(validate_access_token(&token, "wrong-secret-also-32-bytes-long!!!!").is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        // Expired one hour ago
        let claims = access_claims(Duration::seconds(-3600));
        let token = create_access_token(&claims, SECRET).expect("Should create token");

        let result = validate_access_token(&token, SECRET);
        assert!(matches!(result.unwrap_err(), JwtError::Expired));
    }

    #[test]
    fn test_token_type_confusion_rejected() {
        let access = access_claims(Duration::minutes(15));
        let access_token = create_access_token(&access, SECRET).unwrap();

        let refresh = RefreshClaims::new(Uuid::new_v4(), Duration::days(7));
        let refresh_token = create_refresh_token(&refresh, SECRET).unwrap();

        // A refresh token is not a valid access token and vice versa
        assert!(validate_access_token(&refresh_token, SECRET).is_err());
        assert!(validate_refresh_token(&access_token, SECRET).is_err());
    }

    #[test]
    fn test_validate_refresh_token() {
        let user_id = Uuid::new_v4();
        let claims = RefreshClaims::new(user_id, Duration::days(7));
        let token = create_refresh_token(&claims, SECRET).unwrap();

        let validated = validate_refresh_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let result = validate_access_token("not.a.token", SECRET);
        assert!(matches!(result.unwrap_err(), JwtError::Invalid(_)));
    }

    #[test]
    fn test_token_type_as_str() {
        assert_eq!(TokenType::Access.as_str(), "access");
        assert_eq!(TokenType::Refresh.as_str(), "refresh");
    }
}
