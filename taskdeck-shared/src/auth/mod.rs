/// Authentication and access-scoping utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT access/refresh token generation and validation
/// - [`scope`]: Caller identity and task visibility scoping
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing with independent access/refresh expiry
/// - **Constant-time Comparison**: Password verification never short-circuits

pub mod jwt;
pub mod password;
pub mod scope;
