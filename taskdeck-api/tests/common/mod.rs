/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation (standard and staff)
/// - JWT token generation
/// - API client helpers

use axum::body::Body;
use axum::http::{Request, Response};
use chrono::Duration;
use sqlx::PgPool;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use taskdeck_shared::auth::jwt::{create_access_token, AccessClaims};
use taskdeck_shared::auth::password::hash_password;
use taskdeck_shared::models::task::{CreateTask, Task, TaskStatus};
use taskdeck_shared::models::user::{CreateUser, User};
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh standard user
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../taskdeck-shared/migrations").run(&db).await?;

        // Create test user
        let user = create_user(&db, false).await?;

        // Generate JWT token
        let jwt_token = token_for(&user, &config)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value for the default test user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a request and returns the response
    pub async fn send(&self, request: Request<Body>) -> Response<axum::body::Body> {
        self.app
            .clone()
            .call(request)
            .await
            .expect("request should not fail at the transport level")
    }

    /// Cleans up test data
    ///
    /// Deleting users cascades to their tasks.
    pub async fn cleanup_users(&self, ids: &[Uuid]) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        for id in ids {
            User::delete(&self.db, *id).await?;
        }
        Ok(())
    }
}

/// Creates a user with a unique email and username
pub async fn create_user(db: &PgPool, is_staff: bool) -> anyhow::Result<User> {
    let suffix = Uuid::new_v4().simple().to_string();
    let user = User::create(
        db,
        CreateUser {
            email: format!("test-{}@example.com", suffix),
            username: format!("user-{}", suffix),
            password_hash: hash_password("test-password")?,
        },
    )
    .await?;

    if is_staff {
        sqlx::query("UPDATE users SET is_staff = TRUE WHERE id = $1")
            .bind(user.id)
            .execute(db)
            .await?;

        let user = User::find_by_id(db, user.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("staff user vanished after update"))?;
        return Ok(user);
    }

    Ok(user)
}

/// Mints an access token for a user
pub fn token_for(user: &User, config: &Config) -> anyhow::Result<String> {
    let claims = AccessClaims::new(
        user.id,
        user.username.clone(),
        user.email.clone(),
        Duration::minutes(config.jwt.access_ttl_minutes),
    );
    Ok(create_access_token(&claims, &config.jwt.secret)?)
}

/// Helper to create a task directly in the database
pub async fn create_test_task(
    db: &PgPool,
    owner_id: Uuid,
    title: &str,
    status: TaskStatus,
) -> anyhow::Result<Task> {
    let task = Task::create(
        db,
        CreateTask {
            owner_id,
            title: title.to_string(),
            description: None,
            status,
        },
    )
    .await?;

    Ok(task)
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&body).expect("body should be JSON")
}

/// Builds a JSON request
pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).expect("request should build")
}
