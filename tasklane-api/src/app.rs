/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tasklane_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = tasklane_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tasklane_shared::auth::{
    jwt,
    middleware::{extract_bearer_token, Principal},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health                 # Health check (public)
/// ├── POST   /create_user            # Registration (public)
/// ├── POST   /token                  # Obtain token pair (public)
/// ├── POST   /token/refresh          # Refresh access token (public)
/// ├── POST   /token/verify           # Verify a token (public)
/// ├── GET    /tasks                  # List visible tasks (authenticated)
/// ├── POST   /tasks                  # Create task
/// ├── GET    /tasks/:id              # Read one visible task
/// ├── PUT    /tasks/:id              # Update one visible task
/// ├── DELETE /tasks_delete/:id       # Delete an owned task
/// ├── GET    /task_access            # List grants the caller is party to
/// ├── POST   /task_access            # Grant access (owner only)
/// ├── GET    /task_access/:id        # Read one grant
/// ├── PUT    /task_access/:id        # Re-point a grant (owner only)
/// └── DELETE /task_access/:id        # Revoke a grant
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes: health, registration, and the token endpoints
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/create_user", post(routes::users::create_user))
        .route("/token", post(routes::tokens::obtain_token_pair))
        .route("/token/refresh", post(routes::tokens::refresh_token))
        .route("/token/verify", post(routes::tokens::verify_token));

    // Everything touching tasks or grants requires a valid access token
    let protected_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task).put(routes::tasks::update_task),
        )
        .route("/tasks_delete/:id", delete(routes::tasks::delete_task))
        .route(
            "/task_access",
            get(routes::task_access::list_grants).post(routes::task_access::create_grant),
        )
        .route(
            "/task_access/:id",
            get(routes::task_access::get_grant)
                .put(routes::task_access::update_grant)
                .delete(routes::task_access::delete_grant),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the access token from the Authorization header,
/// then injects the caller's [`Principal`] into request extensions. Handlers
/// receive it via the `Extension` extractor and pass it to the store, which
/// is where every ownership and visibility rule is enforced.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let token = extract_bearer_token(req.headers())?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let principal = Principal::from_claims(&claims);
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DatabaseConfig, JwtConfig};

    #[tokio::test]
    async fn test_app_state_exposes_jwt_secret() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
        };

        let state = AppState {
            db: PgPool::connect_lazy(&config.database.url).expect("lazy pool"),
            config: Arc::new(config),
        };

        assert_eq!(state.jwt_secret(), "test-secret-key-at-least-32-bytes-long");
    }

    // Router construction and the auth layer are covered by the integration
    // tests in tests/integration_test.rs
}
