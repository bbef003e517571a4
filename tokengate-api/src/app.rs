/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tokengate_api::{app::AppState, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(config)?;
/// let app = tokengate_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokengate_shared::{
    auth::middleware::auth_middleware,
    models::user::{InMemoryUserStore, UserStore},
    token::{new_token_maker, TokenError, TokenMaker},
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
    /// Token maker shared by the login flow and the auth gate
    pub token_maker: Arc<dyn TokenMaker>,

    /// User storage
    pub users: Arc<dyn UserStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state with an in-memory user store
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Configuration` if the configured key does not fit
    /// the configured token engine. The server must not start in that case.
    pub fn new(config: Config) -> Result<Self, TokenError> {
        Self::with_user_store(config, Arc::new(InMemoryUserStore::new()))
    }

    /// Creates new application state backed by `users`
    pub fn with_user_store(config: Config, users: Arc<dyn UserStore>) -> Result<Self, TokenError> {
        let token_maker = new_token_maker(config.token.kind, &config.token.symmetric_key)?;

        Ok(Self {
            token_maker,
            users,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                   # Health check (public)
/// └── /v1/
///     └── /users/
///         ├── POST /            # Create user (public)
///         ├── POST /login       # Login, returns access token (public)
///         └── GET  /me          # Current user (bearer token)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Protected user routes
    let authenticated_user_routes = Router::new()
        .route("/me", get(routes::users::current_user))
        .layer(axum::middleware::from_fn_with_state(
            state.token_maker.clone(),
            auth_middleware,
        ));

    let user_routes = Router::new()
        .route("/", post(routes::users::create_user))
        .route("/login", post(routes::users::login_user))
        .merge(authenticated_user_routes);

    let v1_routes = Router::new().nest("/users", user_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
