/// Authentication middleware for Axum
///
/// This module provides the bearer-token gate placed in front of protected
/// routes. The gate reads the `Authorization` header, verifies the credential
/// with the configured [`TokenMaker`], and adds the verified [`Payload`] to the
/// request extensions. Any failure ends the request with `401 Unauthorized`.
///
/// # Header format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// The scheme is matched case-insensitively. The value must split into exactly
/// two whitespace-separated fields.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Extension, Router};
/// use tokengate_shared::auth::middleware::auth_middleware;
/// use tokengate_shared::token::{PasetoMaker, Payload, TokenMaker};
///
/// async fn protected_handler(Extension(payload): Extension<Payload>) -> String {
///     format!("Hello, {}!", payload.username)
/// }
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let maker: Arc<dyn TokenMaker> = Arc::new(PasetoMaker::generate()?);
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn_with_state(maker, auth_middleware));
/// # Ok(())
/// # }
/// ```

use std::{future::Future, pin::Pin, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::token::{Payload, TokenError, TokenMaker};

/// The only supported authorization scheme
pub const AUTHORIZATION_TYPE_BEARER: &str = "Bearer";

/// Error type for authentication middleware
///
/// All variants become `401 Unauthorized`; the variant itself is kept for
/// logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Authorization header is absent or blank
    #[error("authorization header is not provided")]
    MissingCredential,

    /// Header is not `<scheme> <credential>`
    #[error("invalid authorization header format")]
    MalformedCredential,

    /// Scheme other than Bearer
    #[error("unsupported authorization type {0}")]
    UnsupportedScheme(String),

    /// Credential failed verification
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "unauthorized",
            "message": self.to_string(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Extracts the bearer credential from an `Authorization` header value
///
/// `None` means the header was absent.
pub fn parse_authorization_header(value: Option<&str>) -> Result<&str, AuthError> {
    let value = value.ok_or(AuthError::MissingCredential)?;
    if value.trim().is_empty() {
        return Err(AuthError::MissingCredential);
    }

    let fields: Vec<&str> = value.split_whitespace().collect();
    let [scheme, credential] = fields.as_slice() else {
        return Err(AuthError::MalformedCredential);
    };

    if !scheme.eq_ignore_ascii_case(AUTHORIZATION_TYPE_BEARER) {
        return Err(AuthError::UnsupportedScheme((*scheme).to_string()));
    }

    Ok(*credential)
}

/// Authenticates `req` and returns the verified payload
pub fn authenticate(maker: &dyn TokenMaker, req: &Request) -> Result<Payload, AuthError> {
    let header_value = match req.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedCredential)?),
    };

    let credential = parse_authorization_header(header_value)?;

    Ok(maker.verify_token(credential)?)
}

/// Bearer token authentication middleware
///
/// Use with `axum::middleware::from_fn_with_state`, passing the shared maker
/// as state.
///
/// # Errors
///
/// Returns `401 Unauthorized` if:
/// - Authorization header is missing
/// - Header format or scheme is wrong
/// - Token is invalid or expired
pub async fn auth_middleware(
    State(maker): State<Arc<dyn TokenMaker>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let payload = authenticate(maker.as_ref(), &req).map_err(|e| {
        tracing::debug!(
            method = %req.method(),
            path = %req.uri().path(),
            reason = %e,
            "request rejected by auth gate"
        );
        e
    })?;

    tracing::trace!(username = %payload.username, token_id = %payload.id, "request authenticated");

    req.extensions_mut().insert(payload);

    Ok(next.run(req).await)
}

/// Creates an authentication middleware closure
///
/// Helper that captures the maker for use with `axum::middleware::from_fn`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Router};
/// use tokengate_shared::auth::middleware::create_auth_middleware;
/// use tokengate_shared::token::{JwtMaker, TokenMaker};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let maker: Arc<dyn TokenMaker> = Arc::new(JwtMaker::new("your-secret-key-at-least-32-bytes-long")?);
///
/// let app: Router = Router::new()
///     .route("/protected", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_auth_middleware(maker)));
/// # Ok(())
/// # }
/// ```
pub fn create_auth_middleware(
    maker: Arc<dyn TokenMaker>,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    move |req, next| {
        let maker = maker.clone();
        Box::pin(auth_middleware(State(maker), req, next))
    }
}
