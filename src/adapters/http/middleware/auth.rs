//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that validates Bearer tokens and injects the principal into extensions
//! - `RequireAuth` - Extractor that requires authentication
//!
//! # Architecture
//!
//! The middleware resolves tokens through the same `IdentityResolver` the
//! WebSocket endpoint uses, so REST and realtime callers are authenticated
//! identically.
//!
//! ```text
//! Request → auth_middleware → injects Principal into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::IdentityResolver;
use crate::domain::foundation::{AuthError, Principal};

/// Auth middleware state.
pub type AuthState = IdentityResolver;

/// Authentication middleware that validates Bearer tokens.
///
/// On a missing token the request continues without a principal, and
/// `RequireAuth` decides. A present but invalid token is answered with 401.
///
/// ```text
/// Authorization: Bearer <token>
/// ```
pub async fn auth_middleware(
    State(identity): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_owned);

    let Some(token) = token else {
        return next.run(request).await;
    };

    match identity.resolve(Some(&token)).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => {
            let (status, message) = match &e {
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!("Auth service unavailable: {}", msg);
                    (StatusCode::SERVICE_UNAVAILABLE, "Authentication service unavailable")
                }
                _ => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            };

            (
                status,
                Json(serde_json::json!({
                    "status": "error",
                    "message": message,
                })),
            )
                .into_response()
        }
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor that requires authentication.
///
/// Returns 401 when the auth middleware did not resolve a principal.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Principal);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<Principal>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication credentials were not provided.")
            }
        };

        (
            status,
            Json(serde_json::json!({
                "status": "error",
                "message": message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::extract::FromRequestParts;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use crate::adapters::auth::MockSessionValidator;
    use crate::domain::foundation::UserId;

    fn identity() -> AuthState {
        let validator = MockSessionValidator::new()
            .with_test_user("valid-token", 1, false)
            .with_failure("expired", AuthError::TokenExpired)
            .with_failure(
                "down",
                AuthError::service_unavailable("directory offline"),
            );
        IdentityResolver::new(Arc::new(validator))
    }

    fn app() -> Router {
        async fn whoami(RequireAuth(principal): RequireAuth) -> String {
            principal.user_id.to_string()
        }

        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(identity(), auth_middleware))
    }

    fn request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Middleware Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_bearer_token_reaches_handler() {
        let response = app().oneshot(request(Some("Bearer valid-token"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"1");
    }

    #[tokio::test]
    async fn missing_token_is_rejected_by_extractor() {
        let response = app().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_and_expired_tokens_are_401() {
        for header in ["Bearer nope", "Bearer expired"] {
            let response = app().oneshot(request(Some(header))).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn unavailable_auth_service_is_503() {
        let response = app().oneshot(request(Some("Bearer down"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_treated_as_missing() {
        let response = app()
            .oneshot(request(Some("Basic dXNlcjpwYXNz")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // RequireAuth Extractor Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn require_auth_extracts_principal_from_extensions() {
        let mut request: Request<()> = Request::builder().uri("/test").body(()).unwrap();
        request
            .extensions_mut()
            .insert(Principal::new(UserId::from_raw(5), "Test User", true));
        let (mut parts, _body) = request.into_parts();

        let RequireAuth(principal) = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(principal.user_id.as_i64(), 5);
        assert!(principal.is_admin);
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer my-secret-token"), Some("my-secret-token"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("my-secret-token"), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
    }

    #[test]
    fn require_auth_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RequireAuth>();
        assert_send_sync::<AuthState>();
    }
}
