use super::jwt::TokenVerifier;
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Extract a bearer token from the Authorization header
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
}

/// Bearer-token authentication middleware.
///
/// Validates the JWT from the Authorization header and inserts
/// [`super::BearerClaims`] into request extensions on success.
///
/// # Example
///
/// ```ignore
/// let verifier = TokenVerifier::new(&JwtConfig::from_env()?);
///
/// let protected = Router::new()
///     .route("/products", post(create_product))
///     .route_layer(axum::middleware::from_fn_with_state(
///         verifier.clone(),
///         bearer_auth_middleware,
///     ));
/// ```
pub async fn bearer_auth_middleware(
    State(verifier): State<TokenVerifier>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = match extract_token_from_request(&headers) {
        Some(t) => t,
        None => {
            tracing::debug!("No bearer token in Authorization header");
            return Err(
                AppError::Unauthorized("No token provided".to_string()).into_response()
            );
        }
    };

    let claims = match verifier.verify_token(&token) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("Token verification failed: {}", e);
            return Err(AppError::Unauthorized("Invalid token".to_string()).into_response());
        }
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_extract_token_missing_or_malformed() {
        let headers = HeaderMap::new();
        assert!(extract_token_from_request(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic xyz"));
        assert!(extract_token_from_request(&headers).is_none());
    }
}
