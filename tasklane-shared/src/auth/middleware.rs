/// Request authentication primitives
///
/// This module provides the pieces the API's authentication middleware is
/// built from: bearer-token extraction from request headers and the
/// [`Principal`] identity that gets added to request extensions after a
/// token validates.
///
/// Every store operation takes the principal as an explicit argument; there
/// is no ambient "current user" state anywhere in the system.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use tasklane_shared::auth::middleware::extract_bearer_token;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::AUTHORIZATION,
///     HeaderValue::from_static("Bearer some-token"),
/// );
///
/// let token = extract_bearer_token(&headers).unwrap();
/// assert_eq!(token, "some-token");
/// ```

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use super::jwt::Claims;

/// The authenticated identity behind a request
///
/// Resolved from a validated access token by the API's JWT middleware and
/// inserted into request extensions. Handlers pass it down to the task and
/// grant stores, which enforce ownership and visibility against
/// `Principal::user_id`. The username is carried along so denied-permission
/// messages can name the caller without a database lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// The account's username
    pub username: String,
}

impl Principal {
    /// Builds a principal from validated token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username.clone(),
        }
    }
}

/// Error type for credential extraction and validation
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not a Bearer token
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Extracts the bearer token from the `Authorization` header
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if the header is absent or not valid UTF-8
/// - `AuthError::InvalidFormat` if the header does not carry a Bearer token
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenType;
    use axum::http::HeaderValue;

    #[test]
    fn test_principal_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "alice".to_string(), TokenType::Access);

        let principal = Principal::from_claims(&claims);

        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.username, "alice");
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        let token = extract_bearer_token(&headers).expect("Should extract token");
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let headers = HeaderMap::new();

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::InvalidFormat(_))));
    }
}
