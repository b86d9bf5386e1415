use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue, InvalidHeaderValue};

use super::transport::{ApiRequest, RequestInterceptor};
use crate::storage::{LocalStorage, StorageError, TOKEN_KEY};

pub const API_PREFIX: &str = "/api/";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const AUTH_SCHEME: &str = "Token";

/// Whether a request to `path` must carry the session token.
///
/// Every API path is protected unless it is one of the two public auth
/// endpoints. Paths outside the API prefix are never protected.
pub fn is_protected(path: &str) -> bool {
    if !path.starts_with(API_PREFIX) {
        return false;
    }
    !(path.starts_with(LOGIN_PATH) || path.starts_with(REGISTER_PATH))
}

#[derive(Debug, thiserror::Error)]
enum AttachError {
    #[error("reading token from storage: {0}")]
    Storage(#[from] StorageError),
    #[error("token is not a valid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Attaches `Authorization: Token <token>` to protected requests.
///
/// The token is read from durable storage on every request, never from the
/// in-memory session, so the authorizer works before the session is restored.
pub struct RequestAuthorizer {
    storage: Arc<dyn LocalStorage>,
}

impl RequestAuthorizer {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    fn header_value(&self) -> Result<Option<HeaderValue>, AttachError> {
        let Some(token) = self.storage.get_item(TOKEN_KEY)? else {
            return Ok(None);
        };
        if token.is_empty() {
            return Ok(None);
        }
        let mut value = HeaderValue::from_str(&format!("{AUTH_SCHEME} {token}"))?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}

impl RequestInterceptor for RequestAuthorizer {
    fn intercept(&self, request: &mut ApiRequest) {
        if !is_protected(&request.path) {
            return;
        }
        match self.header_value() {
            Ok(Some(value)) => {
                request.headers.insert(AUTHORIZATION, value);
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!(
                    "Sending {} without authorization: {err}",
                    request.path
                );
            }
        }
    }
}
