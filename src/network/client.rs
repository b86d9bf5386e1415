use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::{AuthResponse, ChatMessage, Credentials, Member, NewMessage, ProfileUpdate};

use super::authorizer::{LOGIN_PATH, REGISTER_PATH};
use super::error::ApiError;
use super::transport::{ApiRequest, RequestInterceptor, Transport};

pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const MESSAGES_PATH: &str = "/api/chat/messages";
pub const PROFILE_PATH: &str = "/api/profile";

/// Typed access to the chat backend.
///
/// Every request passes through the registered interceptors, in order,
/// before it is handed to the transport.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            interceptors: Vec::new(),
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    // ========== Auth ==========

    pub async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post(REGISTER_PATH).with_body(serde_json::to_value(credentials)?);
        decode(self.execute(request).await?)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post(LOGIN_PATH).with_body(serde_json::to_value(credentials)?);
        decode(self.execute(request).await?)
    }

    /// Ends the session server-side. The response body, if any, is returned as-is.
    pub async fn logout(&self) -> Result<Option<Value>, ApiError> {
        self.execute(ApiRequest::post(LOGOUT_PATH)).await
    }

    // ========== Chat ==========

    pub async fn get_messages(&self) -> Result<Vec<ChatMessage>, ApiError> {
        decode(self.execute(ApiRequest::get(MESSAGES_PATH)).await?)
    }

    pub async fn send_message(&self, text: &str) -> Result<ChatMessage, ApiError> {
        let body = serde_json::to_value(NewMessage {
            text: text.to_string(),
        })?;
        decode(self.execute(ApiRequest::post(MESSAGES_PATH).with_body(body)).await?)
    }

    // ========== Profile ==========

    pub async fn get_profile(&self) -> Result<Member, ApiError> {
        decode(self.execute(ApiRequest::get(PROFILE_PATH)).await?)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Member, ApiError> {
        let request = ApiRequest::put(PROFILE_PATH).with_body(serde_json::to_value(update)?);
        decode(self.execute(request).await?)
    }

    // ========== Pipeline ==========

    async fn execute(&self, mut request: ApiRequest) -> Result<Option<Value>, ApiError> {
        for interceptor in &self.interceptors {
            interceptor.intercept(&mut request);
        }

        let method = request.method.clone();
        let path = request.path.clone();
        log::debug!("{method} {path}");

        let response = self.transport.send(request).await.inspect_err(|err| {
            log::warn!("{method} {path} failed: {err}");
        })?;

        if !response.status.is_success() {
            log::info!("{method} {path} rejected with {}", response.status);
            return Err(ApiError::Rejected {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }
}

fn decode<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
    Ok(serde_json::from_value(body.unwrap_or(Value::Null))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::authorizer::{LOGIN_PATH, REGISTER_PATH};
    use crate::network::test_support::FakeTransport;
    use crate::network::{ApiResponse, RequestAuthorizer};
    use crate::storage::{LocalStorage, MemoryStorage, TOKEN_KEY};
    use reqwest::header::AUTHORIZATION;
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    fn client_with_token(transport: Arc<FakeTransport>, token: Option<&str>) -> ApiClient {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(token) = token {
            storage.set_item(TOKEN_KEY, token).unwrap();
        }
        ApiClient::new(transport).with_interceptor(Arc::new(RequestAuthorizer::new(storage)))
    }

    #[tokio::test]
    async fn login_posts_credentials_without_authorization() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(
            Method::POST,
            LOGIN_PATH,
            StatusCode::OK,
            json!({"token": "t1", "member": {"id": 1, "username": "alice"}}),
        );
        let client = client_with_token(transport.clone(), Some("old"));

        let response = client
            .login(&Credentials {
                username: "alice".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();

        assert_eq!(response.token.as_deref(), Some("t1"));
        assert_eq!(response.member.unwrap().username, "alice");

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, Some(json!({"username": "alice", "password": "secret"})));
        assert!(sent[0].headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn protected_calls_carry_token() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(Method::GET, MESSAGES_PATH, StatusCode::OK, json!([]));
        transport.reply(
            Method::PUT,
            PROFILE_PATH,
            StatusCode::OK,
            json!({"id": 1, "username": "bob"}),
        );
        let client = client_with_token(transport.clone(), Some("t1"));

        assert!(client.get_messages().await.unwrap().is_empty());
        let member = client
            .update_profile(&ProfileUpdate {
                username: Some("bob".into()),
            })
            .await
            .unwrap();
        assert_eq!(member.username, "bob");

        for request in transport.requests() {
            assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Token t1");
        }
        assert_eq!(transport.requests()[1].body, Some(json!({"username": "bob"})));
    }

    #[tokio::test]
    async fn rejection_keeps_status_and_body() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(
            Method::POST,
            REGISTER_PATH,
            StatusCode::BAD_REQUEST,
            json!({"detail": "Validation failed.", "fields": {"username": ["taken"]}}),
        );
        let client = client_with_token(transport, None);

        let err = client
            .register(&Credentials {
                username: "alice".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.response_body().unwrap()["fields"]["username"][0], "taken");
    }

    #[tokio::test]
    async fn logout_accepts_empty_body() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(
            Method::POST,
            LOGOUT_PATH,
            Ok(ApiResponse {
                status: StatusCode::NO_CONTENT,
                body: None,
            }),
        );
        let client = client_with_token(transport, Some("t1"));

        assert_eq!(client.logout().await.unwrap(), None);
    }

    #[tokio::test]
    async fn non_list_messages_body_is_decode_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(Method::GET, MESSAGES_PATH, StatusCode::OK, json!({"oops": 1}));
        let client = client_with_token(transport, Some("t1"));

        let err = client.get_messages().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn history_with_offset_less_timestamps_decodes() {
        let transport = Arc::new(FakeTransport::new());
        transport.reply(
            Method::GET,
            MESSAGES_PATH,
            StatusCode::OK,
            json!([
                {"id": 1, "text": "hi", "author": {"username": "alice"}, "created_at": "2024-01-01T10:00:00.123456"},
                {"id": 2, "text": "yo", "author": {"username": "bob"}, "created_at": "2024-01-01T10:01:00Z"}
            ]),
        );
        let client = client_with_token(transport, Some("t1"));

        let messages = client.get_messages().await.unwrap();

        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|message| message.created_at.is_some()));
    }

    #[tokio::test]
    async fn connection_failure_is_propagated() {
        let transport = Arc::new(FakeTransport::new());
        let client = client_with_token(transport, Some("t1"));

        let err = client.get_profile().await.unwrap_err();
        assert!(matches!(err, ApiError::Connection(_)));
    }
}
