use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::network::{ApiClient, ApiError, HttpTransport, RequestAuthorizer, Transport};
use crate::session::SessionStore;
use crate::storage::{self, ClientDatabase, LocalStorage, MemoryStorage};

use super::auth::AuthController;
use super::chat::ChatController;
use super::profile::ProfileController;
use super::router::Router;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to prepare data directory: {0}")]
    DataDir(#[from] std::io::Error),
    #[error("failed to open local database: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] ApiError),
}

/// Wires storage, session, request pipeline and navigation together and
/// hands out view controllers that share them.
pub struct ClientApp {
    session: SessionStore,
    router: Router,
    api: ApiClient,
}

impl ClientApp {
    pub fn open(config: &AppConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn LocalStorage> = if config.database_path.is_empty() {
            log::info!("No database path configured; session will not persist");
            Arc::new(MemoryStorage::new())
        } else {
            storage::ensure_data_dir(&config.database_path)?;
            Arc::new(ClientDatabase::with_path(&config.database_path)?)
        };

        let transport = HttpTransport::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        log::info!("Using chat API at {}", config.api_base_url);

        Ok(Self::with_parts(storage, Arc::new(transport)))
    }

    pub fn with_parts(storage: Arc<dyn LocalStorage>, transport: Arc<dyn Transport>) -> Self {
        // The authorizer reads the token from storage, so it can be built first.
        let authorizer = Arc::new(RequestAuthorizer::new(storage.clone()));
        let api = ApiClient::new(transport).with_interceptor(authorizer);
        let session = SessionStore::open(storage);
        let router = Router::new(session.clone());
        Self {
            session,
            router,
            api,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn login_view(&self) -> AuthController {
        AuthController::login(self.api.clone(), self.session.clone(), self.router.clone())
    }

    pub fn register_view(&self) -> AuthController {
        AuthController::register(self.api.clone(), self.session.clone(), self.router.clone())
    }

    pub fn chat_view(&self) -> ChatController {
        ChatController::new(self.api.clone(), self.session.clone(), self.router.clone())
    }

    pub fn profile_view(&self) -> ProfileController {
        ProfileController::new(self.api.clone(), self.session.clone(), self.router.clone())
    }
}
