use std::sync::{Arc, Mutex};

use crate::common::{Credentials, ErrorContext, normalize_error};
use crate::network::ApiClient;
use crate::session::SessionStore;

use super::router::{Route, Router};
use super::state::{Lifecycle, RequestState, Submission, lock};

// Shown before any request goes out
pub const MISSING_CREDENTIALS: &str = "Please enter a username and password.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    fn route(self) -> Route {
        match self {
            Self::Login => Route::Login,
            Self::Register => Route::Register,
        }
    }

    fn error_context(self) -> ErrorContext {
        match self {
            Self::Login => ErrorContext::Login,
            Self::Register => ErrorContext::Register,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub username: String,
    pub password: String,
    pub state: RequestState,
}

/// Login and registration view. Both share one flow and differ only in the
/// endpoint they call and the fallback error text.
#[derive(Clone)]
pub struct AuthController {
    mode: AuthMode,
    api: ApiClient,
    session: SessionStore,
    router: Router,
    form: Arc<Mutex<AuthForm>>,
    lifecycle: Lifecycle,
}

impl AuthController {
    pub fn new(mode: AuthMode, api: ApiClient, session: SessionStore, router: Router) -> Self {
        Self {
            mode,
            api,
            session,
            router,
            form: Arc::new(Mutex::new(AuthForm::default())),
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn login(api: ApiClient, session: SessionStore, router: Router) -> Self {
        Self::new(AuthMode::Login, api, session, router)
    }

    pub fn register(api: ApiClient, session: SessionStore, router: Router) -> Self {
        Self::new(AuthMode::Register, api, session, router)
    }

    /// Enter the view. Returns the redirect target when a session already
    /// exists, in which case the form must not be used.
    pub fn mount(&self) -> Option<Route> {
        let route = self.router.navigate(self.mode.route());
        (route != self.mode.route()).then_some(route)
    }

    pub fn set_username(&self, username: impl Into<String>) {
        lock(&self.form).username = username.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        lock(&self.form).password = password.into();
    }

    pub fn form(&self) -> AuthForm {
        lock(&self.form).clone()
    }

    pub fn can_submit(&self) -> bool {
        !lock(&self.form).state.is_submitting()
    }

    pub async fn submit(&self) -> Submission {
        let credentials = {
            let mut form = lock(&self.form);
            if form.state.is_submitting() {
                return Submission::Busy;
            }
            if form.username.is_empty() || form.password.is_empty() {
                form.state = RequestState::Failed(MISSING_CREDENTIALS.to_string());
                return Submission::Invalid;
            }
            form.state = RequestState::Submitting;
            Credentials {
                username: form.username.clone(),
                password: form.password.clone(),
            }
        };

        let result = match self.mode {
            AuthMode::Login => self.api.login(&credentials).await,
            AuthMode::Register => self.api.register(&credentials).await,
        };

        match result {
            Ok(response) => {
                // token is live server-side
                self.session.set_from_auth_response(response);
                if self.lifecycle.is_disposed() {
                    return Submission::Discarded;
                }
                log::info!("{:?} succeeded for {}", self.mode, credentials.username);
                lock(&self.form).state = RequestState::Succeeded;
                self.router.navigate(Route::Chat);
                Submission::Sent
            }
            Err(err) => {
                if self.lifecycle.is_disposed() {
                    return Submission::Discarded;
                }
                let message = normalize_error(Some(&err), self.mode.error_context());
                lock(&self.form).state = RequestState::Failed(message);
                Submission::Failed
            }
        }
    }

    pub fn dispose(&self) {
        self.lifecycle.dispose();
    }
}
