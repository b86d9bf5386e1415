use std::sync::{Arc, Mutex};

use crate::common::{ChatMessage, ErrorContext, normalize_error};
use crate::network::ApiClient;
use crate::session::SessionStore;

use super::router::{Route, Router};
use super::state::{Lifecycle, LoadState, MessageList, Submission, lock};

/// Local state of the chat view.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub messages: MessageList,
    pub load: LoadState,
    pub draft: String,
    pub sending: bool,
    pub send_error: Option<String>,
}

/// What the message area shows, by precedence.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatDisplay {
    Loading,
    Error(String),
    Empty,
    Messages(Vec<ChatMessage>),
}

impl ChatState {
    pub fn display(&self) -> ChatDisplay {
        match &self.load {
            LoadState::Loading => ChatDisplay::Loading,
            LoadState::Failed(message) => ChatDisplay::Error(message.clone()),
            _ if self.messages.is_empty() => ChatDisplay::Empty,
            _ => ChatDisplay::Messages(self.messages.as_slice().to_vec()),
        }
    }

    pub fn can_send(&self) -> bool {
        !self.sending && !self.draft.trim().is_empty()
    }
}

/// The shared channel view: loads history once, sends messages, logs out.
#[derive(Clone)]
pub struct ChatController {
    api: ApiClient,
    session: SessionStore,
    router: Router,
    state: Arc<Mutex<ChatState>>,
    lifecycle: Lifecycle,
}

impl ChatController {
    pub fn new(api: ApiClient, session: SessionStore, router: Router) -> Self {
        Self {
            api,
            session,
            router,
            state: Arc::new(Mutex::new(ChatState::default())),
            lifecycle: Lifecycle::default(),
        }
    }

    /// Enter the view and fetch the history. Only the first call fetches.
    pub async fn mount(&self) -> Route {
        let route = self.router.navigate(Route::Chat);
        if route != Route::Chat {
            return route;
        }

        {
            let mut state = lock(&self.state);
            if state.load != LoadState::Idle {
                return route;
            }
            state.load = LoadState::Loading;
        }

        let result = self.api.get_messages().await;
        if self.lifecycle.is_disposed() {
            log::debug!("Chat view closed before history arrived; dropping it");
            return route;
        }

        let mut state = lock(&self.state);
        match result {
            Ok(history) => {
                log::info!("Loaded {} messages", history.len());
                state.messages.push_history(history);
                state.load = LoadState::Loaded;
            }
            Err(err) => {
                state.load = LoadState::Failed(normalize_error(Some(&err), ErrorContext::Chat));
            }
        }
        route
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        lock(&self.state).draft = text.into();
    }

    pub fn can_send(&self) -> bool {
        lock(&self.state).can_send()
    }

    pub async fn send(&self) -> Submission {
        let text = {
            let mut state = lock(&self.state);
            if state.sending {
                return Submission::Busy;
            }
            let text = state.draft.trim().to_string();
            if text.is_empty() {
                return Submission::Invalid;
            }
            state.sending = true;
            state.send_error = None;
            text
        };

        let result = self.api.send_message(&text).await;
        if self.lifecycle.is_disposed() {
            return Submission::Discarded;
        }

        let mut state = lock(&self.state);
        state.sending = false;
        match result {
            Ok(message) => {
                state.messages.push_message(message);
                state.draft.clear();
                Submission::Sent
            }
            Err(err) => {
                state.send_error = Some(normalize_error(Some(&err), ErrorContext::Chat));
                Submission::Failed
            }
        }
    }

    /// Leave the chat. The server call may fail; the local session is
    /// cleared and the login view shown regardless.
    pub async fn logout(&self) -> Route {
        if let Err(err) = self.api.logout().await {
            log::warn!("Logout request failed, clearing local session anyway: {err}");
        }
        self.session.clear();
        self.router.navigate(Route::Login)
    }

    pub fn state(&self) -> ChatState {
        lock(&self.state).clone()
    }

    pub fn display(&self) -> ChatDisplay {
        lock(&self.state).display()
    }

    /// Username of the logged-in member, for the header.
    pub fn current_username(&self) -> Option<String> {
        self.session.member().map(|member| member.username)
    }

    pub fn dispose(&self) {
        self.lifecycle.dispose();
    }
}
