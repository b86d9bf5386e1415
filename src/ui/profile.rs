use std::sync::{Arc, Mutex};

use crate::common::{ErrorContext, ProfileUpdate, normalize_error};
use crate::network::ApiClient;
use crate::session::SessionStore;

use super::router::{Route, Router};
use super::state::{Lifecycle, LoadState, Notice, Submission, lock};

// Notice texts
pub const EMPTY_USERNAME: &str = "Username cannot be empty.";
pub const PROFILE_UPDATED: &str = "Profile updated.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileState {
    pub username: String,
    pub load: LoadState,
    pub submitting: bool,
    pub notice: Option<Notice>,
}

/// Profile view: shows the member and edits the username.
#[derive(Clone)]
pub struct ProfileController {
    api: ApiClient,
    session: SessionStore,
    router: Router,
    state: Arc<Mutex<ProfileState>>,
    lifecycle: Lifecycle,
}

impl ProfileController {
    pub fn new(api: ApiClient, session: SessionStore, router: Router) -> Self {
        let username = session
            .member()
            .map(|member| member.username)
            .unwrap_or_default();
        Self {
            api,
            session,
            router,
            state: Arc::new(Mutex::new(ProfileState {
                username,
                ..ProfileState::default()
            })),
            lifecycle: Lifecycle::default(),
        }
    }

    /// Enter the view. The profile is only fetched when the session does not
    /// already hold the member.
    pub async fn mount(&self) -> Route {
        let route = self.router.navigate(Route::Profile);
        if route != Route::Profile {
            return route;
        }

        if let Some(member) = self.session.member() {
            let mut state = lock(&self.state);
            if state.username.is_empty() {
                state.username = member.username;
            }
            return route;
        }

        {
            let mut state = lock(&self.state);
            if state.load == LoadState::Loading {
                return route;
            }
            state.load = LoadState::Loading;
        }

        let result = self.api.get_profile().await;
        if let Ok(member) = &result {
            // session-wide, so it is kept even if the view has closed
            self.session.update_member(Some(member.clone()));
        }
        if self.lifecycle.is_disposed() {
            return route;
        }

        let mut state = lock(&self.state);
        match result {
            Ok(member) => {
                state.username = member.username;
                state.load = LoadState::Loaded;
            }
            Err(err) => {
                state.load = LoadState::Failed(normalize_error(Some(&err), ErrorContext::Profile));
            }
        }
        route
    }

    pub fn set_username(&self, username: impl Into<String>) {
        lock(&self.state).username = username.into();
    }

    pub fn can_submit(&self) -> bool {
        !lock(&self.state).submitting
    }

    pub async fn submit(&self) -> Submission {
        let username = {
            let mut state = lock(&self.state);
            if state.submitting {
                return Submission::Busy;
            }
            if state.username.is_empty() {
                state.notice = Some(Notice::Error(EMPTY_USERNAME.to_string()));
                return Submission::Invalid;
            }
            state.submitting = true;
            state.notice = None;
            state.username.clone()
        };

        let update = ProfileUpdate {
            username: Some(username),
        };
        let result = self.api.update_profile(&update).await;
        if let Ok(member) = &result {
            self.session.update_member(Some(member.clone()));
        }
        if self.lifecycle.is_disposed() {
            return Submission::Discarded;
        }

        match result {
            Ok(_) => {
                let mut state = lock(&self.state);
                state.submitting = false;
                state.notice = Some(Notice::Success(PROFILE_UPDATED.to_string()));
                Submission::Sent
            }
            Err(err) => {
                let mut state = lock(&self.state);
                state.submitting = false;
                state.notice = Some(Notice::Error(normalize_error(
                    Some(&err),
                    ErrorContext::Profile,
                )));
                Submission::Failed
            }
        }
    }

    pub fn state(&self) -> ProfileState {
        lock(&self.state).clone()
    }

    pub fn dispose(&self) {
        self.lifecycle.dispose();
    }
}
