use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use crate::common::{AuthResponse, Member};
use crate::storage::{LocalStorage, MEMBER_KEY, TOKEN_KEY};

/// Who is logged in: the session token and the member's profile.
///
/// `member` is never set while `token` is absent. The reverse happens while
/// the profile is still loading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub member: Option<Member>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Process-wide session state, mirrored to durable storage.
///
/// Clones share the same state; a mutation through one handle is visible
/// through every other handle as soon as the call returns. Storage writes
/// are best effort: failures are logged and the in-memory state stays
/// authoritative.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn LocalStorage>,
    state: Arc<RwLock<Session>>,
}

impl SessionStore {
    /// Empty store over `storage`; call [`SessionStore::restore`] to load.
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            storage,
            state: Arc::new(RwLock::new(Session::default())),
        }
    }

    /// Store with the persisted session already loaded.
    pub fn open(storage: Arc<dyn LocalStorage>) -> Self {
        let store = Self::new(storage);
        store.restore();
        store
    }

    /// Reload the session from durable storage and return it.
    ///
    /// Unreadable entries and a profile that fails to parse are treated as
    /// absent; a bad profile does not discard the token.
    pub fn restore(&self) -> Session {
        let token = self.read_token();
        let member = match token {
            Some(_) => self.read_member(),
            None => None,
        };

        let restored = Session { token, member };
        log::debug!(
            "Restored session (authenticated: {}, member: {})",
            restored.is_authenticated(),
            restored.member.is_some()
        );
        *self.write() = restored.clone();
        restored
    }

    pub fn session(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session().token
    }

    pub fn member(&self) -> Option<Member> {
        self.session().member
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    // ========== Mutations ==========

    /// Replace token and member together from a login/registration result.
    pub fn set_from_auth_response(&self, response: AuthResponse) {
        let token = response.token.filter(|token| !token.is_empty());
        let member = match token {
            Some(_) => response.member,
            None => {
                if response.member.is_some() {
                    log::warn!("Auth response carried a member without a token; ignoring member");
                }
                None
            }
        };

        let mut state = self.write();
        state.token = token;
        state.member = member;
        self.persist_token(state.token.as_deref());
        self.persist_member(state.member.as_ref());
    }

    /// Drop the session, in memory and in storage.
    pub fn clear(&self) {
        let mut state = self.write();
        *state = Session::default();
        self.persist_token(None);
        self.persist_member(None);
    }

    /// Replace the member profile, keeping the token.
    ///
    /// `None` is ignored, and so is any update while logged out.
    pub fn update_member(&self, member: Option<Member>) {
        let Some(member) = member else {
            return;
        };

        let mut state = self.write();
        if state.token.is_none() {
            log::debug!("Ignoring member update without an active session");
            return;
        }
        self.persist_member(Some(&member));
        state.member = Some(member);
    }

    // ========== Storage ==========

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_token(&self) -> Option<String> {
        match self.storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(err) => {
                log::warn!("Failed to read stored token: {err}");
                None
            }
        }
    }

    fn read_member(&self) -> Option<Member> {
        let raw = match self.storage.get_item(MEMBER_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                log::warn!("Failed to read stored member: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(member) => Some(member),
            Err(err) => {
                log::warn!("Stored member is malformed ({err}); treating as absent");
                None
            }
        }
    }

    fn persist_token(&self, token: Option<&str>) {
        let result = match token {
            Some(token) => self.storage.set_item(TOKEN_KEY, token),
            None => self.storage.remove_item(TOKEN_KEY),
        };
        if let Err(err) = result {
            log::warn!("Failed to persist token: {err}");
        }
    }

    fn persist_member(&self, member: Option<&Member>) {
        let result = match member {
            Some(member) => match serde_json::to_string(member) {
                Ok(raw) => self.storage.set_item(MEMBER_KEY, &raw),
                Err(err) => {
                    log::warn!("Failed to serialize member: {err}");
                    return;
                }
            },
            None => self.storage.remove_item(MEMBER_KEY),
        };
        if let Err(err) = result {
            log::warn!("Failed to persist member: {err}");
        }
    }
}
