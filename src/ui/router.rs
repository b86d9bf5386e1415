use std::sync::{Arc, Mutex};

use crate::session::SessionStore;

use super::state::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    /// The chat root.
    Chat,
    Profile,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Chat => "/",
            Self::Profile => "/profile",
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Chat | Self::Profile)
    }
}

/// Navigation with session guards.
///
/// Authenticated-only routes send a visitor without a token to login; the
/// login and register routes send a logged-in user to the chat root.
#[derive(Clone)]
pub struct Router {
    session: SessionStore,
    current: Arc<Mutex<Route>>,
}

impl Router {
    pub fn new(session: SessionStore) -> Self {
        let start = resolve(&session, Route::Chat);
        Self {
            session,
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Where a request for `route` ends up under the current session.
    pub fn resolve(&self, route: Route) -> Route {
        resolve(&self.session, route)
    }

    pub fn navigate(&self, route: Route) -> Route {
        let target = self.resolve(route);
        if target != route {
            log::debug!("Redirecting {} to {}", route.path(), target.path());
        }
        *lock(&self.current) = target;
        target
    }

    pub fn current(&self) -> Route {
        *lock(&self.current)
    }
}

fn resolve(session: &SessionStore, route: Route) -> Route {
    let authenticated = session.is_authenticated();
    match route {
        _ if route.requires_auth() && !authenticated => Route::Login,
        Route::Login | Route::Register if authenticated => Route::Chat,
        _ => route,
    }
}
