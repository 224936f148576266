//! Authentication session state for dam monitoring clients.
//!
//! The observation core never authenticates; it assumes the gateway
//! attaches whatever token the shared [`TokenStore`] holds. This crate
//! owns that boundary: exchanging credentials for a token, caching the
//! user profile, and the one policy decision that is local to this
//! layer: a failed profile fetch is treated as an expired session and
//! clears the stored token. Observation fetches never do that.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{info, warn};

use dms_core::auth::{AuthGateway, LoginRequest, LoginType, TokenStore, UserInfo};

/// In-memory token store for native clients.
///
/// Browser builds would back [`TokenStore`] with persistent storage
/// instead; the interface is the same either way.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<String>>,
    user: RefCell<Option<UserInfo>>,
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn set_token(&self, token: &str) {
        *self.token.borrow_mut() = Some(token.to_string());
    }

    fn clear_token(&self) {
        *self.token.borrow_mut() = None;
    }

    fn user(&self) -> Option<UserInfo> {
        self.user.borrow().clone()
    }

    fn set_user(&self, user: &UserInfo) {
        *self.user.borrow_mut() = Some(user.clone());
    }

    fn clear_user(&self) {
        *self.user.borrow_mut() = None;
    }
}

/// Clears the flag on drop, mirroring the fetch guards in the
/// observation store.
struct FlagGuard(Rc<Cell<bool>>);

impl FlagGuard {
    fn engage(flag: Rc<Cell<bool>>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Session state for one application instance.
///
/// Hydrates from the token store on construction, so a token persisted
/// by a previous session is picked up without a fresh login.
pub struct Session {
    tokens: Rc<dyn TokenStore>,
    token: RefCell<Option<String>>,
    user: RefCell<Option<UserInfo>>,
    loading: Rc<Cell<bool>>,
    error: RefCell<Option<String>>,
}

impl Session {
    pub fn new(tokens: Rc<dyn TokenStore>) -> Self {
        let token = tokens.token();
        let user = tokens.user();
        Self {
            tokens,
            token: RefCell::new(token),
            user: RefCell::new(user),
            loading: Rc::new(Cell::new(false)),
            error: RefCell::new(None),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.borrow().as_ref().is_some_and(UserInfo::is_admin)
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.user.borrow().clone()
    }

    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    /// Message from the most recent failed login, if any.
    pub fn last_error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    /// Exchange credentials for a session token.
    ///
    /// On success the token is written to the store (where the gateway
    /// picks it up) and `true` is returned. On failure the error is
    /// recorded, `false` is returned, and any previously stored token
    /// is left untouched, since a failed login must not log anyone out.
    pub async fn login<G: AuthGateway>(
        &self,
        gateway: &G,
        login_type: LoginType,
        id: &str,
        password: &str,
    ) -> bool {
        let _guard = FlagGuard::engage(Rc::clone(&self.loading));
        self.error.replace(None);
        let request = LoginRequest {
            login_type,
            id: id.to_string(),
            password: password.to_string(),
        };
        match gateway.login(&request).await {
            Ok(token) => {
                info!("login succeeded for {}", request.id);
                self.tokens.set_token(&token);
                self.token.replace(Some(token));
                true
            }
            Err(e) => {
                warn!("login failed for {}: {}", request.id, e);
                self.error.replace(Some(e.to_string()));
                false
            }
        }
    }

    /// Drop the token and cached profile, in state and store.
    pub fn logout(&self) {
        self.token.replace(None);
        self.user.replace(None);
        self.tokens.clear_token();
        self.tokens.clear_user();
    }

    /// Refresh the cached user profile.
    ///
    /// Does nothing without a token. A failure is interpreted as an
    /// expired session: token and profile are cleared.
    pub async fn fetch_user<G: AuthGateway>(&self, gateway: &G) {
        if self.token.borrow().is_none() {
            return;
        }
        match gateway.get_me().await {
            Ok(user) => {
                self.tokens.set_user(&user);
                self.user.replace(Some(user));
            }
            Err(e) => {
                warn!("session invalidated: {}", e);
                self.logout();
            }
        }
    }
}
