//! Authentication Module
//!
//! Owns the session tokens, keeps them in sync with persistent storage and
//! publishes every change to subscribers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorBody};
use crate::gateway::execute;
use crate::navigation::{Navigator, LOGIN_ROUTE};
use crate::storage::{TokenStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

const REFRESH_PATH: &str = "/auth/refresh/";

/// Snapshot of the current session.
///
/// `is_authenticated` is true exactly when both tokens are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub is_authenticated: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl AuthSession {
    pub fn authenticated(access_token: String, refresh_token: String) -> Self {
        Self {
            is_authenticated: true,
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
        }
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Session store shared by the gateway and its callers
pub struct AuthStore {
    config: ClientConfig,
    client: reqwest::Client,
    storage: Arc<dyn TokenStorage>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<AuthSession>,
}

impl AuthStore {
    /// Create an empty (unauthenticated) store. Call [`AuthStore::init`] to
    /// pick up tokens persisted by an earlier run.
    pub fn new(
        config: ClientConfig,
        client: reqwest::Client,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(AuthSession::default());
        Self {
            config,
            client,
            storage,
            navigator,
            state,
        }
    }

    /// Current session snapshot
    pub fn session(&self) -> AuthSession {
        self.state.borrow().clone()
    }

    /// Receiver that observes every transition.
    ///
    /// A receiver holds only the latest snapshot: transitions that land
    /// between two polls are merged, so a slow receiver may see `login`
    /// followed by `logout` as no change at all. Use `changed().await` to
    /// wake on each publish.
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    /// Restore the session from storage if both tokens are there
    pub fn init(&self) {
        let access = self.read(ACCESS_TOKEN_KEY);
        let refresh = self.read(REFRESH_TOKEN_KEY);

        match (access, refresh) {
            (Some(access), Some(refresh)) => {
                self.state.send_replace(AuthSession::authenticated(access, refresh));
                info!("Restored stored session");
            }
            _ => debug!("No stored session found"),
        }
    }

    /// Store a freshly issued token pair
    pub fn login(&self, access_token: &str, refresh_token: &str) {
        self.state.send_modify(|session| {
            self.write(ACCESS_TOKEN_KEY, access_token);
            self.write(REFRESH_TOKEN_KEY, refresh_token);
            *session = AuthSession::authenticated(access_token.to_string(), refresh_token.to_string());
        });
        info!("Session started");
    }

    /// Drop the session and send the user to the login view
    pub fn logout(&self) {
        info!("Logging out");
        self.end_session_if(|_| true);
    }

    /// Called when the server rejects the access token a request was sent
    /// with. A session that has moved on to other credentials is kept.
    pub(crate) fn expire(&self, sent_with: Option<&str>) {
        if self.end_session_if(|session| session.access_token.as_deref() == sent_with) {
            warn!("Server rejected the session credentials");
        } else {
            debug!("Ignoring 401 for credentials that were already replaced");
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Returns `false` when there is nothing to refresh or the exchange fails;
    /// a failed exchange also ends the session. Never returns an error.
    pub async fn refresh_access_token(&self) -> bool {
        let Some(refresh) = self.state.borrow().refresh_token.clone() else {
            debug!("No refresh token available");
            return false;
        };

        match self.request_access_token(&refresh).await {
            Ok(access) => {
                // A logout or a new login may have landed while the call was in flight
                let applied = self.state.send_if_modified(|session| {
                    if session.refresh_token.as_deref() != Some(refresh.as_str()) {
                        return false;
                    }
                    self.write(ACCESS_TOKEN_KEY, &access);
                    session.access_token = Some(access.clone());
                    true
                });

                if applied {
                    info!("Access token refreshed");
                } else {
                    warn!("Discarding refreshed token, session changed meanwhile");
                }
                applied
            }
            Err(e) => {
                error!("Failed to refresh token: {}", e);
                let ended = self.end_session_if(|session| session.refresh_token.as_deref() == Some(refresh.as_str()));
                if !ended {
                    warn!("Keeping session, it changed while the refresh was in flight");
                }
                false
            }
        }
    }

    async fn request_access_token(&self, refresh: &str) -> Result<String, ApiError> {
        let url = self.config.url(REFRESH_PATH);
        debug!("Refreshing access token at: {}", url);

        let request = self.client.post(&url).json(&RefreshRequest { refresh });
        let (status, bytes) = execute(request, self.config.timeout).await?;

        if !status.is_success() {
            return Err(ApiError::Http {
                status,
                body: ErrorBody::from_bytes(&bytes),
            });
        }

        let data: RefreshResponse =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;

        if data.access.is_empty() {
            return Err(ApiError::Decode("refresh response carried an empty access token".into()));
        }

        Ok(data.access)
    }

    /// Clear disk and memory and navigate to the login view, but only while
    /// `still_current` holds for the session. Returns whether it ended.
    fn end_session_if(&self, still_current: impl Fn(&AuthSession) -> bool) -> bool {
        let ended = self.state.send_if_modified(|session| {
            if !still_current(&*session) {
                return false;
            }
            self.delete(ACCESS_TOKEN_KEY);
            self.delete(REFRESH_TOKEN_KEY);
            *session = AuthSession::default();
            true
        });

        if ended {
            self.navigator.navigate(LOGIN_ROUTE);
        }
        ended
    }

    // Storage failures are logged; the in-memory session stays authoritative

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                error!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            error!("Failed to persist {}: {}", key, e);
        }
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            error!("Failed to delete {}: {}", key, e);
        }
    }
}
