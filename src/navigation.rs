//! Navigation Module
//!
//! Redirect hook fired when the session ends.

use tracing::warn;

/// Route shown when the user has to sign in again
pub const LOGIN_ROUTE: &str = "/login";

/// Receives client-side redirects
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator for headless use; records the redirect in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        if route == LOGIN_ROUTE {
            warn!("Session ended, sign in again with `wheeltracker login`");
        } else {
            warn!("Redirect requested to {}", route);
        }
    }
}
