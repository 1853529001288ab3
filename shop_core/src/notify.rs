//! User-facing notices raised as a side effect of authentication failures.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// A call needing a session was made while logged out
    LoginRequired,
    /// The backend rejected the stored token
    SessionExpired,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LoginRequired => f.write_str("Please log in first"),
            Notice::SessionExpired => f.write_str("Your session has expired, please log in again"),
        }
    }
}

/// Receives notices the UI should surface
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Default notifier: log only
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!("{}", notice);
    }
}
