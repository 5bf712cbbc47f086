use super::ledger::LedgerError;
use std::{
    fmt,
    time::{Duration, Instant},
};

pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&LedgerError> for Notification {
    fn from(e: &LedgerError) -> Self {
        Notification::error(e.to_string())
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Success => write!(f, "[ok] {}", self.message),
            Severity::Error => write!(f, "[error] {}", self.message),
        }
    }
}

/// Holds the one notification on display. Showing another replaces it and
/// restarts the dismissal clock.
#[derive(Debug)]
pub struct Notifier {
    dismiss_after: Duration,
    pending: Option<(Notification, Instant)>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_AFTER)
    }
}

impl Notifier {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            dismiss_after,
            pending: None,
        }
    }

    pub fn show(&mut self, notification: Notification, now: Instant) {
        if let Some((replaced, _)) = self.pending.replace((notification, now)) {
            trace!("Replacing notification {replaced:?}");
        }
    }

    pub fn current(&self, now: Instant) -> Option<&Notification> {
        match &self.pending {
            Some((notification, shown_at)) if now < *shown_at + self.dismiss_after => {
                Some(notification)
            }
            _ => None,
        }
    }

    /// Clears the notification once its time is up and returns it.
    pub fn dismiss_expired(&mut self, now: Instant) -> Option<Notification> {
        if self.pending.is_some() && self.current(now).is_none() {
            return self.pending.take().map(|(notification, _)| notification);
        }
        None
    }
}
