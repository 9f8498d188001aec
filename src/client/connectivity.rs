//! Passive notices for browser-reported connectivity changes.

use tracing::info;

use super::toast::{Severity, ToastNotifier};

pub const OFFLINE_MESSAGE: &str = "You are offline. Some features may not work.";
pub const ONLINE_MESSAGE: &str = "Connection restored.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

/// Posts one toast per transition. Repeated reports of the current state
/// are ignored.
pub struct ConnectivityMonitor {
    toasts: ToastNotifier,
    current: Connectivity,
}

impl ConnectivityMonitor {
    /// Pages load online; the first report only matters if it differs.
    #[must_use]
    pub fn new(toasts: ToastNotifier) -> Self {
        Self { toasts, current: Connectivity::Online }
    }

    #[must_use]
    pub fn current(&self) -> Connectivity {
        self.current
    }

    /// Record a connectivity report. Returns true if it was a transition.
    pub fn on_change(&mut self, state: Connectivity) -> bool {
        if state == self.current {
            return false;
        }
        self.current = state;
        info!(?state, "connectivity changed");
        match state {
            Connectivity::Offline => self.toasts.notify(OFFLINE_MESSAGE, Severity::Warning),
            Connectivity::Online => self.toasts.notify(ONLINE_MESSAGE, Severity::Info),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_helpers::recording_toasts;

    #[tokio::test]
    async fn offline_then_online_posts_two_notices() {
        let (toasts, surface) = recording_toasts();
        let mut monitor = ConnectivityMonitor::new(toasts);

        assert!(monitor.on_change(Connectivity::Offline));
        assert!(monitor.on_change(Connectivity::Online));
        assert_eq!(
            surface.messages(),
            vec![(OFFLINE_MESSAGE.to_owned(), Severity::Warning), (ONLINE_MESSAGE.to_owned(), Severity::Info)]
        );
    }

    #[tokio::test]
    async fn repeated_state_is_ignored() {
        let (toasts, surface) = recording_toasts();
        let mut monitor = ConnectivityMonitor::new(toasts);

        assert!(!monitor.on_change(Connectivity::Online));
        assert!(monitor.on_change(Connectivity::Offline));
        assert!(!monitor.on_change(Connectivity::Offline));
        assert_eq!(surface.messages().len(), 1);
        assert_eq!(monitor.current(), Connectivity::Offline);
    }
}
