//! Transient status notifications.
//!
//! DESIGN
//! ======
//! `ToastNotifier` owns the lifecycle; a `ToastSurface` owns the pixels. The
//! notifier creates the surface's container on first use only, appends one
//! element per notification, and schedules its removal on a tokio timer.
//! Every scheduled removal is tracked so a toast can also be dismissed early
//! and nothing is left behind once its timer fires.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use uuid::Uuid;

const ERROR_DISMISS_MS: u64 = 8000;
const DEFAULT_DISMISS_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// How long a toast of this severity stays on screen.
    #[must_use]
    pub fn dismiss_after(self) -> Duration {
        match self {
            Self::Error => Duration::from_millis(ERROR_DISMISS_MS),
            Self::Info | Self::Success | Self::Warning => Duration::from_millis(DEFAULT_DISMISS_MS),
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Info => "fa-info-circle",
            Self::Success => "fa-check-circle",
            Self::Warning => "fa-exclamation-triangle",
            Self::Error => "fa-exclamation-circle",
        }
    }

    #[must_use]
    pub fn color_class(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(Uuid);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
}

/// Where toasts are drawn.
pub trait ToastSurface: Send + Sync {
    /// Create the fixed-position container. Called at most once per notifier.
    fn create_container(&self);
    fn append(&self, toast: &Toast);
    fn remove(&self, id: ToastId);
}

// =============================================================================
// NOTIFIER
// =============================================================================

/// Cheap to clone; clones share the container and pending timers.
#[derive(Clone)]
pub struct ToastNotifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    surface: Arc<dyn ToastSurface>,
    /// Later callers block until the first has finished creating the container.
    container: Once,
    timers: Mutex<HashMap<ToastId, AbortHandle>>,
}

impl NotifierInner {
    fn forget(&self, id: ToastId) -> Option<AbortHandle> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner).remove(&id)
    }
}

impl ToastNotifier {
    #[must_use]
    pub fn new(surface: Arc<dyn ToastSurface>) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                surface,
                container: Once::new(),
                timers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Show `message` and schedule its removal. Must be called inside a
    /// tokio runtime.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> ToastId {
        self.inner.container.call_once(|| self.inner.surface.create_container());

        let toast = Toast { id: ToastId(Uuid::new_v4()), message: message.into(), severity };
        self.inner.surface.append(&toast);

        let id = toast.id;
        let inner = Arc::clone(&self.inner);
        let mut timers = self.inner.timers.lock().unwrap_or_else(PoisonError::into_inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(severity.dismiss_after()).await;
            if inner.forget(id).is_some() {
                inner.surface.remove(id);
            }
        });
        timers.insert(id, timer.abort_handle());
        drop(timers);

        tracing::debug!(severity = ?severity, "toast shown");
        id
    }

    /// Remove a toast before its timer fires. Returns false if it is already gone.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let Some(timer) = self.inner.forget(id) else {
            return false;
        };
        timer.abort();
        self.inner.surface.remove(id);
        true
    }

    /// Toasts currently on screen.
    #[must_use]
    pub fn visible(&self) -> usize {
        self.inner.timers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
#[path = "toast_test.rs"]
mod tests;
