//! Debounced ticket search.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{ClientConfig, DEFAULT_SEARCH_DEBOUNCE_MS};

/// Queries shorter than this (but non-empty) are too noisy to submit.
pub const MIN_QUERY_LEN: usize = 3;

/// The form that owns the search field and the filter controls.
pub trait SearchFormView: Send + Sync {
    fn submit(&self);
}

/// An empty query clears the filter and is always submitted.
#[must_use]
pub fn should_submit(query: &str) -> bool {
    let len = query.chars().count();
    len == 0 || len >= MIN_QUERY_LEN
}

/// Restarts a timer on every keystroke and submits once input settles.
/// Filter controls bypass the timer.
pub struct SearchDebouncer {
    form: Arc<dyn SearchFormView>,
    window: Duration,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    #[must_use]
    pub fn new(form: Arc<dyn SearchFormView>) -> Self {
        Self { form, window: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS), pending: None }
    }

    #[must_use]
    pub fn from_config(config: &ClientConfig, form: Arc<dyn SearchFormView>) -> Self {
        Self::new(form).with_window(config.search_debounce)
    }

    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// The search field now holds `value`.
    pub fn on_input(&mut self, value: &str) {
        self.cancel_pending();

        let form = Arc::clone(&self.form);
        let window = self.window;
        let query = value.to_owned();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if should_submit(&query) {
                form.submit();
            } else {
                debug!(len = query.chars().count(), "search query too short; not submitting");
            }
        }));
    }

    /// An auxiliary filter changed. Submits now and drops any pending
    /// keystroke timer, since this submission already carries the query.
    pub fn on_filter_change(&mut self) {
        self.cancel_pending();
        self.form.submit();
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stop(&mut self) {
        self.cancel_pending();
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
