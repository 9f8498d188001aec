//! Up/down vote controls for rendered tickets.
//!
//! DESIGN
//! ======
//! A `VoteController` owns one ticket's pair of buttons. Clicking a button
//! disables it and swaps in a loading indicator before the request is
//! spawned; the button stays disabled until the request settles, which is
//! what limits each button to one in-flight request. Settling always
//! restores the button through an RAII guard, so an early return or a
//! dropped future cannot leave it stuck.
//!
//! Counts and the active highlight change only on success, and then both
//! buttons are updated from the server's answer. A failure leaves the
//! display exactly as it was and posts an error toast. Nothing retries on
//! its own.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{info, warn};

use super::net::{ApiError, HelpdeskApi, RequestHandle, TicketId};
use super::toast::{Severity, ToastNotifier};
use crate::config::ClientConfig;
use crate::types::{VoteResult, VoteType};

pub const VOTE_FAILED_MESSAGE: &str = "Error submitting vote. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("a {0} vote is already in flight")]
    InFlight(VoteType),
    #[error("no vote controls for ticket {0}")]
    UnknownTicket(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One clickable vote button.
pub trait VoteButtonView: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    /// Replace the button content with a loading indicator.
    fn show_loading(&self);
    /// Put back the content that `show_loading` replaced.
    fn restore_content(&self);
    fn set_count(&self, count: u32);
    fn set_active(&self, active: bool);
}

/// The two buttons rendered under one ticket's vote container.
#[derive(Clone)]
pub struct VoteGroup {
    pub up: Arc<dyn VoteButtonView>,
    pub down: Arc<dyn VoteButtonView>,
}

impl VoteGroup {
    fn button(&self, vote: VoteType) -> &dyn VoteButtonView {
        match vote {
            VoteType::Up => self.up.as_ref(),
            VoteType::Down => self.down.as_ref(),
        }
    }

    fn apply(&self, result: &VoteResult) {
        for vote in [VoteType::Up, VoteType::Down] {
            let button = self.button(vote);
            button.set_count(result.count(vote));
            button.set_active(result.user_vote == Some(vote));
        }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct VoteController {
    ticket_id: TicketId,
    group: VoteGroup,
    api: Arc<dyn HelpdeskApi>,
    toasts: ToastNotifier,
    timeout: Option<Duration>,
    in_flight: Mutex<HashMap<VoteType, AbortHandle>>,
}

/// Restores a button when its request settles.
struct InFlightGuard<'a> {
    controller: &'a VoteController,
    vote: VoteType,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.controller.lock_in_flight().remove(&self.vote);
        let button = self.controller.group.button(self.vote);
        button.restore_content();
        button.set_enabled(true);
    }
}

impl VoteController {
    #[must_use]
    pub fn new(ticket_id: TicketId, group: VoteGroup, api: Arc<dyn HelpdeskApi>, toasts: ToastNotifier) -> Self {
        Self { ticket_id, group, api, toasts, timeout: None, in_flight: Mutex::new(HashMap::new()) }
    }

    /// Controller whose requests are bounded by `config.request_timeout`.
    #[must_use]
    pub fn from_config(
        config: &ClientConfig,
        ticket_id: TicketId,
        group: VoteGroup,
        api: Arc<dyn HelpdeskApi>,
        toasts: ToastNotifier,
    ) -> Self {
        Self::new(ticket_id, group, api, toasts).with_timeout(config.request_timeout)
    }

    /// Bound each request. `None` (the default) waits for as long as the
    /// server takes.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn ticket_id(&self) -> &TicketId {
        &self.ticket_id
    }

    /// Whether the button for `vote` is waiting on the server.
    #[must_use]
    pub fn is_in_flight(&self, vote: VoteType) -> bool {
        self.lock_in_flight().contains_key(&vote)
    }

    /// Submit a vote and reconcile both buttons with the server's answer.
    ///
    /// # Errors
    ///
    /// [`SubmitError::InFlight`] if this button is already waiting (nothing
    /// is sent), otherwise [`SubmitError::Api`] when the request fails.
    pub async fn submit_vote(&self, vote: VoteType) -> Result<VoteResult, SubmitError> {
        let handle = {
            let mut in_flight = self.lock_in_flight();
            if in_flight.contains_key(&vote) {
                return Err(SubmitError::InFlight(vote));
            }

            let button = self.group.button(vote);
            button.set_enabled(false);
            button.show_loading();

            let api = Arc::clone(&self.api);
            let ticket_id = self.ticket_id.clone();
            let handle = RequestHandle::spawn(async move { api.submit_vote(&ticket_id, vote).await })
                .with_timeout(self.timeout);
            in_flight.insert(vote, handle.abort_handle());
            handle
        };
        let _guard = InFlightGuard { controller: self, vote };

        match handle.wait().await {
            Ok(result) => {
                self.group.apply(&result);
                info!(ticket_id = %self.ticket_id, %vote, user_vote = ?result.user_vote, "vote recorded");
                Ok(result)
            }
            Err(e) => {
                warn!(ticket_id = %self.ticket_id, %vote, code = e.error_code(), error = %e, "vote failed");
                self.toasts.notify(VOTE_FAILED_MESSAGE, Severity::Error);
                Err(SubmitError::Api(e))
            }
        }
    }

    /// Abort the outstanding request for `vote`, if any. The pending
    /// `submit_vote` settles through its failure path.
    pub fn cancel(&self, vote: VoteType) -> bool {
        match self.lock_in_flight().get(&vote) {
            Some(abort) => {
                abort.abort();
                true
            }
            None => false,
        }
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashMap<VoteType, AbortHandle>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// PANEL
// =============================================================================

/// Every vote control on a page, keyed by ticket id. Controls for different
/// tickets share nothing and may have requests in flight at the same time.
#[derive(Default)]
pub struct VotePanel {
    controllers: HashMap<TicketId, Arc<VoteController>>,
}

impl VotePanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, controller: VoteController) -> Arc<VoteController> {
        let controller = Arc::new(controller);
        self.controllers.insert(controller.ticket_id().clone(), Arc::clone(&controller));
        controller
    }

    #[must_use]
    pub fn controller(&self, ticket_id: &str) -> Option<Arc<VoteController>> {
        TicketId::parse(ticket_id).and_then(|id| self.controllers.get(&id).cloned())
    }

    /// Route a click on `ticket_id`'s `vote` button to its controller.
    ///
    /// # Errors
    ///
    /// [`SubmitError::UnknownTicket`] when no controls are registered for
    /// the id, otherwise whatever [`VoteController::submit_vote`] returns.
    pub async fn submit_vote(&self, ticket_id: &str, vote: VoteType) -> Result<VoteResult, SubmitError> {
        let controller = self
            .controller(ticket_id)
            .ok_or_else(|| SubmitError::UnknownTicket(ticket_id.to_owned()))?;
        controller.submit_vote(vote).await
    }
}

#[cfg(test)]
#[path = "vote_test.rs"]
mod tests;
