//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the ticket store and the anti-forgery secret. Both are behind
//! `Arc` so cloning the state per request is cheap.

use std::sync::Arc;

use crate::services::csrf::CsrfSecret;
use crate::services::store::TicketStore;

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TicketStore>,
    pub csrf: Arc<CsrfSecret>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>, csrf: CsrfSecret) -> Self {
        Self { store, csrf: Arc::new(csrf) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::services::store::{MemoryStore, SessionUser, TicketRecord};
    use crate::types::{Priority, Role, TicketStatus};

    pub const TEST_CSRF_SECRET: &str = "test-csrf-secret";

    /// `AppState` over a fresh `MemoryStore`, returned alongside the store for seeding.
    #[must_use]
    pub fn test_app_state() -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), CsrfSecret::from_secret(TEST_CSRF_SECRET));
        (state, store)
    }

    /// Open, unassigned ticket with no votes.
    #[must_use]
    pub fn dummy_ticket(id: i64, owner: i64) -> TicketRecord {
        TicketRecord {
            id,
            subject: format!("Printer on floor {id} is jammed"),
            status: TicketStatus::Open,
            priority: Priority::Medium,
            user_id: owner,
            assigned_to: None,
            upvotes: 0,
            downvotes: 0,
        }
    }

    #[must_use]
    pub fn dummy_user(id: i64, role: Role) -> SessionUser {
        SessionUser { id, username: format!("user{id}"), role }
    }

    /// Register a session for a fresh user and return its cookie token.
    pub async fn seed_session(store: &MemoryStore, user_id: i64, role: Role) -> String {
        let token = format!("session-{user_id}");
        store.insert_session(token.clone(), dummy_user(user_id, role)).await;
        token
    }
}
