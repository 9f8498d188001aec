//! Ticket store, the persistence seam behind the vote and stats routes.
//!
//! DESIGN
//! ======
//! Routes talk to `dyn TicketStore` so the server runs against Postgres
//! (`db::PgStore`) in production and against `MemoryStore` in tests or when
//! no `DATABASE_URL` is configured. `cast_vote` is the only write and must be
//! atomic: the vote row and both counters change together or not at all.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::services::session;
use crate::services::vote::VoteTransition;
use crate::types::{Priority, Role, TicketStatus, VoteResult, VoteType};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("ticket not found: {0}")]
    TicketNotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Ticket fields the interactive core depends on. Mirrors the `tickets` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
    pub id: i64,
    pub subject: String,
    pub status: TicketStatus,
    pub priority: Priority,
    /// Creator.
    pub user_id: i64,
    pub assigned_to: Option<i64>,
    pub upvotes: u32,
    pub downvotes: u32,
}

/// Account resolved from a session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// Assignment constraint for ticket counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Assignment {
    #[default]
    Any,
    AssignedTo(i64),
    Assigned,
}

/// Conjunction of optional constraints used by `count_tickets`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub owner: Option<i64>,
    pub status: Option<TicketStatus>,
    pub assignment: Assignment,
}

impl TicketFilter {
    #[must_use]
    pub fn owned_by(user_id: i64) -> Self {
        Self { owner: Some(user_id), ..Self::default() }
    }

    #[must_use]
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignment = assignment;
        self
    }

    #[must_use]
    pub fn matches(&self, ticket: &TicketRecord) -> bool {
        if self.owner.is_some_and(|owner| owner != ticket.user_id) {
            return false;
        }
        if self.status.is_some_and(|status| status != ticket.status) {
            return false;
        }
        match self.assignment {
            Assignment::Any => true,
            Assignment::AssignedTo(agent) => ticket.assigned_to == Some(agent),
            Assignment::Assigned => ticket.assigned_to.is_some(),
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait TicketStore: Send + Sync {
    async fn session_user(&self, token: &str) -> Result<Option<SessionUser>, StoreError>;

    async fn ticket(&self, ticket_id: i64) -> Result<Option<TicketRecord>, StoreError>;

    /// Apply the toggle rules for `requested` and return the new counters.
    async fn cast_vote(&self, ticket_id: i64, user_id: i64, requested: VoteType) -> Result<VoteResult, StoreError>;

    async fn count_tickets(&self, filter: TicketFilter) -> Result<u64, StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Default)]
struct MemoryInner {
    tickets: HashMap<i64, TicketRecord>,
    votes: HashMap<(i64, i64), VoteType>,
    sessions: HashMap<String, SessionUser>,
}

/// In-process store. One write lock covers the vote row and the counters.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_ticket(&self, ticket: TicketRecord) {
        self.inner.write().await.tickets.insert(ticket.id, ticket);
    }

    pub async fn insert_session(&self, token: impl Into<String>, user: SessionUser) {
        self.inner.write().await.sessions.insert(token.into(), user);
    }

    /// Open a session for `user` under a fresh random token.
    pub async fn create_session(&self, user: SessionUser) -> String {
        let token = session::generate_token();
        self.insert_session(token.clone(), user).await;
        token
    }
}

#[async_trait::async_trait]
impl TicketStore for MemoryStore {
    async fn session_user(&self, token: &str) -> Result<Option<SessionUser>, StoreError> {
        Ok(self.inner.read().await.sessions.get(token).cloned())
    }

    async fn ticket(&self, ticket_id: i64) -> Result<Option<TicketRecord>, StoreError> {
        Ok(self.inner.read().await.tickets.get(&ticket_id).cloned())
    }

    async fn cast_vote(&self, ticket_id: i64, user_id: i64, requested: VoteType) -> Result<VoteResult, StoreError> {
        let mut inner = self.inner.write().await;
        let MemoryInner { tickets, votes, .. } = &mut *inner;

        let ticket = tickets
            .get_mut(&ticket_id)
            .ok_or(StoreError::TicketNotFound(ticket_id))?;

        let key = (ticket_id, user_id);
        let transition = VoteTransition::resolve(votes.get(&key).copied(), requested);
        match transition.next {
            Some(vote) => votes.insert(key, vote),
            None => votes.remove(&key),
        };

        let (upvotes, downvotes) = transition.apply(ticket.upvotes, ticket.downvotes);
        ticket.upvotes = upvotes;
        ticket.downvotes = downvotes;

        Ok(VoteResult { upvotes, downvotes, user_vote: transition.next })
    }

    async fn count_tickets(&self, filter: TicketFilter) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.tickets.values().filter(|t| filter.matches(t)).count() as u64)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
