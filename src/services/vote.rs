//! Vote service: toggle rules for ticket votes.
//!
//! DESIGN
//! ======
//! Each (ticket, user) pair holds at most one vote. Repeating the same vote
//! withdraws it, voting the other way switches it. `VoteTransition` is the
//! pure form of those rules; stores call it inside their atomic section so
//! the memory and Postgres backends cannot drift apart.

use tracing::info;

use crate::services::store::{StoreError, TicketStore};
use crate::types::{VoteResult, VoteType};

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("invalid vote type: {0:?}")]
    InvalidVoteType(String),
    #[error("ticket not found: {0}")]
    TicketNotFound(i64),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for VoteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TicketNotFound(id) => Self::TicketNotFound(id),
            other => Self::Store(other),
        }
    }
}

// =============================================================================
// TRANSITION
// =============================================================================

/// Before/after view of one user's vote on one ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub previous: Option<VoteType>,
    pub next: Option<VoteType>,
}

impl VoteTransition {
    #[must_use]
    pub fn resolve(previous: Option<VoteType>, requested: VoteType) -> Self {
        let next = if previous == Some(requested) { None } else { Some(requested) };
        Self { previous, next }
    }

    /// New `(upvotes, downvotes)` after this transition. Counters never go below zero.
    #[must_use]
    pub fn apply(&self, upvotes: u32, downvotes: u32) -> (u32, u32) {
        let mut counts = (upvotes, downvotes);
        if let Some(previous) = self.previous {
            let slot = counter(&mut counts, previous);
            *slot = slot.saturating_sub(1);
        }
        if let Some(next) = self.next {
            let slot = counter(&mut counts, next);
            *slot = slot.saturating_add(1);
        }
        counts
    }
}

fn counter(counts: &mut (u32, u32), vote: VoteType) -> &mut u32 {
    match vote {
        VoteType::Up => &mut counts.0,
        VoteType::Down => &mut counts.1,
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Validate the raw form value and apply the vote.
///
/// An unknown ticket wins over an invalid vote type so callers see 404 before 400.
///
/// # Errors
///
/// Returns `InvalidVoteType`, `TicketNotFound`, or a wrapped store error.
pub async fn cast_vote(
    store: &dyn TicketStore,
    ticket_id: i64,
    user_id: i64,
    raw_vote_type: &str,
) -> Result<VoteResult, VoteError> {
    let Some(requested) = VoteType::from_str(raw_vote_type) else {
        if store.ticket(ticket_id).await?.is_none() {
            return Err(VoteError::TicketNotFound(ticket_id));
        }
        return Err(VoteError::InvalidVoteType(raw_vote_type.to_owned()));
    };

    let result = store.cast_vote(ticket_id, user_id, requested).await?;
    info!(
        ticket_id,
        user_id,
        vote = %requested,
        upvotes = result.upvotes,
        downvotes = result.downvotes,
        "vote recorded"
    );
    Ok(result)
}

#[cfg(test)]
#[path = "vote_test.rs"]
mod tests;
