//! Dashboard counters, scoped by the caller's role.
//!
//! End users see counts over their own tickets. Agents and admins see the
//! whole desk; `my_assigned` is the agent's own queue, or every assigned
//! ticket for an admin.

use crate::services::store::{Assignment, SessionUser, StoreError, TicketFilter, TicketStore};
use crate::types::{DashboardStats, Role, TicketStatus};

pub const TOTAL_TICKETS: &str = "total_tickets";
pub const OPEN_TICKETS: &str = "open_tickets";
pub const IN_PROGRESS_TICKETS: &str = "in_progress_tickets";
pub const RESOLVED_TICKETS: &str = "resolved_tickets";
pub const MY_ASSIGNED: &str = "my_assigned";

/// Compute the counters shown on `user`'s dashboard.
///
/// # Errors
///
/// Returns a store error if any count query fails.
pub async fn dashboard_stats(store: &dyn TicketStore, user: &SessionUser) -> Result<DashboardStats, StoreError> {
    let scope = match user.role {
        Role::User => TicketFilter::owned_by(user.id),
        Role::Agent | Role::Admin => TicketFilter::default(),
    };

    let mut stats = DashboardStats::new()
        .with(TOTAL_TICKETS, store.count_tickets(scope).await?)
        .with(OPEN_TICKETS, store.count_tickets(scope.with_status(TicketStatus::Open)).await?)
        .with(
            IN_PROGRESS_TICKETS,
            store.count_tickets(scope.with_status(TicketStatus::InProgress)).await?,
        );

    stats = match user.role {
        Role::User => stats.with(
            RESOLVED_TICKETS,
            store.count_tickets(scope.with_status(TicketStatus::Resolved)).await?,
        ),
        Role::Agent => stats.with(
            MY_ASSIGNED,
            store.count_tickets(scope.with_assignment(Assignment::AssignedTo(user.id))).await?,
        ),
        Role::Admin => stats.with(MY_ASSIGNED, store.count_tickets(scope.with_assignment(Assignment::Assigned)).await?),
    };

    Ok(stats)
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
