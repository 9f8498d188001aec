//! Database initialization, migrations, and the Postgres ticket store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to create the shared SQLx pool and enforce schema
//! migrations before accepting traffic. The schema is shared with the page
//! rendering side of the help desk, which owns users, categories, and sessions.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::services::store::{Assignment, SessionUser, StoreError, TicketFilter, TicketRecord, TicketStore};
use crate::services::vote::VoteTransition;
use crate::types::{Priority, Role, TicketStatus, VoteResult, VoteType};

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

// =============================================================================
// PG STORE
// =============================================================================

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_count(raw: i32) -> u32 {
    u32::try_from(raw).unwrap_or(0)
}

fn to_column(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[async_trait]
impl TicketStore for PgStore {
    async fn session_user(&self, token: &str) -> Result<Option<SessionUser>, StoreError> {
        let row = sqlx::query(
            r"SELECT u.id, u.username, u.role
              FROM sessions s
              JOIN users u ON u.id = s.user_id
              WHERE s.token = $1 AND u.is_active",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let role: String = row.try_get("role")?;
        Ok(Some(SessionUser {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            role: Role::from_str(&role).unwrap_or_default(),
        }))
    }

    async fn ticket(&self, ticket_id: i64) -> Result<Option<TicketRecord>, StoreError> {
        let row = sqlx::query(
            r"SELECT id, subject, status, priority, user_id, assigned_to, upvotes, downvotes
              FROM tickets WHERE id = $1",
        )
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let status: String = row.try_get("status")?;
        let priority: String = row.try_get("priority")?;
        Ok(Some(TicketRecord {
            id: row.try_get("id")?,
            subject: row.try_get("subject")?,
            status: TicketStatus::from_str(&status).unwrap_or(TicketStatus::Open),
            priority: Priority::from_str(&priority).unwrap_or_default(),
            user_id: row.try_get("user_id")?,
            assigned_to: row.try_get("assigned_to")?,
            upvotes: to_count(row.try_get("upvotes")?),
            downvotes: to_count(row.try_get("downvotes")?),
        }))
    }

    async fn cast_vote(&self, ticket_id: i64, user_id: i64, requested: VoteType) -> Result<VoteResult, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent votes on the same ticket.
        let counts = sqlx::query("SELECT upvotes, downvotes FROM tickets WHERE id = $1 FOR UPDATE")
            .bind(ticket_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::TicketNotFound(ticket_id))?;
        let upvotes = to_count(counts.try_get("upvotes")?);
        let downvotes = to_count(counts.try_get("downvotes")?);

        let existing: Option<String> =
            sqlx::query_scalar("SELECT vote_type FROM ticket_votes WHERE ticket_id = $1 AND user_id = $2")
                .bind(ticket_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let transition = VoteTransition::resolve(existing.as_deref().and_then(VoteType::from_str), requested);

        match (existing.is_some(), transition.next) {
            (false, Some(vote)) => {
                sqlx::query("INSERT INTO ticket_votes (ticket_id, user_id, vote_type) VALUES ($1, $2, $3)")
                    .bind(ticket_id)
                    .bind(user_id)
                    .bind(vote.as_str())
                    .execute(&mut *tx)
                    .await?;
            }
            (true, Some(vote)) => {
                sqlx::query("UPDATE ticket_votes SET vote_type = $3 WHERE ticket_id = $1 AND user_id = $2")
                    .bind(ticket_id)
                    .bind(user_id)
                    .bind(vote.as_str())
                    .execute(&mut *tx)
                    .await?;
            }
            (true, None) => {
                sqlx::query("DELETE FROM ticket_votes WHERE ticket_id = $1 AND user_id = $2")
                    .bind(ticket_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
            (false, None) => {}
        }

        let (upvotes, downvotes) = transition.apply(upvotes, downvotes);
        sqlx::query("UPDATE tickets SET upvotes = $2, downvotes = $3, updated_at = now() WHERE id = $1")
            .bind(ticket_id)
            .bind(to_column(upvotes))
            .bind(to_column(downvotes))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(VoteResult { upvotes, downvotes, user_vote: transition.next })
    }

    async fn count_tickets(&self, filter: TicketFilter) -> Result<u64, StoreError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM tickets WHERE TRUE");
        if let Some(owner) = filter.owner {
            query.push(" AND user_id = ").push_bind(owner);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        match filter.assignment {
            Assignment::Any => {}
            Assignment::AssignedTo(agent) => {
                query.push(" AND assigned_to = ").push_bind(agent);
            }
            Assignment::Assigned => {
                query.push(" AND assigned_to IS NOT NULL");
            }
        }

        let count: i64 = query.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "mod_test.rs"]
mod tests;
