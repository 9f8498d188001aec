use super::*;
use crate::services::store::MemoryStore;
use crate::state::test_helpers::dummy_ticket;

// =============================================================================
// VoteTransition
// =============================================================================

#[test]
fn first_vote_is_recorded() {
    let t = VoteTransition::resolve(None, VoteType::Up);
    assert_eq!(t.next, Some(VoteType::Up));
    assert_eq!(t.apply(4, 2), (5, 2));
}

#[test]
fn repeating_a_vote_withdraws_it() {
    let t = VoteTransition::resolve(Some(VoteType::Down), VoteType::Down);
    assert_eq!(t.next, None);
    assert_eq!(t.apply(4, 2), (4, 1));
}

#[test]
fn opposite_vote_switches_one_count_over() {
    let t = VoteTransition::resolve(Some(VoteType::Up), VoteType::Down);
    assert_eq!(t.next, Some(VoteType::Down));
    assert_eq!(t.apply(4, 2), (3, 3));
}

#[test]
fn counters_never_go_negative() {
    let t = VoteTransition::resolve(Some(VoteType::Up), VoteType::Up);
    assert_eq!(t.apply(0, 0), (0, 0));
}

// =============================================================================
// cast_vote
// =============================================================================

#[tokio::test]
async fn cast_vote_rejects_unknown_vote_type() {
    let store = MemoryStore::new();
    store.insert_ticket(dummy_ticket(1, 10)).await;

    let err = cast_vote(&store, 1, 20, "sideways").await.unwrap_err();
    assert!(matches!(err, VoteError::InvalidVoteType(ref v) if v == "sideways"));
}

#[tokio::test]
async fn cast_vote_reports_missing_ticket_before_bad_type() {
    let store = MemoryStore::new();
    let err = cast_vote(&store, 99, 20, "sideways").await.unwrap_err();
    assert!(matches!(err, VoteError::TicketNotFound(99)));
}

#[tokio::test]
async fn cast_vote_reports_missing_ticket() {
    let store = MemoryStore::new();
    let err = cast_vote(&store, 99, 20, "up").await.unwrap_err();
    assert!(matches!(err, VoteError::TicketNotFound(99)));
}

#[tokio::test]
async fn cast_vote_toggles_through_store() {
    let store = MemoryStore::new();
    store.insert_ticket(dummy_ticket(1, 10)).await;

    let first = cast_vote(&store, 1, 20, "up").await.unwrap();
    assert_eq!(first, VoteResult { upvotes: 1, downvotes: 0, user_vote: Some(VoteType::Up) });

    let switched = cast_vote(&store, 1, 20, "down").await.unwrap();
    assert_eq!(switched, VoteResult { upvotes: 0, downvotes: 1, user_vote: Some(VoteType::Down) });

    let withdrawn = cast_vote(&store, 1, 20, "down").await.unwrap();
    assert_eq!(withdrawn, VoteResult { upvotes: 0, downvotes: 0, user_vote: None });
}
