use super::*;

// =============================================================================
// ApiError
// =============================================================================

#[test]
fn error_codes_are_stable() {
    assert_eq!(ApiError::Transport("refused".into()).error_code(), "E_TRANSPORT");
    assert_eq!(ApiError::Status { status: 500 }.error_code(), "E_STATUS");
    assert_eq!(ApiError::Malformed("eof".into()).error_code(), "E_MALFORMED");
    assert_eq!(ApiError::TimedOut.error_code(), "E_TIMED_OUT");
    assert_eq!(ApiError::Cancelled.error_code(), "E_CANCELLED");
    assert_eq!(ApiError::HttpClientBuild("tls".into()).error_code(), "E_HTTP_CLIENT_BUILD");
}

#[test]
fn retryable_covers_transient_failures_only() {
    assert!(ApiError::Transport("reset".into()).retryable());
    assert!(ApiError::TimedOut.retryable());
    assert!(ApiError::Status { status: 503 }.retryable());
    assert!(ApiError::Status { status: 429 }.retryable());
    assert!(!ApiError::Status { status: 403 }.retryable());
    assert!(!ApiError::Malformed("x".into()).retryable());
    assert!(!ApiError::Cancelled.retryable());
}

// =============================================================================
// TicketId
// =============================================================================

#[test]
fn ticket_id_rejects_blank() {
    assert!(TicketId::parse("").is_none());
    assert!(TicketId::parse("   ").is_none());
}

#[test]
fn ticket_id_trims_and_displays() {
    let id = TicketId::parse(" 42 ").unwrap();
    assert_eq!(id.as_str(), "42");
    assert_eq!(id.to_string(), "42");
}

// =============================================================================
// Response parsing
// =============================================================================

#[test]
fn parse_vote_result_accepts_null_user_vote() {
    let result = parse_vote_result(r#"{"upvotes":3,"downvotes":1,"user_vote":null}"#).unwrap();
    assert_eq!(result, VoteResult { upvotes: 3, downvotes: 1, user_vote: None });
}

#[test]
fn parse_vote_result_accepts_direction() {
    let result = parse_vote_result(r#"{"upvotes":0,"downvotes":2,"user_vote":"down"}"#).unwrap();
    assert_eq!(result.user_vote, Some(VoteType::Down));
}

#[test]
fn parse_vote_result_rejects_html() {
    let err = parse_vote_result("<!doctype html><html></html>").unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)));
}

#[test]
fn parse_vote_result_rejects_negative_counts() {
    let err = parse_vote_result(r#"{"upvotes":-1,"downvotes":0,"user_vote":null}"#).unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)));
}

#[test]
fn parse_vote_result_rejects_unknown_direction() {
    let err = parse_vote_result(r#"{"upvotes":1,"downvotes":0,"user_vote":"sideways"}"#).unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)));
}

#[test]
fn parse_stats_reads_counter_map() {
    let stats = parse_stats(r#"{"total_tickets":9,"open_tickets":4}"#).unwrap();
    assert_eq!(stats.get("total_tickets"), Some(9));
    assert_eq!(stats.get("open_tickets"), Some(4));
    assert_eq!(stats.len(), 2);
}

#[test]
fn parse_stats_rejects_non_object() {
    assert!(matches!(parse_stats("[1,2]"), Err(ApiError::Malformed(_))));
}

// =============================================================================
// HttpApi construction
// =============================================================================

#[test]
fn with_session_rejects_unprintable_token() {
    let config = ClientConfig::new("http://127.0.0.1:9");
    let err = HttpApi::with_session(&config, "csrf", "bad\ntoken").err().unwrap();
    assert!(matches!(err, ApiError::HttpClientBuild(_)));
}

#[test]
fn url_joins_trimmed_base() {
    let config = ClientConfig::new("http://desk.local/");
    let api = HttpApi::new(&config, "csrf").unwrap();
    assert_eq!(api.url("/dashboard/stats"), "http://desk.local/dashboard/stats");
}

#[tokio::test]
async fn configured_request_timeout_ends_hung_request() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accepts connections and never writes a response.
    let server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut config = ClientConfig::new(format!("http://{addr}"));
    config.request_timeout = Some(Duration::from_millis(200));
    let api = HttpApi::new(&config, "csrf").unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), api.fetch_stats())
        .await
        .expect("request bound should fire before the outer deadline");
    assert!(matches!(outcome, Err(ApiError::TimedOut)));
    server.abort();
}

// =============================================================================
// RequestHandle
// =============================================================================

#[tokio::test]
async fn handle_returns_request_result() {
    let handle = RequestHandle::spawn(async { Ok::<_, ApiError>(7_u32) });
    assert_eq!(handle.wait().await, Ok(7));
}

#[tokio::test]
async fn handle_passes_request_error_through() {
    let handle = RequestHandle::<u32>::spawn(async { Err(ApiError::Status { status: 502 }) });
    assert_eq!(handle.wait().await, Err(ApiError::Status { status: 502 }));
}

#[tokio::test(start_paused = true)]
async fn cancel_resolves_to_cancelled() {
    let handle = RequestHandle::spawn(async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, ApiError>(())
    });
    handle.cancel();
    assert_eq!(handle.wait().await, Err(ApiError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn abort_handle_cancels_after_move() {
    let handle = RequestHandle::spawn(async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, ApiError>(())
    });
    let abort = handle.abort_handle();
    let waiter = tokio::spawn(handle.wait());
    tokio::time::sleep(Duration::from_secs(1)).await;
    abort.abort();
    assert_eq!(waiter.await.unwrap(), Err(ApiError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn timeout_elapses_to_timed_out() {
    let handle = RequestHandle::spawn(async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, ApiError>(())
    })
    .with_timeout(Some(Duration::from_secs(5)));
    assert_eq!(handle.wait().await, Err(ApiError::TimedOut));
}

#[tokio::test(start_paused = true)]
async fn no_timeout_waits_for_slow_request() {
    let handle = RequestHandle::spawn(async {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok::<_, ApiError>("late")
    })
    .with_timeout(None);
    assert_eq!(handle.wait().await, Ok("late"));
}
