//! End-to-end: the real router on an ephemeral port, driven by the real
//! `HttpApi` and `VoteController`.

use std::sync::{Arc, Mutex};

use quickdesk::client::net::{ApiError, HelpdeskApi, HttpApi, TicketId};
use quickdesk::client::toast::{Severity, Toast, ToastId, ToastNotifier, ToastSurface};
use quickdesk::client::vote::{SubmitError, VOTE_FAILED_MESSAGE, VoteButtonView, VoteController, VoteGroup};
use quickdesk::config::ClientConfig;
use quickdesk::routes;
use quickdesk::services::csrf::CsrfSecret;
use quickdesk::services::store::{MemoryStore, SessionUser, TicketRecord};
use quickdesk::state::AppState;
use quickdesk::types::{Priority, Role, TicketStatus, VoteResult, VoteType};

const SECRET: &str = "roundtrip-secret";

#[derive(Default)]
struct Button {
    count: Mutex<u32>,
    active: Mutex<bool>,
    enabled: Mutex<bool>,
}

impl Button {
    fn shown(&self) -> (u32, bool) {
        (*self.count.lock().unwrap(), *self.active.lock().unwrap())
    }
}

impl VoteButtonView for Button {
    fn set_enabled(&self, enabled: bool) {
        *self.enabled.lock().unwrap() = enabled;
    }
    fn show_loading(&self) {}
    fn restore_content(&self) {}
    fn set_count(&self, count: u32) {
        *self.count.lock().unwrap() = count;
    }
    fn set_active(&self, active: bool) {
        *self.active.lock().unwrap() = active;
    }
}

#[derive(Default)]
struct Surface {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl ToastSurface for Surface {
    fn create_container(&self) {}
    fn append(&self, toast: &Toast) {
        self.messages.lock().unwrap().push((toast.message.clone(), toast.severity));
    }
    fn remove(&self, _id: ToastId) {}
}

struct Desk {
    base_url: String,
    store: Arc<MemoryStore>,
}

async fn start_desk() -> Desk {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_ticket(TicketRecord {
            id: 1,
            subject: "Laptop will not boot".into(),
            status: TicketStatus::Open,
            priority: Priority::High,
            user_id: 10,
            assigned_to: None,
            upvotes: 0,
            downvotes: 0,
        })
        .await;

    let app = routes::app(AppState::new(store.clone(), CsrfSecret::from_secret(SECRET)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    Desk { base_url: format!("http://{addr}"), store }
}

impl Desk {
    async fn api_for(&self, id: i64, role: Role) -> HttpApi {
        let token = self.store.create_session(SessionUser { id, username: format!("u{id}"), role }).await;
        let csrf = CsrfSecret::from_secret(SECRET).token_for(&token);
        HttpApi::with_session(&ClientConfig::new(&self.base_url), csrf, &token).unwrap()
    }
}

fn controller(api: HttpApi, ticket: &str) -> (VoteController, Arc<Button>, Arc<Button>, Arc<Surface>) {
    let up = Arc::new(Button::default());
    let down = Arc::new(Button::default());
    let surface = Arc::new(Surface::default());
    let controller = VoteController::new(
        TicketId::parse(ticket).unwrap(),
        VoteGroup { up: up.clone(), down: down.clone() },
        Arc::new(api),
        ToastNotifier::new(surface.clone()),
    );
    (controller, up, down, surface)
}

#[tokio::test]
async fn vote_switch_and_withdraw() {
    let desk = start_desk().await;
    let (votes, up, down, surface) = controller(desk.api_for(20, Role::User).await, "1");

    let result = votes.submit_vote(VoteType::Up).await.unwrap();
    assert_eq!(result, VoteResult { upvotes: 1, downvotes: 0, user_vote: Some(VoteType::Up) });
    assert_eq!(up.shown(), (1, true));
    assert_eq!(down.shown(), (0, false));

    votes.submit_vote(VoteType::Down).await.unwrap();
    assert_eq!(up.shown(), (0, false));
    assert_eq!(down.shown(), (1, true));

    let result = votes.submit_vote(VoteType::Down).await.unwrap();
    assert_eq!(result.user_vote, None);
    assert_eq!(down.shown(), (0, false));
    assert!(*down.enabled.lock().unwrap());
    assert!(surface.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn votes_from_two_users_accumulate() {
    let desk = start_desk().await;
    let (first, _, _, _) = controller(desk.api_for(20, Role::User).await, "1");
    let (second, up, _, _) = controller(desk.api_for(21, Role::Agent).await, "1");

    first.submit_vote(VoteType::Up).await.unwrap();
    let result = second.submit_vote(VoteType::Up).await.unwrap();
    assert_eq!(result.upvotes, 2);
    assert_eq!(up.shown(), (2, true));
}

#[tokio::test]
async fn unknown_ticket_surfaces_error_toast() {
    let desk = start_desk().await;
    let (votes, up, _, surface) = controller(desk.api_for(20, Role::User).await, "999");

    let err = votes.submit_vote(VoteType::Up).await.unwrap_err();
    assert_eq!(err, SubmitError::Api(ApiError::Status { status: 404 }));
    assert_eq!(up.shown(), (0, false));
    assert_eq!(
        surface.messages.lock().unwrap().as_slice(),
        &[(VOTE_FAILED_MESSAGE.to_owned(), Severity::Error)]
    );
}

#[tokio::test]
async fn forged_csrf_token_is_forbidden() {
    let desk = start_desk().await;
    let token = desk
        .store
        .create_session(SessionUser { id: 30, username: "mallory".into(), role: Role::User })
        .await;
    let api = HttpApi::with_session(&ClientConfig::new(&desk.base_url), "forged", &token).unwrap();

    let err = api.submit_vote(&TicketId::parse("1").unwrap(), VoteType::Up).await.unwrap_err();
    assert_eq!(err, ApiError::Status { status: 403 });
}

#[tokio::test]
async fn missing_session_is_unauthorized() {
    let desk = start_desk().await;
    let api = HttpApi::new(&ClientConfig::new(&desk.base_url), "whatever").unwrap();
    assert_eq!(api.fetch_stats().await.unwrap_err(), ApiError::Status { status: 401 });
}

#[tokio::test]
async fn stats_are_scoped_to_the_caller() {
    let desk = start_desk().await;

    let owner = desk.api_for(10, Role::User).await.fetch_stats().await.unwrap();
    assert_eq!(owner.get("total_tickets"), Some(1));
    assert_eq!(owner.get("open_tickets"), Some(1));
    assert_eq!(owner.get("resolved_tickets"), Some(0));

    let stranger = desk.api_for(11, Role::User).await.fetch_stats().await.unwrap();
    assert_eq!(stranger.get("total_tickets"), Some(0));

    let admin = desk.api_for(1, Role::Admin).await.fetch_stats().await.unwrap();
    assert_eq!(admin.get("total_tickets"), Some(1));
    assert_eq!(admin.get("my_assigned"), Some(0));
}

#[tokio::test]
async fn non_numeric_ticket_is_not_found() {
    let desk = start_desk().await;
    let api = desk.api_for(20, Role::User).await;

    let err = api.submit_vote(&TicketId::parse("abc").unwrap(), VoteType::Up).await.unwrap_err();
    assert_eq!(err, ApiError::Status { status: 404 });
}
