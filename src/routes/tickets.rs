//! Ticket vote route.

use axum::Form;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::Deserialize;
use tracing::warn;

use crate::routes::auth::{AuthUser, is_xhr};
use crate::services::vote::{self, VoteError};
use crate::state::AppState;

/// Fields posted by a vote control. Accepts multipart or url-encoded bodies.
#[derive(Debug, Default, Deserialize)]
pub struct VoteForm {
    #[serde(default)]
    pub vote_type: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl VoteForm {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "vote_type" => self.vote_type = value,
            "csrf_token" => self.csrf_token = value,
            _ => {}
        }
    }
}

impl<S> FromRequest<S> for VoteForm
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !multipart {
            let Form(form) = Form::<VoteForm>::from_request(req, state)
                .await
                .map_err(|_| StatusCode::BAD_REQUEST)?;
            return Ok(form);
        }

        let mut body = Multipart::from_request(req, state)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;
        let mut form = VoteForm::default();
        while let Some(field) = body.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
            let name = field.name().unwrap_or_default().to_owned();
            let value = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            form.set(&name, value);
        }
        Ok(form)
    }
}

pub(crate) fn vote_error_to_status(err: &VoteError) -> StatusCode {
    match err {
        VoteError::InvalidVoteType(_) => StatusCode::BAD_REQUEST,
        VoteError::TicketNotFound(_) => StatusCode::NOT_FOUND,
        VoteError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /tickets/{id}/vote`: cast, switch, or withdraw the caller's vote.
///
/// Programmatic callers (`X-Requested-With: XMLHttpRequest`) get the new
/// counters as JSON; form posts are redirected back to the ticket page.
/// An id that is not an integer names no ticket and gets 404.
pub async fn vote_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    form: VoteForm,
) -> Response {
    let Ok(ticket_id) = raw_id.parse::<i64>() else {
        warn!(raw_id = %raw_id, "vote rejected: non-numeric ticket id");
        return StatusCode::NOT_FOUND.into_response();
    };

    if !state.csrf.verify(&auth.token, &form.csrf_token) {
        warn!(ticket_id, user_id = auth.user.id, "vote rejected: csrf token mismatch");
        return StatusCode::FORBIDDEN.into_response();
    }

    match vote::cast_vote(state.store.as_ref(), ticket_id, auth.user.id, &form.vote_type).await {
        Ok(result) if is_xhr(&headers) => Json(result).into_response(),
        Ok(_) => Redirect::to(&format!("/tickets/{ticket_id}")).into_response(),
        Err(e) => {
            let status = vote_error_to_status(&e);
            if status.is_server_error() {
                tracing::error!(ticket_id, error = %e, "vote failed");
            } else {
                warn!(ticket_id, error = %e, "vote rejected");
            }
            status.into_response()
        }
    }
}

#[cfg(test)]
#[path = "tickets_test.rs"]
mod tests;
