//! Route gating on the presence of a stored session token, and rejection of
//! cross-site form posts.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::config::{HOME_PATH, SIGN_IN_PATH};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Only for signed-in users; others go to the sign-in page.
    RequiresSession,
    /// Only for visitors; signed-in users go to the home page.
    RequiresNoSession,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(&'static str),
}

impl Guard {
    /// Presence alone decides; the token itself is never inspected.
    pub fn check(self, signed_in: bool) -> Access {
        match (self, signed_in) {
            (Guard::RequiresSession, false) => Access::Redirect(SIGN_IN_PATH),
            (Guard::RequiresNoSession, true) => Access::Redirect(HOME_PATH),
            _ => Access::Allow,
        }
    }
}

pub async fn requires_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    gate(Guard::RequiresSession, &state, request, next).await
}

pub async fn requires_no_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    gate(Guard::RequiresNoSession, &state, request, next).await
}

async fn gate(guard: Guard, state: &AppState, request: Request, next: Next) -> Response {
    match guard.check(state.session.is_signed_in()) {
        Access::Allow => next.run(request).await,
        Access::Redirect(to) if is_htmx(&request) => {
            // htmx would swap a followed redirect into the fragment target
            (StatusCode::OK, [("HX-Redirect", HeaderValue::from_static(to))]).into_response()
        }
        Access::Redirect(to) => Redirect::to(to).into_response(),
    }
}

fn is_htmx(request: &Request) -> bool {
    request.headers().contains_key("HX-Request")
}

/// Refuses state-changing requests that a browser marks as coming from
/// another site. Requests carrying neither `Sec-Fetch-Site` nor `Origin`
/// are not from a browser form and pass through.
pub async fn reject_cross_site(request: Request, next: Next) -> Response {
    let safe = matches!(
        *request.method(),
        Method::GET | Method::HEAD | Method::OPTIONS
    );
    if !safe && is_cross_site(request.headers()) {
        tracing::warn!(
            method = %request.method(),
            path = request.uri().path(),
            "Rejected cross-site request"
        );
        return StatusCode::FORBIDDEN.into_response();
    }
    next.run(request).await
}

fn is_cross_site(headers: &HeaderMap) -> bool {
    if let Some(site) = headers.get("Sec-Fetch-Site") {
        return !matches!(site.to_str(), Ok("same-origin" | "none"));
    }
    let Some(origin) = headers.get(header::ORIGIN) else {
        return false;
    };
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let authority = origin
        .to_str()
        .ok()
        .and_then(|origin| origin.split_once("://"))
        .map(|(_, authority)| authority);
    match (authority, host) {
        (Some(authority), Some(host)) => !authority.eq_ignore_ascii_case(host),
        // "null" origins and posts without a Host header
        _ => true,
    }
}
