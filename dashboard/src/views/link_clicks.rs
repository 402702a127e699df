use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maud::{Markup, html};
use serde::Deserialize;
use tracing::{debug, error};

use crate::api::ApiError;
use crate::charts::{self, Granularity, svg};
use crate::state::AppState;
use crate::styles::Charts as ChartClass;

use super::{back_link, local_path, nav_header, page_shell};

#[derive(Deserialize, Default)]
pub struct ChartQuery {
    #[serde(default)]
    pub granularity: Granularity,
    /// Page the request comes from; assigned on first render.
    #[serde(default)]
    pub view: Option<u64>,
}

pub async fn link_clicks(
    Path(short): Path<String>,
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Markup {
    let view = query.view.unwrap_or_else(|| state.new_view_id());
    let chart = match render_chart(&state, &short, view, query.granularity).await {
        Some(chart) => chart,
        // A newer request from this page is in flight; let it fill the container
        None => reload_chart(&short, view, query.granularity),
    };

    let content = html! {
        (nav_header(back_link("/all-urls")))
        main {
            h1 {
                "Click chart for the link: "
                a href=(state.short_link(&short)) target="_blank" rel="noopener noreferrer" {
                    (short)
                }
            }
            div #chart-container class=(ChartClass::CHART_CONTAINER) {
                (chart)
            }
        }
    };
    page_shell(&format!("{short} | Clicks"), content)
}

/// Chart fragment for the granularity buttons. A request overtaken by a newer
/// one from the same page answers `204` so htmx leaves the page alone.
pub async fn fragment_chart(
    Path(short): Path<String>,
    Query(query): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let view = query.view.unwrap_or_else(|| state.new_view_id());
    match render_chart(&state, &short, view, query.granularity).await {
        Some(chart) => chart.into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Fetches the redirects of `short` and renders them at `granularity`.
/// Returns `None` when a newer request from the same view superseded it.
pub async fn render_chart(
    state: &AppState,
    short: &str,
    view: u64,
    granularity: Granularity,
) -> Option<Markup> {
    let token = match state.session.require_token() {
        Ok(token) => token,
        Err(e) => {
            let message = html! { p { (e.to_string()) } };
            return Some(chart_body(short, view, granularity, message));
        }
    };

    let key = format!("{short}#{view}");
    let mut ticket = state.chart_requests().begin(&key);
    let result = state
        .backend
        .fetch_redirects(&token, short, &mut ticket.token)
        .await;
    state.chart_requests().finish(&key, ticket.id);

    let chart = match result {
        Ok(history) => {
            let series = charts::bucket(&history.events, granularity);
            html! {
                (svg::render_line_chart(&series, granularity))
                @if history.dropped > 0 {
                    p.(ChartClass::CHART_NOTE) { (skipped_note(history.dropped)) }
                }
            }
        }
        Err(ApiError::Superseded) => {
            debug!(short, view, "Chart request superseded, discarding");
            return None;
        }
        Err(e) => {
            error!("Error while loading clicks for {short}: {e}");
            html! { p { "Error while loading clicks" } }
        }
    };
    Some(chart_body(short, view, granularity, chart))
}

fn skipped_note(dropped: usize) -> String {
    match dropped {
        1 => "1 unreadable entry was skipped".to_owned(),
        n => format!("{n} unreadable entries were skipped"),
    }
}

fn fragment_url(short: &str, view: u64, granularity: Granularity) -> String {
    format!(
        "{}?granularity={}&view={view}",
        local_path(&["fragments", "link", short, "chart"]),
        granularity.as_str()
    )
}

/// Placeholder that fetches the chart as soon as htmx loads it.
fn reload_chart(short: &str, view: u64, granularity: Granularity) -> Markup {
    html! {
        div
            hx-get=(fragment_url(short, view, granularity))
            hx-trigger="load"
            hx-target="#chart-container"
            hx-swap="innerHTML"
        {
            p { "Loading..." }
        }
    }
}

fn chart_body(short: &str, view: u64, active: Granularity, chart: Markup) -> Markup {
    let page = local_path(&["link", short]);
    html! {
        (chart)
        div.(ChartClass::GRANULARITY_SELECTOR) {
            @for g in Granularity::SELECTABLE {
                a.(ChartClass::GRANULARITY_BTN)
                    .(if g == active { ChartClass::GRANULARITY_ACTIVE } else { "" })
                    href=(format!("{page}?granularity={}", g.as_str()))
                    hx-get=(fragment_url(short, view, g))
                    hx-target="#chart-container"
                    hx-swap="innerHTML"
                {
                    (g.display_name())
                }
            }
        }
    }
}
