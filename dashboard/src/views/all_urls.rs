use std::sync::Arc;

use axum::extract::State;
use chrono::{DateTime, Utc};
use maud::{Markup, html};
use tracing::error;

use crate::state::AppState;
use crate::styles::Links as LinkClass;

use super::{back_link, local_path, nav_header, page_shell};

fn format_created(ts: DateTime<Utc>) -> String {
    ts.format("%B %-d, %Y, %I:%M %p").to_string()
}

pub async fn all_urls(State(state): State<Arc<AppState>>) -> Markup {
    let result = match state.session.require_token() {
        Ok(token) => state.backend.list_urls(&token).await,
        Err(e) => Err(e),
    };

    let body = match result {
        Err(e) => {
            error!("Error when retrieving user URLs: {e}");
            html! { p { "Failed to load links. Please try again later." } }
        }
        Ok(urls) if urls.is_empty() => html! {
            p { "You don't have any shortened links yet." }
        },
        Ok(urls) => html! {
            ul.(LinkClass::URLS_LIST) {
                @for url in &urls {
                    li.(LinkClass::URL_ITEM) {
                        p {
                            strong { "Shortened link: " }
                            a href=(state.short_link(&url.short))
                                target="_blank"
                                rel="noopener noreferrer"
                            {
                                (url.short)
                            }
                        }
                        @if let Some(original) = &url.url {
                            p { strong { "Original URL: " } (original) }
                        }
                        @if let Some(created) = url.created_at() {
                            p { strong { "Creation date: " } (format_created(created)) }
                        }
                        p { strong { "Number of clicks: " } (url.redirects) }
                        a.(LinkClass::ACTION_LINK) href=(local_path(&["link", &url.short])) {
                            "View click chart"
                        }
                    }
                }
            }
        },
    };

    let content = html! {
        (nav_header(back_link("/shorten")))
        main {
            h1 { "All shortened links" }
            (body)
        }
    };
    page_shell("All links | URL Shortener", content)
}
