use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use maud::{Markup, html};
use tracing::error;

use crate::api::{ShortUrl, UserProfile};
use crate::config::PREVIEW_LINK_COUNT;
use crate::forms::{Field, ShortenForm};
use crate::state::AppState;
use crate::styles::{Forms as FormClass, Header as HeaderClass, Links as LinkClass};

use super::{local_path, nav_header, page_shell};

/// What happened to the last submitted URL, if anything.
#[derive(Default)]
struct Submission {
    url: String,
    created: Option<String>,
    error: Option<String>,
}

pub async fn shorten_page(State(state): State<Arc<AppState>>) -> Markup {
    render(&state, Submission::default()).await
}

pub async fn shorten(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ShortenForm>,
) -> Markup {
    let submission = match form.validate() {
        Err(errors) => Submission {
            url: form.url.clone(),
            error: errors.for_field(Field::Url).map(str::to_owned),
            ..Default::default()
        },
        Ok(url) => match submit(&state, url).await {
            Ok(created) => Submission {
                created: Some(created.short),
                ..Default::default()
            },
            Err(message) => Submission {
                url: form.url.clone(),
                error: Some(message),
                ..Default::default()
            },
        },
    };
    render(&state, submission).await
}

async fn submit(state: &AppState, url: &str) -> Result<ShortUrl, String> {
    let result = match state.session.require_token() {
        Ok(token) => state.backend.shorten(&token, url).await,
        Err(e) => Err(e),
    };
    result.map_err(|e| {
        error!("Error during URL shortening: {e}");
        e.user_message("Something went wrong.").to_owned()
    })
}

/// Profile and links for the page. Failures are logged and leave the
/// corresponding part empty.
async fn load_overview(state: &AppState) -> (Option<UserProfile>, Vec<ShortUrl>) {
    let token = match state.session.require_token() {
        Ok(token) => token,
        Err(e) => {
            error!("Cannot load overview: {e}");
            return (None, Vec::new());
        }
    };

    let (profile, urls) = tokio::join!(
        state.backend.profile(&token),
        state.backend.list_urls(&token)
    );
    let profile = profile
        .inspect_err(|e| error!("Failed to retrieve user name: {e}"))
        .ok();
    let urls = urls
        .inspect_err(|e| error!("Error while retrieving user URLs: {e}"))
        .unwrap_or_default();
    (profile, urls)
}

async fn render(state: &AppState, submission: Submission) -> Markup {
    let (profile, urls) = load_overview(state).await;

    let actions = html! {
        span {
            "Welcome"
            @if let Some(profile) = &profile {
                ", " (profile.display_name())
            }
        }
        form method="post" action="/logout" {
            button.(HeaderClass::EXIT_BUTTON) type="submit" { "EXIT" }
        }
    };

    let content = html! {
        (nav_header(actions))
        main {
            h1 { "Create your short link" }
            form method="post" action="/shorten" {
                input type="text" name="url" placeholder="Enter URL" value=(submission.url)
                    class=[submission.error.as_ref().map(|_| FormClass::FIELD_ERROR)];
                button.(FormClass::SUBMIT_BUTTON) type="submit" { "SHORTEN" }
            }
            @if let Some(error) = &submission.error {
                div.(FormClass::ERROR_MESSAGE) { (error) }
            }
            @if let Some(short) = &submission.created {
                div.(FormClass::SUCCESS_MESSAGE) {
                    "Your short link: "
                    a href=(state.short_link(short))
                        target="_blank"
                        rel="noopener noreferrer"
                    {
                        (short)
                    }
                }
            }
            p { "URL shortening is a tool that makes your content look professional." }

            h2 { "Your short links:" }
            @if urls.is_empty() {
                p { "You don't have any short links yet" }
            } @else {
                ul.(LinkClass::URLS_LIST) {
                    @for url in urls.iter().take(PREVIEW_LINK_COUNT) {
                        li.(LinkClass::URL_ITEM) {
                            p {
                                strong { "Short link: " }
                                a href=(state.short_link(&url.short))
                                    target="_blank"
                                    rel="noopener noreferrer"
                                {
                                    (url.short)
                                }
                            }
                            a.(LinkClass::ACTION_LINK) href=(local_path(&["link", &url.short])) {
                                "Statistics"
                            }
                        }
                    }
                }
                a.(LinkClass::ACTION_LINK) href="/all-urls" { "Show all..." }
            }
        }
    };
    page_shell("Shorten | URL Shortener", content)
}
