use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Redirect};
use maud::{DOCTYPE, Markup, html};
use reqwest::Url;

use crate::config::SIGN_IN_PATH;
use crate::styles::{self, Header as HeaderClass};

pub mod all_urls;
pub mod auth;
pub mod link_clicks;
pub mod shorten;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

pub fn page_shell(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/styles.css";
                script src=(HTMX_SRC) {}
            }
            body {
                (content)
            }
        }
    }
}

/// Top bar with the logo and page-specific actions on the right.
pub fn nav_header(actions: Markup) -> Markup {
    html! {
        header.(HeaderClass::NAVIGATE) {
            div.(HeaderClass::LOGO) { "URL Shortener" }
            div.(HeaderClass::NAV_ACTIONS) { (actions) }
        }
    }
}

pub fn back_link(href: &str) -> Markup {
    html! {
        a href=(href) { "Back" }
    }
}

/// Absolute path made of percent-encoded `segments`.
pub fn local_path(segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return format!("/{}", segments.join("/"));
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_owned()
}

pub async fn index() -> Redirect {
    Redirect::to(SIGN_IN_PATH)
}

pub async fn styles() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css")], styles::ALL.as_str())
}
