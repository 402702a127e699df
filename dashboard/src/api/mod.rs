//! HTTP client for the URL-shortening backend.

pub mod client;
pub mod error;
pub mod models;

pub use client::BackendClient;
pub use error::ApiError;
pub use models::{RedirectEvent, ShortUrl, UserProfile};
