//! Behavioral constants for forms, link previews and navigation.

/// Passwords shorter than this are rejected before reaching the backend.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Links listed on the shorten page before "Show all...".
pub const PREVIEW_LINK_COUNT: usize = 3;

/// Where visitors without a session are sent.
pub const SIGN_IN_PATH: &str = "/login";

/// Landing page for signed-in users.
pub const HOME_PATH: &str = "/shorten";
