//! Data directory layout for persistent storage.

/// Fixed storage key of the bearer token, relative to the data directory.
pub const SESSION_FILE: &str = "session.toml";
