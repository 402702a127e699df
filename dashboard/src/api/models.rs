use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
}

#[derive(Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl UserProfile {
    /// Full name when the user gave one, otherwise the login.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Serialize)]
pub struct ShortenRequest<'a> {
    pub url: &'a str,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ShortUrl {
    pub short: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub redirects: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ShortUrl {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

/// One recorded follow of a short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectEvent {
    /// The value exactly as the backend sent it.
    pub raw: String,
    pub at: DateTime<Utc>,
}

impl RedirectEvent {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_timestamp(raw).map(|at| RedirectEvent {
            raw: raw.to_owned(),
            at,
        })
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            // Numbers are epoch milliseconds.
            Value::Number(n) => {
                let millis = n.as_i64()?;
                DateTime::from_timestamp_millis(millis).map(|at| RedirectEvent {
                    raw: n.to_string(),
                    at,
                })
            }
            _ => None,
        }
    }
}

/// Redirect timestamps of a link, validated into typed events.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RedirectHistory {
    pub events: Vec<RedirectEvent>,
    /// Entries that could not be read as a timestamp and were skipped.
    pub dropped: usize,
    /// The body was not an array at all.
    pub malformed: bool,
}

impl RedirectHistory {
    pub fn from_json(body: &Value) -> Self {
        let Some(items) = body.as_array() else {
            return RedirectHistory {
                malformed: true,
                ..Default::default()
            };
        };

        let mut history = RedirectHistory::default();
        for item in items {
            match RedirectEvent::from_json(item) {
                Some(event) => history.events.push(event),
                None => history.dropped += 1,
            }
        }
        history
    }
}

/// Parses the timestamp flavours the backend emits: RFC 3339, naive ISO-8601
/// date-times (taken as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
