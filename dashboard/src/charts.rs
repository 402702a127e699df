pub mod svg;

use std::collections::HashMap;

use chrono::{DateTime, Timelike, Utc};
use serde::Deserialize;

use crate::api::RedirectEvent;

/// Time-bucket resolution for the click chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Granularity {
    #[default]
    Day,
    Hour,
    Minute,
    /// Any unrecognised selection. Events are not truncated and keep their
    /// raw value as label.
    Exact,
}

impl Granularity {
    /// The choices offered to the viewer, in display order.
    pub const SELECTABLE: [Granularity; 3] =
        [Granularity::Day, Granularity::Hour, Granularity::Minute];

    pub fn parse(value: &str) -> Self {
        match value {
            "day" => Granularity::Day,
            "hour" => Granularity::Hour,
            "minute" => Granularity::Minute,
            _ => Granularity::Exact,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Hour => "hour",
            Granularity::Minute => "minute",
            Granularity::Exact => "exact",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Granularity::Day => "By days",
            Granularity::Hour => "By hours",
            Granularity::Minute => "By minutes",
            Granularity::Exact => "Exact",
        }
    }

    /// Start of the bucket `at` falls into.
    pub fn truncate(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let date = at.date_naive();
        let truncated = match self {
            Granularity::Day => date.and_hms_opt(0, 0, 0),
            Granularity::Hour => date.and_hms_opt(at.hour(), 0, 0),
            Granularity::Minute => date.and_hms_opt(at.hour(), at.minute(), 0),
            Granularity::Exact => return at,
        };
        truncated.map_or(at, |naive| naive.and_utc())
    }

    /// Bucket key of an event.
    pub fn label(&self, event: &RedirectEvent) -> String {
        let format = match self {
            Granularity::Day => "%Y-%m-%d",
            Granularity::Hour => "%Y-%m-%d %H:00",
            Granularity::Minute => "%Y-%m-%d %H:%M",
            Granularity::Exact => return event.raw.clone(),
        };
        event.at.format(format).to_string()
    }
}

impl From<String> for Granularity {
    fn from(value: String) -> Self {
        Granularity::parse(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    /// Truncated instant of the first event that produced this label.
    pub start: DateTime<Utc>,
    pub count: usize,
}

/// Groups events into buckets at `granularity`.
///
/// Buckets come out in the order their label is first seen while scanning
/// `events`; input that is not time-sorted yields a series that is not
/// time-sorted either.
pub fn bucket(events: &[RedirectEvent], granularity: Granularity) -> Vec<Bucket> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut series: Vec<Bucket> = Vec::new();

    for event in events {
        let label = granularity.label(event);
        match positions.get(&label) {
            Some(&idx) => series[idx].count += 1,
            None => {
                positions.insert(label.clone(), series.len());
                series.push(Bucket {
                    label,
                    start: granularity.truncate(event.at),
                    count: 1,
                });
            }
        }
    }

    series
}

/// Axis label for a bucket start.
pub fn format_tick(ts: DateTime<Utc>, granularity: Granularity) -> String {
    let format = match granularity {
        Granularity::Day => "%Y-%m-%d",
        Granularity::Hour => "%H:00",
        Granularity::Minute => "%H:%M",
        Granularity::Exact => "%Y-%m-%d %H:%M:%S",
    };
    ts.format(format).to_string()
}
