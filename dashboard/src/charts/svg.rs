use std::fmt::Write;

use maud::{Markup, html};

use super::{Bucket, Granularity, format_tick};

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 240.0;
const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 30.0;

const TEXT_STYLE: &str = "fill: var(--foreground); font-family: inherit";
const SVG_CONTAINER_STYLE: &str = "width:100%;height:auto";
const GRID_STYLE: &str = "stroke: var(--muted); stroke-dasharray: 3 3";

pub const NO_DATA: &str = "No data available to build the chart";

/// Draws click counts as a line, one point per bucket in series order.
pub fn render_line_chart(series: &[Bucket], granularity: Granularity) -> Markup {
    if series.is_empty() {
        return empty_chart();
    }

    let max_val = series.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
    let chart_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let point = |i: usize, count: usize| {
        let x = if series.len() == 1 {
            MARGIN_LEFT + chart_w / 2.0
        } else {
            MARGIN_LEFT + (i as f64 / (series.len() - 1) as f64) * chart_w
        };
        let y = MARGIN_TOP + chart_h - (count as f64 / max_val) * chart_h;
        (x, y)
    };

    let mut points = String::new();
    for (i, b) in series.iter().enumerate() {
        let (x, y) = point(i, b.count);
        if !points.is_empty() {
            points.push(' ');
        }
        let _ = write!(points, "{x},{y}");
    }

    html! {
        svg
            viewBox=(format!("0 0 {WIDTH} {HEIGHT}"))
            xmlns="http://www.w3.org/2000/svg"
            style=(SVG_CONTAINER_STYLE)
        {
            rect width=(WIDTH) height=(HEIGHT) style="fill: var(--background)" {}
            line
                x1=(MARGIN_LEFT)
                y1=(MARGIN_TOP)
                x2=(MARGIN_LEFT + chart_w)
                y2=(MARGIN_TOP)
                style=(GRID_STYLE)
            {}
            line
                x1=(MARGIN_LEFT)
                y1=(MARGIN_TOP + chart_h / 2.0)
                x2=(MARGIN_LEFT + chart_w)
                y2=(MARGIN_TOP + chart_h / 2.0)
                style=(GRID_STYLE)
            {}
            line
                x1=(MARGIN_LEFT)
                y1=(MARGIN_TOP + chart_h)
                x2=(MARGIN_LEFT + chart_w)
                y2=(MARGIN_TOP + chart_h)
                style=(GRID_STYLE)
            {}
            text
                x=(MARGIN_LEFT - 5.0)
                y=(MARGIN_TOP + 4.0)
                font-size="10"
                text-anchor="end"
                style=(TEXT_STYLE)
            {
                (max_val)
            }
            text
                x=(MARGIN_LEFT - 5.0)
                y=(MARGIN_TOP + chart_h)
                font-size="10"
                text-anchor="end"
                style=(TEXT_STYLE)
            { "0" }
            polyline points=(points) fill="none" stroke-width="2" style="stroke: var(--accent)" {}
            @for (i, b) in series.iter().enumerate() {
                @let (x, y) = point(i, b.count);
                circle cx=(x) cy=(y) r="3" style="fill: var(--accent)" {
                    title { (b.label) ": " (b.count) }
                }
            }
            (write_x_axis(series, granularity, chart_w))
        }
    }
}

fn write_x_axis(series: &[Bucket], granularity: Granularity, chart_w: f64) -> Markup {
    let label_y = HEIGHT - 8.0;
    html! {
        @if series.len() == 1 {
            text
                x=(MARGIN_LEFT + chart_w / 2.0)
                y=(label_y)
                font-size="11"
                text-anchor="middle"
                style=(TEXT_STYLE)
            {
                (format_tick(series[0].start, granularity))
            }
        } @else {
            @if let Some(first) = series.first() {
                text
                    x=(MARGIN_LEFT)
                    y=(label_y)
                    font-size="11"
                    text-anchor="start"
                    style=(TEXT_STYLE)
                {
                    (format_tick(first.start, granularity))
                }
            }
            @if series.len() > 2 {
                @let mid = (series.len() - 1) / 2;
                @let mid_x = MARGIN_LEFT + (mid as f64 / (series.len() - 1) as f64) * chart_w;
                text x=(mid_x) y=(label_y) font-size="11" text-anchor="middle" style=(TEXT_STYLE) {
                    (format_tick(series[mid].start, granularity))
                }
            }
            @if let Some(last) = series.last() {
                text
                    x=(MARGIN_LEFT + chart_w)
                    y=(label_y)
                    font-size="11"
                    text-anchor="end"
                    style=(TEXT_STYLE)
                {
                    (format_tick(last.start, granularity))
                }
            }
        }
    }
}

fn empty_chart() -> Markup {
    html! {
        p { (NO_DATA) }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn bucket(label: &str, hour: u32, count: usize) -> Bucket {
        Bucket {
            label: label.to_owned(),
            start: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            count,
        }
    }

    #[test]
    fn empty_series_renders_message() {
        let html = render_line_chart(&[], Granularity::Day).into_string();
        assert!(html.contains(NO_DATA));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn renders_point_per_bucket_with_ticks() {
        let series = vec![
            bucket("2024-01-01 08:00", 8, 1),
            bucket("2024-01-01 09:00", 9, 4),
            bucket("2024-01-01 10:00", 10, 2),
        ];
        let html = render_line_chart(&series, Granularity::Hour).into_string();

        assert_eq!(html.matches("<circle").count(), 3);
        assert!(html.contains("2024-01-01 09:00: 4"));
        assert!(html.contains(">08:00<"));
        assert!(html.contains(">09:00<"));
        assert!(html.contains(">10:00<"));
    }

    #[test]
    fn single_bucket_is_centred() {
        let series = vec![bucket("2024-01-01", 0, 5)];
        let html = render_line_chart(&series, Granularity::Day).into_string();
        assert_eq!(html.matches("<circle").count(), 1);
        assert!(html.contains(">2024-01-01<"));
    }
}
