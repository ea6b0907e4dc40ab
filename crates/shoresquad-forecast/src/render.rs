//! Forecast card rendering.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::page::RenderTarget;
use crate::payload::{self, Step};

pub const LOADING_MARKUP: &str = r#"<div class="forecast-loading">Loading forecast…</div>"#;
pub const UNAVAILABLE_MARKUP: &str =
    r#"<div class="forecast-loading">Weather currently unavailable — check back soon.</div>"#;
pub const NO_DATA_MARKUP: &str =
    r#"<div class="forecast-loading">No forecast data available</div>"#;

/// Placeholder shown for a missing temperature.
const MISSING_TEMP: &str = "--";

/// One display card, derived from a single per-day record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastDay {
    pub date_label: String,
    pub high_c: Option<i64>,
    pub low_c: Option<i64>,
    pub description: String,
    /// Empty when the record has no humidity data
    pub humidity_range: String,
    /// Empty when the record has no wind data
    pub wind_summary: String,
}

impl ForecastDay {
    pub fn from_record(record: &Value) -> Self {
        let raw_date = payload::text(payload::field(record, "date"))
            .or_else(|| payload::text(payload::field(record, "timestamp")))
            .unwrap_or_default();

        let temp = |bound: &str| {
            payload::number(payload::path(
                record,
                &[Step::Key("temperature"), Step::Key(bound)],
            ))
            .map(|t| t.round() as i64)
        };

        let description = payload::text(payload::field(record, "forecast"))
            .or_else(|| {
                payload::text(payload::path(
                    record,
                    &[Step::Key("general"), Step::Key("forecast")],
                ))
            })
            .unwrap_or_default()
            .to_string();

        Self {
            date_label: format_date_label(raw_date),
            high_c: temp("high"),
            low_c: temp("low"),
            description,
            humidity_range: humidity_range(record),
            wind_summary: wind_summary(record),
        }
    }

    /// Card markup with every free-text field escaped.
    pub fn to_markup(&self) -> String {
        let label = escape_html(&self.date_label);
        let details = [self.humidity_range.as_str(), self.wind_summary.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| escape_html(s))
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            r#"<article class="forecast-card" role="group" aria-label="Forecast for {label}">
  <div class="forecast-day">{label}</div>
  <div class="forecast-temp">{high}°C / {low}°C</div>
  <div class="forecast-desc">{desc}</div>
  <small class="muted">{details}</small>
</article>"#,
            label = label,
            high = temp_text(self.high_c),
            low = temp_text(self.low_c),
            desc = escape_html(&self.description),
            details = details,
        )
    }
}

fn temp_text(value: Option<i64>) -> String {
    value.map_or_else(|| MISSING_TEMP.to_string(), |t| t.to_string())
}

/// Short weekday, day and month (`Wed, 1 May`). Unparseable input is
/// returned unchanged.
pub fn format_date_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        });

    match date {
        Some(d) => d.format("%a, %-d %b").to_string(),
        None => raw.to_string(),
    }
}

fn humidity_range(record: &Value) -> String {
    let Some(rh) = payload::field(record, "relative_humidity") else {
        return String::new();
    };
    let low = payload::display(payload::field(rh, "low"));
    let high = payload::display(payload::field(rh, "high"));

    match (low, high) {
        (Some(l), Some(h)) => format!("RH {}%–{}%", l, h),
        (Some(v), None) | (None, Some(v)) => format!("RH {}%", v),
        (None, None) => String::new(),
    }
}

fn wind_summary(record: &Value) -> String {
    let Some(wind) = payload::field(record, "wind") else {
        return String::new();
    };
    let direction = payload::display(payload::field(wind, "direction"));
    let speed = payload::field(wind, "speed");
    let low = speed.and_then(|s| payload::display(payload::field(s, "low")));
    let high = speed.and_then(|s| payload::display(payload::field(s, "high")));

    let speed_text = match (low, high) {
        (Some(l), Some(h)) => Some(format!("{}–{} km/h", l, h)),
        (Some(v), None) | (None, Some(v)) => Some(format!("{} km/h", v)),
        (None, None) => None,
    };

    if direction.is_none() && speed_text.is_none() {
        return String::new();
    }

    ["Wind".to_string()]
        .into_iter()
        .chain(direction)
        .chain(speed_text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape `& < > " ' \`` for embedding in markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cards for every day in source order, or the no-data message.
pub fn render_markup(data: &Value) -> String {
    let records = payload::day_records(data);
    if records.is_empty() {
        return NO_DATA_MARKUP.to_string();
    }

    records
        .iter()
        .map(|record| ForecastDay::from_record(record).to_markup())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace the target's content with the rendered forecast in one assignment.
pub fn render(data: &Value, target: &mut dyn RenderTarget) {
    let markup = render_markup(data);
    target.replace_content(&markup);
}
