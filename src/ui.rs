//! Rendering helpers: widgets, JSON highlighting and cell formatting

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use ratatui::{prelude::*, widgets::*};
use serde_json::Value;

use crate::models::{Column, ColumnKind};

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Simple JSON syntax highlighting, one `Line` per input line
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    text.lines().map(highlight_json_line).collect()
}

fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        match c {
            '"' => {
                // find the closing quote, honouring escapes
                let mut end = rest.len();
                let mut escaped = false;
                for (i, ch) in rest.char_indices().skip(1) {
                    match ch {
                        '\\' if !escaped => escaped = true,
                        '"' if !escaped => {
                            end = i + 1;
                            break;
                        }
                        _ => escaped = false,
                    }
                }
                let (string, tail) = rest.split_at(end);
                let is_key = tail.trim_start().starts_with(':');
                let color = if is_key { Color::Cyan } else { Color::Green };
                spans.push(Span::styled(string.to_string(), Style::default().fg(color)));
                rest = tail;
            }
            '{' | '}' | '[' | ']' => {
                spans.push(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
                rest = &rest[1..];
            }
            _ => {
                let end = rest
                    .find(|ch: char| matches!(ch, '"' | '{' | '}' | '[' | ']'))
                    .unwrap_or(rest.len());
                let (plain, tail) = rest.split_at(end);
                let word = plain
                    .trim()
                    .trim_start_matches(':')
                    .trim_end_matches(',')
                    .trim();
                let style = if matches!(word, "true" | "false" | "null") {
                    Style::default().fg(Color::Magenta)
                } else if !word.is_empty() && word.parse::<f64>().is_ok() {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(plain.to_string(), style));
                rest = tail;
            }
        }
    }

    Line::from(spans)
}

// ============================================================================
// Cell formatting
// ============================================================================

/// Read a backend timestamp: RFC 3339, naive ISO (taken as UTC), a bare
/// date, or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(Utc.from_utc_datetime(&naive));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// "October 07, 2025 at 14:03:00"
pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%B %d, %Y at %H:%M:%S").to_string()
}

/// "October 07, 2025"
pub fn format_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%B %d, %Y").to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{} {}s", n, unit)
    } else {
        format!("{} {}", n, unit)
    }
}

/// Time since `then`: "3 days ago", "Just now", "Never"
pub fn format_relative(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(then) = then else {
        return "Never".to_string();
    };
    let minutes = (now - then).num_seconds() / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let (months, years) = (days / 30, days / 365);

    if years > 0 {
        format!("{} ago", plural(years, "year"))
    } else if months > 0 {
        format!("{} ago", plural(months, "month"))
    } else if days > 0 {
        format!("{} ago", plural(days, "day"))
    } else if hours > 0 {
        format!("{} ago", plural(hours, "hour"))
    } else if minutes > 0 {
        format!("{} ago", plural(minutes, "minute"))
    } else {
        "Just now".to_string()
    }
}

/// Remaining validity: "Expires in 3 days", "Expired", "(no expiry)"
pub fn format_validity(until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(until) = until else {
        return "(no expiry)".to_string();
    };
    let ms = (until - now).num_milliseconds();
    // whole days, rounded up
    let days = ms.div_euclid(86_400_000) + i64::from(ms.rem_euclid(86_400_000) != 0);

    if days <= 0 {
        "Expired".to_string()
    } else if days < 30 {
        format!("Expires in {}", plural(days, "day"))
    } else if days < 365 {
        format!("Expires in {}", plural(days / 30, "month"))
    } else {
        format!("Expires in {}", plural(days / 365, "year"))
    }
}

/// Less than 30 days of validity left
pub fn expiring_soon(until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    until.is_some_and(|until| until - now < chrono::Duration::days(30))
}

/// Plain-text rendering of a JSON value
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Text for one table cell
pub fn cell_text(column: &Column, record: &Value, now: DateTime<Utc>) -> String {
    let value = record.get(column.key).unwrap_or(&Value::Null);
    match column.kind {
        ColumnKind::Text => value_text(value),
        ColumnKind::Validity => {
            let until = parse_timestamp(value);
            let date = until
                .map(|d| format_date(&d.with_timezone(&chrono::Local)))
                .unwrap_or_else(|| "Unlimited".to_string());
            format!("{} · {}", date, format_validity(until, now))
        }
        ColumnKind::LastSeen => format_relative(parse_timestamp(value), now),
        ColumnKind::Active => {
            if value.as_bool().unwrap_or(false) {
                "[x]".to_string()
            } else {
                "[ ]".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_format_datetime() {
        let dt = at("2025-10-07T14:03:00Z");
        assert_eq!(format_datetime(&dt), "October 07, 2025 at 14:03:00");
        assert_eq!(format_date(&dt), "October 07, 2025");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = at("2025-10-07T14:03:00Z");
        assert_eq!(parse_timestamp(&json!("2025-10-07T14:03:00Z")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2025-10-07T14:03:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!(expected.timestamp_millis())), Some(expected));
        assert_eq!(
            parse_timestamp(&json!("2025-10-07")),
            Some(at("2025-10-07T00:00:00Z"))
        );
        assert_eq!(parse_timestamp(&json!("soon")), None);
        assert_eq!(parse_timestamp(&Value::Null), None);
    }

    #[test]
    fn test_format_relative() {
        let now = at("2025-10-10T12:00:00Z");
        assert_eq!(format_relative(None, now), "Never");
        assert_eq!(format_relative(Some(now - Duration::seconds(30)), now), "Just now");
        assert_eq!(format_relative(Some(now - Duration::minutes(1)), now), "1 minute ago");
        assert_eq!(format_relative(Some(now - Duration::hours(5)), now), "5 hours ago");
        assert_eq!(format_relative(Some(now - Duration::days(3)), now), "3 days ago");
        assert_eq!(format_relative(Some(now - Duration::days(65)), now), "2 months ago");
        assert_eq!(format_relative(Some(now - Duration::days(400)), now), "1 year ago");
    }

    #[test]
    fn test_format_validity() {
        let now = at("2025-10-10T12:00:00Z");
        assert_eq!(format_validity(None, now), "(no expiry)");
        assert_eq!(format_validity(Some(now - Duration::hours(1)), now), "Expired");
        assert_eq!(format_validity(Some(now + Duration::hours(1)), now), "Expires in 1 day");
        assert_eq!(format_validity(Some(now + Duration::days(10)), now), "Expires in 10 days");
        assert_eq!(format_validity(Some(now + Duration::days(95)), now), "Expires in 3 months");
        assert_eq!(format_validity(Some(now + Duration::days(800)), now), "Expires in 2 years");

        assert!(expiring_soon(Some(now + Duration::days(10)), now));
        assert!(!expiring_soon(Some(now + Duration::days(40)), now));
        assert!(!expiring_soon(None, now));
    }

    #[test]
    fn test_cell_text() {
        let now = at("2025-10-10T12:00:00Z");
        let record = json!({"userRoles": ["Admin", "Viewer"], "isActive": true, "lastLogin": null});
        let roles = Column { key: "userRoles", header: "Roles", kind: ColumnKind::Text };
        let active = Column { key: "isActive", header: "Active", kind: ColumnKind::Active };
        let seen = Column { key: "lastLogin", header: "Last Seen", kind: ColumnKind::LastSeen };
        assert_eq!(cell_text(&roles, &record, now), "Admin, Viewer");
        assert_eq!(cell_text(&active, &record, now), "[x]");
        assert_eq!(cell_text(&seen, &record, now), "Never");
    }

    #[test]
    fn test_highlight_marks_keys_and_literals() {
        let lines = highlight_json("  \"name\": \"Ada\",\n  \"active\": true");
        assert_eq!(lines.len(), 2);
        let key = lines[0].spans.iter().find(|s| s.content == "\"name\"").unwrap();
        assert_eq!(key.style.fg, Some(Color::Cyan));
        let value = lines[0].spans.iter().find(|s| s.content == "\"Ada\"").unwrap();
        assert_eq!(value.style.fg, Some(Color::Green));
        let literal = lines[1].spans.iter().find(|s| s.content.contains("true")).unwrap();
        assert_eq!(literal.style.fg, Some(Color::Magenta));
    }
}
