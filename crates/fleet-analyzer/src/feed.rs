//! Hourly feed payload decoding
//!
//! Each hour of the balloon feed is a JSON array of `[lat, lon, alt]`
//! triples, but payloads are frequently damaged: missing brackets, bare
//! `NaN` tokens, truncated tails. Decoding is lenient and tries, in order:
//!
//! 1. the payload as-is
//! 2. with a leading `[` added
//! 3. wrapped in `[` ... `]`
//! 4. salvaging every innermost `[...]` group that decodes as a triple

use balloon_tracking::Report;
use serde_json::Value;
use tracing::{debug, warn};

/// Convert one decoded element into a report
///
/// Requires finite latitude and longitude; a missing altitude becomes 0.
pub fn report_from_value(value: &Value) -> Option<Report> {
    let fields = value.as_array()?;
    let lat = fields.first()?.as_f64().filter(|v| v.is_finite())?;
    let lon = fields.get(1)?.as_f64().filter(|v| v.is_finite())?;
    let alt = fields.get(2).and_then(Value::as_f64).unwrap_or(0.0);
    Some(Report::new(lat, lon, alt))
}

/// Convert decoded elements into reports, dropping the unusable ones
pub fn reports_from_values(values: &[Value]) -> Vec<Report> {
    let reports: Vec<Report> = values.iter().filter_map(report_from_value).collect();
    if reports.len() < values.len() {
        debug!(
            "Dropped {} of {} feed entries without a usable position",
            values.len() - reports.len(),
            values.len()
        );
    }
    reports
}

/// Decode an hourly payload, repairing what can be repaired
///
/// Returns `None` for HTML error pages and for payloads with nothing
/// salvageable.
pub fn parse_feed_payload(text: &str) -> Option<Vec<Report>> {
    let trimmed = text.trim();
    if trimmed
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<html"))
    {
        return None;
    }

    let cleaned = trimmed.replace("NaN", "null");

    let attempts = [
        cleaned.clone(),
        format!("[{}", cleaned),
        format!("[{}]", cleaned),
    ];
    for attempt in &attempts {
        if let Ok(values) = serde_json::from_str::<Vec<Value>>(attempt) {
            return Some(reports_from_values(&values));
        }
    }

    let salvaged = salvage_triples(&cleaned);
    if salvaged.is_empty() {
        warn!("Feed payload unreadable ({} bytes)", text.len());
        None
    } else {
        warn!("Feed payload damaged; salvaged {} reports", salvaged.len());
        Some(salvaged)
    }
}

/// Decode every innermost `[...]` group that is a valid triple
fn salvage_triples(text: &str) -> Vec<Report> {
    let mut reports = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        match c {
            '[' => start = Some(i),
            ']' => {
                if let Some(s) = start.take() {
                    let group = &text[s..=i];
                    if let Some(report) = serde_json::from_str::<Value>(group)
                        .ok()
                        .as_ref()
                        .and_then(report_from_value)
                    {
                        reports.push(report);
                    }
                }
            }
            _ => {}
        }
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_payload() {
        let reports = parse_feed_payload("[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]").unwrap();
        assert_eq!(reports, vec![Report::new(1.0, 2.0, 3.0), Report::new(4.0, 5.0, 6.0)]);
    }

    #[test]
    fn test_missing_opening_bracket() {
        let reports = parse_feed_payload("[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]").unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_missing_both_brackets() {
        let reports = parse_feed_payload("\n[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]\n").unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_nan_altitude_becomes_zero() {
        let reports = parse_feed_payload("[[1.0, 2.0, NaN]]").unwrap();
        assert_eq!(reports, vec![Report::new(1.0, 2.0, 0.0)]);
    }

    #[test]
    fn test_nan_position_is_dropped() {
        let reports = parse_feed_payload("[[NaN, 2.0, 3.0], [1.0, 2.0, 3.0]]").unwrap();
        assert_eq!(reports, vec![Report::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_salvage_truncated_payload() {
        let reports = parse_feed_payload("[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8").unwrap();
        assert_eq!(reports, vec![Report::new(1.0, 2.0, 3.0), Report::new(4.0, 5.0, 6.0)]);
    }

    #[test]
    fn test_html_error_page_rejected() {
        assert!(parse_feed_payload("<html><body>404</body></html>").is_none());
        assert!(parse_feed_payload("  <HTML>").is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_feed_payload("not json at all").is_none());
    }

    #[test]
    fn test_empty_array_is_empty_hour() {
        assert_eq!(parse_feed_payload("[]"), Some(vec![]));
    }
}
