//! EPG (Electronic Program Guide) engine
//!
//! XMLTV extraction and current/next schedule resolution, plus the
//! timestamp helpers both sides share.

mod parser;
mod resolve;

pub use parser::{parse, GuideData};
pub use resolve::current_and_next;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// XMLTV timestamp layout: fixed-width datetime plus offset,
/// e.g. `20240101180000 +0000`.
const XMLTV_FORMAT: &str = "%Y%m%d%H%M%S %z";

/// Rendering applied to matched programmes, localized to the caller's
/// timezone, e.g. `Mon, 01 Jan 2024 18:30:00 CET`.
const DISPLAY_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %Z";

/// Interpret an XMLTV timestamp as an instant. Offset-less values occur
/// in the wild and are treated as UTC. Returns `None` on anything else.
pub(crate) fn parse_xmltv_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_str(raw, XMLTV_FORMAT) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|t| t.and_utc())
}

/// Render an XMLTV timestamp in the requested timezone. Unparseable
/// values pass through verbatim rather than losing the field.
pub(crate) fn localize(raw: &str, tz: Tz) -> String {
    match parse_xmltv_instant(raw) {
        Some(t) => t.with_timezone(&tz).format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xmltv_instant() {
        let t = parse_xmltv_instant("20240115120000 +0000").unwrap();
        assert_eq!(t.timestamp(), 1705320000);

        let t1 = parse_xmltv_instant("20240115120000 +0100").unwrap();
        let t2 = parse_xmltv_instant("20240115120000 +0000").unwrap();
        assert_eq!((t2 - t1).num_seconds(), 3600);
    }

    #[test]
    fn test_parse_without_offset_is_utc() {
        let bare = parse_xmltv_instant("20240115120000").unwrap();
        let explicit = parse_xmltv_instant("20240115120000 +0000").unwrap();
        assert_eq!(bare, explicit);
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_xmltv_instant("").is_none());
        assert!(parse_xmltv_instant("not a time").is_none());
        assert!(parse_xmltv_instant("2024-01-15 12:00").is_none());
    }

    #[test]
    fn test_localize() {
        assert_eq!(
            localize("20240101180000 +0000", chrono_tz::UTC),
            "Mon, 01 Jan 2024 18:00:00 UTC"
        );
        assert_eq!(
            localize("20240101180000 +0000", chrono_tz::Europe::Paris),
            "Mon, 01 Jan 2024 19:00:00 CET"
        );
    }

    #[test]
    fn test_localize_garbage_passes_through() {
        assert_eq!(localize("soon", chrono_tz::UTC), "soon");
    }
}
