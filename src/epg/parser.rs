//! Structural extractor for XMLTV guide documents
//!
//! Streaming, non-validating. A missing attribute or nested element
//! becomes an empty field; a malformed element is dropped and the scan
//! continues. No document shape aborts the pass.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::parse_xmltv_instant;
use crate::models::{Channel, Programme};

/// Extraction result: both sequences come back sorted, channels by name
/// and programmes by start instant.
#[derive(Debug, Clone, Default)]
pub struct GuideData {
    pub channels: Vec<Channel>,
    pub programmes: Vec<Programme>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Root,
    Channel,
    Programme,
    DisplayName,
    Title,
    Desc,
}

/// Extract channel and programme records from raw XMLTV text.
pub fn parse(xml: &str) -> GuideData {
    // Text arrives split around entity references; edge-trimming each
    // fragment would eat the whitespace next to them. Surrounding
    // whitespace is trimmed once, at element end.
    let mut reader = Reader::from_str(xml);

    let mut channels: Vec<Channel> = Vec::new();
    let mut programmes: Vec<Programme> = Vec::new();

    let mut state = State::Root;
    let mut channel: Option<Channel> = None;
    let mut programme: Option<Programme> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"channel" => {
                    state = State::Channel;
                    channel = Some(Channel {
                        id: attribute(e, b"id").unwrap_or_default(),
                        name: String::new(),
                        icon: String::new(),
                    });
                }
                b"programme" => {
                    state = State::Programme;
                    programme = Some(Programme {
                        channel_id: attribute(e, b"channel").unwrap_or_default(),
                        start: attribute(e, b"start").unwrap_or_default(),
                        stop: attribute(e, b"stop").unwrap_or_default(),
                        title: String::new(),
                        description: String::new(),
                    });
                }
                b"display-name" if state == State::Channel => {
                    state = State::DisplayName;
                    text.clear();
                }
                b"title" if state == State::Programme => {
                    state = State::Title;
                    text.clear();
                }
                b"desc" if state == State::Programme => {
                    state = State::Desc;
                    text.clear();
                }
                b"icon" if state == State::Channel => {
                    if let Some(src) = attribute(e, b"src") {
                        if let Some(ref mut chan) = channel {
                            // First icon wins
                            if chan.icon.is_empty() {
                                chan.icon = src;
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if matches!(state, State::DisplayName | State::Title | State::Desc) {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    text.push_str(&decode_entities(&raw));
                }
            }
            // The reader splits text at entity references and hands them
            // over separately
            Ok(Event::GeneralRef(e)) => {
                if matches!(state, State::DisplayName | State::Title | State::Desc) {
                    let name = String::from_utf8_lossy(e.as_ref());
                    match resolve_entity(&name) {
                        Some(c) => text.push(c),
                        None => {
                            text.push('&');
                            text.push_str(&name);
                            text.push(';');
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"channel" => {
                    if let Some(chan) = channel.take() {
                        channels.push(chan);
                    }
                    state = State::Root;
                }
                b"programme" => {
                    if let Some(prog) = programme.take() {
                        programmes.push(prog);
                    }
                    state = State::Root;
                }
                b"display-name" if state == State::DisplayName => {
                    if let Some(ref mut chan) = channel {
                        // First display-name wins
                        if chan.name.is_empty() {
                            chan.name = text.trim().to_string();
                        }
                    }
                    state = State::Channel;
                }
                b"title" if state == State::Title => {
                    if let Some(ref mut prog) = programme {
                        if prog.title.is_empty() {
                            prog.title = text.trim().to_string();
                        }
                    }
                    state = State::Programme;
                }
                b"desc" if state == State::Desc => {
                    if let Some(ref mut prog) = programme {
                        if prog.description.is_empty() {
                            prog.description = text.trim().to_string();
                        }
                    }
                    state = State::Programme;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                // Drop the in-flight element and keep scanning
                log::debug!("skipping malformed guide element: {}", e);
                channel = None;
                programme = None;
                text.clear();
                state = State::Root;
            }
            _ => {}
        }
    }

    channels.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    // Sort by parsed instant rather than raw string, so mixed offsets and
    // non-fixed-width values still order temporally. Unparseable starts
    // sink to the end.
    programmes.sort_by_cached_key(|p| {
        parse_xmltv_instant(&p.start)
            .map(|t| t.timestamp())
            .unwrap_or(i64::MAX)
    });

    log::debug!(
        "extracted {} channels, {} programmes",
        channels.len(),
        programmes.len()
    );

    GuideData {
        channels,
        programmes,
    }
}

/// Get an attribute value by name, case-insensitively, entity-decoded.
fn attribute(e: &BytesStart, name: &[u8]) -> Option<String> {
    let mut attrs = e.attributes();
    attrs.with_checks(false);
    attrs
        .flatten()
        .find(|a| a.key.as_ref().eq_ignore_ascii_case(name))
        .map(|a| decode_entities(&String::from_utf8_lossy(&a.value)))
}

/// Decode XML entities back to normal characters. Bare ampersands and
/// malformed entities pass through untouched.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        // Entity names are short; anything longer is a bare ampersand
        if let Some(end) = rest.find(';').filter(|&end| end > 1 && end <= 10) {
            if let Some(c) = resolve_entity(&rest[1..end]) {
                out.push(c);
                rest = &rest[end + 1..];
                continue;
            }
        }

        out.push('&');
        rest = &rest[1..];
    }

    out.push_str(rest);
    out
}

/// Resolve one entity name (the part between `&` and `;`) to a character.
fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => entity.strip_prefix('#').and_then(|num| {
            let code = if let Some(hex) = num.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                num.parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_guide() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<tv>
  <channel id="bbc1">
    <display-name>BBC One</display-name>
    <icon src="http://example.com/bbc1.png"/>
  </channel>
  <programme start="20240115120000 +0000" stop="20240115130000 +0000" channel="bbc1">
    <title>News at Noon</title>
    <desc>Daily news broadcast</desc>
  </programme>
</tv>"#;

        let guide = parse(xml);

        assert_eq!(guide.channels.len(), 1);
        assert_eq!(guide.channels[0].id, "bbc1");
        assert_eq!(guide.channels[0].name, "BBC One");
        assert_eq!(guide.channels[0].icon, "http://example.com/bbc1.png");

        assert_eq!(guide.programmes.len(), 1);
        assert_eq!(guide.programmes[0].channel_id, "bbc1");
        assert_eq!(guide.programmes[0].start, "20240115120000 +0000");
        assert_eq!(guide.programmes[0].title, "News at Noon");
        assert_eq!(guide.programmes[0].description, "Daily news broadcast");
    }

    #[test]
    fn test_channels_sorted_by_name_case_insensitive() {
        let xml = r#"<tv>
  <channel id="c"><display-name>zebra TV</display-name></channel>
  <channel id="a"><display-name>Alpha</display-name></channel>
  <channel id="b"><display-name>beta</display-name></channel>
</tv>"#;

        let guide = parse(xml);
        let names: Vec<&str> = guide.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "beta", "zebra TV"]);
    }

    #[test]
    fn test_programmes_sorted_by_start_instant() {
        // Document order scrambled; +0100 noon is 11:00 UTC and must sort
        // before +0000 noon even though it compares lexically later
        let xml = r#"<tv>
  <programme start="20240115140000 +0000" stop="20240115150000 +0000" channel="ch1"><title>C</title></programme>
  <programme start="20240115120000 +0000" stop="20240115130000 +0000" channel="ch1"><title>B</title></programme>
  <programme start="20240115120000 +0100" stop="20240115130000 +0100" channel="ch1"><title>A</title></programme>
</tv>"#;

        let guide = parse(xml);
        let titles: Vec<&str> = guide.programmes.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }

    #[test]
    fn test_unparseable_start_sorts_last() {
        let xml = r#"<tv>
  <programme start="garbage" stop="garbage" channel="ch1"><title>Broken</title></programme>
  <programme start="20240115120000 +0000" stop="20240115130000 +0000" channel="ch1"><title>Fine</title></programme>
</tv>"#;

        let guide = parse(xml);
        assert_eq!(guide.programmes[0].title, "Fine");
        assert_eq!(guide.programmes[1].title, "Broken");
    }

    #[test]
    fn test_missing_icon_and_display_name_yield_empty() {
        let xml = r#"<tv>
  <channel id="bare"></channel>
</tv>"#;

        let guide = parse(xml);
        assert_eq!(guide.channels.len(), 1);
        assert_eq!(guide.channels[0].id, "bare");
        assert_eq!(guide.channels[0].name, "");
        assert_eq!(guide.channels[0].icon, "");
    }

    #[test]
    fn test_missing_attributes_yield_empty() {
        let xml = r#"<tv>
  <programme channel="ch1"><title>No times</title></programme>
</tv>"#;

        let guide = parse(xml);
        assert_eq!(guide.programmes.len(), 1);
        assert_eq!(guide.programmes[0].start, "");
        assert_eq!(guide.programmes[0].stop, "");
    }

    #[test]
    fn test_first_nested_element_wins() {
        let xml = r#"<tv>
  <channel id="multi">
    <display-name>First</display-name>
    <display-name>Second</display-name>
  </channel>
</tv>"#;

        let guide = parse(xml);
        assert_eq!(guide.channels[0].name, "First");
    }

    #[test]
    fn test_entities_decoded() {
        let xml = r#"<tv>
  <programme start="20240115120000 +0000" stop="20240115130000 +0000" channel="ch1">
    <title>Laurel &amp; Hardy</title>
    <desc>&#72;&#x69; there</desc>
  </programme>
</tv>"#;

        let guide = parse(xml);
        assert_eq!(guide.programmes[0].title, "Laurel & Hardy");
        assert_eq!(guide.programmes[0].description, "Hi there");
    }

    #[test]
    fn test_whitespace_around_entities_preserved() {
        let xml = r#"<tv>
  <programme start="20240115120000 +0000" stop="20240115130000 +0000" channel="ch1">
    <title>  Rock &amp; Roll Hour  </title>
  </programme>
</tv>"#;

        let guide = parse(xml);
        // Interior spacing survives; only surrounding whitespace is trimmed
        assert_eq!(guide.programmes[0].title, "Rock & Roll Hour");
    }

    #[test]
    fn test_decode_entities_tolerates_bare_ampersand() {
        assert_eq!(decode_entities("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("a &bogusentity; b"), "a &bogusentity; b");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
    }

    #[test]
    fn test_case_insensitive_attribute_match() {
        let xml = r#"<tv>
  <channel ID="shouty"><display-name>Shouty</display-name></channel>
</tv>"#;

        let guide = parse(xml);
        assert_eq!(guide.channels[0].id, "shouty");
    }

    #[test]
    fn test_unknown_elements_ignored() {
        let xml = r#"<tv>
  <weird><display-name>not a channel</display-name></weird>
  <channel id="ok"><display-name>OK</display-name></channel>
</tv>"#;

        let guide = parse(xml);
        assert_eq!(guide.channels.len(), 1);
        assert_eq!(guide.channels[0].name, "OK");
    }
}
