//! Current/next schedule resolution
//!
//! Single-pass early-exit scan over a start-sorted programme sequence.
//! Interval test is start-inclusive, stop-exclusive. Matching always
//! compares parsed instants; the localized strings are presentation only.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::{localize, parse_xmltv_instant};
use crate::models::{ProgramView, Programme};

/// Find the programme airing at `now` and the one following it.
///
/// Expects the input pre-filtered to a single channel and sorted by start.
/// A programme with an unparseable `start` never matches and is never
/// promoted to next; an unparseable `stop` means its interval never
/// contains `now`.
pub fn current_and_next<'a, I>(
    programmes: I,
    now: DateTime<Utc>,
    tz: Tz,
) -> (Option<ProgramView>, Option<ProgramView>)
where
    I: IntoIterator<Item = &'a Programme>,
{
    let mut iter = programmes.into_iter();

    while let Some(programme) = iter.next() {
        let Some(start) = parse_xmltv_instant(&programme.start) else {
            log::warn!(
                "unparseable start {:?} on channel {}, skipping",
                programme.start,
                programme.channel_id
            );
            continue;
        };

        // Input is time-sorted: the first future programme ends the scan
        if start > now {
            return (None, Some(localized(programme, tz)));
        }

        match parse_xmltv_instant(&programme.stop) {
            Some(stop) if stop > now => {
                let next = iter
                    .find(|p| parse_xmltv_instant(&p.start).is_some())
                    .map(|p| localized(p, tz));
                return (Some(localized(programme, tz)), next);
            }
            Some(_) => {}
            None => {
                log::warn!(
                    "unparseable stop {:?} on channel {}, skipping",
                    programme.stop,
                    programme.channel_id
                );
            }
        }
    }

    (None, None)
}

fn localized(programme: &Programme, tz: Tz) -> ProgramView {
    ProgramView {
        channel_id: programme.channel_id.clone(),
        start: localize(&programme.start, tz),
        stop: localize(&programme.stop, tz),
        title: programme.title.clone(),
        description: programme.description.clone(),
    }
}
