//! Query facade composing fetch -> extract -> resolve
//!
//! [`GuideClient`] holds only the per-call provider coordinates; nothing
//! is cached or shared across queries. The batch operations fetch and
//! parse the guide exactly once, shared across every item in the batch.
//!
//! The `resolve_*` free functions do the same resolution against an
//! already-parsed [`GuideData`] with an explicit reference instant; the
//! client methods delegate to them with `Utc::now()`.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::epg::{self, current_and_next, GuideData};
use crate::error::GuideError;
use crate::fetch;
use crate::models::{Channel, ChannelLookup, ChannelSchedule, StreamRecord};

const CHANNEL_NOT_FOUND: &str = "Channel not found";

/// Client for one provider's XMLTV guide.
pub struct GuideClient {
    server: String,
    username: String,
    password: String,
}

impl GuideClient {
    pub fn new(server: &str, username: &str, password: &str) -> Self {
        Self {
            server: server.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn fetch_guide(&self) -> Result<GuideData, GuideError> {
        let xml = fetch::fetch_xmltv(&self.server, &self.username, &self.password)?;
        Ok(epg::parse(&xml))
    }

    /// Resolve one channel by its EPG id. Returns `None` both for an
    /// unknown id and for a failed fetch (logged).
    pub fn resolve_channel(&self, epg_channel_id: &str, tz: Tz) -> Option<ChannelSchedule> {
        match self.fetch_guide() {
            Ok(guide) => resolve_one(&guide, epg_channel_id, Utc::now(), tz),
            Err(e) => {
                log::error!("channel lookup for {} failed: {}", epg_channel_id, e);
                None
            }
        }
    }

    /// Resolve a comma-separated list of EPG channel ids. Unknown ids
    /// yield per-item markers; fetch failures fail the whole batch.
    pub fn resolve_channels(
        &self,
        channel_ids_csv: &str,
        tz: Tz,
    ) -> Result<Vec<ChannelLookup>, GuideError> {
        let guide = self.fetch_guide().inspect_err(|e| {
            log::error!("multi-channel lookup failed: {}", e);
        })?;
        Ok(resolve_many(&guide, channel_ids_csv, Utc::now(), tz))
    }

    /// Full channel listing, sorted by name. No schedule resolution.
    pub fn list_channels(&self) -> Result<Vec<Channel>, GuideError> {
        let guide = self.fetch_guide().inspect_err(|e| {
            log::error!("channel listing failed: {}", e);
        })?;
        Ok(guide.channels)
    }

    /// Resolve schedules for every stream record carrying a known EPG id,
    /// keyed by `stream_id`. Records without an EPG id, or whose id
    /// matches no channel, are omitted.
    pub fn resolve_batch(
        &self,
        records: &[StreamRecord],
        tz: Tz,
    ) -> Result<HashMap<i64, ChannelSchedule>, GuideError> {
        let guide = self.fetch_guide().inspect_err(|e| {
            log::error!("batch schedule lookup failed: {}", e);
        })?;
        Ok(resolve_batch_in(&guide, records, Utc::now(), tz))
    }
}

/// Resolve one channel against parsed guide data.
pub fn resolve_one(
    guide: &GuideData,
    epg_channel_id: &str,
    now: DateTime<Utc>,
    tz: Tz,
) -> Option<ChannelSchedule> {
    // First id match wins when the document carries duplicates
    let channel = guide
        .channels
        .iter()
        .find(|c| c.id == epg_channel_id)?
        .clone();

    let (current, next) = current_and_next(
        guide.programmes.iter().filter(|p| p.channel_id == channel.id),
        now,
        tz,
    );

    Some(ChannelSchedule {
        channel,
        current_program: current,
        next_program: next,
    })
}

/// Resolve a comma-separated id list against parsed guide data,
/// de-duplicated preserving first-seen order.
pub fn resolve_many(
    guide: &GuideData,
    channel_ids_csv: &str,
    now: DateTime<Utc>,
    tz: Tz,
) -> Vec<ChannelLookup> {
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for channel_id in channel_ids_csv.split(',') {
        if !seen.insert(channel_id) {
            continue;
        }
        match resolve_one(guide, channel_id, now, tz) {
            Some(schedule) => results.push(ChannelLookup::Found(schedule)),
            None => results.push(ChannelLookup::NotFound {
                channel_id: channel_id.to_string(),
                error: CHANNEL_NOT_FOUND.to_string(),
            }),
        }
    }

    results
}

/// Resolve stream records against parsed guide data, keyed by stream id.
pub fn resolve_batch_in(
    guide: &GuideData,
    records: &[StreamRecord],
    now: DateTime<Utc>,
    tz: Tz,
) -> HashMap<i64, ChannelSchedule> {
    let mut results = HashMap::new();

    for record in records {
        let Some(epg_channel_id) = record.epg_channel_id.as_deref() else {
            continue;
        };
        if let Some(schedule) = resolve_one(guide, epg_channel_id, now, tz) {
            results.insert(record.stream_id, schedule);
        }
    }

    results
}
