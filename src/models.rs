//! Guide records exchanged with the request-routing layer
//!
//! Output types serialize camelCase to match the addon wire contract
//! (`channelId`, `currentProgram`, ...). Everything here is rebuilt on
//! every query and dropped when the call returns.

use serde::{Deserialize, Serialize};

/// One broadcastable channel from the guide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    /// Stable id used to correlate with programmes.
    pub id: String,
    /// Display name, used for sorting and presentation only.
    pub name: String,
    /// Logo URL, empty string when the guide carries none.
    pub icon: String,
}

/// One scheduled broadcast entry, timestamps in the source encoding
/// (`YYYYMMDDHHmmss +HHMM`).
#[derive(Debug, Clone, PartialEq)]
pub struct Programme {
    /// Weak reference to a [`Channel::id`]; orphans are valid and simply
    /// never matched.
    pub channel_id: String,
    pub start: String,
    pub stop: String,
    pub title: String,
    pub description: String,
}

/// A programme selected as current or next, with `start`/`stop` rewritten
/// into a human-readable string localized to the requested timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramView {
    pub channel_id: String,
    pub start: String,
    pub stop: String,
    pub title: String,
    pub description: String,
}

/// Resolved schedule for one channel. Absent directions serialize as
/// explicit `null`s.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSchedule {
    pub channel: Channel,
    pub current_program: Option<ProgramView>,
    pub next_program: Option<ProgramView>,
}

/// Per-identifier outcome of a multi-channel lookup. A miss is a marker
/// item, not a batch failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChannelLookup {
    Found(ChannelSchedule),
    #[serde(rename_all = "camelCase")]
    NotFound { channel_id: String, error: String },
}

/// Stream listing entry from the provider, as consumed by the
/// batch-by-stream-id operation.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamRecord {
    pub stream_id: i64,
    #[serde(default)]
    pub epg_channel_id: Option<String>,
}
