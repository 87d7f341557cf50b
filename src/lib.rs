//! XMLTV EPG query engine for Xtream Codes providers
//!
//! Fetches the provider guide (`{server}/xmltv.php`), extracts channel and
//! programme records from it, and resolves what is airing now and next for
//! a reference instant in a caller-supplied timezone.
//!
//! Stateless by design: every query performs its own fetch and parse, and
//! no data survives the call. Callers that need caching add it themselves.

pub mod epg;
pub mod error;
pub mod fetch;
pub mod guide;
pub mod models;


pub use error::GuideError;
pub use guide::{resolve_batch_in, resolve_many, resolve_one, GuideClient};
pub use models::{
    Channel, ChannelLookup, ChannelSchedule, ProgramView, Programme, StreamRecord,
};
