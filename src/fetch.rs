//! Document fetcher for the provider's XMLTV endpoint
//!
//! One GET per call, no retries. Cancellation and retry policy belong to
//! the caller.

use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;

use crate::error::GuideError;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const READ_TIMEOUT_SECS: u64 = 120;
const USER_AGENT: &str = "XtreamEpg/0.2";

fn create_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(READ_TIMEOUT_SECS)))
        .timeout_connect(Some(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
        .build()
        .new_agent()
}

/// Retrieve the raw guide document from `{server}/xmltv.php`.
///
/// Transport errors and non-success statuses propagate as [`GuideError`].
pub fn fetch_xmltv(server: &str, username: &str, password: &str) -> Result<String, GuideError> {
    let url = format!(
        "{}/xmltv.php?username={}&password={}",
        server.trim_end_matches('/'),
        username,
        password
    );

    let response = create_agent()
        .get(&url)
        .header("User-Agent", USER_AGENT)
        .call()?;

    let mut raw = Vec::new();
    response.into_body().into_reader().read_to_end(&mut raw)?;

    // Providers often gzip the guide regardless of Accept-Encoding.
    if raw.starts_with(&[0x1f, 0x8b]) {
        let mut xml = String::new();
        GzDecoder::new(raw.as_slice()).read_to_string(&mut xml)?;
        Ok(xml)
    } else {
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}
