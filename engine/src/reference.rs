//! Session-wide reference state extracted from the stream headers.
//!

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use crate::EngineStatus;

/// Holds the reference values used as offsets for the whole recording.
///
/// Populated incrementally by the header lines until `all_refs` flips, then
/// only the clock moves (through `advance`).  Every latitude/longitude in
/// the stream is a delta against `lat`/`lon`.
///
#[derive(Clone, Debug, Default)]
pub struct Reference {
    /// Surrogate id assigned by the sink, 0 until assigned.
    pub session_id: i64,
    pub file_version: f64,
    pub title: Option<String>,
    pub datasource: Option<String>,
    pub author: Option<String>,
    pub client_version: Option<String>,
    pub status: Option<String>,
    /// Reference latitude, degrees.
    pub lat: Option<f64>,
    /// Reference longitude, degrees.
    pub lon: Option<f64>,
    /// Recording start, truncated to whole seconds UTC.
    pub start_time: Option<DateTime<Utc>>,
    /// Seconds since the recording origin, moved by `#` lines.
    pub time_offset: f64,
    /// Delta between the two most recent `#` lines.
    pub time_since_last: f64,
    /// True once lat, lon and start_time are all known.
    pub all_refs: bool,
    /// Session row written to the sink.
    pub written: bool,
}

impl Reference {
    pub fn new() -> Self {
        Reference::default()
    }

    /// Move the session clock to a new offset.
    ///
    pub fn advance(&mut self, offset: f64) {
        self.time_since_last = offset - self.time_offset;
        self.time_offset = offset;
    }

    /// Absorb one header key.  Unknown keys are tolerated.
    ///
    pub fn absorb(&mut self, key: &str, value: &str) -> Result<(), EngineStatus> {
        match key {
            "ReferenceLatitude" => self.lat = value.parse().ok(),
            "ReferenceLongitude" => self.lon = value.parse().ok(),
            "ReferenceTime" | "RecordingTime" => {
                self.start_time = Some(parse_reference_time(value)?)
            }
            "DataSource" => self.datasource = Some(value.to_owned()),
            "Title" => self.title = Some(value.to_owned()),
            "Author" => self.author = Some(value.to_owned()),
            "FileVersion" => self.file_version = value.parse().unwrap_or_default(),
            "ClientVersion" => self.client_version = Some(value.to_owned()),
            _ => debug!("ignoring header {}={}", key, value),
        }
        self.all_refs = self.lat.is_some() && self.lon.is_some() && self.start_time.is_some();
        Ok(())
    }
}

/// Timestamps come as ISO-8601 with microseconds and a trailing `Z`;
/// the sub-second part is dropped.
///
fn parse_reference_time(value: &str) -> Result<DateTime<Utc>, EngineStatus> {
    let t = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.fZ")
        .map_err(|_| EngineStatus::BadTimestamp(value.to_owned()))?;
    Ok(DateTime::from_timestamp(t.and_utc().timestamp(), 0).unwrap_or_default())
}
