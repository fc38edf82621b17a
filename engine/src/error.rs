//! Error module.
//!

use thiserror::Error;

use tacview_formats::DecodeError;

/// Everything the enrichment session can report back to its driver.
///
#[derive(Debug, Error)]
pub enum EngineStatus {
    #[error("line could not be decoded: {0}")]
    Decode(#[from] DecodeError),
    #[error("update received before the reference was complete")]
    MissingReference,
    #[error("bad reference timestamp `{0}`")]
    BadTimestamp(String),
}
