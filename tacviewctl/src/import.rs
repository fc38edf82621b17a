//! Feed a plain-text `.acmi` recording through the pump.
//!

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use eyre::Result;
use tracing::info;

use tacview_engine::RecordSink;

use crate::pump::Pump;

#[tracing::instrument(skip(pump))]
pub fn import_file<S: RecordSink>(path: &Path, pump: &mut Pump<S>) -> Result<()> {
    info!("Reading from {:?}", path);

    let fh = File::open(path)?;
    for line in BufReader::new(fh).lines() {
        pump.handle(&line?)?;
    }
    Ok(())
}
