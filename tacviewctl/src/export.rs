//! Export the object table as CSV.
//!

use std::fs;
use std::path::Path;

use csv::WriterBuilder;
use duckdb::Connection;
use eyre::Result;
use serde::Serialize;
use tracing::trace;

/// The exported view of an enriched object.
///
#[derive(Debug, Serialize)]
struct ObjectRow {
    id: i64,
    session_id: i64,
    tac_id: i64,
    name: Option<String>,
    color: Option<String>,
    #[serde(rename = "type")]
    dtype: Option<String>,
    pilot: Option<String>,
    grp: Option<String>,
    coalition: Option<String>,
    first_seen: f64,
    last_seen: f64,
    lat: f64,
    lon: f64,
    alt: f64,
    velocity_kts: f64,
    parent: Option<i64>,
    parent_dist: Option<f64>,
    impacted: Option<i64>,
    impacted_dist: Option<f64>,
    updates: i32,
    alive: bool,
}

#[tracing::instrument(skip(dbh))]
pub fn export_objects(dbh: &Connection, output: Option<&Path>) -> Result<usize> {
    trace!("Generating output…");

    let mut stmt = dbh.prepare(
        r##"
SELECT id, session_id, tac_id, name, color, type, pilot, grp, coalition,
       first_seen, last_seen, lat, lon, alt, velocity_kts,
       parent, parent_dist, impacted, impacted_dist, updates, alive
FROM object
ORDER BY id
"##,
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ObjectRow {
            id: row.get(0)?,
            session_id: row.get(1)?,
            tac_id: row.get(2)?,
            name: row.get(3)?,
            color: row.get(4)?,
            dtype: row.get(5)?,
            pilot: row.get(6)?,
            grp: row.get(7)?,
            coalition: row.get(8)?,
            first_seen: row.get(9)?,
            last_seen: row.get(10)?,
            lat: row.get(11)?,
            lon: row.get(12)?,
            alt: row.get(13)?,
            velocity_kts: row.get(14)?,
            parent: row.get(15)?,
            parent_dist: row.get(16)?,
            impacted: row.get(17)?,
            impacted_dist: row.get(18)?,
            updates: row.get(19)?,
            alive: row.get(20)?,
        })
    })?;

    // Prepare the writer
    //
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(vec![]);

    let mut count = 0usize;
    for row in rows {
        wtr.serialize(row?)?;
        count += 1;
    }

    // Output final csv
    //
    let data = String::from_utf8(wtr.into_inner()?)?;
    match output {
        Some(path) => fs::write(path, data)?,
        None => print!("{}", data),
    }
    Ok(count)
}
