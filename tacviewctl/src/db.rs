//! DuckDB schema and the sink writing enriched records into it.
//!
//! Objects go in one by one on first sight (we need the surrogate id back),
//! the high-volume positional events are buffered and bulk-inserted through
//! an appender.  At the end of a run the latest event per object is folded
//! back into the object table.
//!

use std::collections::HashMap;

use duckdb::{params, Connection};
use eyre::Result;
use tracing::{debug, info};

use tacview_engine::{RecordSink, Reference};
use tacview_formats::ObjectRec;

const SCHEMA: &str = r##"
CREATE SEQUENCE IF NOT EXISTS session_ids;
CREATE SEQUENCE IF NOT EXISTS object_ids;
CREATE SEQUENCE IF NOT EXISTS impact_ids;

CREATE TABLE IF NOT EXISTS session (
    session_id INTEGER PRIMARY KEY DEFAULT nextval('session_ids'),
    start_time BIGINT UNIQUE,
    datasource VARCHAR,
    author VARCHAR,
    file_version DOUBLE,
    title VARCHAR,
    lat DOUBLE,
    lon DOUBLE,
    client_version VARCHAR,
    status VARCHAR
);

CREATE TABLE IF NOT EXISTS object (
    id INTEGER PRIMARY KEY DEFAULT nextval('object_ids'),
    tac_id BIGINT,
    session_id INTEGER,
    name VARCHAR,
    color VARCHAR,
    country VARCHAR,
    grp VARCHAR,
    pilot VARCHAR,
    type VARCHAR,
    alive BOOLEAN,
    coalition VARCHAR,
    first_seen DOUBLE,
    last_seen DOUBLE,
    lat DOUBLE,
    lon DOUBLE,
    alt DOUBLE,
    roll DOUBLE,
    pitch DOUBLE,
    yaw DOUBLE,
    u_coord DOUBLE,
    v_coord DOUBLE,
    heading DOUBLE,
    velocity_kts DOUBLE,
    impacted INTEGER,
    impacted_dist DOUBLE,
    parent INTEGER,
    parent_dist DOUBLE,
    updates INTEGER,
    can_be_parent BOOLEAN
);

CREATE TABLE IF NOT EXISTS impact (
    id INTEGER PRIMARY KEY DEFAULT nextval('impact_ids'),
    session_id INTEGER,
    killer INTEGER,
    target INTEGER,
    weapon INTEGER,
    time_offset DOUBLE,
    impact_dist DOUBLE
);

CREATE TABLE IF NOT EXISTS event (
    id INTEGER,
    session_id INTEGER,
    last_seen DOUBLE,
    alive BOOLEAN,
    lat DOUBLE,
    lon DOUBLE,
    alt DOUBLE,
    roll DOUBLE,
    pitch DOUBLE,
    yaw DOUBLE,
    u_coord DOUBLE,
    v_coord DOUBLE,
    heading DOUBLE,
    velocity_kts DOUBLE,
    updates INTEGER
);
"##;

const DROP: &str = r##"
DROP TABLE IF EXISTS event;
DROP TABLE IF EXISTS impact;
DROP TABLE IF EXISTS object;
DROP TABLE IF EXISTS session;
DROP SEQUENCE IF EXISTS session_ids;
DROP SEQUENCE IF EXISTS object_ids;
DROP SEQUENCE IF EXISTS impact_ids;
"##;

pub fn create_tables(dbh: &Connection) -> Result<()> {
    dbh.execute_batch(SCHEMA)?;
    info!("All tables created.");
    Ok(())
}

pub fn drop_tables(dbh: &Connection) -> Result<()> {
    dbh.execute_batch(DROP)?;
    info!("All tables dropped.");
    Ok(())
}

/// Collect summary statistics on object and event records.
///
pub fn show_stats(dbh: &Connection) -> Result<()> {
    let (objects, parents, impacts, max_updates, total_updates, events, alive) = dbh.query_row(
        r##"
SELECT COUNT(*),
       COUNT(parent),
       (SELECT COUNT(*) FROM impact),
       COALESCE(MAX(updates), 0),
       CAST(COALESCE(SUM(updates), 0) AS BIGINT),
       (SELECT COUNT(*) FROM event),
       CAST(COALESCE(SUM(CASE WHEN alive THEN 1 ELSE 0 END), 0) AS BIGINT)
FROM object
"##,
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
            ))
        },
    )?;

    println!(
        "Results:\nobjects: {objects}\nparents: {parents}\nimpacts: {impacts}\n\
         max updates: {max_updates}\ntotal updates: {total_updates}\n\
         total events: {events}\ntotal alive: {alive}"
    );
    Ok(())
}

/// One buffered positional event, the bulk of the volume.
#[derive(Debug)]
struct EventRow {
    id: i64,
    session_id: i64,
    last_seen: f64,
    alive: bool,
    lat: f64,
    lon: f64,
    alt: f64,
    roll: f64,
    pitch: f64,
    yaw: f64,
    u_coord: f64,
    v_coord: f64,
    heading: f64,
    velocity_kts: f64,
    updates: i32,
}

/// Sink writing into DuckDB.  Owns the tac_id → surrogate id map used to
/// resolve `parent`/`impacted` references.
///
pub struct DuckSink {
    dbh: Connection,
    ids: HashMap<u64, i64>,
    events: Vec<EventRow>,
    batch_size: usize,
}

impl DuckSink {
    pub fn new(dbh: Connection, batch_size: usize) -> Result<Self> {
        create_tables(&dbh)?;
        Ok(DuckSink {
            dbh,
            ids: HashMap::new(),
            events: Vec::with_capacity(batch_size),
            batch_size,
        })
    }

    fn force_flush(&mut self) -> Result<()> {
        if self.events.is_empty() {
            return Ok(());
        }
        debug!("inserting {} events", self.events.len());

        let mut app = self.dbh.appender("event")?;
        for e in &self.events {
            app.append_row(params![
                e.id,
                e.session_id,
                e.last_seen,
                e.alive,
                e.lat,
                e.lon,
                e.alt,
                e.roll,
                e.pitch,
                e.yaw,
                e.u_coord,
                e.v_coord,
                e.heading,
                e.velocity_kts,
                e.updates
            ])?;
        }
        drop(app);
        self.events.clear();
        Ok(())
    }

    /// Fold the latest event per object back into the object table.
    ///
    fn merge_latest(&self) -> Result<()> {
        self.dbh.execute_batch(
            r##"
UPDATE object SET
    last_seen = e.last_seen, alive = e.alive, lat = e.lat, lon = e.lon,
    alt = e.alt, roll = e.roll, pitch = e.pitch, yaw = e.yaw,
    u_coord = e.u_coord, v_coord = e.v_coord, heading = e.heading,
    velocity_kts = e.velocity_kts, updates = e.updates
FROM (
    SELECT * FROM (
        SELECT *, row_number() OVER (PARTITION BY id ORDER BY updates DESC) AS rn
        FROM event
    ) WHERE rn = 1
) AS e
WHERE object.id = e.id;
"##,
        )?;
        Ok(())
    }

    fn resolve(&self, tac_id: Option<u64>) -> Option<i64> {
        tac_id.and_then(|t| self.ids.get(&t)).copied()
    }
}

impl RecordSink for DuckSink {
    fn start_session(&mut self, re: &Reference) -> Result<i64> {
        let id = self.dbh.query_row(
            r##"
INSERT INTO session (start_time, datasource, author, file_version, title,
                     lat, lon, client_version, status)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING session_id
"##,
            params![
                re.start_time.map(|t| t.timestamp()),
                re.datasource,
                re.author,
                re.file_version,
                re.title,
                re.lat,
                re.lon,
                re.client_version,
                re.status
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn write_object(&mut self, rec: &mut ObjectRec) -> Result<()> {
        // Insert-once: later state reaches the object table through the
        // event stream and the end-of-run merge.
        if rec.written {
            return Ok(());
        }

        let parent = self.resolve(rec.parent);
        let impacted = self.resolve(rec.impacted);
        let parent_dist = (rec.parent_dist >= 0.0).then_some(rec.parent_dist);
        let impacted_dist = (rec.impacted_dist >= 0.0).then_some(rec.impacted_dist);

        let id: i64 = self.dbh.query_row(
            r##"
INSERT INTO object (
    tac_id, session_id, name, color, country, grp, pilot, type,
    alive, coalition, first_seen, last_seen, lat, lon, alt, roll,
    pitch, yaw, u_coord, v_coord, heading, velocity_kts, impacted,
    impacted_dist, parent, parent_dist, updates, can_be_parent
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
        ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING id
"##,
            params![
                rec.tac_id as i64,
                rec.session_id,
                rec.name,
                rec.color,
                rec.country,
                rec.grp,
                rec.pilot,
                rec.dtype,
                rec.alive,
                rec.coalition,
                rec.first_seen,
                rec.last_seen,
                rec.lat,
                rec.lon,
                rec.alt,
                rec.roll,
                rec.pitch,
                rec.yaw,
                rec.u_coord,
                rec.v_coord,
                rec.heading,
                rec.velocity_kts,
                impacted,
                impacted_dist,
                parent,
                parent_dist,
                rec.updates as i32,
                rec.can_be_parent
            ],
            |row| row.get(0),
        )?;
        rec.id = id;
        rec.written = true;
        self.ids.insert(rec.tac_id, id);
        Ok(())
    }

    fn append_event(&mut self, rec: &ObjectRec) -> Result<()> {
        self.events.push(EventRow {
            id: rec.id,
            session_id: rec.session_id,
            last_seen: rec.last_seen,
            alive: rec.alive,
            lat: rec.lat,
            lon: rec.lon,
            alt: rec.alt,
            roll: rec.roll,
            pitch: rec.pitch,
            yaw: rec.yaw,
            u_coord: rec.u_coord,
            v_coord: rec.v_coord,
            heading: rec.heading,
            velocity_kts: rec.velocity_kts,
            updates: rec.updates as i32,
        });
        Ok(())
    }

    fn mark_dead(&mut self, rec: &ObjectRec) -> Result<()> {
        let impacted = self.resolve(rec.impacted);
        let dist = (rec.impacted_dist >= 0.0).then_some(rec.impacted_dist);

        self.dbh.execute(
            "UPDATE object SET alive = false, impacted = ?, impacted_dist = ? WHERE id = ?",
            params![impacted, dist, rec.id],
        )?;
        Ok(())
    }

    fn write_impact(&mut self, rec: &ObjectRec, time_offset: f64) -> Result<()> {
        let killer = self.resolve(rec.parent);
        let target = self.resolve(rec.impacted);
        let dist = (rec.impacted_dist >= 0.0).then_some(rec.impacted_dist);

        self.dbh.execute(
            r##"
INSERT INTO impact (session_id, killer, target, weapon, time_offset, impact_dist)
VALUES (?, ?, ?, ?, ?, ?)
"##,
            params![rec.session_id, killer, target, rec.id, time_offset, dist],
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.events.len() < self.batch_size {
            return Ok(());
        }
        self.force_flush()
    }

    fn finish(&mut self) -> Result<()> {
        self.force_flush()?;
        self.merge_latest()
    }
}
