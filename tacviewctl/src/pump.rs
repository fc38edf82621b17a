//! The per-line drive loop: feed the session, forward touched records to
//! the sink, keep throughput numbers.
//!

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use eyre::Result;
use tracing::{debug, info, warn};

use tacview_engine::{EngineStatus, Outcome, RecordSink, Session};

/// How often we log throughput, seconds.
const LOG_EVERY: f64 = 5.0;

/// Counters for one run.
///
#[derive(Debug, Default)]
pub struct PumpStats {
    pub lines: usize,
    pub objects: usize,
    pub impacts: usize,
    pub skipped: usize,
}

impl fmt::Display for PumpStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines, {} objects, {} impacts, {} skipped",
            self.lines, self.objects, self.impacts, self.skipped
        )
    }
}

/// Glue between a line source, the enrichment session and a sink.
///
pub struct Pump<S: RecordSink> {
    session: Session,
    sink: S,
    stats: PumpStats,
    started: Instant,
    last_log: f64,
}

impl<S: RecordSink> Pump<S> {
    pub fn new(sink: S) -> Self {
        Pump {
            session: Session::new(),
            sink,
            stats: PumpStats::default(),
            started: Instant::now(),
            last_log: 0.0,
        }
    }

    /// Feed one line through the session and forward the result.
    ///
    /// The engine is best-effort: quarantined lines are logged and counted,
    /// they never abort the run.  Sink failures do.
    ///
    pub fn handle(&mut self, line: &str) -> Result<()> {
        self.stats.lines += 1;

        let outcome = match self.session.feed_line(line) {
            Ok(outcome) => outcome,
            Err(EngineStatus::MissingReference) => {
                debug!("update before the reference is complete, skipped");
                self.stats.skipped += 1;
                return Ok(());
            }
            Err(status) => {
                warn!("quarantined line `{}`: {}", line, status);
                self.stats.skipped += 1;
                return Ok(());
            }
        };

        match outcome {
            Outcome::RefUpdated => {
                let re = self.session.reference();
                if re.all_refs && !re.written {
                    let id = self.sink.start_session(re)?;
                    let re = self.session.reference_mut();
                    re.session_id = id;
                    re.written = true;
                    info!("All refs found, session {} started", id);
                }
            }
            Outcome::TimeAdvanced(_) => {
                self.sink.flush()?;
                self.progress();
            }
            Outcome::Updated(tac_id) => {
                if let Some(rec) = self.session.store_mut().get_mut(tac_id) {
                    if !rec.written {
                        self.sink.write_object(rec)?;
                        self.stats.objects += 1;
                    }
                    self.sink.append_event(rec)?;
                }
            }
            Outcome::Removed { tac_id, impact } => {
                let offset = self.session.reference().time_offset;
                if let Some(rec) = self.session.store().get(tac_id) {
                    self.sink.mark_dead(rec)?;
                    if impact {
                        self.sink.write_impact(rec, offset)?;
                        self.stats.impacts += 1;
                    }
                }
            }
            Outcome::Skipped => self.stats.skipped += 1,
        }
        Ok(())
    }

    fn progress(&mut self) {
        let runtime = self.started.elapsed().as_secs_f64();
        if runtime - self.last_log < LOG_EVERY {
            return;
        }
        let ahead = self.session.reference().time_offset - runtime;
        info!(
            "Runtime: {:.2}s - Sec ahead: {:.2} - Lines/sec: {:.1} - Total: {}",
            runtime,
            ahead,
            self.stats.lines as f64 / runtime,
            self.stats.lines
        );
        self.last_log = runtime;
    }

    /// End of stream: flush the sink and report what never found a parent.
    ///
    pub fn finish(mut self) -> Result<PumpStats> {
        self.sink.finish()?;

        let runtime = self.started.elapsed().as_secs_f64();
        info!(
            "{} lines processed in {:.2}s ({:.1} lines/s)",
            self.stats.lines,
            runtime,
            self.stats.lines as f64 / runtime.max(1e-6)
        );

        let mut orphans: BTreeMap<String, usize> = BTreeMap::new();
        for rec in self.session.store().values() {
            if rec.should_have_parent && rec.parent.is_none() {
                let key = rec.dtype.clone().unwrap_or_else(|| "unknown".to_owned());
                *orphans.entry(key).or_default() += 1;
            }
        }
        for (dtype, count) in &orphans {
            info!("{} x {} without a parent", count, dtype);
        }

        Ok(self.stats)
    }
}
