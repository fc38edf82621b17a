//! The sink collaborator: where enriched records end up.
//!

use eyre::Result;

use tacview_formats::ObjectRec;

use crate::Reference;

/// A destination for enriched records.  The engine never persists anything
/// itself; a driver feeds it lines and forwards the touched records here.
///
/// The sink owns the surrogate id space: `start_session` and `write_object`
/// assign ids, and the sink is responsible for mapping the tac_ids stored in
/// `parent`/`impacted` into that space.
///
pub trait RecordSink {
    /// Persist the session row, returns the surrogate session id.
    fn start_session(&mut self, re: &Reference) -> Result<i64>;

    /// Persist a newly seen object: insert the row, assign `rec.id` and
    /// set `rec.written`.  Called once per record; later state reaches the
    /// store through `append_event` and the final `finish` merge.
    fn write_object(&mut self, rec: &mut ObjectRec) -> Result<()>;

    /// Queue one positional event for bulk insertion.
    fn append_event(&mut self, rec: &ObjectRec) -> Result<()>;

    /// The object is gone from the stream.
    fn mark_dead(&mut self, rec: &ObjectRec) -> Result<()>;

    /// A weapon found its target at death time.
    fn write_impact(&mut self, rec: &ObjectRec, time_offset: f64) -> Result<()>;

    /// Write queued events if the batch is worth it.
    fn flush(&mut self) -> Result<()>;

    /// Force out everything buffered, end of stream.
    fn finish(&mut self) -> Result<()>;
}
