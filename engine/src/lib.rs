//! Library implementing the stream enrichment engine.
//!
//! This is a *synchronous* engine.  A `Session` owns the reference state and
//! the object store for one recording; every line of the stream is fed to it
//! in arrival order and processed to completion before the next one.  The
//! surrounding program (network client or file reader) may be async, the
//! enrichment itself never suspends.
//!
//! Per update line the session folds the reference offsets into the
//! geodesic position, refreshes the cartesian coordinates and the velocity,
//! and for newly seen child objects (weapons, decoys, …) searches the store
//! for the closest eligible firing platform.  On a removal marker the same
//! search runs in impact mode against the opposing coalition's air units.
//!
//! Enriched records are handed to a [`RecordSink`] by the caller; the engine
//! itself never persists anything.
//!

pub use contact::*;
pub use error::*;
pub use kinematics::*;
pub use reference::*;
pub use session::*;
pub use sink::*;
pub use store::*;

mod contact;
mod error;
mod kinematics;
mod reference;
mod session;
mod sink;
mod store;

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
