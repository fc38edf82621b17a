//! Definition of the ACMI wire format.
//!
//! One recording is a plain-text stream, one record per line.  This crate
//! decodes a single line into its typed form (`RawLine`), defines the
//! per-object state container (`ObjectRec`) and the deterministic
//! classification of an object from its `Type` descriptor (`Category` and
//! the parenting predicates).
//!
//! Decoding is pure: nothing in here touches session state, so a rejected
//! line can never leave a record half-updated.
//!

pub use category::*;
pub use line::*;
pub use rec::*;

mod category;
mod line;
mod rec;

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
