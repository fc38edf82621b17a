//! This library shares common code amongst all tacview-rs crates.
//!
//! Here live the geodesic to Earth-Centered-Earth-Fixed conversion with its
//! distance kernels, and the `tracing` initialisation used by the binaries.
//!

mod cartesian;
mod logging;

pub use cartesian::*;
pub use logging::*;

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
