//! Cartesian refresh and velocity derivation for one record.
//!

use tacview_common::Ecef;
use tacview_formats::ObjectRec;

/// Conversion constant between m/s and knots, as the recorder applies it.
pub const KNOT_FACTOR: f64 = 1.94384;

/// Recompute the record's ECEF position from its current geodesic fix and
/// derive the velocity from the displacement since the previous one.
///
/// A zero time gap produces no velocity update, and a computed zero never
/// overwrites an earlier non-zero value.
///
pub fn refresh(rec: &mut ObjectRec) {
    let new_coords = Ecef::from_geodetic(rec.lat, rec.lon, rec.alt);

    if let Some(prev) = rec.cart_coords {
        if rec.secs_since_last_seen > 0.0 {
            let kts = (new_coords.dist(&prev) / rec.secs_since_last_seen) / KNOT_FACTOR;
            if kts != 0.0 {
                rec.velocity_kts = kts;
            }
        }
    }
    rec.cart_coords = Some(new_coords);
}
