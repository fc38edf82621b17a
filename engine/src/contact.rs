//! Nearest-contact search: which platform fired this weapon, which enemy
//! did it hit.
//!
//! Candidates are filtered by parenting capability, coalition color and
//! recency, then the closest one by ECEF distance wins.  The filter fills a
//! pair of parallel buffers (ids and points) so the distance kernel runs in
//! one pass without per-candidate allocations.
//!

use tracing::{debug, trace};

use tacview_formats::ObjectRec;

use crate::ObjStore;

/// Parent candidates further away than this are rejected, meters.
const PARENT_MAX_DIST: f64 = 200.0;

/// How far back a candidate's last sighting may lie, seconds.
const RECENT_WINDOW: f64 = 2.5;

/// The two eligibility modes of the search.
///
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContactMode {
    /// Who did this weapon hit (on a removal marker).
    Impact,
    /// Who fired this object (on first sight).
    Parent,
}

/// A successful association.
///
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// Tacview id of the matched record.
    pub tac_id: u64,
    /// ECEF meters between subject and match.
    pub dist: f64,
}

/// Find the nearest eligible contact for `rec` in `store`.
///
pub fn find_contact(rec: &ObjectRec, store: &ObjStore, mode: ContactMode) -> Option<Contact> {
    // In impact mode only weapons are worth resolving.
    if mode == ContactMode::Impact && !(rec.should_have_parent && rec.category.is_weapon()) {
        return None;
    }
    let origin = rec.cart_coords?;

    let colors = accepted_colors(rec, mode);
    if colors.is_empty() {
        return None;
    }

    debug!(
        "looking for {:?} of {:x} ({:?}-{:?})",
        mode, rec.tac_id, rec.name, rec.dtype
    );

    let mut ids = Vec::new();
    let mut points = Vec::new();

    for near in store.values() {
        if !near.can_be_parent || near.tac_id == rec.tac_id {
            continue;
        }
        match near.color.as_deref() {
            Some(c) if colors.contains(&c) => (),
            _ => continue,
        }
        if mode == ContactMode::Impact && !near.category.is_air() {
            continue;
        }
        // Stale candidates are out, except ground units that are still
        // alive: a parked SAM site does not move between sightings.
        let recent = near.last_seen >= rec.last_seen - RECENT_WINDOW;
        let parked = near.category.is_ground() && near.alive;
        if !recent && !parked {
            continue;
        }
        let point = match near.cart_coords {
            Some(p) => p,
            None => continue,
        };
        ids.push(near.tac_id);
        points.push(point);
    }

    let (idx, dist) = origin.nearest(&points)?;
    trace!("closest of {} candidates: {:x} at {}m", ids.len(), ids[idx], dist);

    if mode == ContactMode::Parent && dist > PARENT_MAX_DIST {
        debug!(
            "rejecting parent {:x} for {:x}: {}m away, {} checked",
            ids[idx],
            rec.tac_id,
            dist,
            ids.len()
        );
        return None;
    }

    Some(Contact {
        tac_id: ids[idx],
        dist,
    })
}

/// Which candidate colors the subject accepts.
///
/// Impacts are resolved against the opposing coalition; parents must share
/// the subject's color, with Violet treated as neutral and allowed to match
/// anyone.
///
fn accepted_colors<'a>(rec: &'a ObjectRec, mode: ContactMode) -> Vec<&'a str> {
    match mode {
        ContactMode::Impact => match rec.color.as_deref() {
            Some("Blue") => vec!["Red"],
            _ => vec!["Blue"],
        },
        ContactMode::Parent => match rec.color.as_deref() {
            Some("Violet") => vec!["Red", "Blue", "Grey"],
            Some(c) => vec![c],
            None => vec![],
        },
    }
}
