//! One enrichment session: the reference state and the object store, fed
//! one stream line at a time.
//!

use tracing::{trace, warn};

use tacview_formats::{parse_line, RawLine, Update};

use crate::{find_contact, kinematics, ContactMode, EngineStatus, ObjStore, Reference};

/// What happened to the line that was just fed.
///
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Outcome {
    /// `#` line, clock moved to this offset.
    TimeAdvanced(f64),
    /// Header line absorbed into the reference.
    RefUpdated,
    /// An object was created or updated.
    Updated(u64),
    /// An object died; `impact` says whether a target was found.
    Removed { tac_id: u64, impact: bool },
    /// Tolerated anomaly (removal of an unknown id), nothing changed.
    Skipped,
}

/// Session-scoped enrichment state.  One per recording; dropping it drops
/// the whole store.
///
#[derive(Debug, Default)]
pub struct Session {
    reference: Reference,
    store: ObjStore,
}

impl Session {
    pub fn new() -> Self {
        Session {
            reference: Reference::new(),
            store: ObjStore::new(),
        }
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn reference_mut(&mut self) -> &mut Reference {
        &mut self.reference
    }

    pub fn store(&self) -> &ObjStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ObjStore {
        &mut self.store
    }

    /// Process one line to completion.
    ///
    /// Decoding happens before any state is touched, so a failed line never
    /// leaves a record half-updated.
    ///
    #[tracing::instrument(skip(self, line))]
    pub fn feed_line(&mut self, line: &str) -> Result<Outcome, EngineStatus> {
        match parse_line(line)? {
            RawLine::TimeFrame(offset) => {
                self.reference.advance(offset);
                Ok(Outcome::TimeAdvanced(offset))
            }
            RawLine::Header(pairs) => {
                for (key, value) in pairs {
                    self.reference.absorb(key, value)?;
                }
                Ok(Outcome::RefUpdated)
            }
            RawLine::Removal(tac_id) => self.remove(tac_id),
            RawLine::Update(up) => self.update(up),
        }
    }

    /// Death marker: flip the record, then resolve what it hit.
    ///
    fn remove(&mut self, tac_id: u64) -> Result<Outcome, EngineStatus> {
        let Some(rec) = self.store.get_mut(tac_id) else {
            warn!("removal for unknown object {:x}", tac_id);
            return Ok(Outcome::Skipped);
        };
        rec.alive = false;
        rec.updates += 1;

        let hit = self
            .store
            .get(tac_id)
            .and_then(|rec| find_contact(rec, &self.store, ContactMode::Impact));

        let impact = match hit {
            Some(contact) => {
                if let Some(rec) = self.store.get_mut(tac_id) {
                    if rec.impacted.is_none() {
                        rec.impacted = Some(contact.tac_id);
                        rec.impacted_dist = contact.dist;
                    }
                }
                true
            }
            None => false,
        };

        Ok(Outcome::Removed { tac_id, impact })
    }

    /// Object observation: create or refresh the record, then run the
    /// classification, kinematics and parenting hooks.
    ///
    fn update(&mut self, up: Update) -> Result<Outcome, EngineStatus> {
        if !self.reference.all_refs {
            return Err(EngineStatus::MissingReference);
        }
        let offset = self.reference.time_offset;
        let ref_lat = self.reference.lat.unwrap_or_default();
        let ref_lon = self.reference.lon.unwrap_or_default();
        let session_id = self.reference.session_id;

        let tac_id = up.tac_id;
        let (rec, created) = self.store.get_or_create(tac_id, session_id, offset);
        if !created {
            rec.update_last_seen(offset);
            rec.updates += 1;
        }

        // Positions on the wire are deltas against the reference point,
        // folded to absolute exactly once, here.
        //
        let c = &up.coords;
        if let Some(v) = c.lon {
            rec.lon = v + ref_lon;
        }
        if let Some(v) = c.lat {
            rec.lat = v + ref_lat;
        }
        if let Some(v) = c.alt {
            rec.alt = v;
        }
        if let Some(v) = c.roll {
            rec.roll = v;
        }
        if let Some(v) = c.pitch {
            rec.pitch = v;
        }
        if let Some(v) = c.yaw {
            rec.yaw = v;
        }
        if let Some(v) = c.u_coord {
            rec.u_coord = v;
        }
        if let Some(v) = c.v_coord {
            rec.v_coord = v;
        }
        if let Some(v) = c.heading {
            rec.heading = v;
        }

        for (key, value) in &up.fields {
            rec.apply_kv(key, value);
        }

        if rec.updates == 1 && rec.dtype.is_some() {
            rec.classify();
        }

        kinematics::refresh(rec);

        // Freshly seen child objects get tied to their firing platform.
        //
        let wants_parent = rec.updates == 1 && rec.should_have_parent;
        if wants_parent {
            trace!("looking for the parent of {:x}", tac_id);
            let hit = self
                .store
                .get(tac_id)
                .and_then(|rec| find_contact(rec, &self.store, ContactMode::Parent));
            if let Some(contact) = hit {
                if let Some(rec) = self.store.get_mut(tac_id) {
                    if rec.parent.is_none() {
                        rec.parent = Some(contact.tac_id);
                        rec.parent_dist = contact.dist;
                    }
                }
            }
        }

        Ok(Outcome::Updated(tac_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tacview_formats::{Category, ObjectRec};

    /// A session with the reference at (0, 0) and a complete header set.
    fn session_at_origin() -> Session {
        let mut s = Session::new();
        s.feed_line("0,ReferenceLatitude=0.0").unwrap();
        s.feed_line("0,ReferenceLongitude=0.0").unwrap();
        s.feed_line("0,ReferenceTime=2019-01-01T12:12:01.101Z").unwrap();
        assert!(s.reference().all_refs);
        s
    }

    fn rec(s: &Session, tac_id: u64) -> &ObjectRec {
        s.store().get(tac_id).unwrap()
    }

    #[test]
    fn test_new_object_no_velocity() {
        let mut s = session_at_origin();
        let out = s.feed_line("102,T=1.0|2.0|100").unwrap();
        assert_eq!(Outcome::Updated(0x102), out);

        let r = rec(&s, 0x102);
        assert_eq!(0x102, r.tac_id);
        assert_eq!(2.0, r.lat);
        assert_eq!(1.0, r.lon);
        assert_eq!(100.0, r.alt);
        assert!(r.cart_coords.is_some());
        assert_eq!(0.0, r.velocity_kts);
        assert_eq!(1, r.updates);
        assert_eq!(r.first_seen, r.last_seen);
    }

    #[test]
    fn test_velocity_on_second_sighting() {
        let mut s = session_at_origin();
        s.feed_line("102,T=1.0|2.0|100").unwrap();
        s.feed_line("#1.0").unwrap();
        s.feed_line("102,T=1.0|2.0|200").unwrap();

        let r = rec(&s, 0x102);
        assert_eq!(200.0, r.alt);
        assert_eq!(1.0, r.secs_since_last_seen);
        assert_eq!(2, r.updates);
        // 100 m climb in one second.
        assert!((r.velocity_kts - 51.44).abs() < 0.01);
        assert!(r.last_seen >= r.first_seen);
    }

    #[test]
    fn test_missing_coordinate_left_at_default() {
        let mut s = session_at_origin();
        s.feed_line("103,T=|3.0|50").unwrap();

        let r = rec(&s, 0x103);
        assert_eq!(0.0, r.lon);
        assert_eq!(3.0, r.lat);
        assert_eq!(50.0, r.alt);
    }

    #[test]
    fn test_reference_offsets_are_folded_in() {
        let mut s = Session::new();
        s.feed_line("0,ReferenceLatitude=30.0").unwrap();
        s.feed_line("0,ReferenceLongitude=-114.0").unwrap();
        s.feed_line("0,ReferenceTime=2019-01-01T12:12:01.101Z").unwrap();
        s.feed_line("102,T=1.5|2.5|100").unwrap();

        let r = rec(&s, 0x102);
        assert_eq!(32.5, r.lat);
        assert_eq!(-112.5, r.lon);
    }

    #[test]
    fn test_update_before_reference_fails() {
        let mut s = Session::new();
        assert!(matches!(
            s.feed_line("102,T=1.0|2.0|100"),
            Err(EngineStatus::MissingReference)
        ));
        assert!(s.store().is_empty());
    }

    #[test]
    fn test_malformed_line_does_not_touch_the_store() {
        let mut s = session_at_origin();
        assert!(s.feed_line("102,T=1.0|2.0").is_err());
        assert!(s.store().is_empty());
    }

    #[test]
    fn test_parent_match_within_threshold() {
        let mut s = session_at_origin();
        s.feed_line("a01,T=0|0|1000,Type=Air+FixedWing,Color=Red,Name=Su-27")
            .unwrap();
        s.feed_line("b01,T=0|0|1150,Type=Weapon+Missile,Color=Red")
            .unwrap();

        let w = rec(&s, 0xb01);
        assert_eq!(Category::Weapon, w.category);
        assert_eq!(Some(0xa01), w.parent);
        assert!((w.parent_dist - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_parent_rejected_beyond_threshold() {
        let mut s = session_at_origin();
        s.feed_line("a01,T=0|0|1000,Type=Air+FixedWing,Color=Red")
            .unwrap();
        s.feed_line("b01,T=0|0|1250,Type=Weapon+Missile,Color=Red")
            .unwrap();

        let w = rec(&s, 0xb01);
        assert_eq!(None, w.parent);
        assert_eq!(-1.0, w.parent_dist);
    }

    #[test]
    fn test_parent_looked_up_only_on_first_sight() {
        let mut s = session_at_origin();
        s.feed_line("b01,T=0|0|1150,Type=Weapon+Missile,Color=Red")
            .unwrap();
        // The platform only shows up afterwards.
        s.feed_line("a01,T=0|0|1000,Type=Air+FixedWing,Color=Red")
            .unwrap();
        s.feed_line("#1.0").unwrap();
        s.feed_line("b01,T=0|0|1100").unwrap();

        assert_eq!(None, rec(&s, 0xb01).parent);
    }

    #[test]
    fn test_impact_on_death() {
        let mut s = session_at_origin();
        s.feed_line("a01,T=0|0|1000,Type=Air+FixedWing,Color=Red")
            .unwrap();
        s.feed_line("c01,T=0.001|0|1100,Type=Air+FixedWing,Color=Blue")
            .unwrap();
        s.feed_line("b01,T=0|0|1150,Type=Weapon+Missile,Color=Red")
            .unwrap();

        let out = s.feed_line("-b01").unwrap();
        assert_eq!(
            Outcome::Removed {
                tac_id: 0xb01,
                impact: true
            },
            out
        );

        let w = rec(&s, 0xb01);
        assert!(!w.alive);
        assert_eq!(2, w.updates);
        // Determined against the opposing coalition's air units.
        assert_eq!(Some(0xc01), w.impacted);
        assert!(w.impacted_dist > 0.0);
    }

    #[test]
    fn test_death_without_candidates() {
        let mut s = session_at_origin();
        s.feed_line("b01,T=0|0|1150,Type=Weapon+Missile,Color=Red")
            .unwrap();
        let out = s.feed_line("-b01").unwrap();
        assert_eq!(
            Outcome::Removed {
                tac_id: 0xb01,
                impact: false
            },
            out
        );
        assert!(!rec(&s, 0xb01).alive);
    }

    #[test]
    fn test_removal_of_unknown_object_is_skipped() {
        let mut s = session_at_origin();
        assert_eq!(Outcome::Skipped, s.feed_line("-dead").unwrap());
        assert!(s.store().is_empty());
    }

    #[test]
    fn test_time_advance() {
        let mut s = session_at_origin();
        let out = s.feed_line("#87.2").unwrap();
        assert_eq!(Outcome::TimeAdvanced(87.2), out);
        assert_eq!(87.2, s.reference().time_offset);
    }

    #[test]
    fn test_update_counts_are_monotonic() {
        let mut s = session_at_origin();
        s.feed_line("102,T=1.0|2.0|100").unwrap();
        s.feed_line("#1.0").unwrap();
        s.feed_line("102,T=1.0|2.0|200").unwrap();
        s.feed_line("#2.0").unwrap();
        s.feed_line("102,T=1.0|2.0|300").unwrap();

        let r = rec(&s, 0x102);
        assert_eq!(3, r.updates);
        assert!(r.updates >= 1);
        assert!(r.last_seen >= r.first_seen);
        assert!(r.secs_since_last_seen >= 0.0);
    }

    #[test]
    fn test_descriptor_fields_applied() {
        let mut s = session_at_origin();
        s.feed_line(
            "802,T=6.3596289|5.139203|342.67|||7.3|729234.25|-58312.28|,\
             Type=Ground+Static+Building,Name=FARP,Color=Blue,\
             Coalition=Enemies,Country=us,Group=Static Group",
        )
        .unwrap();

        let r = rec(&s, 0x802);
        assert_eq!(Some("FARP".to_owned()), r.name);
        assert_eq!(Some("Ground+Static+Building".to_owned()), r.dtype);
        assert_eq!(Some("Blue".to_owned()), r.color);
        assert_eq!(Some("us".to_owned()), r.country);
        assert_eq!(Some("Static Group".to_owned()), r.grp);
        assert_eq!(Category::Ground, r.category);
        assert!(r.can_be_parent);
    }

    #[test]
    fn test_object_without_altitude_gets_default() {
        let mut s = session_at_origin();
        s.feed_line("4001,T=4.6361975|6.5404775||||357.8|-347259.72|380887.44|,Type=Ground+Heavy+Armor+Vehicle+Tank,Color=Red")
            .unwrap();
        assert_eq!(1.0, rec(&s, 0x4001).alt);
    }
}
