//! The per-object state container and its field-update operations.
//!

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use strum::EnumString;
use tracing::debug;

use tacview_common::Ecef;

use crate::category::{can_be_parent, should_have_parent, Category};

/// Stream keys we map to typed slots.  Descriptor keys are matched
/// case-sensitively as they appear on the wire; the coordinate keys use the
/// short names of the `T=` table.
///
#[derive(Copy, Clone, Debug, Eq, PartialEq, EnumString)]
pub enum Key {
    Name,
    Type,
    Color,
    Country,
    Coalition,
    Pilot,
    Group,
    #[strum(serialize = "lon")]
    Lon,
    #[strum(serialize = "lat")]
    Lat,
    #[strum(serialize = "alt")]
    Alt,
    #[strum(serialize = "roll")]
    Roll,
    #[strum(serialize = "pitch")]
    Pitch,
    #[strum(serialize = "yaw")]
    Yaw,
    #[strum(serialize = "u_coord")]
    UCoord,
    #[strum(serialize = "v_coord")]
    VCoord,
    #[strum(serialize = "heading")]
    Heading,
}

/// One tracked entity.
///
/// Created on first sight of a Tacview id, then mutated on every later
/// observation of the same id.  `lat`/`lon` are absolute after the caller
/// folds in the reference offsets; `cart_coords` always mirrors the current
/// geodesic position once the kinematics pass has run.
///
#[derive(Clone, Debug, Serialize)]
pub struct ObjectRec {
    /// Hex id from the stream.
    pub tac_id: u64,
    /// Surrogate id assigned by the sink, 0 until assigned.
    pub id: i64,
    pub session_id: i64,

    pub first_seen: f64,
    pub last_seen: f64,
    pub secs_since_last_seen: f64,
    pub updates: u32,

    pub name: Option<String>,
    #[serde(rename = "type")]
    pub dtype: Option<String>,
    pub color: Option<String>,
    pub country: Option<String>,
    pub coalition: Option<String>,
    pub pilot: Option<String>,
    /// The stream's `Group` field.
    pub grp: Option<String>,

    pub lat: f64,
    pub lon: f64,
    /// Ships come without an altitude, 1.0 keeps them sorting sanely.
    pub alt: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub u_coord: f64,
    pub v_coord: f64,
    pub heading: f64,
    #[serde(skip)]
    pub cart_coords: Option<Ecef>,
    pub velocity_kts: f64,

    pub alive: bool,
    /// Written to the sink at least once.
    pub written: bool,
    pub category: Category,
    pub can_be_parent: bool,
    pub should_have_parent: bool,

    /// Tacview id of the firing platform, once determined.
    pub parent: Option<u64>,
    /// Meters to the parent at association time, -1 while unset.
    pub parent_dist: f64,
    /// Tacview id of the struck object, determined at death.
    pub impacted: Option<u64>,
    pub impacted_dist: f64,

    /// Unrecognized stream keys, kept verbatim.
    #[serde(skip)]
    pub extra: BTreeMap<String, String>,
}

impl ObjectRec {
    pub fn new(tac_id: u64, session_id: i64, seen: f64) -> Self {
        ObjectRec {
            tac_id,
            id: 0,
            session_id,
            first_seen: seen,
            last_seen: seen,
            secs_since_last_seen: 0.0,
            updates: 1,
            name: None,
            dtype: None,
            color: None,
            country: None,
            coalition: None,
            pilot: None,
            grp: None,
            lat: 0.0,
            lon: 0.0,
            alt: 1.0,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            u_coord: 0.0,
            v_coord: 0.0,
            heading: 0.0,
            cart_coords: None,
            velocity_kts: 0.0,
            alive: true,
            written: false,
            category: Category::Other,
            can_be_parent: false,
            should_have_parent: false,
            parent: None,
            parent_dist: -1.0,
            impacted: None,
            impacted_dist: -1.0,
            extra: BTreeMap::new(),
        }
    }

    /// Register a new observation time.
    ///
    pub fn update_last_seen(&mut self, offset: f64) {
        self.secs_since_last_seen = offset - self.last_seen;
        self.last_seen = offset;
    }

    /// Apply one `KEY=VALUE` pair from the stream.  Recognized keys go to
    /// their typed slot, everything else lands in `extra`.  Never fails:
    /// a bad float for a coordinate key is kept in `extra` instead.
    ///
    pub fn apply_kv(&mut self, key: &str, value: &str) {
        let slot = match Key::from_str(key) {
            Ok(k) => k,
            Err(_) => {
                debug!("unknown key {}={}", key, value);
                self.extra.insert(key.to_owned(), value.to_owned());
                return;
            }
        };

        match slot {
            Key::Name => self.name = Some(value.to_owned()),
            Key::Type => self.dtype = Some(value.to_owned()),
            Key::Color => self.color = Some(value.to_owned()),
            Key::Country => self.country = Some(value.to_owned()),
            Key::Coalition => self.coalition = Some(value.to_owned()),
            Key::Pilot => self.pilot = Some(value.to_owned()),
            Key::Group => self.grp = Some(value.to_owned()),
            _ => match value.parse::<f64>() {
                Ok(v) => match slot {
                    Key::Lon => self.lon = v,
                    Key::Lat => self.lat = v,
                    Key::Alt => self.alt = v,
                    Key::Roll => self.roll = v,
                    Key::Pitch => self.pitch = v,
                    Key::Yaw => self.yaw = v,
                    Key::UCoord => self.u_coord = v,
                    Key::VCoord => self.v_coord = v,
                    Key::Heading => self.heading = v,
                    _ => (),
                },
                Err(_) => {
                    self.extra.insert(key.to_owned(), value.to_owned());
                }
            },
        }
    }

    /// Derive category and parenting flags from the `Type` descriptor.
    /// Run once, when the record is first seen with a known type.
    ///
    pub fn classify(&mut self) {
        let dtype = match self.dtype.as_deref() {
            Some(t) => t,
            None => return,
        };
        self.category = Category::from_type(dtype);

        // A weapon is never a parent and always wants one.
        if self.category.is_weapon() {
            self.can_be_parent = false;
            self.should_have_parent = true;
        } else {
            self.can_be_parent = can_be_parent(dtype);
            self.should_have_parent = should_have_parent(dtype);
        }
    }
}
