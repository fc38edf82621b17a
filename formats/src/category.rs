//! Deterministic classification of a tracked object from its `Type` string.
//!

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// `Type` values that denote a weapon.  Matched by equality.
const WEAPON_TYPES: [&str; 3] = ["Weapon+Missile", "Weapon+Bomb", "Projectile+Shell"];

/// `Type` values that denote a ground unit.  Matched by equality.
const GROUND_TYPES: [&str; 5] = [
    "Ground+AntiAircraft",
    "Ground+Heavy+Armor+Vehicle+Tank",
    "Ground+Vehicle",
    "Ground+Static+Building",
    "Ground+Light+Human+Infantry",
];

/// `Type` values that denote an air unit.  Matched by equality.
const AIR_TYPES: [&str; 2] = ["Air+FixedWing", "Air+Rotorcraft"];

/// Substrings excluding an object from ever being a firing platform.
const NEVER_PARENT: [&str; 5] = [
    "Decoy",
    "Misc",
    "Weapon",
    "Projectile",
    "Ground+Light+Human+Air+Parachutist",
];

/// Substrings marking an object as fired/deployed by something else.
const CHILD_MARKS: [&str; 5] = ["Weapon", "Projectile", "Decoy", "Container", "Flare"];

/// What kind of thing an object is.  The three interesting kinds are
/// mutually exclusive by construction; everything else is `Other`.
///
#[derive(
    Copy, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display, EnumString,
)]
pub enum Category {
    Weapon,
    Ground,
    Air,
    #[default]
    Other,
}

impl Category {
    /// Classify a `Type` descriptor.  The weapon test comes first and cuts
    /// off the rest.
    ///
    pub fn from_type(dtype: &str) -> Self {
        if WEAPON_TYPES.contains(&dtype) {
            Category::Weapon
        } else if GROUND_TYPES.contains(&dtype) {
            Category::Ground
        } else if AIR_TYPES.contains(&dtype) {
            Category::Air
        } else {
            Category::Other
        }
    }

    #[inline]
    pub fn is_weapon(self) -> bool {
        self == Category::Weapon
    }

    #[inline]
    pub fn is_ground(self) -> bool {
        self == Category::Ground
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self == Category::Air
    }
}

/// Can this object have fired or deployed something?  Substring containment,
/// not equality.  A weapon never qualifies.
///
pub fn can_be_parent(dtype: &str) -> bool {
    !NEVER_PARENT.iter().any(|t| dtype.contains(t))
}

/// Should this object be associated with a firing platform?
///
pub fn should_have_parent(dtype: &str) -> bool {
    CHILD_MARKS.iter().any(|t| dtype.contains(t))
}
