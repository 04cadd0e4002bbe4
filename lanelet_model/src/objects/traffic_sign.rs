use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use geom::Pt3D;

use crate::{Country, LaneletID};

/// Sign codes with country-specific defaults. Codes are strings because every
/// country catalog defines its own set; only the ones the repair engine knows
/// defaults for are named here.
pub mod sign_codes {
    pub const MAX_SPEED: &str = "max_speed";
    pub const MIN_SPEED: &str = "min_speed";
    pub const CITY_LIMIT: &str = "city_limit";
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrafficSignID(pub usize);

impl fmt::Display for TrafficSignID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TrafficSign #{}", self.0)
    }
}

/// One sign on a post: a code plus its values (a speed limit sign carries the
/// limit, a city limit sign the city name).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficSignElement {
    pub sign_code: String,
    pub additional_values: Vec<String>,
}

impl TrafficSignElement {
    pub fn new(sign_code: &str, additional_values: Vec<String>) -> TrafficSignElement {
        TrafficSignElement {
            sign_code: sign_code.to_string(),
            additional_values,
        }
    }
}

/// A physical sign post, holding at least one sign element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficSign {
    pub id: TrafficSignID,
    pub elements: Vec<TrafficSignElement>,
    pub position: Pt3D,
    /// The lanelets where this sign first becomes effective.
    pub first_occurrence: BTreeSet<LaneletID>,
}

/// The static country-keyed default for a sign element that's missing its
/// value. Speed values are km/h. Returns None for codes with no sensible
/// default (nobody can guess a city name).
pub fn default_additional_value(country: Country, sign_code: &str) -> Option<String> {
    let value = match (country, sign_code) {
        (Country::Germany, sign_codes::MAX_SPEED) => "130",
        (Country::Germany, sign_codes::MIN_SPEED) => "60",
        (Country::Spain, sign_codes::MAX_SPEED) => "120",
        (Country::Spain, sign_codes::MIN_SPEED) => "60",
        (Country::UnitedStates, sign_codes::MAX_SPEED) => "112",
        (Country::UnitedStates, sign_codes::MIN_SPEED) => "64",
        _ => {
            return None;
        }
    };
    Some(value.to_string())
}
