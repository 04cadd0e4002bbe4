use std::fmt;

use serde::{Deserialize, Serialize};

use geom::{Duration, Pt3D};

use crate::Country;

/// Reset value for a cycle element whose duration is non-positive.
pub const DEFAULT_CYCLE_DURATION: Duration = Duration::const_seconds(30.0);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrafficLightID(pub usize);

impl fmt::Display for TrafficLightID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TrafficLight #{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrafficLightState {
    Red,
    RedYellow,
    Yellow,
    Green,
    Inactive,
}

/// Which turning movements the light controls.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TrafficLightDirection {
    Right,
    Straight,
    Left,
    LeftStraight,
    StraightRight,
    LeftRight,
    All,
}

/// One step of a light's cycle: show `state` for `duration`. A state appears at
/// most once per cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleElement {
    pub state: TrafficLightState,
    pub duration: Duration,
}

impl CycleElement {
    pub fn new(state: TrafficLightState, duration: Duration) -> CycleElement {
        CycleElement { state, duration }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficLight {
    pub id: TrafficLightID,
    pub position: Pt3D,
    pub direction: TrafficLightDirection,
    pub cycle: Vec<CycleElement>,
}

/// The replacement cycle for a light whose state combination is invalid.
/// Germany runs a red-yellow phase before green; the others go straight from
/// red to green.
pub fn default_cycle(country: Country) -> Vec<CycleElement> {
    match country {
        Country::Germany => vec![
            CycleElement::new(TrafficLightState::Red, Duration::seconds(60.0)),
            CycleElement::new(TrafficLightState::RedYellow, Duration::seconds(10.0)),
            CycleElement::new(TrafficLightState::Green, Duration::seconds(60.0)),
            CycleElement::new(TrafficLightState::Yellow, Duration::seconds(10.0)),
        ],
        Country::Spain | Country::UnitedStates => vec![
            CycleElement::new(TrafficLightState::Red, Duration::seconds(60.0)),
            CycleElement::new(TrafficLightState::Green, Duration::seconds(60.0)),
            CycleElement::new(TrafficLightState::Yellow, Duration::seconds(10.0)),
        ],
    }
}
