//! A road network at lane-level granularity ("lanelets": directed lane segments
//! bounded by left/right polylines, with connectivity and regulatory-element
//! references), plus a repair engine that restores one violated
//! well-formedness rule at a time while disturbing as little else as possible.
//!
//! The verifier that decides *which* rules are violated lives elsewhere; this
//! crate only consumes its `(rule, location)` reports, expressed as
//! [`RepairAction`] values handed to a [`RepairSession`].

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod map_name;
mod network;
mod objects;
pub mod repair;

pub use crate::map_name::{Country, MapName};
pub use crate::network::LaneletNetwork;
pub use crate::objects::intersection::{
    IncomingID, Intersection, IntersectionID, IntersectionIncoming,
};
pub use crate::objects::lanelet::{
    Adjacency, BoundaryEnd, Lanelet, LaneletID, LaneletType, LineMarking, Side, StopLine,
};
pub use crate::objects::traffic_light::{
    default_cycle, CycleElement, TrafficLight, TrafficLightDirection, TrafficLightID,
    TrafficLightState, DEFAULT_CYCLE_DURATION,
};
pub use crate::objects::traffic_sign::{
    default_additional_value, sign_codes, TrafficSign, TrafficSignElement, TrafficSignID,
};
pub use crate::repair::{ElementKind, RepairAction, RepairSession};
