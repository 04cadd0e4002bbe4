//! Geometry for lanelet networks: world-space points, segments, and the polyline
//! operations the repair engine leans on. Everything works on raw point arrays,
//! because mid-repair boundaries are allowed to be degenerate (duplicate points,
//! loops) until the repair finishes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use crate::distance::Distance;
pub use crate::duration::Duration;
pub use crate::line::Line;
pub use crate::polyline::{
    arc_length_positions, average, index_map, insert_vertices, is_self_intersecting,
    polyline_length, project_onto_polyline, resample,
};
pub use crate::pt::{HashablePt3D, Pt3D};

mod distance;
mod duration;
mod line;
mod polyline;
mod pt;

/// Two points closer than this are considered coincident.
pub const EPSILON_DIST: Distance = Distance::const_meters(0.0001);

// Reduce floating point precision, to make potentially serialized geometry
// deterministic and diffable.
pub(crate) fn trim_f64(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

pub(crate) fn serialize_f64<S: Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
    // TODO Better if this had an error message
    if x.is_finite() {
        s.serialize_f64(*x)
    } else {
        Err(serde::ser::Error::custom(format!("bad f64 {}", x)))
    }
}

pub(crate) fn deserialize_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let x = <f64>::deserialize(d)?;
    if x.is_finite() {
        Ok(x)
    } else {
        Err(serde::de::Error::custom(format!("bad f64 {}", x)))
    }
}
