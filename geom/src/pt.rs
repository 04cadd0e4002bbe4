use std::fmt;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::{deserialize_f64, serialize_f64, trim_f64, Distance, EPSILON_DIST};

/// This represents world space, in meters. The z coordinate carries elevation;
/// planar sources just leave it 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pt3D {
    #[serde(serialize_with = "serialize_f64", deserialize_with = "deserialize_f64")]
    x: f64,
    #[serde(serialize_with = "serialize_f64", deserialize_with = "deserialize_f64")]
    y: f64,
    #[serde(serialize_with = "serialize_f64", deserialize_with = "deserialize_f64")]
    z: f64,
}

impl Pt3D {
    pub fn new(x: f64, y: f64, z: f64) -> Pt3D {
        if !x.is_finite() || !y.is_finite() || !z.is_finite() {
            panic!("Bad Pt3D ({}, {}, {})", x, y, z);
        }

        Pt3D {
            x: trim_f64(x),
            y: trim_f64(y),
            z: trim_f64(z),
        }
    }

    /// A point on a planar map, z = 0.
    pub fn planar(x: f64, y: f64) -> Pt3D {
        Pt3D::new(x, y, 0.0)
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn z(self) -> f64 {
        self.z
    }

    pub fn dist_to(self, to: Pt3D) -> Distance {
        Distance::meters(
            ((self.x - to.x).powi(2) + (self.y - to.y).powi(2) + (self.z - to.z).powi(2)).sqrt(),
        )
    }

    pub fn approx_eq(self, other: Pt3D, threshold: Distance) -> bool {
        self.dist_to(other) <= threshold
    }

    /// The componentwise mean of some points. Panics on an empty slice.
    pub fn center(pts: &[Pt3D]) -> Pt3D {
        assert!(!pts.is_empty());
        let mut x = 0.0;
        let mut y = 0.0;
        let mut z = 0.0;
        for pt in pts {
            x += pt.x;
            y += pt.y;
            z += pt.z;
        }
        let len = pts.len() as f64;
        Pt3D::new(x / len, y / len, z / len)
    }

    pub fn offset(self, dx: f64, dy: f64, dz: f64) -> Pt3D {
        Pt3D::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn to_hashable(self) -> HashablePt3D {
        HashablePt3D {
            x_nan: NotNan::new(self.x).unwrap(),
            y_nan: NotNan::new(self.y).unwrap(),
            z_nan: NotNan::new(self.z).unwrap(),
        }
    }
}

impl fmt::Display for Pt3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt3D({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A hashable key for a point's coordinates. Raw coordinates are already
/// precision-trimmed, so points that're EPSILON_DIST-coincident after repair
/// wind up with equal keys.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HashablePt3D {
    x_nan: NotNan<f64>,
    y_nan: NotNan<f64>,
    z_nan: NotNan<f64>,
}

impl HashablePt3D {
    pub fn to_pt3d(self) -> Pt3D {
        Pt3D::new(
            self.x_nan.into_inner(),
            self.y_nan.into_inner(),
            self.z_nan.into_inner(),
        )
    }
}

impl From<Pt3D> for HashablePt3D {
    fn from(pt: Pt3D) -> Self {
        pt.to_hashable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_componentwise() {
        let pts = vec![Pt3D::new(0.0, 0.0, 0.0), Pt3D::new(2.0, 4.0, 6.0)];
        assert_eq!(Pt3D::center(&pts), Pt3D::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn hashable_round_trips() {
        let pt = Pt3D::new(1.2345, -9.8, 0.5);
        assert_eq!(pt.to_hashable().to_pt3d(), pt);
    }

    #[test]
    fn dist_includes_elevation() {
        let a = Pt3D::new(0.0, 0.0, 0.0);
        let b = Pt3D::new(0.0, 3.0, 4.0);
        assert_eq!(a.dist_to(b), Distance::meters(5.0));
        assert!(a.approx_eq(a.offset(0.0, EPSILON_DIST.inner_meters() / 2.0, 0.0), EPSILON_DIST));
    }
}
