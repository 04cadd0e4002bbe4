use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use geom::Pt3D;

use crate::{TrafficLightID, TrafficSignID};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneletID(pub usize);

impl fmt::Display for LaneletID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Lanelet #{}", self.0)
    }
}

/// Which boundary of a lanelet, facing the direction of travel.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// One end of a boundary polyline.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BoundaryEnd {
    Start,
    Last,
}

/// A same-row neighbor, tagged with relative travel direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Adjacency {
    pub id: LaneletID,
    pub same_direction: bool,
}

/// Tags describing what kind of lane this is. Some combinations make no sense
/// together (a lanelet can't be both a sidewalk and a highway lane); the
/// verifier flags those.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaneletType {
    Urban,
    Rural,
    Highway,
    AccessRamp,
    ExitRamp,
    BusLane,
    BicycleLane,
    Sidewalk,
    Crosswalk,
    Parking,
    Intersection,
    Unknown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineMarking {
    Solid,
    Dashed,
    BroadSolid,
    BroadDashed,
    Unknown,
}

/// An optional two-point line where vehicles stop, associated with the signs
/// and lights that demand the stop. `start`/`end` are both set or both unset;
/// a single defined endpoint is a violation the repair engine clears.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopLine {
    pub start: Option<Pt3D>,
    pub end: Option<Pt3D>,
    pub line_marking: LineMarking,
    pub traffic_signs: BTreeSet<TrafficSignID>,
    pub traffic_lights: BTreeSet<TrafficLightID>,
}

/// An atomic directed lane segment. The left and right boundaries have the same
/// number of vertices; `center_vertices` is derived from them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lanelet {
    pub id: LaneletID,
    pub left_vertices: Vec<Pt3D>,
    pub right_vertices: Vec<Pt3D>,
    pub center_vertices: Vec<Pt3D>,

    pub predecessors: BTreeSet<LaneletID>,
    pub successors: BTreeSet<LaneletID>,
    pub adj_left: Option<Adjacency>,
    pub adj_right: Option<Adjacency>,

    pub lanelet_type: BTreeSet<LaneletType>,
    pub traffic_signs: BTreeSet<TrafficSignID>,
    pub traffic_lights: BTreeSet<TrafficLightID>,
    pub stop_line: Option<StopLine>,
}

impl Lanelet {
    pub fn new(id: LaneletID, left_vertices: Vec<Pt3D>, right_vertices: Vec<Pt3D>) -> Lanelet {
        let mut lanelet = Lanelet {
            id,
            left_vertices,
            right_vertices,
            center_vertices: Vec::new(),
            predecessors: BTreeSet::new(),
            successors: BTreeSet::new(),
            adj_left: None,
            adj_right: None,
            lanelet_type: BTreeSet::new(),
            traffic_signs: BTreeSet::new(),
            traffic_lights: BTreeSet::new(),
            stop_line: None,
        };
        lanelet.recompute_center_vertices();
        lanelet
    }

    /// The pointwise mean of the two boundaries. Call after any repair that
    /// rewrites boundary geometry.
    pub fn recompute_center_vertices(&mut self) {
        self.center_vertices = self
            .left_vertices
            .iter()
            .zip(self.right_vertices.iter())
            .map(|(l, r)| Pt3D::center(&[*l, *r]))
            .collect();
    }

    pub fn boundary(&self, side: Side) -> &Vec<Pt3D> {
        match side {
            Side::Left => &self.left_vertices,
            Side::Right => &self.right_vertices,
        }
    }

    pub fn boundary_mut(&mut self, side: Side) -> &mut Vec<Pt3D> {
        match side {
            Side::Left => &mut self.left_vertices,
            Side::Right => &mut self.right_vertices,
        }
    }

    pub fn endpoint(&self, side: Side, end: BoundaryEnd) -> Pt3D {
        let pts = self.boundary(side);
        match end {
            BoundaryEnd::Start => pts[0],
            BoundaryEnd::Last => *pts.last().unwrap(),
        }
    }

    pub fn endpoint_mut(&mut self, side: Side, end: BoundaryEnd) -> &mut Pt3D {
        let pts = self.boundary_mut(side);
        match end {
            BoundaryEnd::Start => &mut pts[0],
            BoundaryEnd::Last => pts.last_mut().unwrap(),
        }
    }

    pub fn adj(&self, side: Side) -> Option<Adjacency> {
        match side {
            Side::Left => self.adj_left,
            Side::Right => self.adj_right,
        }
    }

    pub fn set_adj(&mut self, side: Side, adj: Option<Adjacency>) {
        match side {
            Side::Left => self.adj_left = adj,
            Side::Right => self.adj_right = adj,
        }
    }
}
