use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LaneletID;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntersectionID(pub usize);

impl fmt::Display for IntersectionID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Intersection #{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IncomingID(pub usize);

impl fmt::Display for IncomingID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Incoming #{}", self.0)
    }
}

/// One approach into an intersection: the lanelets arriving there and where
/// they can go. `left_of` orders the approaches for right-of-way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionIncoming {
    pub id: IncomingID,
    pub incoming_lanelets: BTreeSet<LaneletID>,
    pub successors_left: BTreeSet<LaneletID>,
    pub successors_straight: BTreeSet<LaneletID>,
    pub successors_right: BTreeSet<LaneletID>,
    pub left_of: Option<IncomingID>,
}

impl IntersectionIncoming {
    pub fn new(id: IncomingID, incoming_lanelets: BTreeSet<LaneletID>) -> IntersectionIncoming {
        IntersectionIncoming {
            id,
            incoming_lanelets,
            successors_left: BTreeSet::new(),
            successors_straight: BTreeSet::new(),
            successors_right: BTreeSet::new(),
            left_of: None,
        }
    }
}

/// A junction, structurally: at least two incomings, plus the lanelets crossing
/// through it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub id: IntersectionID,
    pub incomings: Vec<IntersectionIncoming>,
    pub crossings: BTreeSet<LaneletID>,
}

impl Intersection {
    pub fn new(id: IntersectionID, incomings: Vec<IntersectionIncoming>) -> Intersection {
        Intersection {
            id,
            incomings,
            crossings: BTreeSet::new(),
        }
    }

    pub fn incoming(&self, id: IncomingID) -> Option<&IntersectionIncoming> {
        self.incomings.iter().find(|i| i.id == id)
    }

    pub fn incoming_mut(&mut self, id: IncomingID) -> Option<&mut IntersectionIncoming> {
        self.incomings.iter_mut().find(|i| i.id == id)
    }
}
