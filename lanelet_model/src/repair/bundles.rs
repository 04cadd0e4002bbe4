//! Transitive equivalence classes of coincident boundary endpoints. Lanelets
//! don't share vertex storage, so when a repair decides two endpoints are the
//! same physical point, every endpoint already bundled with either of them has
//! to move too -- otherwise repairing a chain of lanelets around one junction
//! would only keep the two most recent participants consistent.

use std::collections::HashMap;

use geom::{HashablePt3D, Pt3D};

use crate::{BoundaryEnd, LaneletID, LaneletNetwork, Side};

/// One boundary endpoint of one lanelet, identified structurally so bundles
/// survive the point itself moving.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VertexSlot {
    pub lanelet: LaneletID,
    pub side: Side,
    pub end: BoundaryEnd,
}

impl VertexSlot {
    pub fn new(lanelet: LaneletID, side: Side, end: BoundaryEnd) -> VertexSlot {
        VertexSlot { lanelet, side, end }
    }
}

#[derive(Default)]
pub struct VertexBundles {
    // Keyed by the current shared coordinate of every member slot.
    bundles: HashMap<HashablePt3D, Vec<VertexSlot>>,
}

impl VertexBundles {
    pub fn new() -> VertexBundles {
        VertexBundles::default()
    }

    /// Declares that two endpoints are the same physical point. Unions their
    /// bundles, moves the shared point to the mean of the two current
    /// positions, and rewrites that point into every member's boundary array.
    pub fn merge(&mut self, network: &mut LaneletNetwork, a: VertexSlot, b: VertexSlot) {
        let pt_a = network.lanelet(a.lanelet).endpoint(a.side, a.end);
        let pt_b = network.lanelet(b.lanelet).endpoint(b.side, b.end);

        let mut members = self.take_bundle(pt_a.to_hashable(), a);
        if pt_b.to_hashable() != pt_a.to_hashable() {
            for slot in self.take_bundle(pt_b.to_hashable(), b) {
                if !members.contains(&slot) {
                    members.push(slot);
                }
            }
        } else if !members.contains(&b) {
            members.push(b);
        }

        // Slots can go stale when a chain merge removes their lanelet.
        members.retain(|slot| network.maybe_lanelet(slot.lanelet).is_some());

        let new_pt = Pt3D::center(&[pt_a, pt_b]);
        for slot in &members {
            *network
                .lanelet_mut(slot.lanelet)
                .endpoint_mut(slot.side, slot.end) = new_pt;
        }
        for slot in &members {
            network.lanelet_mut(slot.lanelet).recompute_center_vertices();
        }

        self.bundles.insert(new_pt.to_hashable(), members);
    }

    fn take_bundle(&mut self, key: HashablePt3D, slot: VertexSlot) -> Vec<VertexSlot> {
        let mut members = self.bundles.remove(&key).unwrap_or_default();
        if !members.contains(&slot) {
            members.push(slot);
        }
        members
    }
}
