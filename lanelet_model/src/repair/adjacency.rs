//! Repairs for left/right neighbor links and the shared geometry they imply.
//! Parallel neighbors must trace the same physical line along their shared
//! boundary; merging and forking neighbors must share their end or start
//! points.

use geom::average;

use crate::repair::bundles::VertexSlot;
use crate::repair::RepairSession;
use crate::{Adjacency, BoundaryEnd, LaneletID, Side};

impl RepairSession<'_> {
    pub(crate) fn repair_non_existent_adjacency(&mut self, id: LaneletID, side: Side) {
        self.network.lanelet_mut(id).set_adj(side, None);
    }

    pub(crate) fn repair_missing_adjacency(
        &mut self,
        id: LaneletID,
        adjacent: LaneletID,
        side: Side,
        same_direction: bool,
    ) {
        self.network.lanelet_mut(id).set_adj(
            side,
            Some(Adjacency {
                id: adjacent,
                same_direction,
            }),
        );
    }

    /// The lanelet and its recorded neighbor on `side` don't share boundary
    /// geometry. Replace both shared boundaries with their pointwise average,
    /// growing the sparser lanelet first so the counts line up.
    pub(crate) fn repair_parallel_adjacency(&mut self, id: LaneletID, side: Side) {
        let Some(lanelet) = self.network.maybe_lanelet(id) else {
            warn!("Can't align the {} neighbor of {}; it's gone", side, id);
            return;
        };
        let Some(link) = lanelet.adj(side) else {
            warn!("{} has no {} neighbor recorded; nothing to align", id, side);
            return;
        };
        let other = link.id;
        if self.network.maybe_lanelet(other).is_none() {
            warn!("Can't align {} with {}; the neighbor is gone", id, other);
            return;
        }
        // An opposite-direction neighbor faces us with the same-named side; a
        // same-direction one with the opposite side.
        let other_side = if link.same_direction {
            side.opposite()
        } else {
            side
        };

        let n_self = self.network.lanelet(id).left_vertices.len();
        let n_other = self.network.lanelet(other).left_vertices.len();
        if n_self < n_other {
            self.resample_lanelet(id, n_other);
        } else if n_other < n_self {
            self.resample_lanelet(other, n_self);
        }

        let mine = self.network.lanelet(id).boundary(side).clone();
        let theirs = self.network.lanelet(other).boundary(other_side).clone();
        let shared = average(&mine, &theirs, !link.same_direction);

        *self.network.lanelet_mut(id).boundary_mut(side) = shared.clone();
        self.network.lanelet_mut(id).recompute_center_vertices();
        let for_other = if link.same_direction {
            shared
        } else {
            shared.into_iter().rev().collect()
        };
        *self.network.lanelet_mut(other).boundary_mut(other_side) = for_other;
        self.network.lanelet_mut(other).recompute_center_vertices();

        let ends = if link.same_direction {
            [
                (BoundaryEnd::Start, BoundaryEnd::Start),
                (BoundaryEnd::Last, BoundaryEnd::Last),
            ]
        } else {
            [
                (BoundaryEnd::Start, BoundaryEnd::Last),
                (BoundaryEnd::Last, BoundaryEnd::Start),
            ]
        };
        for (my_end, their_end) in ends {
            self.bundles.merge(
                self.network,
                VertexSlot::new(id, side, my_end),
                VertexSlot::new(other, other_side, their_end),
            );
        }
    }

    /// Two same-row lanelets converge into one; their final boundary points
    /// must coincide pairwise.
    pub(crate) fn repair_merging_adjacency(&mut self, id: LaneletID, other: LaneletID) {
        self.join_at(id, other, BoundaryEnd::Last);
    }

    /// Two same-row lanelets fork out of one; their first boundary points must
    /// coincide pairwise.
    pub(crate) fn repair_forking_adjacency(&mut self, id: LaneletID, other: LaneletID) {
        self.join_at(id, other, BoundaryEnd::Start);
    }

    fn join_at(&mut self, id: LaneletID, other: LaneletID, end: BoundaryEnd) {
        if self.network.maybe_lanelet(id).is_none() || self.network.maybe_lanelet(other).is_none() {
            warn!("Can't join {} and {}; one is gone", id, other);
            return;
        }
        for side in [Side::Left, Side::Right] {
            self.bundles.merge(
                self.network,
                VertexSlot::new(id, side, end),
                VertexSlot::new(other, side, end),
            );
        }
    }

    /// Resamples both boundaries of one lanelet to `count` vertices each.
    fn resample_lanelet(&mut self, id: LaneletID, count: usize) {
        let lanelet = self.network.lanelet_mut(id);
        lanelet.left_vertices = geom::resample(&lanelet.left_vertices, count);
        lanelet.right_vertices = geom::resample(&lanelet.right_vertices, count);
        lanelet.recompute_center_vertices();
    }
}
