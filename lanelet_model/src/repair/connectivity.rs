//! Repairs for predecessor/successor edges: dangling references, missing
//! reciprocal references, and end-to-start gaps between connected lanelets.

use geom::Distance;

use crate::repair::bundles::VertexSlot;
use crate::repair::RepairSession;
use crate::{BoundaryEnd, LaneletID, Side};

// A connection gap wider than this on the nearer boundary, or this on average,
// is a false edge rather than sloppy geometry.
const FALSE_EDGE_MIN_GAP: Distance = Distance::const_meters(2.0);
const FALSE_EDGE_MEAN_GAP: Distance = Distance::const_meters(4.0);

impl RepairSession<'_> {
    pub(crate) fn repair_non_existent_predecessor(&mut self, id: LaneletID, pred: LaneletID) {
        self.network.lanelet_mut(id).predecessors.remove(&pred);
    }

    pub(crate) fn repair_non_existent_successor(&mut self, id: LaneletID, succ: LaneletID) {
        self.network.lanelet_mut(id).successors.remove(&succ);
    }

    /// `pred` flows into `id` geometrically but doesn't appear in `id`'s
    /// predecessor set yet.
    pub(crate) fn repair_missing_predecessor(&mut self, id: LaneletID, pred: LaneletID) {
        self.network.lanelet_mut(id).predecessors.insert(pred);
    }

    pub(crate) fn repair_missing_successor(&mut self, id: LaneletID, succ: LaneletID) {
        self.network.lanelet_mut(id).successors.insert(succ);
    }

    pub(crate) fn repair_predecessor_connection(&mut self, id: LaneletID, pred: LaneletID) {
        self.repair_connection(pred, id);
    }

    pub(crate) fn repair_successor_connection(&mut self, id: LaneletID, succ: LaneletID) {
        self.repair_connection(id, succ);
    }

    /// Two lanelets reference each other with contradictory directions. There's
    /// no mechanical fix that doesn't guess which one is wrong, so this only
    /// flags it for a human.
    pub(crate) fn repair_conflicting_directions(&mut self, id: LaneletID, other: LaneletID) {
        warn!(
            "{} and {} disagree about their relative travel direction; leaving both alone",
            id, other
        );
    }

    /// `from` flows into `to`. If the end-to-start gap is small, snap the
    /// endpoints together (transitively, through the vertex bundles). If it's
    /// wide, the edge itself is wrong and gets severed instead.
    fn repair_connection(&mut self, from: LaneletID, to: LaneletID) {
        let (Some(f), Some(t)) = (
            self.network.maybe_lanelet(from),
            self.network.maybe_lanelet(to),
        ) else {
            warn!("Can't repair the connection between {} and {}; one is gone", from, to);
            return;
        };

        let d_left = f
            .endpoint(Side::Left, BoundaryEnd::Last)
            .dist_to(t.endpoint(Side::Left, BoundaryEnd::Start));
        let d_right = f
            .endpoint(Side::Right, BoundaryEnd::Last)
            .dist_to(t.endpoint(Side::Right, BoundaryEnd::Start));

        if d_left.min(d_right) > FALSE_EDGE_MIN_GAP
            || (d_left + d_right) * 0.5 > FALSE_EDGE_MEAN_GAP
        {
            warn!(
                "The gap between {} and {} is {} / {}; severing the false edge",
                from, to, d_left, d_right
            );
            self.network.lanelet_mut(from).successors.remove(&to);
            self.network.lanelet_mut(to).predecessors.remove(&from);
            return;
        }

        self.bundles.merge(
            self.network,
            VertexSlot::new(from, Side::Left, BoundaryEnd::Last),
            VertexSlot::new(to, Side::Left, BoundaryEnd::Start),
        );
        self.bundles.merge(
            self.network,
            VertexSlot::new(from, Side::Right, BoundaryEnd::Last),
            VertexSlot::new(to, Side::Right, BoundaryEnd::Start),
        );
    }
}
