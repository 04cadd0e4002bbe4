//! Repairs for intersections: structural minimums and dangling members.

use crate::repair::RepairSession;
use crate::{IncomingID, IntersectionID, LaneletID};

impl RepairSession<'_> {
    /// An intersection needs at least two approaches to be a junction at all.
    pub(crate) fn repair_few_incomings(&mut self, id: IntersectionID) {
        if self.network.intersections.remove(&id).is_some() {
            info!("Removing {}; it has fewer than two incomings", id);
        }
    }

    pub(crate) fn repair_empty_incoming(&mut self, id: IntersectionID, incoming: IncomingID) {
        let intersection = self.network.intersection_mut(id);
        intersection.incomings.retain(|i| i.id != incoming);
    }

    /// The incoming's `left_of` points at an approach that no longer exists.
    pub(crate) fn repair_dangling_left_of(&mut self, id: IntersectionID, incoming: IncomingID) {
        let intersection = self.network.intersection_mut(id);
        let Some(incoming) = intersection.incoming_mut(incoming) else {
            warn!("{} has no incoming at the reported ID", id);
            return;
        };
        incoming.left_of = None;
    }

    pub(crate) fn repair_non_existent_incoming_lanelet(
        &mut self,
        id: IntersectionID,
        incoming: IncomingID,
        lanelet: LaneletID,
    ) {
        let intersection = self.network.intersection_mut(id);
        let Some(incoming) = intersection.incoming_mut(incoming) else {
            warn!("{} has no incoming at the reported ID", id);
            return;
        };
        incoming.incoming_lanelets.remove(&lanelet);
    }

    pub(crate) fn repair_non_existent_crossing_lanelet(
        &mut self,
        id: IntersectionID,
        lanelet: LaneletID,
    ) {
        self.network.intersection_mut(id).crossings.remove(&lanelet);
    }
}
