//! Cross-element rules: element IDs share one numbering space across lanelets,
//! signs, lights, and intersections.

use crate::repair::{ElementKind, RepairSession};
use crate::{IntersectionID, LaneletID, TrafficLightID, TrafficSignID};

impl RepairSession<'_> {
    /// Moves the element to a fresh ID, `max(all IDs) + 1` recomputed per call.
    /// References to the old ID are left alone: while the ID was duplicated,
    /// inbound references were ambiguous anyway, and the verifier re-reports
    /// any that end up dangling. Repairing an already-moved element is a no-op.
    pub(crate) fn repair_unique_id(&mut self, kind: ElementKind, id: usize) {
        let new_id = self.network.next_free_id();
        match kind {
            ElementKind::Lanelet => {
                if let Some(mut lanelet) = self.network.lanelets.remove(&LaneletID(id)) {
                    info!("Reassigning {} to Lanelet #{}", lanelet.id, new_id);
                    lanelet.id = LaneletID(new_id);
                    self.network.insert_lanelet(lanelet);
                }
            }
            ElementKind::TrafficSign => {
                if let Some(mut sign) = self.network.traffic_signs.remove(&TrafficSignID(id)) {
                    info!("Reassigning {} to TrafficSign #{}", sign.id, new_id);
                    sign.id = TrafficSignID(new_id);
                    self.network.insert_traffic_sign(sign);
                }
            }
            ElementKind::TrafficLight => {
                if let Some(mut light) = self.network.traffic_lights.remove(&TrafficLightID(id)) {
                    info!("Reassigning {} to TrafficLight #{}", light.id, new_id);
                    light.id = TrafficLightID(new_id);
                    self.network.insert_traffic_light(light);
                }
            }
            ElementKind::Intersection => {
                if let Some(mut intersection) =
                    self.network.intersections.remove(&IntersectionID(id))
                {
                    info!("Reassigning {} to Intersection #{}", intersection.id, new_id);
                    intersection.id = IntersectionID(new_id);
                    self.network.insert_intersection(intersection);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::repair::test_fixtures::*;
    use crate::{Intersection, IntersectionIncoming, RepairAction};

    #[test]
    fn fresh_ids_are_recomputed_per_call() {
        let mut network = network_with_lanelets(vec![
            straight_lanelet(1, 0.0, 10.0, 0.0),
            straight_lanelet(2, 10.0, 20.0, 0.0),
        ]);
        network.insert_traffic_sign(speed_sign(1, 5.0, -2.0));
        network.insert_traffic_light(simple_light(1, 10.0, -2.0));
        network.insert_intersection(Intersection::new(
            IntersectionID(1),
            vec![
                IntersectionIncoming::new(
                    crate::IncomingID(10),
                    BTreeSet::from([LaneletID(1)]),
                ),
                IntersectionIncoming::new(
                    crate::IncomingID(11),
                    BTreeSet::from([LaneletID(2)]),
                ),
            ],
        ));

        let mut session = crate::RepairSession::new(&mut network, test_map_name());
        // The max ID across every element kind is 2 (incoming IDs have their
        // own numbering), so lanelet 1 moves to 3, then lanelet 2 to 4.
        session.repair(RepairAction::UniqueId(ElementKind::Lanelet, 1));
        session.repair(RepairAction::UniqueId(ElementKind::Lanelet, 2));
        // Repairing an ID that no longer exists collides with nothing.
        session.repair(RepairAction::UniqueId(ElementKind::Lanelet, 1));

        let ids: Vec<usize> = network.lanelets.keys().map(|id| id.0).collect();
        assert_eq!(ids, vec![3, 4]);
        assert!(network.traffic_signs.contains_key(&TrafficSignID(1)));
    }
}
