//! Repairs for a lanelet's references to traffic signs and lights, and for its
//! stop line.

use geom::{project_onto_polyline, Distance, Pt3D};

use crate::repair::RepairSession;
use crate::{LaneletID, TrafficLightID, TrafficSignID};

// A sign or light further than this from both stop line endpoints doesn't
// belong to that stop line.
const STOP_LINE_RADIUS: Distance = Distance::const_meters(10.0);

impl RepairSession<'_> {
    pub(crate) fn repair_non_existent_sign_ref(&mut self, id: LaneletID, sign: TrafficSignID) {
        self.network.lanelet_mut(id).traffic_signs.remove(&sign);
    }

    pub(crate) fn repair_non_existent_light_ref(&mut self, id: LaneletID, light: TrafficLightID) {
        self.network.lanelet_mut(id).traffic_lights.remove(&light);
    }

    pub(crate) fn repair_non_existent_stop_line_sign_ref(
        &mut self,
        id: LaneletID,
        sign: TrafficSignID,
    ) {
        if let Some(stop_line) = &mut self.network.lanelet_mut(id).stop_line {
            stop_line.traffic_signs.remove(&sign);
        }
    }

    pub(crate) fn repair_non_existent_stop_line_light_ref(
        &mut self,
        id: LaneletID,
        light: TrafficLightID,
    ) {
        if let Some(stop_line) = &mut self.network.lanelet_mut(id).stop_line {
            stop_line.traffic_lights.remove(&light);
        }
    }

    /// The lanelet references `sign` but its stop line doesn't. If the sign
    /// really stands at the stop line, adopt it; otherwise the stop line's
    /// whole sign set is stale and gets rebuilt from everything nearby.
    pub(crate) fn repair_stop_line_missing_sign_ref(&mut self, id: LaneletID, sign: TrafficSignID) {
        let Some((start, end)) = self.stop_line_endpoints(id) else {
            return;
        };
        let candidate_close = self
            .network
            .traffic_signs
            .get(&sign)
            .map(|s| near_stop_line(start, end, s.position))
            .unwrap_or(false);
        if candidate_close {
            if let Some(stop_line) = &mut self.network.lanelet_mut(id).stop_line {
                stop_line.traffic_signs.insert(sign);
            }
            return;
        }

        let nearby: Vec<TrafficSignID> = self
            .network
            .traffic_signs
            .values()
            .filter(|s| near_stop_line(start, end, s.position))
            .map(|s| s.id)
            .collect();
        info!(
            "{} isn't at the stop line of {}; rebuilding its sign set from {} nearby signs",
            sign,
            id,
            nearby.len()
        );
        if let Some(stop_line) = &mut self.network.lanelet_mut(id).stop_line {
            stop_line.traffic_signs = nearby.into_iter().collect();
        }
    }

    pub(crate) fn repair_stop_line_missing_light_ref(
        &mut self,
        id: LaneletID,
        light: TrafficLightID,
    ) {
        let Some((start, end)) = self.stop_line_endpoints(id) else {
            return;
        };
        let candidate_close = self
            .network
            .traffic_lights
            .get(&light)
            .map(|l| near_stop_line(start, end, l.position))
            .unwrap_or(false);
        if candidate_close {
            if let Some(stop_line) = &mut self.network.lanelet_mut(id).stop_line {
                stop_line.traffic_lights.insert(light);
            }
            return;
        }

        let nearby: Vec<TrafficLightID> = self
            .network
            .traffic_lights
            .values()
            .filter(|l| near_stop_line(start, end, l.position))
            .map(|l| l.id)
            .collect();
        info!(
            "{} isn't at the stop line of {}; rebuilding its light set from {} nearby lights",
            light,
            id,
            nearby.len()
        );
        if let Some(stop_line) = &mut self.network.lanelet_mut(id).stop_line {
            stop_line.traffic_lights = nearby.into_iter().collect();
        }
    }

    /// Exactly one endpoint is defined, which means nothing geometrically.
    /// Clear both rather than invent the missing one.
    pub(crate) fn repair_stop_line_single_endpoint(&mut self, id: LaneletID) {
        if let Some(stop_line) = &mut self.network.lanelet_mut(id).stop_line {
            stop_line.start = None;
            stop_line.end = None;
        }
    }

    /// Snaps the stop line's endpoints onto the boundaries they're supposed to
    /// span: start onto the left boundary, end onto the right.
    pub(crate) fn repair_stop_line_off_boundary(&mut self, id: LaneletID) {
        let lanelet = self.network.lanelet_mut(id);
        let left = lanelet.left_vertices.clone();
        let right = lanelet.right_vertices.clone();
        if let Some(stop_line) = &mut lanelet.stop_line {
            if let Some(start) = stop_line.start {
                stop_line.start = Some(project_onto_polyline(start, &left));
            }
            if let Some(end) = stop_line.end {
                stop_line.end = Some(project_onto_polyline(end, &right));
            }
        }
    }

    fn stop_line_endpoints(&self, id: LaneletID) -> Option<(Pt3D, Pt3D)> {
        let Some(lanelet) = self.network.maybe_lanelet(id) else {
            warn!("Can't repair the stop line of {}; it's gone", id);
            return None;
        };
        let Some(stop_line) = &lanelet.stop_line else {
            warn!("{} has no stop line to repair", id);
            return None;
        };
        match (stop_line.start, stop_line.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => {
                warn!("The stop line of {} has no usable endpoints", id);
                None
            }
        }
    }
}

fn near_stop_line(start: Pt3D, end: Pt3D, pt: Pt3D) -> bool {
    pt.dist_to(start) <= STOP_LINE_RADIUS || pt.dist_to(end) <= STOP_LINE_RADIUS
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::repair::test_fixtures::*;
    use crate::{LineMarking, RepairAction, RepairSession, StopLine};

    fn stop_line_at(x: f64) -> StopLine {
        StopLine {
            start: Some(Pt3D::planar(x, 2.0)),
            end: Some(Pt3D::planar(x, 0.0)),
            line_marking: LineMarking::Solid,
            traffic_signs: BTreeSet::new(),
            traffic_lights: BTreeSet::new(),
        }
    }

    #[test]
    fn dangling_references_are_dropped_from_both_sets() {
        let mut network = network_with_lanelets(vec![straight_lanelet(1, 0.0, 10.0, 0.0)]);
        let lanelet = network.lanelet_mut(LaneletID(1));
        lanelet.traffic_signs.insert(TrafficSignID(7));
        lanelet.traffic_lights.insert(TrafficLightID(8));
        let mut stop_line = stop_line_at(10.0);
        stop_line.traffic_signs.insert(TrafficSignID(7));
        stop_line.traffic_lights.insert(TrafficLightID(8));
        lanelet.stop_line = Some(stop_line);

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::NonExistentSignRef(LaneletID(1), TrafficSignID(7)));
        session.repair(RepairAction::NonExistentLightRef(LaneletID(1), TrafficLightID(8)));
        session.repair(RepairAction::NonExistentStopLineSignRef(
            LaneletID(1),
            TrafficSignID(7),
        ));
        session.repair(RepairAction::NonExistentStopLineLightRef(
            LaneletID(1),
            TrafficLightID(8),
        ));

        let lanelet = network.lanelet(LaneletID(1));
        assert!(lanelet.traffic_signs.is_empty());
        assert!(lanelet.traffic_lights.is_empty());
        let stop_line = lanelet.stop_line.as_ref().unwrap();
        assert!(stop_line.traffic_signs.is_empty());
        assert!(stop_line.traffic_lights.is_empty());
    }

    #[test]
    fn close_sign_is_adopted_by_the_stop_line() {
        let mut network = network_with_lanelets(vec![straight_lanelet(1, 0.0, 10.0, 0.0)]);
        network.lanelet_mut(LaneletID(1)).stop_line = Some(stop_line_at(10.0));
        network.insert_traffic_sign(speed_sign(5, 12.0, 0.0));

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::StopLineMissingSignRef(
            LaneletID(1),
            TrafficSignID(5),
        ));

        let stop_line = network.lanelet(LaneletID(1)).stop_line.as_ref().unwrap();
        assert!(stop_line.traffic_signs.contains(&TrafficSignID(5)));
    }

    #[test]
    fn far_sign_triggers_a_rebuild_from_nearby_signs() {
        let mut network = network_with_lanelets(vec![straight_lanelet(1, 0.0, 10.0, 0.0)]);
        network.lanelet_mut(LaneletID(1)).stop_line = Some(stop_line_at(10.0));
        // The named sign is 90m away; another sign actually stands at the line.
        network.insert_traffic_sign(speed_sign(5, 100.0, 0.0));
        network.insert_traffic_sign(speed_sign(6, 11.0, 1.0));

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::StopLineMissingSignRef(
            LaneletID(1),
            TrafficSignID(5),
        ));

        let stop_line = network.lanelet(LaneletID(1)).stop_line.as_ref().unwrap();
        assert!(!stop_line.traffic_signs.contains(&TrafficSignID(5)));
        assert!(stop_line.traffic_signs.contains(&TrafficSignID(6)));
    }

    #[test]
    fn close_light_is_adopted_by_the_stop_line() {
        let mut network = network_with_lanelets(vec![straight_lanelet(1, 0.0, 10.0, 0.0)]);
        network.lanelet_mut(LaneletID(1)).stop_line = Some(stop_line_at(10.0));
        network.insert_traffic_light(simple_light(5, 12.0, 0.0));

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::StopLineMissingLightRef(
            LaneletID(1),
            TrafficLightID(5),
        ));

        let stop_line = network.lanelet(LaneletID(1)).stop_line.as_ref().unwrap();
        assert!(stop_line.traffic_lights.contains(&TrafficLightID(5)));
    }

    #[test]
    fn far_light_triggers_a_rebuild_from_nearby_lights() {
        let mut network = network_with_lanelets(vec![straight_lanelet(1, 0.0, 10.0, 0.0)]);
        network.lanelet_mut(LaneletID(1)).stop_line = Some(stop_line_at(10.0));
        // The named light hangs 90m away; another one stands at the line.
        network.insert_traffic_light(simple_light(5, 100.0, 0.0));
        network.insert_traffic_light(simple_light(6, 11.0, 1.0));

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::StopLineMissingLightRef(
            LaneletID(1),
            TrafficLightID(5),
        ));

        let stop_line = network.lanelet(LaneletID(1)).stop_line.as_ref().unwrap();
        assert!(!stop_line.traffic_lights.contains(&TrafficLightID(5)));
        assert!(stop_line.traffic_lights.contains(&TrafficLightID(6)));
    }

    #[test]
    fn single_endpoint_clears_both() {
        let mut network = network_with_lanelets(vec![straight_lanelet(1, 0.0, 10.0, 0.0)]);
        let mut stop_line = stop_line_at(10.0);
        stop_line.end = None;
        network.lanelet_mut(LaneletID(1)).stop_line = Some(stop_line);

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::StopLineSingleEndpoint(LaneletID(1)));

        let stop_line = network.lanelet(LaneletID(1)).stop_line.as_ref().unwrap();
        assert_eq!(stop_line.start, None);
        assert_eq!(stop_line.end, None);
    }

    #[test]
    fn off_boundary_endpoints_are_projected_back() {
        let mut network = network_with_lanelets(vec![straight_lanelet(1, 0.0, 10.0, 0.0)]);
        let mut stop_line = stop_line_at(5.0);
        stop_line.start = Some(Pt3D::planar(5.0, 5.0));
        stop_line.end = Some(Pt3D::planar(5.0, -3.0));
        network.lanelet_mut(LaneletID(1)).stop_line = Some(stop_line);

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::StopLineOffBoundary(LaneletID(1)));

        let stop_line = network.lanelet(LaneletID(1)).stop_line.as_ref().unwrap();
        assert_eq!(stop_line.start, Some(Pt3D::planar(5.0, 2.0)));
        assert_eq!(stop_line.end, Some(Pt3D::planar(5.0, 0.0)));
    }
}
