//! Merging a composable predecessor/successor pair into one lanelet, together
//! with every laterally adjacent pair in the same row of the road. The session
//! keeps an old-ID-to-merged-ID table so later repairs naming already-merged
//! lanelets land on the right survivor.

use crate::repair::RepairSession;
use crate::{Adjacency, Lanelet, LaneletID, Side};

impl RepairSession<'_> {
    /// `a` flows into `b` and nothing else does; the split serves no purpose.
    /// Merges them, and walks left and right across the road merging each
    /// adjacent predecessor/successor pair alongside, so the adjacency rows
    /// stay rectangular.
    pub(crate) fn repair_merge_composable(&mut self, a: LaneletID, b: LaneletID) {
        let a = self.resolve_merged(a);
        let b = self.resolve_merged(b);
        if a == b {
            return;
        }
        if self.network.maybe_lanelet(a).is_none() || self.network.maybe_lanelet(b).is_none() {
            warn!("Can't merge {} and {}; one is gone", a, b);
            return;
        }

        for (upstream, downstream) in self.composable_rows(a, b) {
            self.merge_pair(upstream, downstream);
        }
    }

    /// All (upstream, downstream) pairs to merge: the seed pair plus its
    /// lateral neighbors on both sides, for as long as both members of a row
    /// have a neighbor and the two links agree on direction. Pairs are stored
    /// in driving order even across opposite-direction rows.
    fn composable_rows(&self, a: LaneletID, b: LaneletID) -> Vec<(LaneletID, LaneletID)> {
        let mut rows = vec![(a, b)];
        for side in [Side::Left, Side::Right] {
            let (mut cur_a, mut cur_b) = (a, b);
            // Whether the current row still faces the same direction as the
            // seed row.
            let mut aligned = true;
            loop {
                let step_side = if aligned { side } else { side.opposite() };
                let (Some(link_a), Some(link_b)) = (
                    self.network.lanelet(cur_a).adj(step_side),
                    self.network.lanelet(cur_b).adj(step_side),
                ) else {
                    break;
                };
                if link_a.same_direction != link_b.same_direction {
                    break;
                }
                if self.network.maybe_lanelet(link_a.id).is_none()
                    || self.network.maybe_lanelet(link_b.id).is_none()
                {
                    break;
                }
                let new_aligned = aligned == link_a.same_direction;
                let pair = if new_aligned {
                    (link_a.id, link_b.id)
                } else {
                    (link_b.id, link_a.id)
                };
                if rows.contains(&pair) || rows.contains(&(pair.1, pair.0)) {
                    break;
                }
                rows.push(pair);
                cur_a = link_a.id;
                cur_b = link_b.id;
                aligned = new_aligned;
            }
        }
        rows
    }

    fn merge_pair(&mut self, x_id: LaneletID, y_id: LaneletID) {
        if self.network.maybe_lanelet(x_id).is_none() || self.network.maybe_lanelet(y_id).is_none()
        {
            return;
        }
        // Before removal, so neither old ID can come back into circulation.
        let new_id = LaneletID(self.network.next_free_id());
        let (Some(x), Some(y)) = (
            self.network.lanelets.remove(&x_id),
            self.network.lanelets.remove(&y_id),
        ) else {
            return;
        };
        info!("Merging {} and {} into Lanelet #{}", x_id, y_id, new_id.0);

        // Drop the duplicated joint vertex only when both sides share it
        // exactly; anything asymmetric must keep every point so the two
        // boundaries stay equal-length.
        let shared_joint = x.left_vertices.last() == y.left_vertices.first()
            && x.right_vertices.last() == y.right_vertices.first();
        let skip = if shared_joint { 1 } else { 0 };
        let mut left = x.left_vertices;
        left.extend(y.left_vertices.into_iter().skip(skip));
        let mut right = x.right_vertices;
        right.extend(y.right_vertices.into_iter().skip(skip));

        let mut merged = Lanelet::new(new_id, left, right);
        merged.lanelet_type = x.lanelet_type;
        merged.traffic_signs = x.traffic_signs.union(&y.traffic_signs).copied().collect();
        merged.traffic_lights = x
            .traffic_lights
            .union(&y.traffic_lights)
            .copied()
            .collect();
        // The stop line, if any, sits where the road actually ends.
        merged.stop_line = y.stop_line.or(x.stop_line);
        merged.predecessors = x
            .predecessors
            .into_iter()
            .filter(|p| *p != x_id && *p != y_id)
            .collect();
        merged.successors = y
            .successors
            .into_iter()
            .filter(|s| *s != x_id && *s != y_id)
            .collect();
        merged.adj_left = x.adj_left.map(|adj| Adjacency {
            id: self.resolve_merged(adj.id),
            same_direction: adj.same_direction,
        });
        merged.adj_right = x.adj_right.map(|adj| Adjacency {
            id: self.resolve_merged(adj.id),
            same_direction: adj.same_direction,
        });

        for lanelet in self.network.lanelets.values_mut() {
            for set in [&mut lanelet.predecessors, &mut lanelet.successors] {
                if set.remove(&x_id) | set.remove(&y_id) {
                    set.insert(new_id);
                }
            }
            for adj in [&mut lanelet.adj_left, &mut lanelet.adj_right] {
                if let Some(link) = adj {
                    if link.id == x_id || link.id == y_id {
                        link.id = new_id;
                    }
                }
            }
        }
        for sign in self.network.traffic_signs.values_mut() {
            if sign.first_occurrence.remove(&x_id) | sign.first_occurrence.remove(&y_id) {
                sign.first_occurrence.insert(new_id);
            }
        }
        // Intersections only gain the merged ID; the stale members stay for the
        // verifier to report individually.
        for intersection in self.network.intersections.values_mut() {
            for incoming in &mut intersection.incomings {
                if incoming.incoming_lanelets.contains(&x_id)
                    || incoming.incoming_lanelets.contains(&y_id)
                {
                    incoming.incoming_lanelets.insert(new_id);
                }
            }
        }

        self.network.insert_lanelet(merged);
        self.merged.insert(x_id, new_id);
        self.merged.insert(y_id, new_id);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use geom::Pt3D;

    use super::*;
    use crate::repair::test_fixtures::*;
    use crate::{
        Intersection, IntersectionID, IntersectionIncoming, LineMarking, RepairAction,
        RepairSession, StopLine, TrafficSignID,
    };

    #[test]
    fn a_simple_pair_becomes_one_lanelet() {
        let mut network = network_with_lanelets(vec![
            straight_lanelet(1, 0.0, 10.0, 0.0),
            straight_lanelet(2, 10.0, 20.0, 0.0),
        ]);
        network.lanelet_mut(LaneletID(1)).successors.insert(LaneletID(2));
        network.lanelet_mut(LaneletID(2)).predecessors.insert(LaneletID(1));
        network.lanelet_mut(LaneletID(1)).traffic_signs.insert(TrafficSignID(7));
        network.lanelet_mut(LaneletID(2)).stop_line = Some(StopLine {
            start: Some(Pt3D::planar(20.0, 2.0)),
            end: Some(Pt3D::planar(20.0, 0.0)),
            line_marking: LineMarking::Solid,
            traffic_signs: BTreeSet::new(),
            traffic_lights: BTreeSet::new(),
        });
        network.insert_intersection(Intersection::new(
            IntersectionID(3),
            vec![IntersectionIncoming::new(
                crate::IncomingID(20),
                BTreeSet::from([LaneletID(2)]),
            )],
        ));

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::MergeComposableLanelets(LaneletID(1), LaneletID(2)));
        // Naming either old ID again resolves to the merged lanelet; no-op.
        session.repair(RepairAction::MergeComposableLanelets(LaneletID(1), LaneletID(2)));

        assert_eq!(network.lanelets.len(), 1);
        let merged = network.lanelet(LaneletID(4));
        // The shared junction vertex is deduplicated.
        assert_eq!(merged.left_vertices.len(), 5);
        assert_eq!(merged.left_vertices[0], Pt3D::planar(0.0, 2.0));
        assert_eq!(merged.left_vertices[4], Pt3D::planar(20.0, 2.0));
        assert_eq!(merged.center_vertices.len(), 5);
        assert!(merged.predecessors.is_empty());
        assert!(merged.successors.is_empty());
        assert!(merged.traffic_signs.contains(&TrafficSignID(7)));
        assert!(merged.stop_line.is_some());
        // The intersection gained the merged ID without losing the old one.
        let incoming = &network.intersections[&IntersectionID(3)].incomings[0];
        assert!(incoming.incoming_lanelets.contains(&LaneletID(4)));
        assert!(incoming.incoming_lanelets.contains(&LaneletID(2)));
    }

    #[test]
    fn asymmetric_joint_keeps_boundary_counts_equal() {
        // Only the left boundaries meet exactly at the junction; the right
        // joint is still 0.1m open. Neither side may lose a vertex.
        let mut network = network_with_lanelets(vec![
            straight_lanelet(1, 0.0, 10.0, 0.0),
            Lanelet::new(
                LaneletID(2),
                vec![Pt3D::planar(10.0, 2.0), Pt3D::planar(20.0, 2.0)],
                vec![Pt3D::planar(10.1, 0.0), Pt3D::planar(20.0, 0.0)],
            ),
        ]);
        network.lanelet_mut(LaneletID(1)).successors.insert(LaneletID(2));
        network.lanelet_mut(LaneletID(2)).predecessors.insert(LaneletID(1));

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::MergeComposableLanelets(LaneletID(1), LaneletID(2)));

        let merged = network.lanelet(LaneletID(3));
        assert_eq!(merged.left_vertices.len(), 5);
        assert_eq!(merged.right_vertices.len(), 5);
        assert_eq!(merged.center_vertices.len(), 5);
    }

    #[test]
    fn adjacent_rows_merge_alongside_and_stay_linked() {
        // Two lanes side by side, each split at x=10.
        let mut network = network_with_lanelets(vec![
            straight_lanelet(1, 0.0, 10.0, 0.0),
            straight_lanelet(2, 10.0, 20.0, 0.0),
            straight_lanelet(11, 0.0, 10.0, 2.0),
            straight_lanelet(12, 10.0, 20.0, 2.0),
        ]);
        network.lanelet_mut(LaneletID(1)).successors.insert(LaneletID(2));
        network.lanelet_mut(LaneletID(2)).predecessors.insert(LaneletID(1));
        network.lanelet_mut(LaneletID(11)).successors.insert(LaneletID(12));
        network.lanelet_mut(LaneletID(12)).predecessors.insert(LaneletID(11));
        for (lane, neighbor) in [(1, 11), (2, 12)] {
            network.lanelet_mut(LaneletID(lane)).adj_left =
                Some(Adjacency { id: LaneletID(neighbor), same_direction: true });
            network.lanelet_mut(LaneletID(neighbor)).adj_right =
                Some(Adjacency { id: LaneletID(lane), same_direction: true });
        }

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::MergeComposableLanelets(LaneletID(1), LaneletID(2)));

        assert_eq!(network.lanelets.len(), 2);
        // Seed pair merged first into 13, then the left row into 14.
        let right_lane = network.lanelet(LaneletID(13));
        let left_lane = network.lanelet(LaneletID(14));
        assert_eq!(right_lane.adj_left.map(|a| a.id), Some(LaneletID(14)));
        assert_eq!(left_lane.adj_right.map(|a| a.id), Some(LaneletID(13)));
    }

    #[test]
    fn opposite_direction_row_merges_in_driving_order() {
        // The oncoming lane runs x 20 -> 0 and is split at x=10: lanelet 21
        // flows into 22. Adjacency links cross directions.
        let mut network = network_with_lanelets(vec![
            straight_lanelet(1, 0.0, 10.0, 0.0),
            straight_lanelet(2, 10.0, 20.0, 0.0),
            Lanelet::new(
                LaneletID(21),
                vec![Pt3D::planar(20.0, 2.0), Pt3D::planar(10.0, 2.0)],
                vec![Pt3D::planar(20.0, 4.0), Pt3D::planar(10.0, 4.0)],
            ),
            Lanelet::new(
                LaneletID(22),
                vec![Pt3D::planar(10.0, 2.0), Pt3D::planar(0.0, 2.0)],
                vec![Pt3D::planar(10.0, 4.0), Pt3D::planar(0.0, 4.0)],
            ),
        ]);
        network.lanelet_mut(LaneletID(1)).successors.insert(LaneletID(2));
        network.lanelet_mut(LaneletID(2)).predecessors.insert(LaneletID(1));
        network.lanelet_mut(LaneletID(21)).successors.insert(LaneletID(22));
        network.lanelet_mut(LaneletID(22)).predecessors.insert(LaneletID(21));
        // Facing +x, lanelet 1's left neighbor is the piece of the oncoming
        // lane over the same x range, which is 22.
        network.lanelet_mut(LaneletID(1)).adj_left =
            Some(Adjacency { id: LaneletID(22), same_direction: false });
        network.lanelet_mut(LaneletID(22)).adj_left =
            Some(Adjacency { id: LaneletID(1), same_direction: false });
        network.lanelet_mut(LaneletID(2)).adj_left =
            Some(Adjacency { id: LaneletID(21), same_direction: false });
        network.lanelet_mut(LaneletID(21)).adj_left =
            Some(Adjacency { id: LaneletID(2), same_direction: false });

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::MergeComposableLanelets(LaneletID(1), LaneletID(2)));

        assert_eq!(network.lanelets.len(), 2);
        // The oncoming pair merged as (21, 22), keeping its own driving order:
        // the merged boundary runs from x=20 down to x=0.
        let oncoming = network.lanelet(LaneletID(24));
        assert_eq!(oncoming.left_vertices[0], Pt3D::planar(20.0, 2.0));
        assert_eq!(
            *oncoming.left_vertices.last().unwrap(),
            Pt3D::planar(0.0, 2.0)
        );
    }

    #[test]
    fn merge_table_resolution_is_transitive() {
        let mut network = network_with_lanelets(vec![
            straight_lanelet(1, 0.0, 10.0, 0.0),
            straight_lanelet(2, 10.0, 20.0, 0.0),
            straight_lanelet(3, 20.0, 30.0, 0.0),
        ]);
        for (a, b) in [(1, 2), (2, 3)] {
            network.lanelet_mut(LaneletID(a)).successors.insert(LaneletID(b));
            network.lanelet_mut(LaneletID(b)).predecessors.insert(LaneletID(a));
        }

        let mut session = RepairSession::new(&mut network, test_map_name());
        session.repair(RepairAction::MergeComposableLanelets(LaneletID(1), LaneletID(2)));
        // Lanelet 2 is gone; the location resolves to its merged successor.
        session.repair(RepairAction::MergeComposableLanelets(LaneletID(2), LaneletID(3)));

        assert_eq!(network.lanelets.len(), 1);
        let survivor = network.lanelets.values().next().unwrap();
        assert_eq!(survivor.left_vertices.first(), Some(&Pt3D::planar(0.0, 2.0)));
        assert_eq!(survivor.left_vertices.last(), Some(&Pt3D::planar(30.0, 2.0)));
    }
}
