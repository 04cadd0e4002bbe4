//! The repair engine. The external verifier evaluates well-formedness rules
//! and reports each violation as a [`RepairAction`]; one [`RepairSession`]
//! applies them to the network, mutating it in place. The engine never
//! re-verifies anything itself.

use std::collections::BTreeMap;

use crate::repair::bundles::VertexBundles;
use crate::{
    IncomingID, IntersectionID, LaneletID, LaneletNetwork, MapName, Side, TrafficLightID,
    TrafficLightState, TrafficSignID,
};

mod adjacency;
mod boundary;
mod bundles;
mod connectivity;
mod general;
mod intersection;
mod merge;
mod references;
mod traffic_light;
mod traffic_sign;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ElementKind {
    Lanelet,
    TrafficSign,
    TrafficLight,
    Intersection,
}

/// One violated rule at one location, as reported by the verifier. The variant
/// carries exactly the IDs that rule's location tuple has, so a mismatched
/// arity can't even be expressed.
#[derive(Clone, Debug, PartialEq)]
pub enum RepairAction {
    // Cross-element rules
    UniqueId(ElementKind, usize),

    // Lanelet boundary shape
    UnequalVertexCounts(LaneletID),
    DegenerateLanelet(LaneletID),
    LeftSelfIntersection(LaneletID),
    RightSelfIntersection(LaneletID),
    BoundariesIntersection(LaneletID),
    SwappedBoundaries(LaneletID),

    // Lanelet connectivity
    NonExistentPredecessor(LaneletID, LaneletID),
    NonExistentSuccessor(LaneletID, LaneletID),
    MissingPredecessor(LaneletID, LaneletID),
    MissingSuccessor(LaneletID, LaneletID),
    PredecessorConnection(LaneletID, LaneletID),
    SuccessorConnection(LaneletID, LaneletID),
    ConflictingDirections(LaneletID, LaneletID),

    // Lanelet adjacency
    NonExistentAdjacency(LaneletID, Side),
    MissingAdjacency {
        lanelet: LaneletID,
        adjacent: LaneletID,
        side: Side,
        same_direction: bool,
    },
    ParallelAdjacency(LaneletID, Side),
    MergingAdjacency(LaneletID, LaneletID),
    ForkingAdjacency(LaneletID, LaneletID),

    // Lanelet regulatory references and stop lines
    NonExistentSignRef(LaneletID, TrafficSignID),
    NonExistentLightRef(LaneletID, TrafficLightID),
    NonExistentStopLineSignRef(LaneletID, TrafficSignID),
    NonExistentStopLineLightRef(LaneletID, TrafficLightID),
    StopLineMissingSignRef(LaneletID, TrafficSignID),
    StopLineMissingLightRef(LaneletID, TrafficLightID),
    StopLineSingleEndpoint(LaneletID),
    StopLineOffBoundary(LaneletID),

    // Composable-chain merging
    MergeComposableLanelets(LaneletID, LaneletID),

    // Traffic signs
    EmptySignElements(TrafficSignID),
    DanglingSignOccurrence(TrafficSignID),
    MissingAdditionalValue(TrafficSignID, usize),
    InvalidAdditionalValue(TrafficSignID, usize),
    SignTooFar(TrafficSignID, LaneletID),

    // Traffic lights
    EmptyCycle(TrafficLightID),
    DanglingTrafficLight(TrafficLightID),
    NonPositiveCycleDuration(TrafficLightID, usize),
    DuplicateCycleState(TrafficLightID, TrafficLightState),
    InvalidCycleCombination(TrafficLightID),

    // Intersections
    FewIncomings(IntersectionID),
    EmptyIncoming(IntersectionID, IncomingID),
    DanglingLeftOf(IntersectionID, IncomingID),
    NonExistentIncomingLanelet(IntersectionID, IncomingID, LaneletID),
    NonExistentCrossingLanelet(IntersectionID, LaneletID),
}

/// Wraps one network for one verifier pass. The vertex bundles and the
/// old-ID-to-merged-ID table accumulate across calls, so transitive endpoint
/// merging and chain merging only work if the caller keeps using the same
/// session for the whole pass.
pub struct RepairSession<'a> {
    network: &'a mut LaneletNetwork,
    map_name: MapName,
    bundles: VertexBundles,
    merged: BTreeMap<LaneletID, LaneletID>,
}

impl<'a> RepairSession<'a> {
    pub fn new(network: &'a mut LaneletNetwork, map_name: MapName) -> RepairSession<'a> {
        RepairSession {
            network,
            map_name,
            bundles: VertexBundles::new(),
            merged: BTreeMap::new(),
        }
    }

    /// Applies one repair. Success is only observable through the mutated
    /// network; repairs on elements that another repair already removed are
    /// no-ops.
    pub fn repair(&mut self, action: RepairAction) {
        match action {
            RepairAction::UniqueId(kind, id) => self.repair_unique_id(kind, id),

            RepairAction::UnequalVertexCounts(l) => self.repair_unequal_vertex_counts(l),
            RepairAction::DegenerateLanelet(l) => self.repair_degenerate_lanelet(l),
            RepairAction::LeftSelfIntersection(l) => self.repair_self_intersection(l, Side::Left),
            RepairAction::RightSelfIntersection(l) => self.repair_self_intersection(l, Side::Right),
            RepairAction::BoundariesIntersection(l) => self.repair_boundaries_intersection(l),
            RepairAction::SwappedBoundaries(l) => self.repair_swapped_boundaries(l),

            RepairAction::NonExistentPredecessor(l, p) => self.repair_non_existent_predecessor(l, p),
            RepairAction::NonExistentSuccessor(l, s) => self.repair_non_existent_successor(l, s),
            RepairAction::MissingPredecessor(l, p) => self.repair_missing_predecessor(l, p),
            RepairAction::MissingSuccessor(l, s) => self.repair_missing_successor(l, s),
            RepairAction::PredecessorConnection(l, p) => self.repair_predecessor_connection(l, p),
            RepairAction::SuccessorConnection(l, s) => self.repair_successor_connection(l, s),
            RepairAction::ConflictingDirections(l, other) => {
                self.repair_conflicting_directions(l, other)
            }

            RepairAction::NonExistentAdjacency(l, side) => self.repair_non_existent_adjacency(l, side),
            RepairAction::MissingAdjacency {
                lanelet,
                adjacent,
                side,
                same_direction,
            } => self.repair_missing_adjacency(lanelet, adjacent, side, same_direction),
            RepairAction::ParallelAdjacency(l, side) => self.repair_parallel_adjacency(l, side),
            RepairAction::MergingAdjacency(l, other) => self.repair_merging_adjacency(l, other),
            RepairAction::ForkingAdjacency(l, other) => self.repair_forking_adjacency(l, other),

            RepairAction::NonExistentSignRef(l, sign) => self.repair_non_existent_sign_ref(l, sign),
            RepairAction::NonExistentLightRef(l, light) => {
                self.repair_non_existent_light_ref(l, light)
            }
            RepairAction::NonExistentStopLineSignRef(l, sign) => {
                self.repair_non_existent_stop_line_sign_ref(l, sign)
            }
            RepairAction::NonExistentStopLineLightRef(l, light) => {
                self.repair_non_existent_stop_line_light_ref(l, light)
            }
            RepairAction::StopLineMissingSignRef(l, sign) => {
                self.repair_stop_line_missing_sign_ref(l, sign)
            }
            RepairAction::StopLineMissingLightRef(l, light) => {
                self.repair_stop_line_missing_light_ref(l, light)
            }
            RepairAction::StopLineSingleEndpoint(l) => self.repair_stop_line_single_endpoint(l),
            RepairAction::StopLineOffBoundary(l) => self.repair_stop_line_off_boundary(l),

            RepairAction::MergeComposableLanelets(a, b) => self.repair_merge_composable(a, b),

            RepairAction::EmptySignElements(sign) => self.repair_empty_sign_elements(sign),
            RepairAction::DanglingSignOccurrence(sign) => self.repair_dangling_sign_occurrence(sign),
            RepairAction::MissingAdditionalValue(sign, element) => {
                self.repair_missing_additional_value(sign, element)
            }
            RepairAction::InvalidAdditionalValue(sign, element) => {
                self.repair_invalid_additional_value(sign, element)
            }
            RepairAction::SignTooFar(sign, l) => self.repair_sign_too_far(sign, l),

            RepairAction::EmptyCycle(light) => self.repair_empty_cycle(light),
            RepairAction::DanglingTrafficLight(light) => self.repair_dangling_traffic_light(light),
            RepairAction::NonPositiveCycleDuration(light, element) => {
                self.repair_non_positive_cycle_duration(light, element)
            }
            RepairAction::DuplicateCycleState(light, state) => {
                self.repair_duplicate_cycle_state(light, state)
            }
            RepairAction::InvalidCycleCombination(light) => {
                self.repair_invalid_cycle_combination(light)
            }

            RepairAction::FewIncomings(i) => self.repair_few_incomings(i),
            RepairAction::EmptyIncoming(i, inc) => self.repair_empty_incoming(i, inc),
            RepairAction::DanglingLeftOf(i, inc) => self.repair_dangling_left_of(i, inc),
            RepairAction::NonExistentIncomingLanelet(i, inc, l) => {
                self.repair_non_existent_incoming_lanelet(i, inc, l)
            }
            RepairAction::NonExistentCrossingLanelet(i, l) => {
                self.repair_non_existent_crossing_lanelet(i, l)
            }
        }
    }

    /// The merged ID a lanelet ended up as, following earlier chain merges in
    /// this session.
    pub fn resolve_merged(&self, id: LaneletID) -> LaneletID {
        let mut current = id;
        while let Some(next) = self.merged.get(&current) {
            current = *next;
        }
        current
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use std::collections::BTreeSet;

    use geom::Pt3D;

    use crate::{
        Country, Lanelet, LaneletID, LaneletNetwork, MapName, TrafficLight, TrafficLightDirection,
        TrafficLightID, TrafficSign, TrafficSignElement, TrafficSignID,
    };

    pub fn test_map_name() -> MapName {
        MapName::new(Country::Germany, "Test-1")
    }

    /// A straight lanelet from x0 to x1, 2m wide, right boundary on y_right.
    /// Three vertices per boundary.
    pub fn straight_lanelet(id: usize, x0: f64, x1: f64, y_right: f64) -> Lanelet {
        let mid = (x0 + x1) / 2.0;
        Lanelet::new(
            LaneletID(id),
            vec![
                Pt3D::planar(x0, y_right + 2.0),
                Pt3D::planar(mid, y_right + 2.0),
                Pt3D::planar(x1, y_right + 2.0),
            ],
            vec![
                Pt3D::planar(x0, y_right),
                Pt3D::planar(mid, y_right),
                Pt3D::planar(x1, y_right),
            ],
        )
    }

    pub fn speed_sign(id: usize, x: f64, y: f64) -> TrafficSign {
        TrafficSign {
            id: TrafficSignID(id),
            elements: vec![TrafficSignElement::new(
                crate::sign_codes::MAX_SPEED,
                vec!["50".to_string()],
            )],
            position: Pt3D::planar(x, y),
            first_occurrence: BTreeSet::new(),
        }
    }

    pub fn simple_light(id: usize, x: f64, y: f64) -> TrafficLight {
        TrafficLight {
            id: TrafficLightID(id),
            position: Pt3D::planar(x, y),
            direction: TrafficLightDirection::All,
            cycle: crate::default_cycle(Country::Germany),
        }
    }

    pub fn network_with_lanelets(lanelets: Vec<Lanelet>) -> LaneletNetwork {
        let mut network = LaneletNetwork::blank();
        for l in lanelets {
            network.insert_lanelet(l);
        }
        network
    }
}
