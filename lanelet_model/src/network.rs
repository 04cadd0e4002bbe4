use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Intersection, IntersectionID, Lanelet, LaneletID, TrafficLight, TrafficLightID, TrafficSign,
    TrafficSignID,
};

/// The single mutable aggregate everything operates on. Repairs mutate it in
/// place; nothing else owns any of these elements.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneletNetwork {
    pub lanelets: BTreeMap<LaneletID, Lanelet>,
    pub traffic_signs: BTreeMap<TrafficSignID, TrafficSign>,
    pub traffic_lights: BTreeMap<TrafficLightID, TrafficLight>,
    pub intersections: BTreeMap<IntersectionID, Intersection>,
}

impl LaneletNetwork {
    pub fn blank() -> LaneletNetwork {
        LaneletNetwork::default()
    }

    /// Panics on a bad ID. Callers handing over verifier locations have already
    /// promised the element exists; use the `maybe_` variants otherwise.
    pub fn lanelet(&self, id: LaneletID) -> &Lanelet {
        self.maybe_lanelet(id)
            .unwrap_or_else(|| panic!("{} doesn't exist", id))
    }

    pub fn lanelet_mut(&mut self, id: LaneletID) -> &mut Lanelet {
        self.lanelets
            .get_mut(&id)
            .unwrap_or_else(|| panic!("{} doesn't exist", id))
    }

    pub fn maybe_lanelet(&self, id: LaneletID) -> Option<&Lanelet> {
        self.lanelets.get(&id)
    }

    pub fn traffic_sign(&self, id: TrafficSignID) -> &TrafficSign {
        self.traffic_signs
            .get(&id)
            .unwrap_or_else(|| panic!("{} doesn't exist", id))
    }

    pub fn traffic_sign_mut(&mut self, id: TrafficSignID) -> &mut TrafficSign {
        self.traffic_signs
            .get_mut(&id)
            .unwrap_or_else(|| panic!("{} doesn't exist", id))
    }

    pub fn traffic_light(&self, id: TrafficLightID) -> &TrafficLight {
        self.traffic_lights
            .get(&id)
            .unwrap_or_else(|| panic!("{} doesn't exist", id))
    }

    pub fn traffic_light_mut(&mut self, id: TrafficLightID) -> &mut TrafficLight {
        self.traffic_lights
            .get_mut(&id)
            .unwrap_or_else(|| panic!("{} doesn't exist", id))
    }

    pub fn intersection_mut(&mut self, id: IntersectionID) -> &mut Intersection {
        self.intersections
            .get_mut(&id)
            .unwrap_or_else(|| panic!("{} doesn't exist", id))
    }

    pub fn insert_lanelet(&mut self, lanelet: Lanelet) {
        assert!(
            self.lanelets.insert(lanelet.id, lanelet).is_none(),
            "inserted a lanelet with a duplicate ID"
        );
    }

    pub fn insert_traffic_sign(&mut self, sign: TrafficSign) {
        assert!(
            self.traffic_signs.insert(sign.id, sign).is_none(),
            "inserted a traffic sign with a duplicate ID"
        );
    }

    pub fn insert_traffic_light(&mut self, light: TrafficLight) {
        assert!(
            self.traffic_lights.insert(light.id, light).is_none(),
            "inserted a traffic light with a duplicate ID"
        );
    }

    pub fn insert_intersection(&mut self, intersection: Intersection) {
        assert!(
            self.intersections
                .insert(intersection.id, intersection)
                .is_none(),
            "inserted an intersection with a duplicate ID"
        );
    }

    /// One more than the highest ID in use across every element kind. IDs share
    /// one numbering space, so a fresh one must clear all four maps.
    pub fn next_free_id(&self) -> usize {
        let max_lanelet = self.lanelets.keys().map(|id| id.0).max().unwrap_or(0);
        let max_sign = self.traffic_signs.keys().map(|id| id.0).max().unwrap_or(0);
        let max_light = self.traffic_lights.keys().map(|id| id.0).max().unwrap_or(0);
        let max_intersection = self.intersections.keys().map(|id| id.0).max().unwrap_or(0);
        max_lanelet
            .max(max_sign)
            .max(max_light)
            .max(max_intersection)
            + 1
    }
}
