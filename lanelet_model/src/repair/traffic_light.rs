//! Repairs for traffic lights and their cycles.

use geom::Duration;

use crate::repair::RepairSession;
use crate::{default_cycle, TrafficLightID, TrafficLightState, DEFAULT_CYCLE_DURATION};

impl RepairSession<'_> {
    /// A light with no cycle controls nothing; remove it.
    pub(crate) fn repair_empty_cycle(&mut self, id: TrafficLightID) {
        if self.network.traffic_lights.remove(&id).is_some() {
            info!("Removing {}; its cycle is empty", id);
        }
    }

    /// No lanelet references the light anymore.
    pub(crate) fn repair_dangling_traffic_light(&mut self, id: TrafficLightID) {
        if self.network.traffic_lights.remove(&id).is_some() {
            info!("Removing {}; nothing references it", id);
        }
    }

    pub(crate) fn repair_non_positive_cycle_duration(&mut self, id: TrafficLightID, element: usize) {
        let light = self.network.traffic_light_mut(id);
        let Some(element) = light.cycle.get_mut(element) else {
            warn!("{} has no cycle element at the reported index", id);
            return;
        };
        if element.duration <= Duration::ZERO {
            element.duration = DEFAULT_CYCLE_DURATION;
        }
    }

    /// Keeps only the first occurrence of the duplicated state, preserving its
    /// duration and the order of everything else.
    pub(crate) fn repair_duplicate_cycle_state(
        &mut self,
        id: TrafficLightID,
        state: TrafficLightState,
    ) {
        let light = self.network.traffic_light_mut(id);
        let mut seen = false;
        light.cycle.retain(|element| {
            if element.state != state {
                return true;
            }
            if seen {
                false
            } else {
                seen = true;
                true
            }
        });
    }

    /// The set of states can't form a legal signal program; replace the whole
    /// cycle with the country's standard one.
    pub(crate) fn repair_invalid_cycle_combination(&mut self, id: TrafficLightID) {
        let country = self.map_name.country;
        let light = self.network.traffic_light_mut(id);
        info!("Resetting the cycle of {} to the {:?} default", id, country);
        light.cycle = default_cycle(country);
    }
}
