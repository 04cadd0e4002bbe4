//! Repairs for traffic signs: their elements, values, and placement.

use geom::{project_onto_polyline, Pt3D};

use crate::repair::RepairSession;
use crate::{default_additional_value, LaneletID, TrafficSignID};

impl RepairSession<'_> {
    /// A sign post with no sign elements says nothing; remove it.
    pub(crate) fn repair_empty_sign_elements(&mut self, id: TrafficSignID) {
        if self.network.traffic_signs.remove(&id).is_some() {
            info!("Removing {}; it has no elements", id);
        }
    }

    /// Every lanelet in the sign's first_occurrence set is gone, so the sign
    /// applies to nothing.
    pub(crate) fn repair_dangling_sign_occurrence(&mut self, id: TrafficSignID) {
        if self.network.traffic_signs.remove(&id).is_some() {
            info!("Removing {}; its first occurrence is dangling", id);
        }
    }

    /// Fills an element's empty value list with the country default, if the
    /// code has one.
    pub(crate) fn repair_missing_additional_value(&mut self, id: TrafficSignID, element: usize) {
        let country = self.map_name.country;
        let sign = self.network.traffic_sign_mut(id);
        let Some(element) = sign.elements.get_mut(element) else {
            warn!("{} has no element at the reported index", id);
            return;
        };
        if !element.additional_values.is_empty() {
            return;
        }
        match default_additional_value(country, &element.sign_code) {
            Some(value) => element.additional_values.push(value),
            None => warn!(
                "No default value for sign code '{}' in {:?}; leaving {} empty",
                element.sign_code, country, id
            ),
        }
    }

    /// Drops every value that doesn't parse as a finite number. Non-numeric
    /// codes never get reported under this rule, so there's nothing to guard.
    pub(crate) fn repair_invalid_additional_value(&mut self, id: TrafficSignID, element: usize) {
        let sign = self.network.traffic_sign_mut(id);
        let Some(element) = sign.elements.get_mut(element) else {
            warn!("{} has no element at the reported index", id);
            return;
        };
        element
            .additional_values
            .retain(|v| v.parse::<f64>().map(|x| x.is_finite()).unwrap_or(false));
    }

    /// Pulls the sign halfway towards the nearest point on the lanelet's right
    /// boundary. Halfway rather than all the way: the surveyed position still
    /// carries information, it's just implausibly far off.
    pub(crate) fn repair_sign_too_far(&mut self, id: TrafficSignID, lanelet: LaneletID) {
        let Some(l) = self.network.maybe_lanelet(lanelet) else {
            warn!("Can't move {} towards {}; the lanelet is gone", id, lanelet);
            return;
        };
        let position = self.network.traffic_sign(id).position;
        let projected = project_onto_polyline(position, &l.right_vertices);
        self.network.traffic_sign_mut(id).position = Pt3D::center(&[position, projected]);
    }
}
