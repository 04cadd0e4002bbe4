//! Repairs for the shape of a single lanelet's boundaries.

use geom::{insert_vertices, resample, Line, Pt3D, EPSILON_DIST};

use crate::repair::RepairSession;
use crate::{LaneletID, Side};

// An interior vertex whose incoming and outgoing directions differ by within
// this of a half-turn is a spike.
const SPIKE_EPSILON_RADIANS: f64 = 0.01;

impl RepairSession<'_> {
    /// Grows the shorter boundary to match the longer one, leaving the longer
    /// one untouched.
    pub(crate) fn repair_unequal_vertex_counts(&mut self, id: LaneletID) {
        let lanelet = self.network.lanelet_mut(id);
        let n_left = lanelet.left_vertices.len();
        let n_right = lanelet.right_vertices.len();
        if n_left == n_right {
            return;
        }
        if n_left > n_right {
            lanelet.right_vertices = insert_vertices(&lanelet.left_vertices, &lanelet.right_vertices);
        } else {
            lanelet.left_vertices = insert_vertices(&lanelet.right_vertices, &lanelet.left_vertices);
        }
        lanelet.recompute_center_vertices();
    }

    /// A boundary with fewer than 2 distinct points can't be repaired into a
    /// lane; the lanelet goes away entirely.
    pub(crate) fn repair_degenerate_lanelet(&mut self, id: LaneletID) {
        if self.network.lanelets.remove(&id).is_some() {
            info!("Removing degenerate {}", id);
        }
    }

    /// Makes one boundary simple again: excise the loops its crossings form,
    /// resample back to the original vertex count, then smooth out any spikes
    /// the resampling re-created.
    pub(crate) fn repair_self_intersection(&mut self, id: LaneletID, side: Side) {
        let lanelet = self.network.lanelet_mut(id);
        let pts = lanelet.boundary_mut(side);
        let original_count = pts.len();

        excise_loops(pts);
        if pts.len() < original_count {
            *pts = resample(pts, original_count);
        }
        remove_spikes(pts);
        lanelet.recompute_center_vertices();
    }

    /// Untangles the left and right boundary of one lanelet crossing each
    /// other. A degenerate shared start or end point is nudged apart first;
    /// each remaining crossing is resolved by exchanging the two segments'
    /// destination points.
    pub(crate) fn repair_boundaries_intersection(&mut self, id: LaneletID) {
        let lanelet = self.network.lanelet_mut(id);
        if lanelet.left_vertices.len() < 2 || lanelet.right_vertices.len() < 2 {
            warn!("{} is too degenerate to untangle boundaries", id);
            return;
        }

        if lanelet.left_vertices[0].approx_eq(lanelet.right_vertices[0], EPSILON_DIST) {
            let left_pt = lanelet.left_vertices[0];
            let right_pt = lanelet.right_vertices[0];
            lanelet.left_vertices[0] = nudge_away(left_pt, lanelet.right_vertices[1]);
            lanelet.right_vertices[0] = nudge_away(right_pt, lanelet.left_vertices[1]);
        }
        let last_l = lanelet.left_vertices.len() - 1;
        let last_r = lanelet.right_vertices.len() - 1;
        if lanelet.left_vertices[last_l].approx_eq(lanelet.right_vertices[last_r], EPSILON_DIST) {
            let left_pt = lanelet.left_vertices[last_l];
            let right_pt = lanelet.right_vertices[last_r];
            lanelet.left_vertices[last_l] = nudge_away(left_pt, lanelet.right_vertices[last_r - 1]);
            lanelet.right_vertices[last_r] = nudge_away(right_pt, lanelet.left_vertices[last_l - 1]);
        }

        for ri in 0..lanelet.right_vertices.len() - 1 {
            for lj in 0..lanelet.left_vertices.len() - 1 {
                let right_seg = Line::new(lanelet.right_vertices[ri], lanelet.right_vertices[ri + 1]);
                let left_seg = Line::new(lanelet.left_vertices[lj], lanelet.left_vertices[lj + 1]);
                if right_seg.crosses(&left_seg) {
                    let tmp = lanelet.right_vertices[ri + 1];
                    lanelet.right_vertices[ri + 1] = lanelet.left_vertices[lj + 1];
                    lanelet.left_vertices[lj + 1] = tmp;
                }
            }
        }
        lanelet.recompute_center_vertices();
    }

    /// The two boundaries are each fine, just labelled backwards.
    pub(crate) fn repair_swapped_boundaries(&mut self, id: LaneletID) {
        let lanelet = self.network.lanelet_mut(id);
        std::mem::swap(&mut lanelet.left_vertices, &mut lanelet.right_vertices);
        lanelet.recompute_center_vertices();
    }
}

/// Repeatedly finds the first proper crossing between segments (i, j > i+1) and
/// deletes the points strictly inside the loop they form, restarting the scan
/// on the shortened array. Adjacent segments touching at their shared joint are
/// not crossings.
fn excise_loops(pts: &mut Vec<Pt3D>) {
    'scan: loop {
        for i in 0..pts.len().saturating_sub(1) {
            for j in (i + 2)..pts.len() - 1 {
                let seg_i = Line::new(pts[i], pts[i + 1]);
                let seg_j = Line::new(pts[j], pts[j + 1]);
                if seg_i.crosses(&seg_j) {
                    pts.drain(i + 1..j);
                    continue 'scan;
                }
            }
        }
        return;
    }
}

/// Replaces any interior vertex that folds the polyline back on itself (turn
/// angle within SPIKE_EPSILON_RADIANS of a half-turn, or a duplicated point)
/// with the midpoint of its neighbors, until none remain.
fn remove_spikes(pts: &mut [Pt3D]) {
    if pts.len() < 3 {
        return;
    }
    loop {
        let mut changed = false;
        for i in 1..pts.len() - 1 {
            let spike = match turn_angle(pts[i - 1], pts[i], pts[i + 1]) {
                Some(angle) => angle > std::f64::consts::PI - SPIKE_EPSILON_RADIANS,
                // A zero-length segment is as degenerate as a full fold-back.
                None => true,
            };
            if spike {
                let midpoint = Line::new(pts[i - 1], pts[i + 1]).middle();
                if midpoint != pts[i] {
                    pts[i] = midpoint;
                    changed = true;
                }
            }
        }
        if !changed {
            return;
        }
    }
}

/// The angle in [0, π] between directions (b - a) and (c - b), in the xy plane.
/// None if either direction is zero-length.
fn turn_angle(a: Pt3D, b: Pt3D, c: Pt3D) -> Option<f64> {
    let (v1x, v1y) = (b.x() - a.x(), b.y() - a.y());
    let (v2x, v2y) = (c.x() - b.x(), c.y() - b.y());
    let len1 = v1x.hypot(v1y);
    let len2 = v2x.hypot(v2y);
    if len1 == 0.0 || len2 == 0.0 {
        return None;
    }
    let cos = ((v1x * v2x + v1y * v2y) / (len1 * len2)).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Moves `pt` 1% further along the vector from `other` to `pt`.
fn nudge_away(pt: Pt3D, other: Pt3D) -> Pt3D {
    pt.offset(
        0.01 * (pt.x() - other.x()),
        0.01 * (pt.y() - other.y()),
        0.01 * (pt.z() - other.z()),
    )
}
