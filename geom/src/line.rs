use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Distance, Pt3D};

/// A line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt3D, Pt3D);

impl Line {
    pub fn new(pt1: Pt3D, pt2: Pt3D) -> Line {
        Line(pt1, pt2)
    }

    pub fn pt1(&self) -> Pt3D {
        self.0
    }

    pub fn pt2(&self) -> Pt3D {
        self.1
    }

    pub fn length(&self) -> Distance {
        self.pt1().dist_to(self.pt2())
    }

    /// Strict proper-crossing test, projected onto the xy plane. Two segments
    /// that merely touch at a shared endpoint don't count as crossing.
    pub fn crosses(&self, other: &Line) -> bool {
        // From http://bryceboe.com/2006/10/23/line-segment-intersection-algorithm/
        is_counter_clockwise(self.pt1(), other.pt1(), other.pt2())
            != is_counter_clockwise(self.pt2(), other.pt1(), other.pt2())
            && is_counter_clockwise(self.pt1(), self.pt2(), other.pt1())
                != is_counter_clockwise(self.pt1(), self.pt2(), other.pt2())
    }

    /// The point `percent` of the way along this line, componentwise (z included).
    pub fn percent_along(&self, percent: f64) -> Pt3D {
        Pt3D::new(
            self.pt1().x() + percent * (self.pt2().x() - self.pt1().x()),
            self.pt1().y() + percent * (self.pt2().y() - self.pt1().y()),
            self.pt1().z() + percent * (self.pt2().z() - self.pt1().z()),
        )
    }

    pub fn middle(&self) -> Pt3D {
        self.percent_along(0.5)
    }

    /// The closest point on this segment to `pt`. The projection parameter comes
    /// from the xy plane, matching the planar crossing tests.
    pub fn project_pt(&self, pt: Pt3D) -> Pt3D {
        let dx = self.pt2().x() - self.pt1().x();
        let dy = self.pt2().y() - self.pt1().y();
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.pt1();
        }
        let t = ((pt.x() - self.pt1().x()) * dx + (pt.y() - self.pt1().y()) * dy) / len_sq;
        self.percent_along(t.clamp(0.0, 1.0))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line({} to {})", self.pt1(), self.pt2())
    }
}

fn is_counter_clockwise(pt1: Pt3D, pt2: Pt3D, pt3: Pt3D) -> bool {
    (pt3.y() - pt1.y()) * (pt2.x() - pt1.x()) > (pt2.y() - pt1.y()) * (pt3.x() - pt1.x())
}
