//! Operations over raw polylines (`&[Pt3D]`). Lanelet boundaries under repair
//! can be temporarily degenerate -- duplicated points, loops, mismatched vertex
//! counts -- so these work on plain point arrays instead of a validated
//! polyline type.

use crate::{Distance, Line, Pt3D};

pub fn polyline_length(pts: &[Pt3D]) -> Distance {
    pts.windows(2)
        .map(|pair| pair[0].dist_to(pair[1]))
        .sum()
}

/// True iff any two non-adjacent segments properly cross. Segments touching at
/// a shared joint don't make a polyline non-simple.
pub fn is_self_intersecting(pts: &[Pt3D]) -> bool {
    let lines: Vec<Line> = pts.windows(2).map(|p| Line::new(p[0], p[1])).collect();
    for i in 0..lines.len() {
        for j in i + 1..lines.len() {
            if lines[i].crosses(&lines[j]) {
                return true;
            }
        }
    }
    false
}

/// Resamples to `n` points evenly spaced by arc length, linearly interpolating
/// along the original segments. Endpoints are preserved.
pub fn resample(pts: &[Pt3D], n: usize) -> Vec<Pt3D> {
    assert!(pts.len() >= 2, "can't resample {} points", pts.len());
    assert!(n >= 2, "can't resample to {} points", n);

    let total = polyline_length(pts);
    if total == Distance::ZERO {
        return vec![pts[0]; n];
    }

    let mut result = Vec::with_capacity(n);
    result.push(pts[0]);
    let mut seg = 0;
    let mut covered = Distance::ZERO;
    for k in 1..n - 1 {
        let target = total * (k as f64 / (n - 1) as f64);
        loop {
            let line = Line::new(pts[seg], pts[seg + 1]);
            let len = line.length();
            if covered + len >= target || seg == pts.len() - 2 {
                let pct = if len == Distance::ZERO {
                    0.0
                } else {
                    (target - covered) / len
                };
                result.push(line.percent_along(pct.clamp(0.0, 1.0)));
                break;
            }
            covered += len;
            seg += 1;
        }
    }
    result.push(*pts.last().unwrap());
    result
}

/// Each vertex's position along the polyline, as a fraction of total arc length
/// in [0, 1].
pub fn arc_length_positions(pts: &[Pt3D]) -> Vec<f64> {
    let total = polyline_length(pts);
    if total == Distance::ZERO {
        return vec![0.0; pts.len()];
    }
    let mut result = Vec::with_capacity(pts.len());
    let mut covered = Distance::ZERO;
    result.push(0.0);
    for pair in pts.windows(2) {
        covered += pair[0].dist_to(pair[1]);
        result.push(covered / total);
    }
    result
}

/// Matches each index of the longer polyline to an index of the shorter one (or
/// -1), by proportional arc-length position. Matching starts with a 1%
/// tolerance and doubles it on each failed pass until every short position
/// resolves; if the tolerance overflows, the leftover short indices are forced
/// onto the tail.
pub fn index_map(long_pcts: &[f64], short_pcts: &[f64]) -> Vec<isize> {
    assert!(long_pcts.len() >= short_pcts.len());

    let mut tolerance = 0.01;
    loop {
        let mut result = vec![-1; long_pcts.len()];
        let mut cursor = 0;
        for (i, pct) in long_pcts.iter().enumerate() {
            if cursor == short_pcts.len() {
                break;
            }
            // Claim this slot only if it's at least as close as the next one,
            // so each short position lands on its nearest long position.
            let closer_than_next = match long_pcts.get(i + 1) {
                Some(next) => (pct - short_pcts[cursor]).abs() <= (next - short_pcts[cursor]).abs(),
                None => true,
            };
            if (pct - short_pcts[cursor]).abs() <= tolerance && closer_than_next {
                result[i] = cursor as isize;
                cursor += 1;
            }
        }
        if cursor == short_pcts.len() {
            return result;
        }

        tolerance *= 2.0;
        if tolerance > 1.0 {
            // Bounded retry exhausted; park the leftover short indices in the
            // last slots still unclaimed, never on top of an earlier match.
            let leftover = short_pcts.len() - cursor;
            let mut open: Vec<usize> = (0..long_pcts.len())
                .rev()
                .filter(|i| result[*i] == -1)
                .take(leftover)
                .collect();
            open.reverse();
            for (k, slot) in open.into_iter().enumerate() {
                result[slot] = (cursor + k) as isize;
            }
            return result;
        }
    }
}

/// Grows `short` to `long.len()` points: every long position without a matching
/// short vertex gets a point interpolated along `short` at that proportional
/// arc-length position. All original short points survive, in order.
pub fn insert_vertices(long: &[Pt3D], short: &[Pt3D]) -> Vec<Pt3D> {
    assert!(long.len() >= short.len());

    let long_pcts = arc_length_positions(long);
    let short_pcts = arc_length_positions(short);
    let mapping = index_map(&long_pcts, &short_pcts);

    let mut result = Vec::with_capacity(long.len());
    for (i, idx) in mapping.iter().enumerate() {
        if *idx >= 0 {
            result.push(short[*idx as usize]);
        } else {
            result.push(pt_at_pct(short, long_pcts[i]));
        }
    }
    result
}

/// Componentwise mean of two equal-length polylines. `reverse_b` traverses `b`
/// back-to-front first, for opposite-direction pairs.
pub fn average(a: &[Pt3D], b: &[Pt3D], reverse_b: bool) -> Vec<Pt3D> {
    assert_eq!(a.len(), b.len());
    a.iter()
        .enumerate()
        .map(|(i, pt_a)| {
            let pt_b = if reverse_b { b[b.len() - 1 - i] } else { b[i] };
            Pt3D::center(&[*pt_a, pt_b])
        })
        .collect()
}

/// The nearest point anywhere on the polyline (not just a vertex).
pub fn project_onto_polyline(pt: Pt3D, pts: &[Pt3D]) -> Pt3D {
    assert!(!pts.is_empty());
    if pts.len() == 1 {
        return pts[0];
    }
    pts.windows(2)
        .map(|pair| Line::new(pair[0], pair[1]).project_pt(pt))
        .min_by_key(|candidate| candidate.dist_to(pt))
        .unwrap()
}

fn pt_at_pct(pts: &[Pt3D], pct: f64) -> Pt3D {
    let total = polyline_length(pts);
    if total == Distance::ZERO {
        return pts[0];
    }
    let target = total * pct.clamp(0.0, 1.0);
    let mut covered = Distance::ZERO;
    for pair in pts.windows(2) {
        let line = Line::new(pair[0], pair[1]);
        let len = line.length();
        if covered + len >= target {
            let pct = if len == Distance::ZERO {
                0.0
            } else {
                (target - covered) / len
            };
            return line.percent_along(pct.clamp(0.0, 1.0));
        }
        covered += len;
    }
    *pts.last().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_preserves_shape() {
        let pts = vec![
            Pt3D::planar(0.0, 0.0),
            Pt3D::planar(10.0, 0.0),
            Pt3D::planar(10.0, 10.0),
        ];
        let result = resample(&pts, 5);
        assert_eq!(result.len(), 5);
        assert_eq!(result[0], pts[0]);
        assert_eq!(result[4], pts[2]);
        // Total length 20, so points every 5m: the midpoint sits on the corner.
        assert_eq!(result[1], Pt3D::planar(5.0, 0.0));
        assert_eq!(result[2], Pt3D::planar(10.0, 0.0));
        assert_eq!(result[3], Pt3D::planar(10.0, 5.0));
    }

    #[test]
    fn insert_vertices_fills_gaps() {
        let long = vec![
            Pt3D::planar(0.0, 1.0),
            Pt3D::planar(1.0, 1.0),
            Pt3D::planar(2.0, 1.0),
        ];
        let short = vec![Pt3D::planar(0.0, 0.0), Pt3D::planar(2.0, 0.0)];
        let result = insert_vertices(&long, &short);
        assert_eq!(
            result,
            vec![
                Pt3D::planar(0.0, 0.0),
                Pt3D::planar(1.0, 0.0),
                Pt3D::planar(2.0, 0.0)
            ]
        );
    }

    #[test]
    fn index_map_tolerates_sloppy_positions() {
        // The short polyline's middle vertex sits at 52%, not 50%; only the
        // doubled tolerance pass resolves it.
        let long = vec![0.0, 0.25, 0.5, 0.75, 1.0];
        let short = vec![0.0, 0.52, 1.0];
        let mapping = index_map(&long, &short);
        assert_eq!(mapping, vec![0, -1, 1, -1, 2]);
    }

    #[test]
    fn index_map_never_drops_a_short_vertex() {
        // The middle short position sits right next to the last one, so the
        // greedy pass claims the final long slot early and the tolerance
        // overflows. The forced fill must land on an unclaimed slot instead of
        // overwriting that match.
        let long = vec![0.0, 0.5, 1.0];
        let short = vec![0.0, 0.96, 1.0];
        let mapping = index_map(&long, &short);
        for k in 0..short.len() {
            assert!(
                mapping.contains(&(k as isize)),
                "short index {} missing from {:?}",
                k,
                mapping
            );
        }
    }

    #[test]
    fn self_intersection_detects_bowtie() {
        let simple = vec![
            Pt3D::planar(0.0, 0.0),
            Pt3D::planar(1.0, 0.0),
            Pt3D::planar(2.0, 1.0),
        ];
        assert!(!is_self_intersecting(&simple));

        let bowtie = vec![
            Pt3D::planar(0.0, 0.0),
            Pt3D::planar(2.0, 2.0),
            Pt3D::planar(2.0, 0.0),
            Pt3D::planar(0.0, 2.0),
        ];
        assert!(is_self_intersecting(&bowtie));
    }

    #[test]
    fn average_can_reverse() {
        let a = vec![Pt3D::planar(0.0, 0.0), Pt3D::planar(2.0, 0.0)];
        let b = vec![Pt3D::planar(2.0, 2.0), Pt3D::planar(0.0, 2.0)];
        assert_eq!(
            average(&a, &b, true),
            vec![Pt3D::planar(0.0, 1.0), Pt3D::planar(2.0, 1.0)]
        );
    }
}
