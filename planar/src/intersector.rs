//! Segment-segment intersection.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    geom::{Coord, Envelope, LineSegment},
    orientation::orientation_index,
};

/// How computed coordinates get rounded.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum PrecisionModel {
    /// Full double precision; nothing is rounded.
    #[default]
    Floating,
    /// Coordinates are rounded to multiples of `1 / scale`.
    Fixed { scale: f64 },
}

impl PrecisionModel {
    pub fn fixed(scale: f64) -> Result<Self> {
        if scale.is_finite() && scale > 0.0 {
            Ok(PrecisionModel::Fixed { scale })
        } else {
            Err(Error::InvalidArgument(format!(
                "precision scale must be positive and finite, got {scale}"
            )))
        }
    }

    pub fn scale(&self) -> Option<f64> {
        match self {
            PrecisionModel::Floating => None,
            PrecisionModel::Fixed { scale } => Some(*scale),
        }
    }

    pub fn make_precise_value(&self, val: f64) -> f64 {
        match self {
            PrecisionModel::Floating => val,
            PrecisionModel::Fixed { scale } => round_half_up(val * scale) / scale,
        }
    }

    pub fn make_precise(&self, c: Coord) -> Coord {
        Coord::new(self.make_precise_value(c.x), self.make_precise_value(c.y))
    }
}

/// Rounds halves towards positive infinity. Hot pixels use the same rule,
/// so a rounded point is always the centre of its own pixel.
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntersectionKind {
    None,
    /// A single point.
    Point,
    /// A collinear overlap, described by its two endpoints.
    Collinear,
}

/// The result of intersecting two segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub kind: IntersectionKind,
    pts: [Coord; 2],
    proper: bool,
    input: [LineSegment; 2],
}

impl Intersection {
    fn none(input: [LineSegment; 2]) -> Self {
        Intersection {
            kind: IntersectionKind::None,
            pts: [Coord::default(); 2],
            proper: false,
            input,
        }
    }

    pub fn has_intersection(&self) -> bool {
        self.kind != IntersectionKind::None
    }

    /// The number of intersection points: 0, 1, or 2 for a collinear overlap.
    pub fn num(&self) -> usize {
        match self.kind {
            IntersectionKind::None => 0,
            IntersectionKind::Point => 1,
            IntersectionKind::Collinear => 2,
        }
    }

    pub fn points(&self) -> &[Coord] {
        &self.pts[..self.num()]
    }

    pub fn point(&self, idx: usize) -> Coord {
        self.pts[idx]
    }

    /// Is the (single) intersection point strictly interior to both segments?
    pub fn is_proper(&self) -> bool {
        self.has_intersection() && self.proper
    }

    /// Is some intersection point not an endpoint of the given input segment?
    pub fn is_interior_on(&self, input_idx: usize) -> bool {
        let seg = &self.input[input_idx];
        self.points().iter().any(|p| *p != seg.p0 && *p != seg.p1)
    }

    /// Is some intersection point interior to one of the segments?
    pub fn is_interior(&self) -> bool {
        self.is_interior_on(0) || self.is_interior_on(1)
    }
}

/// Computes intersections between pairs of segments.
///
/// This holds no scratch state; every call returns a fresh [`Intersection`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LineIntersector {
    pub precision: PrecisionModel,
}

impl LineIntersector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(precision: PrecisionModel) -> Self {
        LineIntersector { precision }
    }

    /// Intersects the closed segments `p1 -- p2` and `q1 -- q2`.
    pub fn intersect(&self, p1: Coord, p2: Coord, q1: Coord, q2: Coord) -> Intersection {
        let input = [LineSegment::new(p1, p2), LineSegment::new(q1, q2)];
        let mut ret = Intersection::none(input);

        if !Envelope::of_points(p1, p2).intersects(&Envelope::of_points(q1, q2)) {
            return ret;
        }

        let pq1 = orientation_index(p1, p2, q1);
        let pq2 = orientation_index(p1, p2, q2);
        if (pq1 > 0 && pq2 > 0) || (pq1 < 0 && pq2 < 0) {
            return ret;
        }
        let qp1 = orientation_index(q1, q2, p1);
        let qp2 = orientation_index(q1, q2, p2);
        if (qp1 > 0 && qp2 > 0) || (qp1 < 0 && qp2 < 0) {
            return ret;
        }

        if pq1 == 0 && pq2 == 0 && qp1 == 0 && qp2 == 0 {
            return self.collinear(p1, p2, q1, q2, input);
        }

        ret.kind = IntersectionKind::Point;
        if pq1 == 0 || pq2 == 0 || qp1 == 0 || qp2 == 0 {
            // An endpoint touches the other segment. Prefer endpoints that
            // agree exactly, so that the result is always an input vertex.
            ret.pts[0] = if p1 == q1 || p1 == q2 {
                p1
            } else if p2 == q1 || p2 == q2 {
                p2
            } else if pq1 == 0 {
                q1
            } else if pq2 == 0 {
                q2
            } else if qp1 == 0 {
                p1
            } else {
                p2
            };
        } else {
            ret.proper = true;
            ret.pts[0] = self.proper_point(p1, p2, q1, q2);
        }
        ret
    }

    fn collinear(
        &self,
        p1: Coord,
        p2: Coord,
        q1: Coord,
        q2: Coord,
        input: [LineSegment; 2],
    ) -> Intersection {
        let p_env = Envelope::of_points(p1, p2);
        let q_env = Envelope::of_points(q1, q2);
        let q1_in_p = p_env.contains_point(q1);
        let q2_in_p = p_env.contains_point(q2);
        let p1_in_q = q_env.contains_point(p1);
        let p2_in_q = q_env.contains_point(p2);

        let mut ret = Intersection::none(input);
        let (a, b, single) = if q1_in_p && q2_in_p {
            (q1, q2, false)
        } else if p1_in_q && p2_in_q {
            (p1, p2, false)
        } else if q1_in_p && p1_in_q {
            (q1, p1, q1 == p1 && !q2_in_p && !p2_in_q)
        } else if q1_in_p && p2_in_q {
            (q1, p2, q1 == p2 && !q2_in_p && !p1_in_q)
        } else if q2_in_p && p1_in_q {
            (q2, p1, q2 == p1 && !q1_in_p && !p2_in_q)
        } else if q2_in_p && p2_in_q {
            (q2, p2, q2 == p2 && !q1_in_p && !p1_in_q)
        } else {
            return ret;
        };
        ret.pts = [a, b];
        ret.kind = if single || a == b {
            IntersectionKind::Point
        } else {
            IntersectionKind::Collinear
        };
        ret
    }

    fn proper_point(&self, p1: Coord, p2: Coord, q1: Coord, q2: Coord) -> Coord {
        let p_env = Envelope::of_points(p1, p2);
        let q_env = Envelope::of_points(q1, q2);
        let common = p_env.intersection(&q_env);

        let pt = match normalized_line_intersection(p1, p2, q1, q2, common.centre()) {
            Some(pt) if p_env.contains_point(pt) && q_env.contains_point(pt) => pt,
            _ => nearest_endpoint(p1, p2, q1, q2),
        };
        // The segments properly intersect, so `common` is non-empty and the
        // exact answer is inside it. Grid-aligned envelopes stay grid-aligned,
        // so rounding after the clamp keeps the point inside.
        self.precision.make_precise(common.clamp(pt))
    }
}

/// Intersects the infinite lines through the segments, after translating
/// everything so that `centre` is the origin.
fn normalized_line_intersection(
    p1: Coord,
    p2: Coord,
    q1: Coord,
    q2: Coord,
    centre: Coord,
) -> Option<Coord> {
    let shift = |c: Coord| Coord::new(c.x - centre.x, c.y - centre.y);
    let (p1, p2, q1, q2) = (shift(p1), shift(p2), shift(q1), shift(q2));

    // Homogeneous coordinates of the two lines, and their cross product.
    let (px, py, pw) = (p1.y - p2.y, p2.x - p1.x, p1.x * p2.y - p2.x * p1.y);
    let (qx, qy, qw) = (q1.y - q2.y, q2.x - q1.x, q1.x * q2.y - q2.x * q1.y);
    let x = py * qw - qy * pw;
    let y = qx * pw - px * qw;
    let w = px * qy - qx * py;

    let (x, y) = (x / w, y / w);
    if x.is_finite() && y.is_finite() {
        Some(Coord::new(x + centre.x, y + centre.y))
    } else {
        None
    }
}

/// The input endpoint closest to the other segment.
fn nearest_endpoint(p1: Coord, p2: Coord, q1: Coord, q2: Coord) -> Coord {
    let p = LineSegment::new(p1, p2);
    let q = LineSegment::new(q1, q2);
    [
        (p1, q.distance_to(p1)),
        (p2, q.distance_to(p2)),
        (q1, p.distance_to(q1)),
        (q2, p.distance_to(q2)),
    ]
    .into_iter()
    .fold((p1, f64::INFINITY), |best, cand| {
        if cand.1 < best.1 {
            cand
        } else {
            best
        }
    })
    .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tests::{grid_coord, p, Reasonable};
    use malachite::{num::arithmetic::traits::Abs, Rational};
    use proptest::prelude::*;

    fn li() -> LineIntersector {
        LineIntersector::new()
    }

    #[test]
    fn proper_crossing() {
        let int = li().intersect(p(0.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(2.0, 0.0));
        assert_eq!(int.kind, IntersectionKind::Point);
        assert!(int.is_proper());
        assert!(int.is_interior());
        assert_eq!(int.point(0), p(1.0, 1.0));
    }

    #[test]
    fn endpoint_touch() {
        let int = li().intersect(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0), p(1.0, 5.0));
        assert_eq!(int.kind, IntersectionKind::Point);
        assert!(!int.is_proper());
        assert_eq!(int.point(0), p(1.0, 0.0));
        assert!(int.is_interior_on(0));
        assert!(!int.is_interior_on(1));

        let int = li().intersect(p(0.0, 0.0), p(2.0, 0.0), p(2.0, 0.0), p(3.0, 5.0));
        assert_eq!(int.points(), &[p(2.0, 0.0)]);
        assert!(!int.is_interior());
    }

    #[test]
    fn collinear_cases() {
        let int = li().intersect(p(0.0, 0.0), p(4.0, 0.0), p(1.0, 0.0), p(6.0, 0.0));
        assert_eq!(int.kind, IntersectionKind::Collinear);
        assert_eq!(int.points(), &[p(1.0, 0.0), p(4.0, 0.0)]);

        // Touching collinear segments meet in a single point.
        let int = li().intersect(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 0.0), p(2.0, 0.0));
        assert_eq!(int.kind, IntersectionKind::Point);
        assert_eq!(int.points(), &[p(1.0, 0.0)]);

        let int = li().intersect(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0));
        assert_eq!(int.kind, IntersectionKind::None);
    }

    #[test]
    fn disjoint() {
        let int = li().intersect(p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(0.4, 0.6));
        assert!(!int.has_intersection());
        assert_eq!(int.points(), &[]);
    }

    #[test]
    fn fixed_precision_rounds() {
        let li = LineIntersector::with_precision(PrecisionModel::fixed(1.0).unwrap());
        // The exact crossing is (1.5, 0.5); halves round up.
        let int = li.intersect(p(0.0, 0.0), p(3.0, 1.0), p(0.0, 1.0), p(3.0, 0.0));
        assert_eq!(int.point(0), p(2.0, 1.0));
        assert!(PrecisionModel::fixed(0.0).is_err());
        assert!(PrecisionModel::fixed(f64::NAN).is_err());
    }

    fn exact(c: f64) -> Rational {
        Rational::try_from(c).unwrap()
    }

    proptest! {
        #[test]
        fn point_in_both_envelopes(s in LineSegment::reasonable(), t in LineSegment::reasonable()) {
            let int = li().intersect(s.p0, s.p1, t.p0, t.p1);
            if int.kind == IntersectionKind::Point {
                let pt = int.point(0);
                prop_assert!(s.envelope().contains_point(pt));
                prop_assert!(t.envelope().contains_point(pt));
            }
        }

        #[test]
        fn grid_crossings_are_accurate(a in grid_coord(100), b in grid_coord(100), c in grid_coord(100), d in grid_coord(100)) {
            let int = li().intersect(a, b, c, d);
            if int.is_proper() {
                // Solve exactly, and compare.
                let (ax, ay, bx, by) = (exact(a.x), exact(a.y), exact(b.x), exact(b.y));
                let (cx, cy, dx, dy) = (exact(c.x), exact(c.y), exact(d.x), exact(d.y));
                let den = (&bx - &ax) * (&dy - &cy) - (&by - &ay) * (&dx - &cx);
                let t = ((&cx - &ax) * (&dy - &cy) - (&cy - &ay) * (&dx - &cx)) / den;
                let x = &ax + &t * (&bx - &ax);
                let y = &ay + &t * (&by - &ay);
                let err_x = (exact(int.point(0).x) - x).abs();
                let err_y = (exact(int.point(0).y) - y).abs();
                let tol = exact(1e-9);
                prop_assert!(err_x < tol && err_y < tol);
            }
        }

        #[test]
        fn symmetric_kind(s in LineSegment::reasonable(), t in LineSegment::reasonable()) {
            let st = li().intersect(s.p0, s.p1, t.p0, t.p1);
            let ts = li().intersect(t.p0, t.p1, s.p0, s.p1);
            prop_assert_eq!(st.kind, ts.kind);
            prop_assert_eq!(st.is_proper(), ts.is_proper());
        }
    }
}
