//! Raw offset curves.
//!
//! A raw offset curve is a closed ring of points at the buffer distance from
//! the input, built one segment at a time. It is allowed to cross itself: the
//! depth engine sorts out which parts of it bound the buffer.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::{
    geom::{Coord, LineSegment},
    graph::Position,
    intersector::{LineIntersector, PrecisionModel},
    orientation::{orientation, Orientation},
};

use super::{
    params::{BufferParameters, EndCapStyle, JoinStyle},
    simplify::BufferInputLineSimplifier,
};

/// Outside turns whose offset endpoints are closer than this (relative to the
/// distance) get a single vertex instead of a join.
const OFFSET_SEGMENT_SEPARATION_FACTOR: f64 = 1.0e-3;
/// Same, for inside turns whose offset segments don't meet.
const INSIDE_TURN_VERTEX_SNAP_DISTANCE_FACTOR: f64 = 1.0e-3;
/// Curve vertices closer than this (relative to the distance) are dropped.
const CURVE_VERTEX_SNAP_DISTANCE_FACTOR: f64 = 1.0e-6;
/// How far the closing segments of an inside turn reach back towards the
/// input vertex, as a fraction `1 / (factor + 1)` of the offset.
const MAX_CLOSING_SEG_LEN_FACTOR: f64 = 80.0;
/// Input lines are simplified with tolerance `distance / SIMPLIFY_FACTOR`.
const SIMPLIFY_FACTOR: f64 = 100.0;

/// The points of a curve under construction.
#[derive(Clone, Debug)]
struct OffsetSegmentString {
    pts: Vec<Coord>,
    precision: PrecisionModel,
    min_vertex_distance: f64,
}

impl OffsetSegmentString {
    fn add_pt(&mut self, pt: Coord) {
        let pt = self.precision.make_precise(pt);
        if let Some(last) = self.pts.last() {
            if pt.distance(last) < self.min_vertex_distance {
                return;
            }
        }
        self.pts.push(pt);
    }

    fn add_pts(&mut self, pts: &[Coord], forward: bool) {
        if forward {
            pts.iter().for_each(|p| self.add_pt(*p));
        } else {
            pts.iter().rev().for_each(|p| self.add_pt(*p));
        }
    }

    fn close_ring(&mut self) {
        if let (Some(first), Some(last)) = (self.pts.first(), self.pts.last()) {
            if first != last {
                self.pts.push(*first);
            }
        }
    }
}

/// Generates the segments of one offset curve, one input vertex at a time.
///
/// The generator keeps a window of the last three input points `s0, s1, s2`
/// and the offsets of the two segments between them; each new input point
/// adds the join at `s1`.
#[derive(Clone, Debug)]
pub struct OffsetSegmentGenerator {
    params: BufferParameters,
    distance: f64,
    fillet_angle_quantum: f64,
    closing_seg_length_factor: f64,
    li: LineIntersector,
    seg_list: OffsetSegmentString,
    s0: Coord,
    s1: Coord,
    s2: Coord,
    seg0: LineSegment,
    seg1: LineSegment,
    offset0: LineSegment,
    offset1: LineSegment,
    side: Position,
    has_narrow_concave_angle: bool,
}

impl OffsetSegmentGenerator {
    pub fn new(precision: PrecisionModel, params: BufferParameters, distance: f64) -> Self {
        let closing_seg_length_factor =
            if params.quadrant_segments >= 8 && params.join_style == JoinStyle::Round {
                MAX_CLOSING_SEG_LEN_FACTOR
            } else {
                1.0
            };
        let zero = LineSegment::new(Coord::default(), Coord::default());
        OffsetSegmentGenerator {
            params,
            distance,
            fillet_angle_quantum: FRAC_PI_2 / params.quadrant_segments.max(1) as f64,
            closing_seg_length_factor,
            li: LineIntersector::new(),
            seg_list: OffsetSegmentString {
                pts: Vec::new(),
                precision,
                min_vertex_distance: distance * CURVE_VERTEX_SNAP_DISTANCE_FACTOR,
            },
            s0: Coord::default(),
            s1: Coord::default(),
            s2: Coord::default(),
            seg0: zero,
            seg1: zero,
            offset0: zero,
            offset1: zero,
            side: Position::Left,
            has_narrow_concave_angle: false,
        }
    }

    /// Whether some inside turn was so sharp that its offset segments didn't
    /// meet, and had to be closed off through the input vertex.
    pub fn has_narrow_concave_angle(&self) -> bool {
        self.has_narrow_concave_angle
    }

    pub fn into_coords(self) -> Vec<Coord> {
        self.seg_list.pts
    }

    pub fn close_ring(&mut self) {
        self.seg_list.close_ring();
    }

    pub fn add_segments(&mut self, pts: &[Coord], forward: bool) {
        self.seg_list.add_pts(pts, forward);
    }

    /// Starts a new side, with `s1 -> s2` as the first segment.
    pub fn init_side_segments(&mut self, s1: Coord, s2: Coord, side: Position) {
        self.s1 = s1;
        self.s2 = s2;
        self.side = side;
        self.seg1 = LineSegment::new(s1, s2);
        self.offset1 = offset_segment(&self.seg1, side, self.distance);
    }

    pub fn add_first_segment(&mut self) {
        self.seg_list.add_pt(self.offset1.p0);
    }

    pub fn add_last_segment(&mut self) {
        self.seg_list.add_pt(self.offset1.p1);
    }

    /// Moves the window on to `p`, adding the join at the old `s2`.
    pub fn add_next_segment(&mut self, p: Coord, add_start_point: bool) {
        self.s0 = self.s1;
        self.s1 = self.s2;
        self.s2 = p;
        self.seg0 = LineSegment::new(self.s0, self.s1);
        self.offset0 = offset_segment(&self.seg0, self.side, self.distance);
        self.seg1 = LineSegment::new(self.s1, self.s2);
        self.offset1 = offset_segment(&self.seg1, self.side, self.distance);

        if self.s1 == self.s2 {
            return;
        }
        let orient = orientation(self.s0, self.s1, self.s2);
        let outside_turn = (orient == Orientation::Right && self.side == Position::Left)
            || (orient == Orientation::Left && self.side == Position::Right);
        if orient == Orientation::Collinear {
            self.add_collinear(add_start_point);
        } else if outside_turn {
            self.add_outside_turn(orient, add_start_point);
        } else {
            self.add_inside_turn();
        }
    }

    // Only does anything if the line doubles back on itself.
    fn add_collinear(&mut self, add_start_point: bool) {
        let int = self.li.intersect(self.s0, self.s1, self.s1, self.s2);
        if int.num() < 2 {
            return;
        }
        match self.params.join_style {
            JoinStyle::Bevel | JoinStyle::Mitre => {
                if add_start_point {
                    self.seg_list.add_pt(self.offset0.p1);
                }
                self.seg_list.add_pt(self.offset1.p0);
            }
            JoinStyle::Round => {
                self.add_fillet(
                    self.s1,
                    self.offset0.p1,
                    self.offset1.p0,
                    Orientation::Right,
                    self.distance,
                );
            }
        }
    }

    fn add_outside_turn(&mut self, orient: Orientation, add_start_point: bool) {
        if self.offset0.p1.distance(&self.offset1.p0)
            < self.distance * OFFSET_SEGMENT_SEPARATION_FACTOR
        {
            self.seg_list.add_pt(self.offset0.p1);
            return;
        }
        match self.params.join_style {
            JoinStyle::Mitre => self.add_mitre_join(),
            JoinStyle::Bevel => {
                self.seg_list.add_pt(self.offset0.p1);
                self.seg_list.add_pt(self.offset1.p0);
            }
            JoinStyle::Round => {
                if add_start_point {
                    self.seg_list.add_pt(self.offset0.p1);
                }
                self.add_fillet(self.s1, self.offset0.p1, self.offset1.p0, orient, self.distance);
                self.seg_list.add_pt(self.offset1.p0);
            }
        }
    }

    fn add_inside_turn(&mut self) {
        let int = self.li.intersect(
            self.offset0.p0,
            self.offset0.p1,
            self.offset1.p0,
            self.offset1.p1,
        );
        if int.has_intersection() {
            self.seg_list.add_pt(int.point(0));
            return;
        }

        // The offset segments are too short to meet. Go back towards the
        // input vertex and out again, so that the curve stays connected.
        self.has_narrow_concave_angle = true;
        self.seg_list.add_pt(self.offset0.p1);
        if self.offset0.p1.distance(&self.offset1.p0)
            < self.distance * INSIDE_TURN_VERTEX_SNAP_DISTANCE_FACTOR
        {
            return;
        }
        if self.closing_seg_length_factor > 0.0 {
            let f = self.closing_seg_length_factor;
            let towards = |p: Coord, q: Coord| Coord::new((f * p.x + q.x) / (f + 1.0), (f * p.y + q.y) / (f + 1.0));
            self.seg_list.add_pt(towards(self.offset0.p1, self.s1));
            self.seg_list.add_pt(towards(self.offset1.p0, self.s1));
        } else {
            self.seg_list.add_pt(self.s1);
        }
        self.seg_list.add_pt(self.offset1.p0);
    }

    /// Adds the end cap at `p1` of the segment `p0 -> p1`, going from the
    /// left side of the line to the right side.
    pub fn add_line_end_cap(&mut self, p0: Coord, p1: Coord) {
        let seg = LineSegment::new(p0, p1);
        let offset_l = offset_segment(&seg, Position::Left, self.distance);
        let offset_r = offset_segment(&seg, Position::Right, self.distance);
        let angle = (p1.y - p0.y).atan2(p1.x - p0.x);
        match self.params.end_cap_style {
            EndCapStyle::Round => {
                self.seg_list.add_pt(offset_l.p1);
                self.add_fillet_arc(
                    p1,
                    angle + FRAC_PI_2,
                    angle - FRAC_PI_2,
                    Orientation::Right,
                    self.distance,
                );
                self.seg_list.add_pt(offset_r.p1);
            }
            EndCapStyle::Flat => {
                self.seg_list.add_pt(offset_l.p1);
                self.seg_list.add_pt(offset_r.p1);
            }
            EndCapStyle::Square => {
                let dx = self.distance.abs() * angle.cos();
                let dy = self.distance.abs() * angle.sin();
                self.seg_list
                    .add_pt(Coord::new(offset_l.p1.x + dx, offset_l.p1.y + dy));
                self.seg_list
                    .add_pt(Coord::new(offset_r.p1.x + dx, offset_r.p1.y + dy));
            }
        }
    }

    fn add_mitre_join(&mut self) {
        let p = self.s1;
        let within_limit = line_intersection(
            self.offset0.p0,
            self.offset0.p1,
            self.offset1.p0,
            self.offset1.p1,
        )
        .filter(|int| {
            let ratio = if self.distance <= 0.0 {
                1.0
            } else {
                int.distance(&p) / self.distance.abs()
            };
            ratio <= self.params.mitre_limit
        });
        match within_limit {
            Some(int) => self.seg_list.add_pt(int),
            None => self.add_limited_mitre_join(),
        }
    }

    // A mitre join cut off square at the mitre limit.
    fn add_limited_mitre_join(&mut self) {
        let base = self.seg0.p1;
        let ang0 = angle(base, self.seg0.p0);
        let ang_diff = angle_between_oriented(self.seg0.p0, base, self.seg1.p1);
        let ang_diff_half = ang_diff / 2.0;
        let mid_ang = normalize_angle(ang0 + ang_diff_half);
        let mitre_mid_ang = normalize_angle(mid_ang + PI);

        let mitre_dist = self.params.mitre_limit * self.distance;
        let bevel_delta = mitre_dist * ang_diff_half.sin().abs();
        let bevel_half_len = self.distance - bevel_delta;

        let bevel_mid = Coord::new(
            base.x + mitre_dist * mitre_mid_ang.cos(),
            base.y + mitre_dist * mitre_mid_ang.sin(),
        );
        let mitre_mid_line = LineSegment::new(base, bevel_mid);
        let left = mitre_mid_line.point_along_offset(1.0, bevel_half_len);
        let right = mitre_mid_line.point_along_offset(1.0, -bevel_half_len);
        if self.side == Position::Left {
            self.seg_list.add_pt(left);
            self.seg_list.add_pt(right);
        } else {
            self.seg_list.add_pt(right);
            self.seg_list.add_pt(left);
        }
    }

    /// Adds an arc around `p` from `p0` to `p1`, endpoints included.
    fn add_fillet(&mut self, p: Coord, p0: Coord, p1: Coord, direction: Orientation, radius: f64) {
        let mut start = (p0.y - p.y).atan2(p0.x - p.x);
        let end = (p1.y - p.y).atan2(p1.x - p.x);
        if direction == Orientation::Right {
            if start <= end {
                start += 2.0 * PI;
            }
        } else if start >= end {
            start -= 2.0 * PI;
        }
        self.seg_list.add_pt(p0);
        self.add_fillet_arc(p, start, end, direction, radius);
        self.seg_list.add_pt(p1);
    }

    // The points strictly before `end` of an arc from `start`, spaced at
    // (roughly) the fillet angle quantum.
    fn add_fillet_arc(&mut self, p: Coord, start: f64, end: f64, direction: Orientation, radius: f64) {
        let direction_factor = if direction == Orientation::Right { -1.0 } else { 1.0 };
        let total = (start - end).abs();
        let n_segs = (total / self.fillet_angle_quantum + 0.5) as u32;
        if n_segs < 1 {
            return;
        }
        let inc = total / n_segs as f64;
        for i in 0..n_segs {
            let a = start + direction_factor * inc * i as f64;
            self.seg_list
                .add_pt(Coord::new(p.x + radius * a.cos(), p.y + radius * a.sin()));
        }
    }

    /// A clockwise circle around `p`.
    pub fn create_circle(&mut self, p: Coord) {
        self.seg_list.add_pt(Coord::new(p.x + self.distance, p.y));
        self.add_fillet_arc(p, 0.0, 2.0 * PI, Orientation::Right, self.distance);
        self.seg_list.close_ring();
    }

    /// A clockwise, axis-aligned square around `p`.
    pub fn create_square(&mut self, p: Coord) {
        let d = self.distance;
        self.seg_list.add_pt(Coord::new(p.x + d, p.y + d));
        self.seg_list.add_pt(Coord::new(p.x + d, p.y - d));
        self.seg_list.add_pt(Coord::new(p.x - d, p.y - d));
        self.seg_list.add_pt(Coord::new(p.x - d, p.y + d));
        self.seg_list.close_ring();
    }
}

/// The segment `seg` moved `distance` to its left or right.
fn offset_segment(seg: &LineSegment, side: Position, distance: f64) -> LineSegment {
    let sign = if side == Position::Left { 1.0 } else { -1.0 };
    let dx = seg.p1.x - seg.p0.x;
    let dy = seg.p1.y - seg.p0.y;
    let len = dx.hypot(dy);
    let ux = sign * distance * dx / len;
    let uy = sign * distance * dy / len;
    LineSegment::new(
        Coord::new(seg.p0.x - uy, seg.p0.y + ux),
        Coord::new(seg.p1.x - uy, seg.p1.y + ux),
    )
}

/// Where the lines through `p1, p2` and `q1, q2` cross, if they do.
fn line_intersection(p1: Coord, p2: Coord, q1: Coord, q2: Coord) -> Option<Coord> {
    // In homogeneous coordinates, each line is the cross product of its
    // points, and the intersection is the cross product of the lines.
    let (px, py, pw) = (p1.y - p2.y, p2.x - p1.x, p1.x * p2.y - p2.x * p1.y);
    let (qx, qy, qw) = (q1.y - q2.y, q2.x - q1.x, q1.x * q2.y - q2.x * q1.y);
    let x = py * qw - qy * pw;
    let y = qx * pw - px * qw;
    let w = px * qy - qx * py;
    let ret = Coord::new(x / w, y / w);
    ret.is_finite().then_some(ret)
}

fn angle(p0: Coord, p1: Coord) -> f64 {
    (p1.y - p0.y).atan2(p1.x - p0.x)
}

// The angle from `tail -> tip0` to `tail -> tip1`, in (-pi, pi].
fn angle_between_oriented(tip0: Coord, tail: Coord, tip1: Coord) -> f64 {
    normalize_angle(angle(tail, tip1) - angle(tail, tip0))
}

fn normalize_angle(mut a: f64) -> f64 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// Builds the raw offset curves of points, lines and rings.
#[derive(Clone, Copy, Debug, Default)]
pub struct OffsetCurveBuilder {
    precision: PrecisionModel,
    params: BufferParameters,
}

impl OffsetCurveBuilder {
    pub fn new(precision: PrecisionModel, params: BufferParameters) -> Self {
        OffsetCurveBuilder { precision, params }
    }

    pub fn params(&self) -> &BufferParameters {
        &self.params
    }

    fn generator(&self, distance: f64) -> OffsetSegmentGenerator {
        OffsetSegmentGenerator::new(self.precision, self.params, distance)
    }

    /// The closed curve around a line (or a point, if `pts` has one
    /// element). `None` if the buffer is empty.
    pub fn line_curve(&self, pts: &[Coord], distance: f64) -> Option<Vec<Coord>> {
        if distance == 0.0 || (distance < 0.0 && !self.params.single_sided) || pts.is_empty() {
            return None;
        }
        let mut gen = self.generator(distance.abs());
        if pts.len() == 1 {
            self.point_curve(pts[0], &mut gen);
        } else if self.params.single_sided {
            self.single_sided_curve(pts, distance, &mut gen);
        } else {
            self.line_buffer_curve(pts, distance, &mut gen);
        }
        Some(gen.into_coords())
    }

    /// The curve offset from a closed ring on one side. A zero distance gives
    /// back the ring itself.
    pub fn ring_curve(&self, pts: &[Coord], side: Position, distance: f64) -> Option<Vec<Coord>> {
        if pts.len() <= 2 {
            return self.line_curve(pts, distance);
        }
        if distance == 0.0 {
            return Some(pts.to_vec());
        }
        let mut gen = self.generator(distance);
        let tol = if side == Position::Right {
            -distance / SIMPLIFY_FACTOR
        } else {
            distance / SIMPLIFY_FACTOR
        };
        let simp = BufferInputLineSimplifier::simplify(pts, tol);
        let n = simp.len() - 1;
        gen.init_side_segments(simp[n - 1], simp[0], side);
        for (i, p) in simp.iter().enumerate().skip(1) {
            gen.add_next_segment(*p, i != 1);
        }
        gen.close_ring();
        Some(gen.into_coords())
    }

    /// The open curve at `distance` from a line: on the left for positive
    /// distances, on the right for negative ones. Either way, it runs in the
    /// same direction as the line.
    pub fn offset_curve(&self, pts: &[Coord], distance: f64) -> Option<Vec<Coord>> {
        if distance == 0.0 || pts.is_empty() {
            return None;
        }
        let right = distance < 0.0;
        let dist = distance.abs();
        let mut gen = self.generator(dist);
        if pts.len() == 1 {
            self.point_curve(pts[0], &mut gen);
            return Some(gen.into_coords());
        }
        let tol = dist / SIMPLIFY_FACTOR;
        if right {
            let simp = BufferInputLineSimplifier::simplify(pts, -tol);
            let n = simp.len() - 1;
            gen.init_side_segments(simp[n], simp[n - 1], Position::Left);
            gen.add_first_segment();
            for p in simp[..n - 1].iter().rev() {
                gen.add_next_segment(*p, true);
            }
        } else {
            let simp = BufferInputLineSimplifier::simplify(pts, tol);
            gen.init_side_segments(simp[0], simp[1], Position::Left);
            gen.add_first_segment();
            for p in &simp[2..] {
                gen.add_next_segment(*p, true);
            }
        }
        gen.add_last_segment();
        let mut ret = gen.into_coords();
        if right {
            ret.reverse();
        }
        Some(ret)
    }

    fn point_curve(&self, p: Coord, gen: &mut OffsetSegmentGenerator) {
        match self.params.end_cap_style {
            EndCapStyle::Round => gen.create_circle(p),
            EndCapStyle::Square => gen.create_square(p),
            EndCapStyle::Flat => {}
        }
    }

    // Left side forwards, the far cap, the right side backwards (as the left
    // side of the reversed line), then the near cap.
    fn line_buffer_curve(&self, pts: &[Coord], distance: f64, gen: &mut OffsetSegmentGenerator) {
        let tol = distance / SIMPLIFY_FACTOR;

        let simp = BufferInputLineSimplifier::simplify(pts, tol);
        let n = simp.len() - 1;
        gen.init_side_segments(simp[0], simp[1], Position::Left);
        for p in &simp[2..] {
            gen.add_next_segment(*p, true);
        }
        gen.add_last_segment();
        gen.add_line_end_cap(simp[n - 1], simp[n]);

        let simp = BufferInputLineSimplifier::simplify(pts, -tol);
        let n = simp.len() - 1;
        gen.init_side_segments(simp[n], simp[n - 1], Position::Left);
        for p in simp[..n - 1].iter().rev() {
            gen.add_next_segment(*p, true);
        }
        gen.add_last_segment();
        gen.add_line_end_cap(simp[1], simp[0]);

        gen.close_ring();
    }

    // The line itself closes the curve off on the other side.
    fn single_sided_curve(&self, pts: &[Coord], distance: f64, gen: &mut OffsetSegmentGenerator) {
        let tol = distance.abs() / SIMPLIFY_FACTOR;
        if distance < 0.0 {
            gen.add_segments(pts, true);
            let simp = BufferInputLineSimplifier::simplify(pts, -tol);
            let n = simp.len() - 1;
            gen.init_side_segments(simp[n], simp[n - 1], Position::Left);
            gen.add_first_segment();
            for p in simp[..n - 1].iter().rev() {
                gen.add_next_segment(*p, true);
            }
        } else {
            gen.add_segments(pts, false);
            let simp = BufferInputLineSimplifier::simplify(pts, tol);
            gen.init_side_segments(simp[0], simp[1], Position::Left);
            gen.add_first_segment();
            for p in &simp[2..] {
                gen.add_next_segment(*p, true);
            }
        }
        gen.add_last_segment();
        gen.close_ring();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{
        is_ccw, signed_area,
        tests::{p, ring},
    };

    fn builder(params: BufferParameters) -> OffsetCurveBuilder {
        OffsetCurveBuilder::new(PrecisionModel::Floating, params)
    }

    #[test]
    fn offset_segments() {
        let seg = LineSegment::new(p(0.0, 0.0), p(2.0, 0.0));
        let left = offset_segment(&seg, Position::Left, 1.0);
        assert_eq!((left.p0, left.p1), (p(0.0, 1.0), p(2.0, 1.0)));
        let right = offset_segment(&seg, Position::Right, 1.0);
        assert_eq!((right.p0, right.p1), (p(0.0, -1.0), p(2.0, -1.0)));
    }

    #[test]
    fn homogeneous_intersection() {
        assert_eq!(
            line_intersection(p(0.0, 0.0), p(1.0, 1.0), p(0.0, 2.0), p(1.0, 1.0)),
            Some(p(1.0, 1.0))
        );
        assert_eq!(
            line_intersection(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)),
            None
        );
    }

    #[test]
    fn circle_around_a_point() {
        let b = builder(BufferParameters::default());
        let circle = b.line_curve(&[p(0.0, 0.0)], 1.0).unwrap();
        // Four quadrants of eight segments, closed.
        assert_eq!(circle.len(), 33);
        assert_eq!(circle.first(), circle.last());
        assert!(!is_ccw(&circle));
        for c in &circle {
            assert!((c.distance(&p(0.0, 0.0)) - 1.0).abs() < 1e-12);
        }

        let square = builder(BufferParameters::default().with_end_cap_style(EndCapStyle::Square))
            .line_curve(&[p(0.0, 0.0)], 1.0)
            .unwrap();
        assert_eq!(signed_area(&square), -4.0);

        let flat = builder(BufferParameters::default().with_end_cap_style(EndCapStyle::Flat))
            .line_curve(&[p(0.0, 0.0)], 1.0)
            .unwrap();
        assert!(flat.is_empty());
    }

    #[test]
    fn flat_capped_segment() {
        let b = builder(BufferParameters::default().with_end_cap_style(EndCapStyle::Flat));
        let curve = b.line_curve(&ring(&[(0.0, 0.0), (4.0, 0.0)]), 1.0).unwrap();
        // The far cap, then the near one.
        insta::assert_debug_snapshot!(curve, @r###"
        [
            (4.0, 1.0),
            (4.0, -1.0),
            (0.0, -1.0),
            (0.0, 1.0),
            (4.0, 1.0),
        ]
        "###);
        assert!(b.line_curve(&ring(&[(0.0, 0.0), (4.0, 0.0)]), -1.0).is_none());
    }

    #[test]
    fn flat_cap_is_square_to_the_first_segment() {
        // The first vertex after the start is a shallow right turn, well
        // within the simplification tolerance.
        let b = builder(BufferParameters::default().with_end_cap_style(EndCapStyle::Flat));
        let curve = b
            .line_curve(&ring(&[(0.0, 0.0), (1.0, 0.005), (10.0, 0.0)]), 1.0)
            .unwrap();

        let len = 1.0f64.hypot(0.005);
        let (ux, uy) = (1.0 / len, 0.005 / len);
        let near = |q: Coord| curve.iter().position(|c| c.distance(&q) < 1e-12);
        let right = near(p(uy, -ux)).unwrap();
        let left = near(p(-uy, ux)).unwrap();
        // The cap runs from the right side to the left side, and the ring
        // closes right after it.
        assert_eq!(left, right + 1);
        let (a, c) = (curve[right], curve[left]);
        assert!(((c.x - a.x) * ux + (c.y - a.y) * uy).abs() < 1e-12);
    }

    #[test]
    fn square_capped_segment_area() {
        let b = builder(BufferParameters::default().with_end_cap_style(EndCapStyle::Square));
        let curve = b.line_curve(&ring(&[(0.0, 0.0), (4.0, 0.0)]), 1.0).unwrap();
        assert!((signed_area(&curve) + 12.0).abs() < 1e-12);
    }

    #[test]
    fn mitred_ring() {
        // A clockwise square, offset outwards (to its left).
        let sq = ring(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0), (0.0, 0.0)]);
        let b = builder(BufferParameters::default().with_join_style(JoinStyle::Mitre));
        let curve = b.ring_curve(&sq, Position::Left, 1.0).unwrap();
        assert_eq!(curve.first(), curve.last());
        assert_eq!(signed_area(&curve), -16.0);

        // A limit below sqrt(2) cuts the corners off.
        let b = builder(
            BufferParameters::default()
                .with_join_style(JoinStyle::Mitre)
                .with_mitre_limit(1.0),
        );
        let curve = b.ring_curve(&sq, Position::Left, 1.0).unwrap();
        assert!(signed_area(&curve) > -16.0);
        assert!(signed_area(&curve) < -14.0);
    }

    #[test]
    fn beveled_and_inside_rings() {
        let sq = ring(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0), (0.0, 0.0)]);
        let b = builder(BufferParameters::default().with_join_style(JoinStyle::Bevel));
        let curve = b.ring_curve(&sq, Position::Left, 1.0).unwrap();
        // The 4x4 square minus four corner triangles of area 1/2.
        assert!((signed_area(&curve) + 14.0).abs() < 1e-12);

        // Inwards, the offset segments meet at the inside corners.
        let curve = builder(BufferParameters::default())
            .ring_curve(&sq, Position::Right, 0.5)
            .unwrap();
        assert_eq!(curve.len(), 5);
        assert!((signed_area(&curve) + 1.0).abs() < 1e-12);
        assert_eq!(builder(BufferParameters::default()).ring_curve(&sq, Position::Left, 0.0), Some(sq));
    }

    #[test]
    fn offset_curve_runs_with_the_line() {
        let line = ring(&[(0.0, 0.0), (4.0, 0.0)]);
        let b = builder(BufferParameters::default());
        assert_eq!(b.offset_curve(&line, 1.0), Some(vec![p(0.0, 1.0), p(4.0, 1.0)]));
        assert_eq!(b.offset_curve(&line, -1.0), Some(vec![p(0.0, -1.0), p(4.0, -1.0)]));
        assert_eq!(b.offset_curve(&line, 0.0), None);
    }

    #[test]
    fn single_sided() {
        let line = ring(&[(0.0, 0.0), (4.0, 0.0)]);
        let b = builder(BufferParameters::default().with_single_sided(true));
        let left = b.line_curve(&line, 1.0).unwrap();
        assert_eq!(signed_area(&left).abs(), 4.0);
        let right = b.line_curve(&line, -1.0).unwrap();
        assert_eq!(signed_area(&right).abs(), 4.0);
        assert_eq!(signed_area(&left), signed_area(&right));
    }

    #[test]
    fn narrow_inside_turn() {
        // A sharp spike: going out and almost straight back.
        let line = ring(&[(0.0, 0.0), (10.0, 0.0), (0.0, 0.1)]);
        let mut gen = OffsetSegmentGenerator::new(PrecisionModel::Floating, BufferParameters::default(), 1.0);
        gen.init_side_segments(line[0], line[1], Position::Left);
        gen.add_next_segment(line[2], true);
        // The left side is the inside of the turn, and the offset segments
        // are on opposite sides of the spike.
        assert!(gen.has_narrow_concave_angle());
        let pts = gen.into_coords();
        assert_eq!(pts.len(), 4);
        assert_eq!(pts[0], p(10.0, 1.0));
    }
}
