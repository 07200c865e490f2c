//! Plain geometric values: coordinates, envelopes, segments, rings and polygons.
//!
//! Nothing in here knows about graphs or noding. These are the values that go
//! into the engine and come back out of it.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{
    graph::Location,
    orientation::{orientation_index, sign_of_det2x2},
};

/// A two-dimensional coordinate.
///
/// Equality is exact. Ordering (see [`Coord::cmp_xy`]) is lexicographic, by `x`
/// and then by `y`.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl std::fmt::Debug for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Coord { x, y }
    }
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Coord { x, y }
    }

    pub fn distance(&self, other: &Coord) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Lexicographic comparison, `x` first.
    pub fn cmp_xy(&self, other: &Coord) -> Ordering {
        self.key().cmp(&other.key())
    }

    /// A totally ordered, hashable version of this coordinate, for use as a map key.
    pub fn key(&self) -> CoordKey {
        CoordKey(OrderedFloat(self.x), OrderedFloat(self.y))
    }
}

/// See [`Coord::key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoordKey(OrderedFloat<f64>, OrderedFloat<f64>);

/// An axis-aligned bounding box.
///
/// The null envelope (the envelope of nothing) has `min > max`; it intersects
/// and contains nothing.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "Env[null]")
        } else {
            write!(
                f,
                "Env[{:?} : {:?}, {:?} : {:?}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            )
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::null()
    }
}

impl Envelope {
    pub fn null() -> Self {
        Envelope {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn of_point(p: Coord) -> Self {
        Envelope {
            min_x: p.x,
            max_x: p.x,
            min_y: p.y,
            max_y: p.y,
        }
    }

    pub fn of_points(p: Coord, q: Coord) -> Self {
        Envelope {
            min_x: p.x.min(q.x),
            max_x: p.x.max(q.x),
            min_y: p.y.min(q.y),
            max_y: p.y.max(q.y),
        }
    }

    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Self {
        let mut env = Envelope::null();
        for c in coords {
            env.expand_to_include(*c);
        }
        env
    }

    pub fn is_null(&self) -> bool {
        self.min_x > self.max_x
    }

    pub fn width(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    pub fn expand_to_include(&mut self, p: Coord) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn expand_by(&mut self, distance: f64) {
        if self.is_null() {
            return;
        }
        self.min_x -= distance;
        self.max_x += distance;
        self.min_y -= distance;
        self.max_y += distance;
    }

    pub fn merge(&mut self, other: &Envelope) {
        if other.is_null() {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        !(self.is_null()
            || other.is_null()
            || other.min_x > self.max_x
            || other.max_x < self.min_x
            || other.min_y > self.max_y
            || other.max_y < self.min_y)
    }

    pub fn contains_point(&self, p: Coord) -> bool {
        !self.is_null()
            && p.x >= self.min_x
            && p.x <= self.max_x
            && p.y >= self.min_y
            && p.y <= self.max_y
    }

    /// Does this envelope cover `other`? Boundaries count.
    pub fn contains(&self, other: &Envelope) -> bool {
        !self.is_null()
            && !other.is_null()
            && other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    pub fn intersection(&self, other: &Envelope) -> Envelope {
        if !self.intersects(other) {
            return Envelope::null();
        }
        Envelope {
            min_x: self.min_x.max(other.min_x),
            max_x: self.max_x.min(other.max_x),
            min_y: self.min_y.max(other.min_y),
            max_y: self.max_y.min(other.max_y),
        }
    }

    pub fn centre(&self) -> Coord {
        Coord::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Moves `p` to the nearest point of this (non-null) envelope.
    pub fn clamp(&self, p: Coord) -> Coord {
        Coord::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
        )
    }
}

/// A transient pair of coordinates.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct LineSegment {
    pub p0: Coord,
    pub p1: Coord,
}

impl std::fmt::Debug for LineSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.p0, self.p1)
    }
}

impl LineSegment {
    pub fn new(p0: Coord, p1: Coord) -> Self {
        LineSegment { p0, p1 }
    }

    pub fn reversed(&self) -> Self {
        LineSegment {
            p0: self.p1,
            p1: self.p0,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.p0.y == self.p1.y
    }

    pub fn min_x(&self) -> f64 {
        self.p0.x.min(self.p1.x)
    }

    pub fn max_x(&self) -> f64 {
        self.p0.x.max(self.p1.x)
    }

    pub fn length(&self) -> f64 {
        self.p0.distance(&self.p1)
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::of_points(self.p0, self.p1)
    }

    /// Where `other` lies relative to this segment's line: `1` if it is
    /// entirely on the left (touching allowed), `-1` if entirely on the right,
    /// `0` if it crosses or is collinear.
    pub fn orientation_index_of(&self, other: &LineSegment) -> i32 {
        let o0 = orientation_index(self.p0, self.p1, other.p0);
        let o1 = orientation_index(self.p0, self.p1, other.p1);
        if o0 >= 0 && o1 >= 0 {
            o0.max(o1)
        } else if o0 <= 0 && o1 <= 0 {
            o0.min(o1)
        } else {
            0
        }
    }

    /// The projection factor of `p` onto this segment's line.
    pub fn projection_factor(&self, p: Coord) -> f64 {
        if p == self.p0 {
            return 0.0;
        }
        if p == self.p1 {
            return 1.0;
        }
        let dx = self.p1.x - self.p0.x;
        let dy = self.p1.y - self.p0.y;
        let len2 = dx * dx + dy * dy;
        if len2 <= 0.0 {
            return 0.0;
        }
        ((p.x - self.p0.x) * dx + (p.y - self.p0.y) * dy) / len2
    }

    pub fn distance_to(&self, p: Coord) -> f64 {
        let r = self.projection_factor(p);
        if self.p0 == self.p1 || r <= 0.0 {
            return p.distance(&self.p0);
        }
        if r >= 1.0 {
            return p.distance(&self.p1);
        }
        let dx = self.p1.x - self.p0.x;
        let dy = self.p1.y - self.p0.y;
        let s = ((self.p0.y - p.y) * dx - (self.p0.x - p.x) * dy) / (dx * dx + dy * dy);
        s.abs() * dx.hypot(dy)
    }

    /// The point `fraction` of the way along the segment, then moved
    /// `offset` to the left of it (negative offsets move right).
    pub fn point_along_offset(&self, fraction: f64, offset: f64) -> Coord {
        let dx = self.p1.x - self.p0.x;
        let dy = self.p1.y - self.p0.y;
        let seg_x = self.p0.x + fraction * dx;
        let seg_y = self.p0.y + fraction * dy;
        let len = dx.hypot(dy);
        let (ux, uy) = if offset != 0.0 && len > 0.0 {
            (offset * dx / len, offset * dy / len)
        } else {
            (0.0, 0.0)
        };
        Coord::new(seg_x - uy, seg_y + ux)
    }

    /// Lexicographic order on `(p0, p1)`.
    pub fn cmp_points(&self, other: &LineSegment) -> Ordering {
        self.p0
            .cmp_xy(&other.p0)
            .then_with(|| self.p1.cmp_xy(&other.p1))
    }
}

/// A polygon: one closed shell and any number of closed holes.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub shell: Vec<Coord>,
    pub holes: Vec<Vec<Coord>>,
}

impl Polygon {
    pub fn new(shell: Vec<Coord>, holes: Vec<Vec<Coord>>) -> Self {
        Polygon { shell, holes }
    }

    pub fn is_empty(&self) -> bool {
        self.shell.is_empty()
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.shell).abs()
            - self
                .holes
                .iter()
                .map(|h| signed_area(h).abs())
                .sum::<f64>()
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::from_coords(&self.shell)
    }

    /// Puts the polygon in a canonical form: clockwise shell, counter-clockwise
    /// holes, every ring starting at its smallest vertex, holes sorted.
    pub fn normalize(&mut self) {
        normalize_ring(&mut self.shell, true);
        for h in &mut self.holes {
            normalize_ring(h, false);
        }
        self.holes.sort_by(|a, b| match (a.first(), b.first()) {
            (Some(a), Some(b)) => a.cmp_xy(b),
            _ => a.len().cmp(&b.len()),
        });
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}

/// The geometries accepted by the engine's entry points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    Polygon(Polygon),
    Collection(Vec<Geometry>),
}

/// The ways of visiting a [`Geometry`]. See [`Geometry::apply`].
pub enum Filter<'a> {
    /// Called once per coordinate.
    Coord(&'a mut dyn FnMut(&Coord)),
    /// Called once per coordinate sequence (a point counts as a sequence of one).
    Sequence(&'a mut dyn FnMut(&[Coord])),
    /// Called once per geometry, collections included, parents before children.
    Component(&'a mut dyn FnMut(&Geometry)),
}

impl Geometry {
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::LineString(pts) => pts.is_empty(),
            Geometry::Polygon(p) => p.is_empty(),
            Geometry::Collection(gs) => gs.iter().all(Geometry::is_empty),
        }
    }

    pub fn apply(&self, filter: &mut Filter<'_>) {
        let mut stack = vec![self];
        while let Some(g) = stack.pop() {
            match filter {
                Filter::Component(f) => f(g),
                Filter::Coord(f) => g.direct_sequences(&mut |seq| seq.iter().for_each(|c| f(c))),
                Filter::Sequence(f) => g.direct_sequences(&mut |seq| f(seq)),
            }
            if let Geometry::Collection(gs) = g {
                stack.extend(gs.iter().rev());
            }
        }
    }

    // Sequences that belong to this geometry itself, not to its children.
    fn direct_sequences(&self, f: &mut dyn FnMut(&[Coord])) {
        match self {
            Geometry::Point(p) => f(std::slice::from_ref(p)),
            Geometry::LineString(pts) => f(pts),
            Geometry::Polygon(p) => {
                f(&p.shell);
                for h in &p.holes {
                    f(h);
                }
            }
            Geometry::Collection(_) => {}
        }
    }

    /// Builds a copy of this geometry with every coordinate sequence replaced
    /// by `f(sequence)`.
    pub fn map_sequences(&self, f: &mut dyn FnMut(&[Coord]) -> Vec<Coord>) -> Geometry {
        match self {
            Geometry::Point(p) => {
                let mapped = f(std::slice::from_ref(p));
                Geometry::Point(mapped.first().copied().unwrap_or(*p))
            }
            Geometry::LineString(pts) => Geometry::LineString(f(pts)),
            Geometry::Polygon(p) => Geometry::Polygon(Polygon {
                shell: f(&p.shell),
                holes: p.holes.iter().map(|h| f(h)).collect(),
            }),
            Geometry::Collection(gs) => {
                Geometry::Collection(gs.iter().map(|g| g.map_sequences(f)).collect())
            }
        }
    }

    pub fn coords(&self) -> Vec<Coord> {
        let mut ret = Vec::new();
        self.apply(&mut Filter::Coord(&mut |c| ret.push(*c)));
        ret
    }

    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::null();
        self.apply(&mut Filter::Coord(&mut |c| env.expand_to_include(*c)));
        env
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Geometry::Polygon(p)
    }
}

/// Shoelace area of a closed ring: positive for counter-clockwise rings.
pub fn signed_area(ring: &[Coord]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    // Shifting by the first point keeps the products small.
    let x0 = ring[0].x;
    let mut sum = 0.0;
    for i in 1..ring.len() - 1 {
        let x = ring[i].x - x0;
        let y1 = ring[i + 1].y;
        let y2 = ring[i - 1].y;
        sum += x * (y2 - y1);
    }
    -sum / 2.0
}

/// Is this closed ring counter-clockwise?
///
/// Uses the orientation at the highest vertex, so it is robust for rings
/// with collinear runs and repeated points. Rings with fewer than three
/// distinct points are reported as not counter-clockwise.
pub fn is_ccw(ring: &[Coord]) -> bool {
    if ring.len() < 4 {
        return false;
    }
    let n = ring.len() - 1;
    let mut hi_idx = 0;
    for i in 1..=n {
        if ring[i].y > ring[hi_idx].y {
            hi_idx = i;
        }
    }
    let hi = ring[hi_idx];

    let mut prev = hi_idx;
    loop {
        prev = if prev == 0 { n } else { prev - 1 };
        if ring[prev] != hi || prev == hi_idx {
            break;
        }
    }
    let mut next = hi_idx;
    loop {
        next = (next + 1) % n;
        if ring[next] != hi || next == hi_idx {
            break;
        }
    }

    let prev = ring[prev];
    let next = ring[next];
    if prev == hi || next == hi || prev == next {
        return false;
    }

    match orientation_index(prev, hi, next) {
        0 => prev.x > next.x,
        o => o > 0,
    }
}

/// Locates `p` relative to a closed ring, by counting crossings of a ray to
/// the right of `p`.
pub fn locate_in_ring(p: Coord, ring: &[Coord]) -> Location {
    let mut crossings = 0;
    for w in ring.windows(2) {
        let (p1, p2) = (w[1], w[0]);
        if p1.x < p.x && p2.x < p.x {
            continue;
        }
        if p == p2 {
            return Location::Boundary;
        }
        if p1.y == p.y && p2.y == p.y {
            let (min_x, max_x) = (p1.x.min(p2.x), p1.x.max(p2.x));
            if min_x <= p.x && p.x <= max_x {
                return Location::Boundary;
            }
            continue;
        }
        if (p1.y > p.y && p2.y <= p.y) || (p2.y > p.y && p1.y <= p.y) {
            let mut sign = sign_of_det2x2(p1.x - p.x, p1.y - p.y, p2.x - p.x, p2.y - p.y);
            if sign == 0 {
                return Location::Boundary;
            }
            if p2.y < p1.y {
                sign = -sign;
            }
            if sign > 0 {
                crossings += 1;
            }
        }
    }
    if crossings % 2 == 1 {
        Location::Interior
    } else {
        Location::Exterior
    }
}

/// Is `p` inside or on the boundary of the ring?
pub fn is_point_in_ring(p: Coord, ring: &[Coord]) -> bool {
    locate_in_ring(p, ring) != Location::Exterior
}

pub fn remove_repeated(pts: &[Coord]) -> Vec<Coord> {
    let mut ret: Vec<Coord> = Vec::with_capacity(pts.len());
    for p in pts {
        if ret.last() != Some(p) {
            ret.push(*p);
        }
    }
    ret
}

pub fn is_closed(pts: &[Coord]) -> bool {
    pts.len() > 1 && pts.first() == pts.last()
}

/// The first point of `test` that is not a vertex of `pts`.
pub fn point_not_in_list(test: &[Coord], pts: &[Coord]) -> Option<Coord> {
    test.iter().find(|p| !pts.contains(p)).copied()
}

fn normalize_ring(ring: &mut Vec<Coord>, clockwise: bool) {
    if ring.len() < 2 || !is_closed(ring) {
        return;
    }
    ring.pop();
    let min_idx = (0..ring.len())
        .min_by(|&i, &j| ring[i].cmp_xy(&ring[j]))
        .unwrap_or(0);
    ring.rotate_left(min_idx);
    ring.push(ring[0]);
    if is_ccw(ring) == clockwise {
        ring.reverse();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub fn p(x: f64, y: f64) -> Coord {
        Coord::new(x, y)
    }

    pub fn ring(pts: &[(f64, f64)]) -> Vec<Coord> {
        pts.iter().map(|&(x, y)| p(x, y)).collect()
    }

    // Kind of like Arbitrary, but
    // - it's a local trait, so we can impl it for whatever we want, and
    // - it only returns "reasonable" values.
    pub trait Reasonable {
        type Strategy: Strategy<Value = Self>;
        fn reasonable() -> Self::Strategy;
    }

    impl Reasonable for Coord {
        type Strategy = BoxedStrategy<Coord>;

        fn reasonable() -> Self::Strategy {
            (-1e6..1e6, -1e6..1e6)
                .prop_map(|(x, y)| Coord::new(x, y))
                .boxed()
        }
    }

    impl Reasonable for LineSegment {
        type Strategy = BoxedStrategy<LineSegment>;

        fn reasonable() -> Self::Strategy {
            (Coord::reasonable(), Coord::reasonable())
                .prop_map(|(p0, p1)| LineSegment::new(p0, p1))
                .boxed()
        }
    }

    /// Coordinates on a small integer grid, for inputs with lots of
    /// coincidences and collinearities.
    pub fn grid_coord(n: i32) -> impl Strategy<Value = Coord> {
        (-n..=n, -n..=n).prop_map(|(x, y)| Coord::new(x as f64, y as f64))
    }

    #[test]
    fn ring_orientation() {
        let ccw = ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]);
        assert!(is_ccw(&ccw));
        assert_eq!(signed_area(&ccw), 4.0);

        let mut cw = ccw.clone();
        cw.reverse();
        assert!(!is_ccw(&cw));
        assert_eq!(signed_area(&cw), -4.0);

        // Flat top with a repeated highest point.
        let flat = ring(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 3.0),
            (4.0, 3.0),
            (0.0, 3.0),
            (0.0, 0.0),
        ]);
        assert!(is_ccw(&flat));
    }

    #[test]
    fn point_in_ring() {
        let sq = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        assert_eq!(locate_in_ring(p(1.0, 1.0), &sq), Location::Interior);
        assert_eq!(locate_in_ring(p(4.0, 2.0), &sq), Location::Boundary);
        assert_eq!(locate_in_ring(p(0.0, 0.0), &sq), Location::Boundary);
        assert_eq!(locate_in_ring(p(2.0, 4.0), &sq), Location::Boundary);
        assert_eq!(locate_in_ring(p(5.0, 2.0), &sq), Location::Exterior);
        assert_eq!(locate_in_ring(p(-1.0, 4.0), &sq), Location::Exterior);
    }

    #[test]
    fn normalize_polygon() {
        let poly = Polygon::new(
            ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]),
            vec![ring(&[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0), (1.0, 1.0)])],
        )
        .normalized();
        insta::assert_debug_snapshot!(poly.shell, @r"
        [
            (0.0, 0.0),
            (0.0, 4.0),
            (4.0, 4.0),
            (4.0, 0.0),
            (0.0, 0.0),
        ]
        ");
        assert!(is_ccw(&poly.holes[0]));
        assert_eq!(poly.holes[0][0], p(1.0, 1.0));
        assert_eq!(poly.area(), 15.0);
    }

    #[test]
    fn filters() {
        let g = Geometry::Collection(vec![
            Geometry::Point(p(0.0, 0.0)),
            Geometry::LineString(vec![p(1.0, 1.0), p(2.0, 2.0)]),
            Geometry::Polygon(Polygon::new(
                ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]),
                vec![],
            )),
        ]);

        let mut n_coords = 0;
        g.apply(&mut Filter::Coord(&mut |_| n_coords += 1));
        assert_eq!(n_coords, 7);

        let mut lens = Vec::new();
        g.apply(&mut Filter::Sequence(&mut |s| lens.push(s.len())));
        assert_eq!(lens, vec![1, 2, 4]);

        let mut n_components = 0;
        g.apply(&mut Filter::Component(&mut |_| n_components += 1));
        assert_eq!(n_components, 4);

        assert_eq!(
            g.envelope(),
            Envelope {
                min_x: 0.0,
                max_x: 2.0,
                min_y: 0.0,
                max_y: 2.0
            }
        );
    }

    #[test]
    fn envelopes() {
        let a = Envelope::of_points(p(0.0, 0.0), p(2.0, 2.0));
        let b = Envelope::of_points(p(2.0, 1.0), p(3.0, 3.0));
        assert!(a.intersects(&b));
        assert!(!a.contains(&b));
        assert_eq!(a.intersection(&b), Envelope::of_points(p(2.0, 1.0), p(2.0, 2.0)));
        assert!(!Envelope::null().intersects(&a));
        assert!(a.contains(&Envelope::of_point(p(1.0, 1.0))));
    }

    proptest! {
        #[test]
        fn segment_distance_is_bounded(s in LineSegment::reasonable(), q in Coord::reasonable()) {
            let d = s.distance_to(q);
            prop_assert!(d <= q.distance(&s.p0) + 1e-6);
            prop_assert!(d <= q.distance(&s.p1) + 1e-6);
        }
    }
}
