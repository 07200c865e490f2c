use crate::{
    geom::{is_ccw, remove_repeated, Coord, Envelope, Filter, Geometry, LineSegment, Polygon},
    graph::{Label, Location, Position},
    noding::NodedSegmentString,
};

use super::offset::OffsetCurveBuilder;

/// The smallest number of points in a closed ring.
const MIN_RING_SIZE: usize = 4;

/// Collects the labelled raw offset curves of every component of a geometry.
///
/// Each curve is labelled with the buffer interior on the side the curve
/// was offset away from, so that depths count how many curves cover a point.
pub struct OffsetCurveSetBuilder<'a> {
    builder: &'a OffsetCurveBuilder,
    distance: f64,
    curves: Vec<NodedSegmentString<Label>>,
}

impl<'a> OffsetCurveSetBuilder<'a> {
    pub fn new(builder: &'a OffsetCurveBuilder, distance: f64) -> Self {
        OffsetCurveSetBuilder {
            builder,
            distance,
            curves: Vec::new(),
        }
    }

    pub fn curves(mut self, geom: &Geometry) -> Vec<NodedSegmentString<Label>> {
        geom.apply(&mut Filter::Component(&mut |g| match g {
            Geometry::Point(p) => self.add_point(*p),
            Geometry::LineString(pts) => self.add_line(pts),
            Geometry::Polygon(p) => self.add_polygon(p),
            Geometry::Collection(_) => {}
        }));
        self.curves
    }

    fn add_curve(&mut self, curve: Option<Vec<Coord>>, left: Location, right: Location) {
        let Some(curve) = curve.filter(|c| c.len() >= 2) else {
            return;
        };
        self.curves.push(NodedSegmentString::new(
            curve,
            Label::area(0, Location::Boundary, left, right),
        ));
    }

    fn add_point(&mut self, p: Coord) {
        if self.distance <= 0.0 {
            return;
        }
        let curve = self.builder.line_curve(&[p], self.distance);
        self.add_curve(curve, Location::Exterior, Location::Interior);
    }

    fn add_line(&mut self, pts: &[Coord]) {
        if pts.is_empty() || (self.distance <= 0.0 && !self.builder.params().single_sided) {
            return;
        }
        let pts = remove_repeated(pts);
        let curve = self.builder.line_curve(&pts, self.distance);
        self.add_curve(curve, Location::Exterior, Location::Interior);
    }

    fn add_polygon(&mut self, p: &Polygon) {
        if p.is_empty() {
            return;
        }
        let (offset_distance, offset_side) = if self.distance < 0.0 {
            (-self.distance, Position::Right)
        } else {
            (self.distance, Position::Left)
        };

        let shell = remove_repeated(&p.shell);
        // Negative buffers of small polygons are empty.
        if self.distance < 0.0 && is_eroded_completely(&p.shell, self.distance) {
            return;
        }
        if self.distance <= 0.0 && shell.len() < 3 {
            return;
        }
        self.add_ring(&shell, offset_distance, offset_side, Location::Exterior, Location::Interior);

        for hole in &p.holes {
            // Positive buffers fill small holes.
            if self.distance > 0.0 && is_eroded_completely(hole, -self.distance) {
                continue;
            }
            let hole = remove_repeated(hole);
            self.add_ring(
                &hole,
                offset_distance,
                offset_side.opposite(),
                Location::Interior,
                Location::Exterior,
            );
        }
    }

    // The locations are the ones for a clockwise ring; counter-clockwise
    // rings get them swapped, and are offset on the other side.
    fn add_ring(
        &mut self,
        pts: &[Coord],
        offset_distance: f64,
        mut side: Position,
        cw_left: Location,
        cw_right: Location,
    ) {
        if offset_distance == 0.0 && pts.len() < MIN_RING_SIZE {
            return;
        }
        let (mut left, mut right) = (cw_left, cw_right);
        if pts.len() >= MIN_RING_SIZE && is_ccw(pts) {
            (left, right) = (cw_right, cw_left);
            side = side.opposite();
        }
        let curve = self.builder.ring_curve(pts, side, offset_distance);
        self.add_curve(curve, left, right);
    }
}

/// Does buffering `ring` by the negative `distance` leave nothing?
///
/// This is a conservative test: it may say no for some rings that do
/// disappear.
fn is_eroded_completely(ring: &[Coord], distance: f64) -> bool {
    if ring.len() < MIN_RING_SIZE {
        return distance < 0.0;
    }
    if ring.len() == MIN_RING_SIZE {
        return is_triangle_eroded_completely(ring, distance);
    }
    let env = Envelope::from_coords(ring);
    distance < 0.0 && 2.0 * distance.abs() > env.width().min(env.height())
}

// A triangle is gone once the distance reaches the radius of its incircle.
fn is_triangle_eroded_completely(tri: &[Coord], distance: f64) -> bool {
    let (a, b, c) = (tri[0], tri[1], tri[2]);
    let len_a = b.distance(&c);
    let len_b = a.distance(&c);
    let len_c = a.distance(&b);
    let circum = len_a + len_b + len_c;
    let in_centre = Coord::new(
        (len_a * a.x + len_b * b.x + len_c * c.x) / circum,
        (len_a * a.y + len_b * b.y + len_c * c.y) / circum,
    );
    LineSegment::new(a, b).distance_to(in_centre) < distance.abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        buffer::BufferParameters,
        geom::tests::{p, ring},
        intersector::PrecisionModel,
    };

    fn curves(geom: &Geometry, distance: f64) -> Vec<NodedSegmentString<Label>> {
        let builder = OffsetCurveBuilder::new(PrecisionModel::Floating, BufferParameters::default());
        OffsetCurveSetBuilder::new(&builder, distance).curves(geom)
    }

    fn sides(c: &NodedSegmentString<Label>) -> (Location, Location) {
        (c.data.get(0, Position::Left), c.data.get(0, Position::Right))
    }

    #[test]
    fn erosion() {
        let tri = ring(&[(0.0, 0.0), (4.0, 0.0), (0.0, 3.0), (0.0, 0.0)]);
        // The 3-4-5 triangle has an incircle of radius 1.
        assert!(!is_eroded_completely(&tri, -0.9));
        assert!(is_eroded_completely(&tri, -1.1));

        let rect = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 2.0), (0.0, 2.0), (0.0, 0.0)]);
        assert!(!is_eroded_completely(&rect, -0.9));
        assert!(is_eroded_completely(&rect, -1.1));
        assert!(!is_eroded_completely(&rect, 5.0));
    }

    #[test]
    fn ring_labels_follow_orientation() {
        let ccw = Polygon::new(
            ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]),
            vec![],
        );
        let cs = curves(&ccw.clone().into(), 1.0);
        assert_eq!(cs.len(), 1);
        assert_eq!(sides(&cs[0]), (Location::Interior, Location::Exterior));

        let cw = ccw.normalized();
        let cs = curves(&cw.into(), 1.0);
        assert_eq!(sides(&cs[0]), (Location::Exterior, Location::Interior));
    }

    #[test]
    fn small_holes_are_filled() {
        let poly = Polygon::new(
            ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]),
            vec![
                ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)]),
                ring(&[(4.0, 4.0), (8.0, 4.0), (8.0, 8.0), (4.0, 8.0), (4.0, 4.0)]),
            ],
        );
        let cs = curves(&poly.clone().into(), 1.0);
        assert_eq!(cs.len(), 2);
        // The hole is counter-clockwise, so the buffer interior is on its
        // right.
        assert_eq!(sides(&cs[1]), (Location::Exterior, Location::Interior));

        assert!(curves(&poly.into(), -6.0).is_empty());
    }

    #[test]
    fn lines_and_points() {
        let g = Geometry::Collection(vec![
            Geometry::Point(p(0.0, 0.0)),
            Geometry::LineString(ring(&[(5.0, 0.0), (5.0, 0.0), (9.0, 0.0)])),
        ]);
        let cs = curves(&g, 1.0);
        assert_eq!(cs.len(), 2);
        for c in &cs {
            assert!(c.is_closed());
            assert_eq!(sides(c), (Location::Exterior, Location::Interior));
        }
        assert!(curves(&g, -1.0).is_empty());
        assert!(curves(&g, 0.0).is_empty());
    }
}
