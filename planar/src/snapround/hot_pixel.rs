use crate::{
    error::Result,
    geom::{Coord, Envelope},
    intersector::{round_half_up, LineIntersector},
    noding::NodedSegmentString,
};

/// The tolerance square around a snap-rounding grid point.
///
/// All the tests happen in the scaled space, where the grid has unit spacing
/// and the pixel is the square of side 1 centred on the rounded point. The
/// pixel is half-open: it contains its interior and its left and bottom
/// edges, so a segment running exactly along a shared pixel boundary
/// belongs to only one of the pixels.
#[derive(Clone, Copy, Debug)]
pub struct HotPixel {
    original: Coord,
    scale: f64,
    /// The pixel centre, in scaled space.
    centre: Coord,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    /// Counter-clockwise from the top right.
    corners: [Coord; 4],
}

impl HotPixel {
    pub fn new(pt: Coord, scale: f64) -> Self {
        let centre = Coord::new(round_half_up(pt.x * scale), round_half_up(pt.y * scale));
        let tol = 0.5;
        let (min_x, max_x) = (centre.x - tol, centre.x + tol);
        let (min_y, max_y) = (centre.y - tol, centre.y + tol);
        HotPixel {
            original: pt,
            scale,
            centre,
            min_x,
            max_x,
            min_y,
            max_y,
            corners: [
                Coord::new(max_x, max_y),
                Coord::new(min_x, max_y),
                Coord::new(min_x, min_y),
                Coord::new(max_x, min_y),
            ],
        }
    }

    /// The point this pixel was created for.
    pub fn original(&self) -> Coord {
        self.original
    }

    /// The pixel centre, in unscaled coordinates.
    pub fn coord(&self) -> Coord {
        Coord::new(self.centre.x / self.scale, self.centre.y / self.scale)
    }

    /// An envelope, in unscaled coordinates, that is guaranteed to contain
    /// the pixel with some room to spare.
    pub fn safe_envelope(&self) -> Envelope {
        let tol = 0.75 / self.scale;
        let mut env = Envelope::of_point(self.original);
        env.expand_by(tol);
        env
    }

    /// Does the segment `p0 -- p1` (in unscaled coordinates) pass through the
    /// half-open pixel?
    pub fn intersects(&self, p0: Coord, p1: Coord) -> bool {
        let p0 = Coord::new(p0.x * self.scale, p0.y * self.scale);
        let p1 = Coord::new(p1.x * self.scale, p1.y * self.scale);
        !self.envelope_excludes(p0, p1) && self.intersects_tolerance_square(p0, p1)
    }

    // Strictly outside the closed pixel, so no edge test can succeed either.
    fn envelope_excludes(&self, p0: Coord, p1: Coord) -> bool {
        self.max_x < p0.x.min(p1.x)
            || self.min_x > p0.x.max(p1.x)
            || self.max_y < p0.y.min(p1.y)
            || self.min_y > p0.y.max(p1.y)
    }

    fn intersects_tolerance_square(&self, p0: Coord, p1: Coord) -> bool {
        let li = LineIntersector::new();
        let [c0, c1, c2, c3] = self.corners;

        // top
        if li.intersect(p0, p1, c0, c1).is_proper() {
            return true;
        }
        let left = li.intersect(p0, p1, c1, c2);
        if left.is_proper() {
            return true;
        }
        let bottom = li.intersect(p0, p1, c2, c3);
        if bottom.is_proper() {
            return true;
        }
        // right
        if li.intersect(p0, p1, c3, c0).is_proper() {
            return true;
        }

        // A segment touching both the left and the bottom edges either passes
        // through the interior or through the bottom-left corner. Both count.
        if left.has_intersection() && bottom.has_intersection() {
            return true;
        }
        p0 == self.centre || p1 == self.centre
    }

    /// If the segment `segment_index` of `ss` passes through this pixel, adds
    /// the pixel centre as a node there. Returns whether a node was added.
    pub fn add_snapped_node<D>(
        &self,
        ss: &mut NodedSegmentString<D>,
        segment_index: usize,
    ) -> Result<bool> {
        let p0 = ss.coord(segment_index);
        let p1 = ss.coord(segment_index + 1);
        if self.intersects(p0, p1) {
            ss.add_intersection(self.coord(), segment_index)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tests::{grid_coord, p};
    use proptest::prelude::*;

    #[test]
    fn half_open() {
        let hp = HotPixel::new(p(0.0, 0.0), 1.0);

        // Along the top and right edges: not in the pixel.
        assert!(!hp.intersects(p(-1.0, 0.5), p(1.0, 0.5)));
        assert!(!hp.intersects(p(0.5, -1.0), p(0.5, 1.0)));

        // Along the left and bottom edges: in the pixel.
        assert!(hp.intersects(p(-0.5, -1.0), p(-0.5, 1.0)));
        assert!(hp.intersects(p(-1.0, -0.5), p(1.0, -0.5)));

        // Through the interior, or ending at the centre.
        assert!(hp.intersects(p(-1.0, 0.0), p(1.0, 0.1)));
        assert!(hp.intersects(p(0.0, 0.0), p(5.0, 5.0)));

        // Nowhere near.
        assert!(!hp.intersects(p(2.0, 2.0), p(3.0, 5.0)));
    }

    #[test]
    fn scaled() {
        let hp = HotPixel::new(p(1.04, 2.96), 10.0);
        assert_eq!(hp.coord(), p(1.0, 3.0));
        assert!(hp.intersects(p(0.0, 2.97), p(2.0, 2.97)));
        assert!(!hp.intersects(p(0.0, 3.06), p(2.0, 3.06)));
        assert!(hp.safe_envelope().contains_point(p(1.1, 3.0)));
    }

    #[test]
    fn snapped_node() {
        let hp = HotPixel::new(p(2.0, 1.0), 1.0);
        let mut ss = NodedSegmentString::new(vec![p(0.0, 0.0), p(4.0, 1.8)], ());
        assert!(hp.add_snapped_node(&mut ss, 0).unwrap());
        let node = ss.node_list().iter().next().unwrap();
        assert_eq!(node.coord, p(2.0, 1.0));
    }

    proptest! {
        #[test]
        fn envelope_shortcut_agrees_with_the_edges(
            centre in grid_coord(4),
            p0 in grid_coord(12),
            p1 in grid_coord(12),
        ) {
            // Half-unit grid coordinates land on pixel edges and corners.
            let hp = HotPixel::new(centre, 1.0);
            let (p0, p1) = (p(p0.x / 2.0, p0.y / 2.0), p(p1.x / 2.0, p1.y / 2.0));
            if hp.envelope_excludes(p0, p1) {
                prop_assert!(!hp.intersects_tolerance_square(p0, p1));
            }
        }
    }
}
