use crate::{
    geom::{is_ccw, is_point_in_ring, point_not_in_list, Coord, Envelope, Polygon},
    graph::{DirEdgeIdx, PlanarGraph},
    noding::{NodedSegmentString, NodingValidator},
};

/// A minimal ring of the polygonizer's graph: either the boundary of a face
/// (clockwise) or an outer boundary of a connected component
/// (counter-clockwise).
#[derive(Clone, Debug)]
pub struct EdgeRing {
    pub edges: Vec<DirEdgeIdx>,
    pub coords: Vec<Coord>,
    pub env: Envelope,
    pub holes: Vec<Vec<Coord>>,
}

impl EdgeRing {
    pub fn new(graph: &PlanarGraph, edges: Vec<DirEdgeIdx>) -> Self {
        let mut coords: Vec<Coord> = Vec::new();
        for de in &edges {
            for c in graph.coords(*de) {
                if coords.last() != Some(&c) {
                    coords.push(c);
                }
            }
        }
        let env = Envelope::from_coords(&coords);
        EdgeRing {
            edges,
            coords,
            env,
            holes: Vec::new(),
        }
    }

    pub fn is_hole(&self) -> bool {
        is_ccw(&self.coords)
    }

    /// A ring is valid if it has at least four points and doesn't intersect
    /// itself.
    pub fn is_valid(&self) -> bool {
        if self.coords.len() <= 3 {
            return false;
        }
        let n = self.coords.len() - 1;
        let mut vertices = self.coords[..n].to_vec();
        vertices.sort_by(Coord::cmp_xy);
        if vertices.windows(2).any(|w| w[0] == w[1]) {
            return false;
        }
        let strings = [NodedSegmentString::new(self.coords.clone(), ())];
        NodingValidator::new(&strings).check_valid().is_ok()
    }

    /// The smallest of `shells` that contains this ring.
    ///
    /// Shells with the same envelope as this ring are skipped, so a ring is
    /// never put inside the face it bounds.
    pub fn find_containing(&self, shells: &[EdgeRing]) -> Option<usize> {
        let mut min_shell: Option<usize> = None;
        for (i, shell) in shells.iter().enumerate() {
            if shell.env == self.env || !shell.env.contains(&self.env) {
                continue;
            }
            let Some(test_pt) = point_not_in_list(&self.coords, &shell.coords) else {
                continue;
            };
            if !is_point_in_ring(test_pt, &shell.coords) {
                continue;
            }
            if min_shell.map_or(true, |m| shells[m].env.contains(&shell.env)) {
                min_shell = Some(i);
            }
        }
        min_shell
    }

    pub fn into_polygon(self) -> Polygon {
        Polygon::new(self.coords, self.holes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::tests::ring,
        graph::{Edge, Label, Location},
    };

    fn single_edge_ring(pts: &[(f64, f64)]) -> EdgeRing {
        let graph =
            PlanarGraph::new(vec![Edge::new(ring(pts), Label::line(0, Location::Interior))]).unwrap();
        EdgeRing::new(&graph, vec![DirEdgeIdx(0)])
    }

    #[test]
    fn validity() {
        let square = single_edge_ring(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)]);
        assert!(square.is_valid());
        assert!(!square.is_hole());

        let bow_tie = single_edge_ring(&[(0.0, 0.0), (4.0, 4.0), (4.0, 0.0), (0.0, 4.0), (0.0, 0.0)]);
        assert!(!bow_tie.is_valid());

        let pinched = single_edge_ring(&[
            (0.0, 0.0),
            (2.0, 2.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (2.0, 2.0),
            (0.0, 4.0),
            (0.0, 0.0),
        ]);
        assert!(!pinched.is_valid());

        let spike = single_edge_ring(&[(0.0, 0.0), (2.0, 0.0), (0.0, 0.0)]);
        assert!(!spike.is_valid());
    }

    #[test]
    fn backward_edges_reverse_their_points() {
        let graph = PlanarGraph::new(vec![Edge::new(
            ring(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)]),
            Label::line(0, Location::Interior),
        )])
        .unwrap();
        let r = EdgeRing::new(&graph, vec![DirEdgeIdx(1)]);
        assert!(r.is_hole());
        assert_eq!(r.coords[1], crate::geom::tests::p(4.0, 0.0));
    }

    #[test]
    fn smallest_containing_shell() {
        let shells = vec![
            single_edge_ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]),
            single_edge_ring(&[(1.0, 1.0), (1.0, 9.0), (9.0, 9.0), (9.0, 1.0), (1.0, 1.0)]),
            single_edge_ring(&[(20.0, 0.0), (20.0, 5.0), (25.0, 5.0), (25.0, 0.0), (20.0, 0.0)]),
        ];
        let hole = single_edge_ring(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 4.0), (2.0, 2.0)]);
        assert_eq!(hole.find_containing(&shells), Some(1));

        let outside = single_edge_ring(&[(30.0, 0.0), (31.0, 0.0), (31.0, 1.0), (30.0, 0.0)]);
        assert_eq!(outside.find_containing(&shells), None);

        // The outer boundary of a face never lands in the face itself.
        let outer = single_edge_ring(&[(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0), (1.0, 1.0)]);
        assert_eq!(outer.find_containing(&shells), Some(0));
    }
}
