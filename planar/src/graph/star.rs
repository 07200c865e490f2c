//! Operations on the star of directed edges leaving a node.

use crate::{
    error::{Error, Result},
    overlay::Depth,
};

use super::{quadrant, DirEdgeIdx, NodeIdx, PlanarGraph, Position, RingIdx};

impl PlanarGraph {
    // The star edges that bound the result area: those in the result, or
    // whose partner is.
    fn result_area_edges(&self, node: NodeIdx) -> Vec<DirEdgeIdx> {
        self.nodes[node.0]
            .star
            .iter()
            .copied()
            .filter(|de| self.de(*de).in_result || self.de(de.sym()).in_result)
            .collect()
    }

    /// Propagates depths around the star of `node`, starting from `de`, which
    /// must already have depths on both sides.
    ///
    /// Walking counter-clockwise, the left side of one edge is the right side
    /// of the next. Coming back around to `de` must give its right depth again.
    pub fn compute_depths(&mut self, node: NodeIdx, de: DirEdgeIdx) -> Result<()> {
        let star = self.nodes[node.0].star.clone();
        let idx = star.iter().position(|d| *d == de).ok_or_else(|| {
            Error::Internal(format!("{de:?} is not in the star of {node:?}"))
        })?;
        let start = self.depth_or_err(de, Position::Left)?;
        let target = self.depth_or_err(de, Position::Right)?;

        let mut curr = start;
        for &next in star[idx + 1..].iter().chain(&star[..idx]) {
            self.set_edge_depths(next, Position::Right, curr)?;
            curr = self.depth_or_err(next, Position::Left)?;
        }
        if curr != target {
            return Err(Error::topology(
                "depth mismatch",
                Some(self.nodes[node.0].coord),
            ));
        }
        Ok(())
    }

    fn depth_or_err(&self, de: DirEdgeIdx, pos: Position) -> Result<Depth> {
        self.de(de)
            .depth(pos)
            .ok_or_else(|| Error::Internal(format!("{de:?} has no {pos:?} depth")))
    }

    /// Sets `next` on the incoming result edges at `node`, so that each one
    /// is followed by the next outgoing result edge counter-clockwise.
    pub fn link_result_directed_edges(&mut self, node: NodeIdx) -> Result<()> {
        let mut first_out = None;
        let mut incoming: Option<DirEdgeIdx> = None;
        for next_out in self.result_area_edges(node) {
            if !self.label(next_out).is_area() {
                continue;
            }
            let out_in_result = self.de(next_out).in_result;
            if first_out.is_none() && out_in_result {
                first_out = Some(next_out);
            }
            match incoming {
                None => {
                    if self.de(next_out.sym()).in_result {
                        incoming = Some(next_out.sym());
                    }
                }
                Some(inc) => {
                    if out_in_result {
                        self.de_mut(inc).next = Some(next_out);
                        incoming = None;
                    }
                }
            }
        }
        if let Some(inc) = incoming {
            let Some(first_out) = first_out else {
                return Err(Error::topology(
                    "no outgoing dirEdge found",
                    Some(self.nodes[node.0].coord),
                ));
            };
            if !self.de(first_out).in_result {
                return Err(Error::Internal(
                    "unable to link last incoming dirEdge".into(),
                ));
            }
            self.de_mut(inc).next = Some(first_out);
        }
        Ok(())
    }

    /// Like [`PlanarGraph::link_result_directed_edges`], but only among the
    /// edges of one maximal ring, and setting `next_min`.
    ///
    /// The star is walked clockwise, so that the minimal rings split off at
    /// this node are as small as possible.
    pub fn link_minimal_directed_edges(&mut self, node: NodeIdx, ring: RingIdx) -> Result<()> {
        let mut first_out = None;
        let mut incoming: Option<DirEdgeIdx> = None;
        for next_out in self.result_area_edges(node).into_iter().rev() {
            let out_in_ring = self.de(next_out).edge_ring == Some(ring);
            if first_out.is_none() && out_in_ring {
                first_out = Some(next_out);
            }
            match incoming {
                None => {
                    if self.de(next_out.sym()).edge_ring == Some(ring) {
                        incoming = Some(next_out.sym());
                    }
                }
                Some(inc) => {
                    if out_in_ring {
                        self.de_mut(inc).next_min = Some(next_out);
                        incoming = None;
                    }
                }
            }
        }
        if let Some(inc) = incoming {
            let first_out = first_out.ok_or_else(|| {
                Error::Internal("found null for first outgoing dirEdge".into())
            })?;
            self.de_mut(inc).next_min = Some(first_out);
        }
        Ok(())
    }

    /// The number of edges leaving `node` that belong to `ring`.
    pub fn outgoing_degree(&self, node: NodeIdx, ring: RingIdx) -> usize {
        self.nodes[node.0]
            .star
            .iter()
            .filter(|de| self.de(**de).edge_ring == Some(ring))
            .count()
    }

    /// Of the edges leaving `node`, the one that is furthest clockwise when
    /// seen from the right: this is the edge to start from when the node is
    /// the rightmost point of its subgraph.
    pub fn rightmost_edge(&self, node: NodeIdx) -> Result<Option<DirEdgeIdx>> {
        let star = &self.nodes[node.0].star;
        let (Some(&de0), Some(&de_last)) = (star.first(), star.last()) else {
            return Ok(None);
        };
        if star.len() == 1 {
            return Ok(Some(de0));
        }
        let north0 = quadrant::is_northern(self.de(de0).quadrant);
        let north1 = quadrant::is_northern(self.de(de_last).quadrant);
        if north0 && north1 {
            Ok(Some(de0))
        } else if !north0 && !north1 {
            Ok(Some(de_last))
        } else if self.de(de0).dy() != 0.0 {
            Ok(Some(de0))
        } else if self.de(de_last).dy() != 0.0 {
            Ok(Some(de_last))
        } else {
            Err(Error::Internal(
                "found two horizontal edges incident on node".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::{
        geom::{tests::p, Coord},
        graph::{tests::shell_edge, Edge},
    };

    use super::*;

    // A clockwise square (interior on the right), split into one edge per side.
    fn square_edges() -> Vec<Edge> {
        let pts = [p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0), p(0.0, 0.0)];
        pts.windows(2).map(|w| shell_edge(w.to_vec())).collect()
    }

    fn walk(g: &PlanarGraph, start: DirEdgeIdx) -> Vec<Coord> {
        let mut ret = vec![g.de(start).p0];
        let mut de = start;
        while let Some(next) = g.de(de).next {
            if next == start {
                break;
            }
            ret.push(g.de(next).p0);
            de = next;
        }
        ret
    }

    #[test]
    fn depths_around_a_corner() {
        let mut g = PlanarGraph::new(square_edges()).unwrap();
        let origin = g.node_at(p(0.0, 0.0)).unwrap();
        // The edge going up from the origin has the interior on its right.
        let up = DirEdgeIdx(0);
        g.set_edge_depths(up, Position::Right, Depth::new(1, 0)).unwrap();
        g.compute_depths(origin, up).unwrap();

        // The other edge at the origin is the last side, running backwards.
        let along = DirEdgeIdx(7);
        assert_eq!(g.de(along).depth(Position::Left), Some(Depth::new(1, 0)));
        assert_eq!(g.de(along).depth(Position::Right), Some(Depth::new(0, 0)));
    }

    #[test]
    fn depth_mismatch() {
        let mut g = PlanarGraph::new(square_edges()).unwrap();
        let origin = g.node_at(p(0.0, 0.0)).unwrap();
        let up = DirEdgeIdx(0);
        g.set_edge_depths(up, Position::Right, Depth::new(1, 0)).unwrap();
        // Contradicts what the star will compute for this edge.
        g.set_depth(DirEdgeIdx(7), Position::Left, Depth::new(5, 0))
            .unwrap();
        assert_matches!(g.compute_depths(origin, up), Err(Error::Topology { .. }));
    }

    #[test]
    fn link_square() {
        let mut g = PlanarGraph::new(square_edges()).unwrap();
        for i in 0..4 {
            g.de_mut(DirEdgeIdx(2 * i)).in_result = true;
        }
        for n in g.node_indices().collect::<Vec<_>>() {
            g.link_result_directed_edges(n).unwrap();
        }
        insta::assert_debug_snapshot!(walk(&g, DirEdgeIdx(0)), @r###"
        [
            (0.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
        ]
        "###);
    }

    #[test]
    fn unlinkable_incoming_edge() {
        let mut g = PlanarGraph::new(square_edges()).unwrap();
        // Only one side is in the result, so its end has nowhere to go.
        g.de_mut(DirEdgeIdx(0)).in_result = true;
        let top_left = g.node_at(p(0.0, 1.0)).unwrap();
        assert_matches!(
            g.link_result_directed_edges(top_left),
            Err(Error::Topology { .. })
        );
    }

    // Two clockwise triangles touching at the origin, with the result area
    // outside both of them. Following the result edges gives one ring through
    // the origin twice; the minimal links split it back into the triangles.
    #[test]
    fn minimal_links_at_touching_vertex() {
        let tri = |a: Coord, b: Coord| {
            let o = p(0.0, 0.0);
            vec![
                shell_edge(vec![o, a]),
                shell_edge(vec![a, b]),
                shell_edge(vec![b, o]),
            ]
        };
        let mut edges = tri(p(-1.0, 1.0), p(1.0, 1.0));
        edges.extend(tri(p(1.0, -1.0), p(-1.0, -1.0)));
        let mut g = PlanarGraph::new(edges).unwrap();
        let ring = RingIdx(0);
        for i in 0..6 {
            let de = DirEdgeIdx(2 * i + 1);
            g.de_mut(de).in_result = true;
            g.de_mut(de).edge_ring = Some(ring);
        }
        let origin = g.node_at(p(0.0, 0.0)).unwrap();
        assert_eq!(g.outgoing_degree(origin, ring), 2);
        g.link_minimal_directed_edges(origin, ring).unwrap();

        // Arriving from the upper triangle leads out along the upper triangle.
        assert_eq!(g.de(DirEdgeIdx(1)).next_min, Some(DirEdgeIdx(5)));
        assert_eq!(g.de(DirEdgeIdx(7)).next_min, Some(DirEdgeIdx(11)));
    }

    #[test]
    fn rightmost() {
        let g = PlanarGraph::new(square_edges()).unwrap();
        // At the top right corner the edges go left and down.
        let n = g.node_at(p(1.0, 1.0)).unwrap();
        let de = g.rightmost_edge(n).unwrap().unwrap();
        assert_eq!(g.de(de).p1, p(1.0, 0.0));

        let flat = vec![
            shell_edge(vec![p(0.0, 0.0), p(1.0, 0.0)]),
            shell_edge(vec![p(0.0, 0.0), p(-1.0, 0.0)]),
        ];
        let g = PlanarGraph::new(flat).unwrap();
        let n = g.node_at(p(0.0, 0.0)).unwrap();
        assert_matches!(g.rightmost_edge(n), Err(Error::Internal(_)));
    }
}
