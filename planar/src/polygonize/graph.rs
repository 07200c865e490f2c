use crate::{
    error::{Error, Result},
    geom::Coord,
    graph::{DirEdgeIdx, Edge, EdgeIdx, NodeIdx, PlanarGraph},
};

/// A planar graph of linework, with the bookkeeping the polygonizer needs on
/// top of the shared graph arenas.
///
/// Deleting an edge only marks it; deleted edges are skipped by every walk.
#[derive(Clone, Debug)]
pub struct PolygonizeGraph {
    pub graph: PlanarGraph,
    deleted: Vec<bool>,
    ring_label: Vec<Option<usize>>,
    next: Vec<Option<DirEdgeIdx>>,
    in_ring: Vec<bool>,
}

impl PolygonizeGraph {
    /// Builds the graph from noded lines, each with at least two points.
    pub fn new(edges: Vec<Edge>) -> Result<Self> {
        let graph = PlanarGraph::new(edges)?;
        let n_edges = graph.edges.len();
        let n_des = graph.dir_edges.len();
        Ok(PolygonizeGraph {
            graph,
            deleted: vec![false; n_edges],
            ring_label: vec![None; n_des],
            next: vec![None; n_des],
            in_ring: vec![false; n_des],
        })
    }

    pub fn is_deleted(&self, de: DirEdgeIdx) -> bool {
        self.deleted[de.edge().0]
    }

    fn delete(&mut self, e: EdgeIdx) {
        self.deleted[e.0] = true;
    }

    pub fn edge_coords(&self, e: EdgeIdx) -> &[Coord] {
        &self.graph.edge(e).coords
    }

    fn live_star(&self, node: NodeIdx) -> impl Iterator<Item = DirEdgeIdx> + '_ {
        self.graph
            .node(node)
            .star
            .iter()
            .copied()
            .filter(|de| !self.is_deleted(*de))
    }

    fn degree(&self, node: NodeIdx) -> usize {
        self.live_star(node).count()
    }

    fn degree_with_label(&self, node: NodeIdx, label: usize) -> usize {
        self.live_star(node)
            .filter(|de| self.ring_label[de.0] == Some(label))
            .count()
    }

    /// Deletes chains of edges that end at a node of degree one, returning
    /// the deleted edges.
    pub fn delete_dangles(&mut self) -> Vec<EdgeIdx> {
        let mut stack: Vec<NodeIdx> = self
            .graph
            .node_indices()
            .filter(|n| self.degree(*n) == 1)
            .collect();
        let mut dangles = Vec::new();
        while let Some(node) = stack.pop() {
            for de in self.live_star(node).collect::<Vec<_>>() {
                self.delete(de.edge());
                dangles.push(de.edge());
                let to = self.graph.de(de).to;
                if self.degree(to) == 1 {
                    stack.push(to);
                }
            }
        }
        dangles
    }

    /// Deletes the edges that have the same face on both sides, returning
    /// them.
    pub fn delete_cut_edges(&mut self) -> Result<Vec<EdgeIdx>> {
        self.compute_next_cw_edges();
        self.label_edge_rings()?;

        let mut cut_edges = Vec::new();
        for de in self.graph.dir_edge_indices() {
            if !de.is_forward() || self.is_deleted(de) {
                continue;
            }
            if self.ring_label[de.0] == self.ring_label[de.sym().0] {
                self.delete(de.edge());
                cut_edges.push(de.edge());
            }
        }
        Ok(cut_edges)
    }

    /// Traces the minimal rings of the remaining edges. Each live directed
    /// edge ends up in exactly one of the returned rings.
    pub fn edge_rings(&mut self) -> Result<Vec<Vec<DirEdgeIdx>>> {
        self.compute_next_cw_edges();
        self.ring_label.iter_mut().for_each(|l| *l = None);
        let maximal = self.label_edge_rings()?;
        self.convert_maximal_to_minimal(&maximal)?;

        self.in_ring.iter_mut().for_each(|r| *r = false);
        let mut rings = Vec::new();
        for de in self.graph.dir_edge_indices() {
            if self.is_deleted(de) || self.in_ring[de.0] {
                continue;
            }
            let ring = self.walk(de)?;
            for d in &ring {
                self.in_ring[d.0] = true;
            }
            rings.push(ring);
        }
        Ok(rings)
    }

    // At every node, each incoming edge is followed by the next outgoing edge
    // counter-clockwise, so that bounded faces are traced clockwise.
    fn compute_next_cw_edges(&mut self) {
        for node in self.graph.node_indices() {
            let star: Vec<_> = self.live_star(node).collect();
            let Some(&first) = star.first() else {
                continue;
            };
            for w in star.windows(2) {
                self.next[w[0].sym().0] = Some(w[1]);
            }
            if let Some(&last) = star.last() {
                self.next[last.sym().0] = Some(first);
            }
        }
    }

    // Labels every live directed edge with the number of the ring it's in,
    // returning one starting edge for each ring.
    fn label_edge_rings(&mut self) -> Result<Vec<DirEdgeIdx>> {
        let mut starts = Vec::new();
        for de in self.graph.dir_edge_indices() {
            if self.is_deleted(de) || self.ring_label[de.0].is_some() {
                continue;
            }
            let label = starts.len();
            for d in self.walk(de)? {
                self.ring_label[d.0] = Some(label);
            }
            starts.push(de);
        }
        Ok(starts)
    }

    // Follows `next` pointers from `start` back to `start`.
    fn walk(&self, start: DirEdgeIdx) -> Result<Vec<DirEdgeIdx>> {
        let mut ret = vec![start];
        let mut de = start;
        loop {
            de = self.next[de.0].ok_or_else(|| {
                Error::Internal(format!("{de:?} has no next edge"))
            })?;
            if de == start {
                return Ok(ret);
            }
            if ret.len() > self.graph.dir_edges.len() {
                return Err(Error::topology(
                    "edge ring does not close",
                    Some(self.graph.de(start).p0),
                ));
            }
            ret.push(de);
        }
    }

    // A maximal ring can pass through a node more than once. At those nodes,
    // relink the ring's edges so that it splits into minimal rings.
    fn convert_maximal_to_minimal(&mut self, starts: &[DirEdgeIdx]) -> Result<()> {
        for &start in starts {
            let Some(label) = self.ring_label[start.0] else {
                continue;
            };
            let nodes: Vec<NodeIdx> = self
                .walk(start)?
                .into_iter()
                .map(|de| self.graph.de(de).from)
                .filter(|n| self.degree_with_label(*n, label) > 1)
                .collect();
            for node in nodes {
                self.compute_next_ccw_edges(node, label)?;
            }
        }
        Ok(())
    }

    // Links each incoming edge of the ring to the first outgoing edge of the
    // same ring clockwise from it.
    fn compute_next_ccw_edges(&mut self, node: NodeIdx, label: usize) -> Result<()> {
        let star: Vec<_> = self.live_star(node).collect();
        let mut first_out = None;
        let mut prev_in: Option<DirEdgeIdx> = None;
        for &de in star.iter().rev() {
            let sym = de.sym();
            let out_de = (self.ring_label[de.0] == Some(label)).then_some(de);
            let in_de = (self.ring_label[sym.0] == Some(label)).then_some(sym);
            if out_de.is_none() && in_de.is_none() {
                continue;
            }
            if in_de.is_some() {
                prev_in = in_de;
            }
            if let Some(out_de) = out_de {
                if let Some(p) = prev_in.take() {
                    self.next[p.0] = Some(out_de);
                }
                first_out.get_or_insert(out_de);
            }
        }
        if let Some(p) = prev_in {
            let first = first_out.ok_or_else(|| {
                Error::topology(
                    "found an incoming ring edge with no outgoing one",
                    Some(self.graph.node(node).coord),
                )
            })?;
            self.next[p.0] = Some(first);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::tests::ring,
        graph::{Label, Location},
    };

    fn graph(lines: &[&[(f64, f64)]]) -> PolygonizeGraph {
        let edges = lines
            .iter()
            .map(|l| Edge::new(ring(l), Label::line(0, Location::Interior)))
            .collect();
        PolygonizeGraph::new(edges).unwrap()
    }

    #[test]
    fn dangle_chains_are_deleted() {
        let mut g = graph(&[
            &[(0.0, 0.0), (4.0, 0.0)],
            &[(4.0, 0.0), (0.0, 4.0)],
            &[(0.0, 4.0), (0.0, 0.0)],
            // A chain of two edges hanging off a corner.
            &[(4.0, 0.0), (6.0, 0.0)],
            &[(6.0, 0.0), (8.0, 1.0)],
        ]);
        let mut dangles = g.delete_dangles();
        dangles.sort();
        assert_eq!(dangles, vec![EdgeIdx(3), EdgeIdx(4)]);
        assert!(g.delete_cut_edges().unwrap().is_empty());
        let rings = g.edge_rings().unwrap();
        assert_eq!(rings.len(), 2);
        assert!(rings.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn bridge_is_a_cut_edge() {
        // Two triangles joined by a bridge.
        let mut g = graph(&[
            &[(2.0, 0.0), (0.0, 2.0), (0.0, 0.0), (2.0, 0.0)],
            &[(2.0, 0.0), (5.0, 0.0)],
            &[(5.0, 0.0), (7.0, 0.0), (5.0, 2.0), (5.0, 0.0)],
        ]);
        assert!(g.delete_dangles().is_empty());
        assert_eq!(g.delete_cut_edges().unwrap(), vec![EdgeIdx(1)]);
        // Two faces, and one outer ring for each triangle.
        assert_eq!(g.edge_rings().unwrap().len(), 4);
    }

    #[test]
    fn touching_rings_split_at_the_shared_node() {
        // A bow tie: two triangles meeting at (2, 2).
        let mut g = graph(&[
            &[(2.0, 2.0), (0.0, 0.0), (0.0, 4.0), (2.0, 2.0)],
            &[(2.0, 2.0), (4.0, 0.0), (4.0, 4.0), (2.0, 2.0)],
        ]);
        let rings = g.edge_rings().unwrap();
        // Each face, plus the outer boundary split in two.
        assert_eq!(rings.len(), 4);
        let mut seen: Vec<_> = rings.iter().flatten().copied().collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), g.graph.dir_edges.len());
    }
}
