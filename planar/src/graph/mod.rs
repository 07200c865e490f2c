//! The planar graph of noded edges.
//!
//! Everything lives in arenas owned by [`PlanarGraph`], and refers to
//! everything else by index. Each edge gets two directed edges, stored next
//! to one another: the forward one at `2 * i` and the backward one at
//! `2 * i + 1`. So the symmetric partner of a directed edge is always at
//! `idx ^ 1`.

mod edge;
mod label;
mod location;
pub mod quadrant;
mod star;

pub use edge::{Edge, EdgeList};
pub use label::{Label, TopologyLocation};
pub use location::{Location, Position};

use std::collections::BTreeMap;

use crate::{
    error::{Error, Result},
    geom::{Coord, CoordKey},
    overlay::Depth,
};

/// An index into the graph's edges.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct EdgeIdx(pub usize);

impl std::fmt::Debug for EdgeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e_{}", self.0)
    }
}

/// An index into the graph's directed edges.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct DirEdgeIdx(pub usize);

impl std::fmt::Debug for DirEdgeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d_{}", self.0)
    }
}

impl DirEdgeIdx {
    /// The directed edge running the other way along the same edge.
    pub fn sym(self) -> DirEdgeIdx {
        DirEdgeIdx(self.0 ^ 1)
    }

    pub fn edge(self) -> EdgeIdx {
        EdgeIdx(self.0 / 2)
    }

    pub fn is_forward(self) -> bool {
        self.0 % 2 == 0
    }
}

/// An index into the graph's nodes.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct NodeIdx(pub usize);

impl std::fmt::Debug for NodeIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n_{}", self.0)
    }
}

/// An index into some list of edge rings. The graph doesn't own the rings; it
/// only records which ring each directed edge was assigned to.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct RingIdx(pub usize);

impl std::fmt::Debug for RingIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r_{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub coord: Coord,
    /// The outgoing directed edges, sorted counter-clockwise starting from
    /// the positive x axis.
    pub star: Vec<DirEdgeIdx>,
    pub visited: bool,
}

#[derive(Clone, Debug)]
pub struct DirectedEdge {
    pub from: NodeIdx,
    pub to: NodeIdx,
    /// The first two points, in this edge's direction.
    pub p0: Coord,
    pub p1: Coord,
    pub quadrant: u8,
    depth: [Option<Depth>; 3],
    pub next: Option<DirEdgeIdx>,
    pub next_min: Option<DirEdgeIdx>,
    pub edge_ring: Option<RingIdx>,
    pub min_edge_ring: Option<RingIdx>,
    pub in_result: bool,
    pub visited: bool,
}

impl DirectedEdge {
    fn new(from: NodeIdx, to: NodeIdx, p0: Coord, p1: Coord) -> Self {
        DirectedEdge {
            from,
            to,
            p0,
            p1,
            quadrant: quadrant::quadrant_of(p0, p1),
            depth: [None; 3],
            next: None,
            next_min: None,
            edge_ring: None,
            min_edge_ring: None,
            in_result: false,
            visited: false,
        }
    }

    pub fn dx(&self) -> f64 {
        self.p1.x - self.p0.x
    }

    pub fn dy(&self) -> f64 {
        self.p1.y - self.p0.y
    }

    pub fn depth(&self, pos: Position) -> Option<Depth> {
        self.depth[pos.index()]
    }

    /// Compares directions, counter-clockwise from the positive x axis.
    ///
    /// Quadrants are compared first; within a quadrant, the orientation
    /// predicate decides.
    pub fn compare_direction(&self, other: &DirectedEdge) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        if self.dx() == other.dx() && self.dy() == other.dy() {
            return Ordering::Equal;
        }
        self.quadrant.cmp(&other.quadrant).then_with(|| {
            crate::orientation::orientation_index(other.p0, other.p1, self.p1).cmp(&0)
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct PlanarGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub dir_edges: Vec<DirectedEdge>,
    node_map: BTreeMap<CoordKey, NodeIdx>,
}

impl PlanarGraph {
    /// Builds a graph from edges that are already noded and de-duplicated.
    ///
    /// Every edge needs at least two points.
    pub fn new(edges: Vec<Edge>) -> Result<Self> {
        let mut ret = PlanarGraph::default();
        for edge in edges {
            ret.add_edge(edge)?;
        }
        for i in 0..ret.nodes.len() {
            let mut star = std::mem::take(&mut ret.nodes[i].star);
            star.sort_by(|a, b| ret.dir_edges[a.0].compare_direction(&ret.dir_edges[b.0]));
            ret.nodes[i].star = star;
        }
        Ok(ret)
    }

    fn add_node(&mut self, coord: Coord) -> NodeIdx {
        let next_idx = NodeIdx(self.nodes.len());
        let idx = *self.node_map.entry(coord.key()).or_insert(next_idx);
        if idx == next_idx {
            self.nodes.push(Node {
                coord,
                star: Vec::new(),
                visited: false,
            });
        }
        idx
    }

    fn add_edge(&mut self, edge: Edge) -> Result<()> {
        let n = edge.coords.len();
        if n < 2 {
            return Err(Error::InvalidArgument(
                "graph edges need at least two points".into(),
            ));
        }
        let start = edge.coords[0];
        let end = edge.coords[n - 1];
        let from = self.add_node(start);
        let to = self.add_node(end);

        let fwd = DirEdgeIdx(self.dir_edges.len());
        self.dir_edges
            .push(DirectedEdge::new(from, to, start, edge.coords[1]));
        self.dir_edges
            .push(DirectedEdge::new(to, from, end, edge.coords[n - 2]));
        self.nodes[from.0].star.push(fwd);
        self.nodes[to.0].star.push(fwd.sym());
        self.edges.push(edge);
        Ok(())
    }

    pub fn node_at(&self, c: Coord) -> Option<NodeIdx> {
        self.node_map.get(&c.key()).copied()
    }

    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIdx> {
        (0..self.nodes.len()).map(NodeIdx)
    }

    pub fn dir_edge_indices(&self) -> impl Iterator<Item = DirEdgeIdx> {
        (0..self.dir_edges.len()).map(DirEdgeIdx)
    }

    pub fn de(&self, idx: DirEdgeIdx) -> &DirectedEdge {
        &self.dir_edges[idx.0]
    }

    pub fn de_mut(&mut self, idx: DirEdgeIdx) -> &mut DirectedEdge {
        &mut self.dir_edges[idx.0]
    }

    pub fn edge(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx.0]
    }

    /// The label of a directed edge: its edge's label, flipped if it runs backwards.
    pub fn label(&self, de: DirEdgeIdx) -> Label {
        let label = self.edges[de.edge().0].label;
        if de.is_forward() {
            label
        } else {
            label.flipped()
        }
    }

    /// The coordinates of a directed edge, in its direction.
    pub fn coords(&self, de: DirEdgeIdx) -> impl Iterator<Item = Coord> + '_ {
        let pts = &self.edges[de.edge().0].coords;
        let fwd = de.is_forward();
        (0..pts.len()).map(move |i| if fwd { pts[i] } else { pts[pts.len() - 1 - i] })
    }

    pub fn set_depth(&mut self, de: DirEdgeIdx, pos: Position, depth: Depth) -> Result<()> {
        let slot = &mut self.dir_edges[de.0].depth[pos.index()];
        match slot {
            Some(d) if *d != depth => Err(Error::topology(
                "assigned depths do not match",
                Some(self.dir_edges[de.0].p0),
            )),
            _ => {
                *slot = Some(depth);
                Ok(())
            }
        }
    }

    /// Sets the depth on one side of a directed edge, and derives the depth
    /// on the other side from the edge's depth delta.
    pub fn set_edge_depths(&mut self, de: DirEdgeIdx, pos: Position, depth: Depth) -> Result<()> {
        let mut delta = self.edges[de.edge().0].depth_delta;
        if !de.is_forward() {
            delta = -delta;
        }
        let factor = if pos == Position::Left { -1 } else { 1 };
        self.set_depth(de, pos, depth)?;
        self.set_depth(de, pos.opposite(), depth + delta * factor)
    }

    /// Copies this directed edge's depths onto its partner, with sides swapped.
    pub fn copy_sym_depths(&mut self, de: DirEdgeIdx) -> Result<()> {
        let sym = de.sym();
        if let Some(d) = self.de(de).depth(Position::Right) {
            self.set_depth(sym, Position::Left, d)?;
        }
        if let Some(d) = self.de(de).depth(Position::Left) {
            self.set_depth(sym, Position::Right, d)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geom::tests::p;
    use assert_matches::assert_matches;
    use Location::*;

    pub fn shell_edge(coords: Vec<Coord>) -> Edge {
        let label = Label::area(0, Boundary, Exterior, Interior);
        let mut e = Edge::new(coords, label);
        e.depth_delta = Depth::delta_of(&label);
        e
    }

    #[test]
    fn star_is_counter_clockwise() {
        let centre = p(0.0, 0.0);
        let ends = [p(-1.0, -1.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 2.0), p(-2.0, 0.5)];
        let edges = ends
            .iter()
            .map(|e| shell_edge(vec![centre, *e]))
            .collect();
        let g = PlanarGraph::new(edges).unwrap();
        let n = g.node_at(centre).unwrap();
        let order: Vec<Coord> = g.node(n).star.iter().map(|de| g.de(*de).p1).collect();
        assert_eq!(
            order,
            vec![p(1.0, 0.0), p(1.0, 2.0), p(0.0, 1.0), p(-2.0, 0.5), p(-1.0, -1.0)]
        );
    }

    #[test]
    fn sym_pairs() {
        let g = PlanarGraph::new(vec![shell_edge(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)])]).unwrap();
        let fwd = DirEdgeIdx(0);
        assert_eq!(fwd.sym(), DirEdgeIdx(1));
        assert_eq!(fwd.sym().sym(), fwd);
        assert_eq!(g.de(fwd.sym()).p0, p(1.0, 1.0));
        assert_eq!(g.de(fwd.sym()).p1, p(1.0, 0.0));
        assert_eq!(g.de(fwd).to, g.de(fwd.sym()).from);
        assert_eq!(
            g.coords(fwd.sym()).collect::<Vec<_>>(),
            vec![p(1.0, 1.0), p(1.0, 0.0), p(0.0, 0.0)]
        );
        assert_eq!(g.label(fwd.sym()).get(0, Position::Left), Interior);
    }

    // The shell edge has the exterior on the left and the interior on the
    // right, so its depth delta is -1: the left side is one shallower.
    #[test]
    fn edge_depth_signs() {
        let mut g = PlanarGraph::new(vec![shell_edge(vec![p(0.0, 0.0), p(1.0, 0.0)])]).unwrap();
        let (fwd, bwd) = (DirEdgeIdx(0), DirEdgeIdx(1));
        let d = |a| Depth::new(a, 0);

        // forward, given the right side
        g.set_edge_depths(fwd, Position::Right, d(1)).unwrap();
        assert_eq!(g.de(fwd).depth(Position::Left), Some(d(0)));

        // backward, given the right side (which is the forward edge's left)
        g.set_edge_depths(bwd, Position::Right, d(0)).unwrap();
        assert_eq!(g.de(bwd).depth(Position::Left), Some(d(1)));

        let mut g = PlanarGraph::new(vec![shell_edge(vec![p(0.0, 0.0), p(1.0, 0.0)])]).unwrap();
        // forward, given the left side
        g.set_edge_depths(fwd, Position::Left, d(3)).unwrap();
        assert_eq!(g.de(fwd).depth(Position::Right), Some(d(4)));

        // backward, given the left side
        g.set_edge_depths(bwd, Position::Left, d(4)).unwrap();
        assert_eq!(g.de(bwd).depth(Position::Right), Some(d(3)));

        g.copy_sym_depths(fwd).unwrap();
        assert_matches!(
            g.set_edge_depths(fwd, Position::Left, d(7)),
            Err(Error::Topology { .. })
        );
    }
}
