use crate::{
    error::{Error, Result},
    geom::{is_ccw, is_point_in_ring, Coord, Envelope},
    graph::{DirEdgeIdx, PlanarGraph, RingIdx},
};

/// Maximal rings follow `next`; minimal rings follow `next_min`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingKind {
    Maximal,
    Minimal,
}

/// A closed walk of result directed edges.
#[derive(Clone, Debug)]
pub struct EdgeRing {
    pub kind: RingKind,
    pub edges: Vec<DirEdgeIdx>,
    /// Closed: the first point is repeated at the end.
    pub pts: Vec<Coord>,
    pub env: Envelope,
    is_hole: bool,
    pub shell: Option<RingIdx>,
    pub holes: Vec<RingIdx>,
}

impl EdgeRing {
    /// Walks the ring starting at `start`, recording `idx` as the ring of every
    /// directed edge on it.
    pub fn build(graph: &mut PlanarGraph, start: DirEdgeIdx, idx: RingIdx, kind: RingKind) -> Result<Self> {
        let budget = graph.dir_edges.len();
        let mut edges = Vec::new();
        let mut pts = Vec::new();
        let mut de = start;
        loop {
            let slot = match kind {
                RingKind::Maximal => &mut graph.de_mut(de).edge_ring,
                RingKind::Minimal => &mut graph.de_mut(de).min_edge_ring,
            };
            if *slot == Some(idx) || edges.len() >= budget {
                return Err(Error::topology(
                    "Directed Edge visited twice during ring-building",
                    Some(graph.de(de).p0),
                ));
            }
            *slot = Some(idx);
            edges.push(de);

            let skip = if pts.is_empty() { 0 } else { 1 };
            pts.extend(graph.coords(de).skip(skip));

            let next = match kind {
                RingKind::Maximal => graph.de(de).next,
                RingKind::Minimal => graph.de(de).next_min,
            };
            de = next.ok_or_else(|| Error::topology("found null Directed Edge", Some(graph.de(de).p1)))?;
            if de == start {
                break;
            }
        }

        let env = Envelope::from_coords(&pts);
        Ok(EdgeRing {
            kind,
            is_hole: is_ccw(&pts),
            edges,
            pts,
            env,
            shell: None,
            holes: Vec::new(),
        })
    }

    /// Holes are the counter-clockwise rings.
    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    /// Twice the largest number of this ring's edges leaving any one node.
    /// More than two means the ring touches itself.
    pub fn max_node_degree(&self, graph: &PlanarGraph, idx: RingIdx) -> usize {
        self.edges
            .iter()
            .map(|de| graph.outgoing_degree(graph.de(*de).from, idx))
            .max()
            .unwrap_or(0)
            * 2
    }

    /// Does this ring contain `p`, not counting the insides of its holes?
    pub fn contains_point(&self, rings: &[EdgeRing], p: Coord) -> bool {
        if !self.env.contains_point(p) || !is_point_in_ring(p, &self.pts) {
            return false;
        }
        !self.holes.iter().any(|h| rings[h.0].contains_point(rings, p))
    }
}
