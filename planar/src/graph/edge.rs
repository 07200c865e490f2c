use std::collections::HashMap;

use crate::{
    geom::{Coord, CoordKey, Envelope},
    overlay::Depth,
};

use super::{EdgeIdx, Label};

/// An undirected chain of coordinates between two nodes.
#[derive(Clone, Debug)]
pub struct Edge {
    pub coords: Vec<Coord>,
    pub label: Label,
    /// The change in depth from the right side to the left side, in the
    /// forward direction. Merged duplicate edges add their deltas.
    pub depth_delta: Depth,
    pub env: Envelope,
}

impl Edge {
    pub fn new(coords: Vec<Coord>, label: Label) -> Self {
        let env = Envelope::from_coords(&coords);
        Edge {
            coords,
            label,
            depth_delta: Depth::default(),
            env,
        }
    }

    /// Does `other` have the same coordinates in the same order?
    pub fn is_pointwise_equal(&self, other: &Edge) -> bool {
        self.coords == other.coords
    }

    // A key that is the same for an edge and its reverse.
    fn oriented_key(&self) -> Vec<CoordKey> {
        let fwd = self.coords.iter().map(Coord::key);
        let rev = self.coords.iter().rev().map(Coord::key);
        if fwd.clone().cmp(rev.clone()).is_le() {
            fwd.collect()
        } else {
            rev.collect()
        }
    }
}

/// A list of edges with fast lookup of equal edges (in either direction).
#[derive(Clone, Debug, Default)]
pub struct EdgeList {
    edges: Vec<Edge>,
    index: HashMap<Vec<CoordKey>, EdgeIdx>,
}

impl EdgeList {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn get(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn add(&mut self, edge: Edge) -> EdgeIdx {
        let idx = EdgeIdx(self.edges.len());
        self.index.insert(edge.oriented_key(), idx);
        self.edges.push(edge);
        idx
    }

    /// An edge with the same points as `edge`, in either direction.
    pub fn find_equal(&self, edge: &Edge) -> Option<EdgeIdx> {
        self.index.get(&edge.oriented_key()).copied()
    }

    /// Adds an edge, or merges it into an existing equal edge.
    ///
    /// Merging fills in unknown label locations and adds the depth deltas, so
    /// that the merged edge accounts for every copy of it.
    pub fn insert_unique(&mut self, edge: Edge) -> EdgeIdx {
        let Some(idx) = self.find_equal(&edge) else {
            let mut edge = edge;
            edge.depth_delta = Depth::delta_of(&edge.label);
            return self.add(edge);
        };
        let existing = &mut self.edges[idx.0];
        let to_merge = if existing.is_pointwise_equal(&edge) {
            edge.label
        } else {
            edge.label.flipped()
        };
        existing.label.merge(&to_merge);
        existing.depth_delta += Depth::delta_of(&to_merge);
        idx
    }

    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::tests::p,
        graph::{Location::*, Position},
    };

    #[test]
    fn merge_reversed_duplicates() {
        let mut list = EdgeList::default();
        let e = Edge::new(
            vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)],
            Label::area(0, Boundary, Exterior, Interior),
        );
        let mut rev = e.clone();
        rev.coords.reverse();

        let i0 = list.insert_unique(e.clone());
        assert_eq!(list.get(i0).depth_delta, Depth::new(-1, 0));

        // The same edge in the same direction doubles the delta.
        assert_eq!(list.insert_unique(e), i0);
        assert_eq!(list.get(i0).depth_delta, Depth::new(-2, 0));

        // The reverse, with the same sides, cancels one out.
        assert_eq!(list.insert_unique(rev), i0);
        assert_eq!(list.get(i0).depth_delta, Depth::new(-1, 0));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(i0).label.get(0, Position::Left), Exterior);
    }

    #[test]
    fn distinct_edges() {
        let mut list = EdgeList::default();
        let a = Edge::new(vec![p(0.0, 0.0), p(1.0, 0.0)], Label::default());
        let b = Edge::new(vec![p(0.0, 0.0), p(1.0, 1.0)], Label::default());
        list.insert_unique(a);
        list.insert_unique(b.clone());
        assert_eq!(list.len(), 2);
        assert_eq!(list.find_equal(&b), Some(EdgeIdx(1)));
    }
}
