use std::{cmp::Ordering, collections::BTreeSet};

use crate::{
    error::{Error, Result},
    geom::Coord,
    intersector::Intersection,
};

use super::octant::{compare_along, segment_octant};

/// A point at which a segment string gets split.
#[derive(Clone, Copy, Debug)]
pub struct SegmentNode {
    pub coord: Coord,
    /// The index of the segment containing the node. A node that lies exactly on
    /// a vertex is attributed to the segment starting at that vertex.
    pub segment_index: usize,
    octant: u8,
    interior: bool,
}

impl SegmentNode {
    fn new(coord: Coord, segment_index: usize, pts: &[Coord]) -> Self {
        let octant = match pts.get(segment_index + 1) {
            Some(next) => segment_octant(pts[segment_index], *next),
            None => 0,
        };
        SegmentNode {
            coord,
            segment_index,
            octant,
            interior: coord != pts[segment_index],
        }
    }

    /// Is this node strictly inside its segment (as opposed to on its start vertex)?
    pub fn is_interior(&self) -> bool {
        self.interior
    }
}

impl Ord for SegmentNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segment_index
            .cmp(&other.segment_index)
            .then_with(|| compare_along(self.octant, self.coord, other.coord))
    }
}

impl PartialOrd for SegmentNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SegmentNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SegmentNode {}

/// The nodes of a segment string, in order along the string.
#[derive(Clone, Debug, Default)]
pub struct SegmentNodeList {
    nodes: BTreeSet<SegmentNode>,
}

impl SegmentNodeList {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentNode> {
        self.nodes.iter()
    }

    fn add(&mut self, coord: Coord, segment_index: usize, pts: &[Coord]) -> Result<()> {
        let node = SegmentNode::new(coord, segment_index, pts);
        if let Some(existing) = self.nodes.get(&node) {
            if existing.coord != coord {
                return Err(Error::topology(
                    "found equal nodes with different coordinates",
                    Some(coord),
                ));
            }
            return Ok(());
        }
        self.nodes.insert(node);
        Ok(())
    }
}

/// A sequence of coordinates that accumulates the nodes that will split it.
///
/// The `data` tag is carried unchanged onto every piece after splitting.
#[derive(Clone, Debug)]
pub struct NodedSegmentString<D = ()> {
    pts: Vec<Coord>,
    pub data: D,
    nodes: SegmentNodeList,
}

impl<D> NodedSegmentString<D> {
    pub fn new(pts: Vec<Coord>, data: D) -> Self {
        NodedSegmentString {
            pts,
            data,
            nodes: SegmentNodeList::default(),
        }
    }

    pub fn coords(&self) -> &[Coord] {
        &self.pts
    }

    pub fn into_coords(self) -> Vec<Coord> {
        self.pts
    }

    /// The coordinates and the data tag, dropping any nodes.
    pub fn into_parts(self) -> (Vec<Coord>, D) {
        (self.pts, self.data)
    }

    pub fn coord(&self, idx: usize) -> Coord {
        self.pts[idx]
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.pts.len() > 1 && self.pts.first() == self.pts.last()
    }

    pub fn node_list(&self) -> &SegmentNodeList {
        &self.nodes
    }

    /// Adds every point of `int` as a node on segment `segment_index`.
    pub fn add_intersections(&mut self, int: &Intersection, segment_index: usize) -> Result<()> {
        for pt in int.points() {
            self.add_intersection(*pt, segment_index)?;
        }
        Ok(())
    }

    /// Adds a node on the segment `segment_index`.
    ///
    /// A node equal to the segment's end vertex is attributed to the next
    /// segment, so that every vertex has exactly one representation.
    pub fn add_intersection(&mut self, pt: Coord, segment_index: usize) -> Result<()> {
        let mut idx = segment_index;
        if self.pts.get(idx + 1) == Some(&pt) {
            idx += 1;
        }
        self.nodes.add(pt, idx, &self.pts)
    }

    fn add_endpoints(&mut self) -> Result<()> {
        if let (Some(first), Some(last)) = (self.pts.first(), self.pts.last()) {
            let (first, last) = (*first, *last);
            self.nodes.add(first, 0, &self.pts)?;
            self.nodes.add(last, self.pts.len() - 1, &self.pts)?;
        }
        Ok(())
    }

    /// Adds nodes at vertices where the string collapses back on itself.
    ///
    /// There are two cases: two nodes at the same point with exactly one
    /// vertex between them, and a vertex whose neighbours are equal (a spike).
    fn add_collapsed_nodes(&mut self) -> Result<()> {
        let mut collapsed = Vec::new();

        let mut prev: Option<&SegmentNode> = None;
        for node in self.nodes.iter() {
            if let Some(prev) = prev {
                if prev.coord == node.coord {
                    let mut between = node.segment_index as isize - prev.segment_index as isize;
                    if !node.is_interior() {
                        between -= 1;
                    }
                    if between == 1 {
                        collapsed.push(prev.segment_index + 1);
                    }
                }
            }
            prev = Some(node);
        }

        for (i, w) in self.pts.windows(3).enumerate() {
            if w[0] == w[2] {
                collapsed.push(i + 1);
            }
        }

        for idx in collapsed {
            let pt = self.pts[idx];
            self.nodes.add(pt, idx, &self.pts)?;
        }
        Ok(())
    }
}

impl<D: Clone> NodedSegmentString<D> {
    /// Splits this string at its nodes (its endpoints always count as nodes).
    ///
    /// Consecutive pieces share their boundary node, so concatenating the
    /// pieces (dropping the shared points) gives back the original string.
    pub fn split(&mut self) -> Result<Vec<NodedSegmentString<D>>> {
        if self.pts.is_empty() {
            return Ok(Vec::new());
        }
        self.add_endpoints()?;
        self.add_collapsed_nodes()?;

        let nodes: Vec<SegmentNode> = self.nodes.iter().copied().collect();
        let mut ret = Vec::with_capacity(nodes.len().saturating_sub(1));
        for w in nodes.windows(2) {
            ret.push(self.split_piece(&w[0], &w[1]));
        }
        self.check_pieces(&ret)?;
        Ok(ret)
    }

    fn split_piece(&self, n0: &SegmentNode, n1: &SegmentNode) -> NodedSegmentString<D> {
        let mut pts = Vec::with_capacity(n1.segment_index - n0.segment_index + 2);
        pts.push(n0.coord);
        pts.extend_from_slice(&self.pts[n0.segment_index + 1..=n1.segment_index]);
        let last_seg_start = self.pts[n1.segment_index];
        if n1.is_interior() || n1.coord != last_seg_start {
            pts.push(n1.coord);
        }
        NodedSegmentString::new(pts, self.data.clone())
    }

    fn check_pieces(&self, pieces: &[NodedSegmentString<D>]) -> Result<()> {
        let (Some(first), Some(last)) = (pieces.first(), pieces.last()) else {
            return Ok(());
        };
        if first.pts.first() != self.pts.first() {
            return Err(Error::Internal("bad split edge start point".into()));
        }
        if last.pts.last() != self.pts.last() {
            return Err(Error::Internal("bad split edge end point".into()));
        }
        Ok(())
    }

    /// Splits every string in `strings` at its nodes.
    pub fn noded_substrings(strings: &mut [NodedSegmentString<D>]) -> Result<Vec<NodedSegmentString<D>>> {
        let mut ret = Vec::new();
        for s in strings {
            ret.extend(s.split()?);
        }
        Ok(ret)
    }
}
