use std::cmp::Ordering;

use crate::{
    error::{Error, Result},
    geom::{Coord, LineSegment},
    graph::{PlanarGraph, Position},
    orientation::orientation_index,
};

use super::{BufferSubgraph, Depth};

/// Finds the depth at a point outside some already-processed subgraphs, by
/// looking at the nearest segment to its right.
pub struct SubgraphDepthLocater<'a> {
    graph: &'a PlanarGraph,
    subgraphs: &'a [BufferSubgraph],
}

/// A segment crossed by a horizontal ray, pointing upwards, and the depth on
/// its left.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DepthSegment {
    upward: LineSegment,
    left_depth: Depth,
}

impl DepthSegment {
    // Orders segments that cross one horizontal ray from left to right.
    // Vertical segments on the same x are decided by their endpoints.
    fn compare(&self, other: &DepthSegment) -> Ordering {
        let (a, b) = (&self.upward, &other.upward);
        match (a.min_x() >= b.max_x(), a.max_x() <= b.min_x()) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        // If the other segment is on our left, we're further right.
        let mut orient = a.orientation_index_of(b);
        if orient == 0 {
            orient = -b.orientation_index_of(a);
        }
        match orient {
            1 => Ordering::Greater,
            -1 => Ordering::Less,
            _ => a.cmp_points(b),
        }
    }
}

impl<'a> SubgraphDepthLocater<'a> {
    pub fn new(graph: &'a PlanarGraph, subgraphs: &'a [BufferSubgraph]) -> Self {
        SubgraphDepthLocater { graph, subgraphs }
    }

    /// The depth at `p`: the left depth of the nearest segment to its right,
    /// or zero if there isn't one.
    ///
    /// Every subgraph must already have its depths computed.
    pub fn depth(&self, p: Coord) -> Result<Depth> {
        Ok(self
            .stabbed_segments(p)?
            .into_iter()
            .min_by(DepthSegment::compare)
            .map(|ds| ds.left_depth)
            .unwrap_or_default())
    }

    fn stabbed_segments(&self, p: Coord) -> Result<Vec<DepthSegment>> {
        let mut ret = Vec::new();
        for sg in self.subgraphs {
            if p.y < sg.env.min_y || p.y > sg.env.max_y {
                continue;
            }
            for de in sg.dir_edges.iter().filter(|de| de.is_forward()) {
                let pts = &self.graph.edge(de.edge()).coords;
                for w in pts.windows(2) {
                    let mut seg = LineSegment::new(w[0], w[1]);
                    let flipped = seg.p0.y > seg.p1.y;
                    if flipped {
                        seg = seg.reversed();
                    }
                    if seg.max_x() < p.x
                        || seg.is_horizontal()
                        || p.y < seg.p0.y
                        || p.y > seg.p1.y
                        || orientation_index(seg.p0, seg.p1, p) < 0
                    {
                        continue;
                    }
                    let pos = if flipped { Position::Right } else { Position::Left };
                    let left_depth = self.graph.de(*de).depth(pos).ok_or_else(|| {
                        Error::topology(format!("{de:?} has no depth beside {p:?}"), Some(seg.p0))
                    })?;
                    ret.push(DepthSegment {
                        upward: seg,
                        left_depth,
                    });
                }
            }
        }
        Ok(ret)
    }
}
