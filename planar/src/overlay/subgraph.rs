use std::collections::{HashSet, VecDeque};

use crate::{
    error::{Error, Result},
    geom::{Coord, Envelope},
    graph::{DirEdgeIdx, NodeIdx, PlanarGraph, Position},
    orientation::{orientation, Orientation},
};

use super::Depth;

/// A connected component of the graph.
///
/// Components are processed one at a time, from right to left, so that by the
/// time a component is processed, everything that might enclose it already
/// has its depths.
#[derive(Clone, Debug)]
pub struct BufferSubgraph {
    pub dir_edges: Vec<DirEdgeIdx>,
    pub nodes: Vec<NodeIdx>,
    /// The directed edge that starts depth propagation: its right side faces
    /// out of the component.
    pub oriented_edge: DirEdgeIdx,
    pub rightmost_coord: Coord,
    pub env: Envelope,
}

impl BufferSubgraph {
    /// Collects everything reachable from `start`, marking the nodes visited.
    pub fn create(graph: &mut PlanarGraph, start: NodeIdx) -> Result<Self> {
        let mut nodes = Vec::new();
        let mut dir_edges = Vec::new();
        let mut stack = vec![start];
        while let Some(n) = stack.pop() {
            if graph.nodes[n.0].visited {
                continue;
            }
            graph.nodes[n.0].visited = true;
            nodes.push(n);
            for &de in &graph.nodes[n.0].star {
                dir_edges.push(de);
                let other = graph.de(de).to;
                if !graph.nodes[other.0].visited {
                    stack.push(other);
                }
            }
        }

        let finder = RightmostEdgeFinder::find(graph, &dir_edges)?;

        let mut env = Envelope::null();
        for de in &dir_edges {
            let pts = &graph.edge(de.edge()).coords;
            for p in &pts[..pts.len() - 1] {
                env.expand_to_include(*p);
            }
        }

        Ok(BufferSubgraph {
            dir_edges,
            nodes,
            oriented_edge: finder.oriented_edge,
            rightmost_coord: finder.coord,
            env,
        })
    }

    /// Assigns depths to every directed edge in this component, given the
    /// depth just outside it.
    pub fn compute_depth(&self, graph: &mut PlanarGraph, outside: Depth) -> Result<()> {
        for de in &self.dir_edges {
            graph.de_mut(*de).visited = false;
        }
        let start = self.oriented_edge;
        graph.set_edge_depths(start, Position::Right, outside)?;
        graph.copy_sym_depths(start)?;

        let start_node = graph.de(start).from;
        graph.de_mut(start).visited = true;
        let mut queue = VecDeque::from([start_node]);
        let mut queued = HashSet::from([start_node]);
        while let Some(node) = queue.pop_front() {
            self.compute_node_depth(graph, node)?;
            for &de in &graph.nodes[node.0].star {
                let sym = de.sym();
                if graph.de(sym).visited {
                    continue;
                }
                let adj = graph.de(sym).from;
                if queued.insert(adj) {
                    queue.push_back(adj);
                }
            }
        }
        log::trace!(
            "subgraph at {:?}: {} nodes, outside depth {outside:?}",
            self.rightmost_coord,
            self.nodes.len()
        );
        Ok(())
    }

    fn compute_node_depth(&self, graph: &mut PlanarGraph, node: NodeIdx) -> Result<()> {
        let star = graph.nodes[node.0].star.clone();
        let start = star
            .iter()
            .copied()
            .find(|de| graph.de(*de).visited || graph.de(de.sym()).visited)
            .ok_or_else(|| {
                Error::topology(
                    "unable to find edge to compute depths",
                    Some(graph.nodes[node.0].coord),
                )
            })?;
        graph.compute_depths(node, start)?;
        for de in star {
            graph.de_mut(de).visited = true;
            graph.copy_sym_depths(de)?;
        }
        Ok(())
    }

    /// Marks the directed edges that have the inside on their right and the
    /// outside on their left.
    pub fn find_result_edges(&self, graph: &mut PlanarGraph, inside: impl Fn(Depth) -> bool) {
        for &de in &self.dir_edges {
            let d = graph.de(de);
            if let (Some(left), Some(right)) = (d.depth(Position::Left), d.depth(Position::Right)) {
                if inside(right) && !inside(left) {
                    graph.de_mut(de).in_result = true;
                }
            }
        }
    }
}

/// Finds a directed edge that touches the rightmost point of a component,
/// oriented so that its right side faces out of the component.
#[derive(Clone, Debug)]
pub struct RightmostEdgeFinder {
    pub coord: Coord,
    pub oriented_edge: DirEdgeIdx,
}

impl RightmostEdgeFinder {
    pub fn find(graph: &PlanarGraph, dir_edges: &[DirEdgeIdx]) -> Result<Self> {
        let mut min: Option<(DirEdgeIdx, usize, Coord)> = None;
        for &de in dir_edges.iter().filter(|de| de.is_forward()) {
            for (i, p) in graph.edge(de.edge()).coords.iter().enumerate() {
                if min.map_or(true, |(_, _, c)| p.x > c.x) {
                    min = Some((de, i, *p));
                }
            }
        }
        let Some((mut min_de, mut min_idx, coord)) = min else {
            return Err(Error::Internal("no edges in subgraph".into()));
        };

        let len = graph.edge(min_de.edge()).coords.len();
        if min_idx == len - 1 {
            // The end of a forward edge is the start of its partner.
            min_de = min_de.sym();
            min_idx = 0;
        }

        if min_idx == 0 {
            let node = graph.de(min_de).from;
            min_de = graph
                .rightmost_edge(node)?
                .ok_or_else(|| Error::Internal("empty star at rightmost node".into()))?;
            if !min_de.is_forward() {
                min_de = min_de.sym();
                min_idx = graph.edge(min_de.edge()).coords.len() - 1;
            }
        } else {
            let pts = &graph.edge(min_de.edge()).coords;
            let prev = pts[min_idx - 1];
            let next = pts[min_idx + 1];
            let orient = orientation(coord, next, prev);
            let use_prev = (prev.y < coord.y
                && next.y < coord.y
                && orient == Orientation::Left)
                || (prev.y > coord.y && next.y > coord.y && orient == Orientation::Right);
            if use_prev {
                min_idx -= 1;
            }
        }

        let pts = &graph.edge(min_de.edge()).coords;
        let side = rightmost_side_of_segment(pts, min_idx as isize)
            .or_else(|| rightmost_side_of_segment(pts, min_idx as isize - 1))
            .ok_or_else(|| Error::topology("no non-horizontal segment at rightmost point", Some(coord)))?;
        let oriented_edge = if side == Position::Left {
            min_de.sym()
        } else {
            min_de
        };
        Ok(RightmostEdgeFinder {
            coord,
            oriented_edge,
        })
    }
}

// A segment going down has the outside of its component on its left.
fn rightmost_side_of_segment(pts: &[Coord], i: isize) -> Option<Position> {
    if i < 0 || i as usize + 1 >= pts.len() {
        return None;
    }
    let (p, q) = (pts[i as usize], pts[i as usize + 1]);
    if p.y == q.y {
        None
    } else if p.y < q.y {
        Some(Position::Right)
    } else {
        Some(Position::Left)
    }
}
