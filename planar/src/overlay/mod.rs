//! The depth engine.
//!
//! Labelled curves are noded and merged into a planar graph. Each connected
//! component of the graph gets depths on both sides of every edge, starting
//! from the depth just outside the component. The edges with the inside on
//! their right and the outside on their left are then traced into rings, and
//! the rings into polygons.

mod depth;
mod depth_locater;
mod edge_ring;
mod polygon_builder;
mod subgraph;

pub use depth::Depth;
pub use depth_locater::SubgraphDepthLocater;
pub use edge_ring::{EdgeRing, RingKind};
pub use polygon_builder::PolygonBuilder;
pub use subgraph::{BufferSubgraph, RightmostEdgeFinder};

use log::debug;

use crate::{
    error::Result,
    geom::{is_ccw, is_closed, remove_repeated, Coord, Filter, Geometry, Polygon},
    graph::{Edge, EdgeList, Label, Location, PlanarGraph},
    noding::{NodedSegmentString, Noder},
};

/// Runs labelled curves through noding, depth assignment and polygon assembly.
#[derive(Clone, Debug, Default)]
pub struct OverlayBuilder<N> {
    noder: N,
}

impl<N: Noder> OverlayBuilder<N> {
    pub fn new(noder: N) -> Self {
        OverlayBuilder { noder }
    }

    /// Builds the polygons bounding the region where `inside` holds.
    pub fn build(
        &mut self,
        curves: Vec<NodedSegmentString<Label>>,
        inside: impl Fn(Depth) -> bool,
    ) -> Result<Vec<Polygon>> {
        if curves.is_empty() {
            return Ok(Vec::new());
        }
        let noded = self.noder.node(curves)?;

        let mut edges = EdgeList::default();
        for ss in noded {
            let (pts, label) = ss.into_parts();
            let pts = remove_repeated(&pts);
            // Collapsed to a point.
            if pts.len() < 2 {
                continue;
            }
            edges.insert_unique(Edge::new(pts, label));
        }
        debug!("{} noded edges", edges.len());

        let mut graph = PlanarGraph::new(edges.into_edges())?;
        let mut subgraphs = Vec::new();
        for n in graph.node_indices().collect::<Vec<_>>() {
            if !graph.node(n).visited {
                subgraphs.push(BufferSubgraph::create(&mut graph, n)?);
            }
        }
        // Right to left, so that enclosing components come first.
        subgraphs.sort_by(|a, b| b.rightmost_coord.x.total_cmp(&a.rightmost_coord.x));
        debug!("{} subgraphs", subgraphs.len());

        let mut builder = PolygonBuilder::default();
        let mut processed = Vec::with_capacity(subgraphs.len());
        for sg in subgraphs {
            let outside =
                SubgraphDepthLocater::new(&graph, &processed).depth(sg.rightmost_coord)?;
            sg.compute_depth(&mut graph, outside)?;
            sg.find_result_edges(&mut graph, &inside);
            builder.add(&mut graph, &sg.dir_edges, &sg.nodes)?;
            processed.push(sg);
        }
        let polys = builder.polygons();
        debug!("{} result polygons", polys.len());
        Ok(polys)
    }
}

/// The labelled curves for one input of an overlay.
///
/// Polygon rings are labelled by what they bound: the inside of a shell and
/// the outside of a hole count one deeper, whichever way the ring runs. Closed
/// line strings are labelled by direction, with the left side one deeper, so
/// that depths become winding numbers. Open line strings and points bound
/// nothing and are skipped.
pub fn overlay_curves(geom: &Geometry, geom_idx: usize) -> Vec<NodedSegmentString<Label>> {
    let mut ret = Vec::new();
    let mut add = |pts: &[Coord], deeper_left: bool| {
        let pts = remove_repeated(pts);
        if pts.len() < 2 {
            return;
        }
        let (left, right) = if deeper_left {
            (Location::Interior, Location::Exterior)
        } else {
            (Location::Exterior, Location::Interior)
        };
        let label = Label::area(geom_idx, Location::Boundary, left, right);
        ret.push(NodedSegmentString::new(pts, label));
    };
    geom.apply(&mut Filter::Component(&mut |g| match g {
        Geometry::Polygon(p) => {
            add(&p.shell, is_ccw(&p.shell));
            for h in &p.holes {
                add(h, !is_ccw(h));
            }
        }
        Geometry::LineString(pts) if is_closed(pts) => add(pts, true),
        _ => {}
    }));
    ret
}
