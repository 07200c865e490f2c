//! Polygonization: the polygons formed by a set of lines.
//!
//! The lines go into a planar graph. Dangling chains and cut edges bound no
//! area, so they're removed first; what's left splits into minimal rings. The
//! clockwise rings bound faces and become shells. The counter-clockwise ones
//! are outer boundaries of connected components, and become holes of the
//! smallest shell containing them.

mod edge_ring;
mod graph;

pub use edge_ring::EdgeRing;
pub use graph::PolygonizeGraph;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{check_finite, Result},
    geom::{remove_repeated, Coord, Filter, Geometry, Polygon},
    graph::{Edge, EdgeIdx, EdgeList, Label, Location},
    intersector::LineIntersector,
    noding::{IntersectionAdder, McIndexNoder, NodedSegmentString, Noder},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonizerOptions {
    /// Node the input lines against each other (and merge duplicate pieces)
    /// before building the graph. Without this, lines must already meet only
    /// at their endpoints.
    pub node_input: bool,
}

/// Everything the polygonizer found.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygonized {
    pub polygons: Vec<Polygon>,
    /// Edges that have a free end, directly or through other dangles.
    pub dangles: Vec<Vec<Coord>>,
    /// Edges with the same face on both sides.
    pub cut_edges: Vec<Vec<Coord>>,
    /// Rings that are degenerate or intersect themselves.
    pub invalid_rings: Vec<Vec<Coord>>,
}

/// Collects lines, and computes the polygons they form on demand.
///
/// The result is computed once, on the first request for any part of it, and
/// reused until more lines are added.
#[derive(Clone, Debug, Default)]
pub struct Polygonizer {
    options: PolygonizerOptions,
    lines: Vec<Vec<Coord>>,
    result: Option<Polygonized>,
}

impl Polygonizer {
    pub fn new(options: PolygonizerOptions) -> Self {
        Polygonizer {
            options,
            ..Default::default()
        }
    }

    /// Adds every line of `geom`, including polygon rings.
    pub fn add(&mut self, geom: &Geometry) {
        let mut lines = Vec::new();
        geom.apply(&mut Filter::Component(&mut |g| match g {
            Geometry::LineString(pts) => lines.push(pts.clone()),
            Geometry::Polygon(p) => {
                lines.push(p.shell.clone());
                lines.extend(p.holes.iter().cloned());
            }
            _ => {}
        }));
        for l in lines {
            self.add_line(&l);
        }
    }

    pub fn add_line(&mut self, pts: &[Coord]) {
        self.result = None;
        self.lines.push(pts.to_vec());
    }

    pub fn polygons(&mut self) -> Result<&[Polygon]> {
        Ok(&self.compute()?.polygons)
    }

    pub fn dangles(&mut self) -> Result<&[Vec<Coord>]> {
        Ok(&self.compute()?.dangles)
    }

    pub fn cut_edges(&mut self) -> Result<&[Vec<Coord>]> {
        Ok(&self.compute()?.cut_edges)
    }

    pub fn invalid_ring_lines(&mut self) -> Result<&[Vec<Coord>]> {
        Ok(&self.compute()?.invalid_rings)
    }

    /// The whole result.
    pub fn result(&mut self) -> Result<&Polygonized> {
        self.compute()
    }

    fn compute(&mut self) -> Result<&Polygonized> {
        let result = match self.result.take() {
            Some(r) => r,
            None => self.polygonize()?,
        };
        Ok(self.result.insert(result))
    }

    fn edges(&self) -> Result<Vec<Edge>> {
        check_finite(self.lines.iter().flatten())?;
        let label = Label::line(0, Location::Interior);
        let lines = self
            .lines
            .iter()
            .map(|l| remove_repeated(l))
            .filter(|l| l.len() >= 2);
        if !self.options.node_input {
            return Ok(lines.map(|l| Edge::new(l, label)).collect());
        }

        let strings = lines.map(|l| NodedSegmentString::new(l, label)).collect();
        let noded = McIndexNoder::new(IntersectionAdder::new(LineIntersector::new())).node(strings)?;
        let mut edges = EdgeList::default();
        for ss in noded {
            let pts = remove_repeated(ss.coords());
            if pts.len() >= 2 {
                edges.insert_unique(Edge::new(pts, label));
            }
        }
        Ok(edges.into_edges())
    }

    fn polygonize(&self) -> Result<Polygonized> {
        let mut graph = PolygonizeGraph::new(self.edges()?)?;
        let dangles = graph.delete_dangles();
        let dangles = lines_of(&graph, &dangles);
        let cut_edges = graph.delete_cut_edges()?;
        let cut_edges = lines_of(&graph, &cut_edges);

        let mut shells = Vec::new();
        let mut holes = Vec::new();
        let mut invalid_rings = Vec::new();
        for edges in graph.edge_rings()? {
            let ring = EdgeRing::new(&graph.graph, edges);
            if !ring.is_valid() {
                invalid_rings.push(ring.coords);
            } else if ring.is_hole() {
                holes.push(ring);
            } else {
                shells.push(ring);
            }
        }
        debug!(
            "{} dangles, {} cut edges, {} shells, {} holes, {} invalid rings",
            dangles.len(),
            cut_edges.len(),
            shells.len(),
            holes.len(),
            invalid_rings.len()
        );

        for hole in holes {
            match hole.find_containing(&shells) {
                Some(i) => shells[i].holes.push(hole.coords),
                None => debug!("dropping unenclosed hole at {:?}", hole.coords.first()),
            }
        }

        Ok(Polygonized {
            polygons: shells.into_iter().map(EdgeRing::into_polygon).collect(),
            dangles,
            cut_edges,
            invalid_rings,
        })
    }
}

fn lines_of(graph: &PolygonizeGraph, edges: &[EdgeIdx]) -> Vec<Vec<Coord>> {
    edges.iter().map(|e| graph.edge_coords(*e).to_vec()).collect()
}
