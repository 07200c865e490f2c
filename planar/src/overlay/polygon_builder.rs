use crate::{
    error::{Error, Result},
    geom::{is_point_in_ring, Polygon},
    graph::{DirEdgeIdx, NodeIdx, PlanarGraph, RingIdx},
};

use super::edge_ring::{EdgeRing, RingKind};

/// Assembles result directed edges into polygons.
///
/// Subgraphs are added one at a time; a hole is assigned to a shell from the
/// same subgraph, or to one from a subgraph that was added earlier.
#[derive(Clone, Debug, Default)]
pub struct PolygonBuilder {
    rings: Vec<EdgeRing>,
    shells: Vec<RingIdx>,
}

impl PolygonBuilder {
    pub fn rings(&self) -> &[EdgeRing] {
        &self.rings
    }

    pub fn ring(&self, idx: RingIdx) -> &EdgeRing {
        &self.rings[idx.0]
    }

    pub fn shells(&self) -> &[RingIdx] {
        &self.shells
    }

    pub fn add(&mut self, graph: &mut PlanarGraph, dir_edges: &[DirEdgeIdx], nodes: &[NodeIdx]) -> Result<()> {
        for &n in nodes {
            graph.link_result_directed_edges(n)?;
        }
        let max_rings = self.build_maximal_rings(graph, dir_edges)?;
        let mut free_holes = Vec::new();
        let mut rings = Vec::new();
        for er in max_rings {
            if self.rings[er.0].max_node_degree(graph, er) > 2 {
                let min_rings = self.build_minimal_rings(graph, er)?;
                match self.find_shell(&min_rings)? {
                    Some(shell) => {
                        for &r in &min_rings {
                            if self.rings[r.0].is_hole() {
                                self.set_shell(r, shell);
                            }
                        }
                        self.shells.push(shell);
                    }
                    None => free_holes.extend(min_rings),
                }
            } else {
                rings.push(er);
            }
        }
        for er in rings {
            if self.rings[er.0].is_hole() {
                free_holes.push(er);
            } else {
                self.shells.push(er);
            }
        }
        log::trace!(
            "{} shells, {} unassigned holes so far",
            self.shells.len(),
            free_holes.len()
        );
        self.place_free_holes(&free_holes)
    }

    fn push_ring(&mut self, graph: &mut PlanarGraph, start: DirEdgeIdx, kind: RingKind) -> Result<RingIdx> {
        let idx = RingIdx(self.rings.len());
        let ring = EdgeRing::build(graph, start, idx, kind)?;
        self.rings.push(ring);
        Ok(idx)
    }

    fn build_maximal_rings(&mut self, graph: &mut PlanarGraph, dir_edges: &[DirEdgeIdx]) -> Result<Vec<RingIdx>> {
        let mut ret = Vec::new();
        for &de in dir_edges {
            let d = graph.de(de);
            if d.in_result && d.edge_ring.is_none() && graph.label(de).is_area() {
                ret.push(self.push_ring(graph, de, RingKind::Maximal)?);
            }
        }
        Ok(ret)
    }

    fn build_minimal_rings(&mut self, graph: &mut PlanarGraph, max_ring: RingIdx) -> Result<Vec<RingIdx>> {
        let edges = self.rings[max_ring.0].edges.clone();
        for de in &edges {
            graph.link_minimal_directed_edges(graph.de(*de).from, max_ring)?;
        }
        let mut ret = Vec::new();
        for de in edges {
            if graph.de(de).min_edge_ring.is_none() {
                ret.push(self.push_ring(graph, de, RingKind::Minimal)?);
            }
        }
        Ok(ret)
    }

    // At most one of the minimal rings split from a maximal ring is a shell.
    fn find_shell(&self, min_rings: &[RingIdx]) -> Result<Option<RingIdx>> {
        let mut shells = min_rings.iter().filter(|r| !self.rings[r.0].is_hole());
        let shell = shells.next().copied();
        if shells.next().is_some() {
            return Err(Error::Internal(
                "found two shells in minimal edge ring list".into(),
            ));
        }
        Ok(shell)
    }

    fn set_shell(&mut self, hole: RingIdx, shell: RingIdx) {
        self.rings[hole.0].shell = Some(shell);
        self.rings[shell.0].holes.push(hole);
    }

    /// Assigns each hole that doesn't have a shell yet to the smallest shell
    /// containing it. Holes that already have a shell are left alone.
    pub fn place_free_holes(&mut self, holes: &[RingIdx]) -> Result<()> {
        for &hole in holes {
            if self.rings[hole.0].shell.is_some() {
                continue;
            }
            let shell = self.find_ring_containing(hole).ok_or_else(|| {
                Error::topology(
                    "unable to assign hole to a shell",
                    self.rings[hole.0].pts.first().copied(),
                )
            })?;
            self.set_shell(hole, shell);
        }
        Ok(())
    }

    fn find_ring_containing(&self, hole: RingIdx) -> Option<RingIdx> {
        let test = &self.rings[hole.0];
        let test_pt = *test.pts.first()?;
        let mut min_shell: Option<RingIdx> = None;
        for &shell in &self.shells {
            let candidate = &self.rings[shell.0];
            if !candidate.env.contains(&test.env) || !is_point_in_ring(test_pt, &candidate.pts) {
                continue;
            }
            let smaller = min_shell.map_or(true, |m| self.rings[m.0].env.contains(&candidate.env));
            if smaller {
                min_shell = Some(shell);
            }
        }
        min_shell
    }

    pub fn polygons(&self) -> Vec<Polygon> {
        self.shells
            .iter()
            .map(|s| {
                let shell = &self.rings[s.0];
                Polygon::new(
                    shell.pts.clone(),
                    shell.holes.iter().map(|h| self.rings[h.0].pts.clone()).collect(),
                )
            })
            .collect()
    }
}
