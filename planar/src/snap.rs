//! Snapping geometries to each other.
//!
//! Overlays of inputs with nearly-coincident edges can defeat full precision
//! noding. Snapping the vertices and segments of one input to nearby vertices
//! of the other makes those edges exactly coincident, which the depth engine
//! handles well.

use crate::{
    buffer::{buffer, BufferParameters},
    error::{Error, Result},
    geom::{is_closed, Coord, Geometry, LineSegment},
    intersector::PrecisionModel,
};

/// The snap tolerance, relative to the size of the input.
pub const SNAP_PRECISION_FACTOR: f64 = 1e-9;

/// A tolerance small enough not to distort `geom` visibly.
pub fn size_based_snap_tolerance(geom: &Geometry) -> f64 {
    let env = geom.envelope();
    env.width().min(env.height()) * SNAP_PRECISION_FACTOR
}

/// The tolerance for snapping an overlay input: the size-based tolerance, or
/// a bit more than a grid cell's diagonal if that's bigger.
pub fn overlay_snap_tolerance(geom: &Geometry, precision: PrecisionModel) -> f64 {
    let tol = size_based_snap_tolerance(geom);
    match precision.scale() {
        Some(scale) => tol.max(2.0 / (1.415 * scale)),
        None => tol,
    }
}

/// The smaller of the two inputs' overlay tolerances.
pub fn overlay_snap_tolerance_pair(g0: &Geometry, g1: &Geometry, precision: PrecisionModel) -> f64 {
    overlay_snap_tolerance(g0, precision).min(overlay_snap_tolerance(g1, precision))
}

/// Snaps one coordinate sequence to a set of points.
pub struct LineStringSnapper<'a> {
    src: &'a [Coord],
    tolerance: f64,
    allow_snapping_to_source_vertices: bool,
}

impl<'a> LineStringSnapper<'a> {
    pub fn new(src: &'a [Coord], tolerance: f64) -> Self {
        LineStringSnapper {
            src,
            tolerance,
            allow_snapping_to_source_vertices: false,
        }
    }

    /// When snapping a geometry to itself, the snap points include the
    /// source's own vertices; segments ending at one of them can still snap
    /// to the others.
    pub fn allow_snapping_to_source_vertices(mut self, allow: bool) -> Self {
        self.allow_snapping_to_source_vertices = allow;
        self
    }

    /// Moves vertices onto snap points within the tolerance, then inserts
    /// snap points into the segments that pass within the tolerance.
    pub fn snap_to(&self, snap_pts: &[Coord]) -> Vec<Coord> {
        let mut pts = self.src.to_vec();
        self.snap_vertices(&mut pts, snap_pts);
        self.snap_segments(&mut pts, snap_pts);
        pts
    }

    fn snap_vertices(&self, pts: &mut [Coord], snap_pts: &[Coord]) {
        let closed = is_closed(pts);
        let end = if closed { pts.len() - 1 } else { pts.len() };
        for i in 0..end {
            if let Some(snapped) = self.find_snap_for_vertex(pts[i], snap_pts) {
                pts[i] = snapped;
                if i == 0 && closed {
                    pts[end] = snapped;
                }
            }
        }
    }

    // A vertex that's already on a snap point stays put.
    fn find_snap_for_vertex(&self, pt: Coord, snap_pts: &[Coord]) -> Option<Coord> {
        for s in snap_pts {
            if pt == *s {
                return None;
            }
            if pt.distance(s) < self.tolerance {
                return Some(*s);
            }
        }
        None
    }

    fn snap_segments(&self, pts: &mut Vec<Coord>, snap_pts: &[Coord]) {
        let distinct = match snap_pts {
            [first, .., last] if first == last => &snap_pts[..snap_pts.len() - 1],
            _ => snap_pts,
        };
        for s in distinct {
            if let Some(idx) = self.find_segment_to_snap(*s, pts) {
                // No repeated points.
                if pts[idx] != *s && pts[idx + 1] != *s {
                    pts.insert(idx + 1, *s);
                }
            }
        }
    }

    // The nearest segment within the tolerance of `snap_pt`.
    fn find_segment_to_snap(&self, snap_pt: Coord, pts: &[Coord]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, w) in pts.windows(2).enumerate() {
            if w[0] == snap_pt || w[1] == snap_pt {
                if self.allow_snapping_to_source_vertices {
                    continue;
                }
                return None;
            }
            let dist = LineSegment::new(w[0], w[1]).distance_to(snap_pt);
            if dist < self.tolerance && best.map_or(true, |(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Snaps the vertices and segments of a geometry to the vertices of another.
pub struct GeometrySnapper<'a> {
    src: &'a Geometry,
}

impl<'a> GeometrySnapper<'a> {
    pub fn new(src: &'a Geometry) -> Self {
        GeometrySnapper { src }
    }

    pub fn snap_to(&self, target: &Geometry, tolerance: f64) -> Result<Geometry> {
        check_tolerance(tolerance)?;
        Ok(self.snap_with(&target_coords(target), tolerance, false))
    }

    /// Snaps the source to its own vertices, which removes narrow gaps and
    /// spikes. With `clean`, polygonal results are rebuilt by a zero-distance
    /// buffer, since snapping can make them self-intersect.
    pub fn snap_to_self(&self, tolerance: f64, clean: bool) -> Result<Geometry> {
        check_tolerance(tolerance)?;
        let snapped = self.snap_with(&target_coords(self.src), tolerance, true);
        if !clean || !is_polygonal(&snapped) {
            return Ok(snapped);
        }
        let mut polys = buffer(&snapped, 0.0, &BufferParameters::default())?;
        Ok(if polys.len() == 1 {
            Geometry::Polygon(polys.remove(0))
        } else {
            Geometry::Collection(polys.into_iter().map(Geometry::Polygon).collect())
        })
    }

    fn snap_with(&self, snap_pts: &[Coord], tolerance: f64, self_snap: bool) -> Geometry {
        self.src.map_sequences(&mut |seq| {
            LineStringSnapper::new(seq, tolerance)
                .allow_snapping_to_source_vertices(self_snap)
                .snap_to(snap_pts)
        })
    }
}

/// Snaps `g0` to `g1`, and then `g1` to the snapped `g0`.
pub fn snap(g0: &Geometry, g1: &Geometry, tolerance: f64) -> Result<(Geometry, Geometry)> {
    let s0 = GeometrySnapper::new(g0).snap_to(g1, tolerance)?;
    let s1 = GeometrySnapper::new(g1).snap_to(&s0, tolerance)?;
    Ok((s0, s1))
}

fn check_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("bad snap tolerance {tolerance}")))
    }
}

// The distinct vertices of `g`, in lexicographic order.
fn target_coords(g: &Geometry) -> Vec<Coord> {
    let mut pts = g.coords();
    pts.sort_by(Coord::cmp_xy);
    pts.dedup();
    pts
}

fn is_polygonal(g: &Geometry) -> bool {
    match g {
        Geometry::Polygon(_) => true,
        Geometry::Collection(gs) => !gs.is_empty() && gs.iter().all(is_polygonal),
        _ => false,
    }
}
