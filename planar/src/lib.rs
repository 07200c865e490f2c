//! Robust planar overlay: boolean operations, buffers and polygonization of
//! polygons and lines, built on snap-rounded noding and a labelled planar
//! graph.

pub mod buffer;
pub mod error;
pub mod geom;
pub mod graph;
pub mod intersector;
pub mod noding;
pub mod orientation;
pub mod overlay;
pub mod polygonize;
pub mod snap;
pub mod snapround;

pub use buffer::{buffer, BufferOp, BufferParameters, EndCapStyle, JoinStyle};
pub use error::{Error, Result};
pub use geom::{Coord, Envelope, Geometry, LineSegment, Polygon};
pub use intersector::PrecisionModel;
pub use polygonize::{Polygonized, Polygonizer, PolygonizerOptions};

use log::debug;
use serde::{Deserialize, Serialize};

use error::check_finite;
use intersector::LineIntersector;
use noding::{IntersectionAdder, McIndexNoder};
use overlay::{overlay_curves, Depth, OverlayBuilder};
use snapround::SnapRounder;

#[cfg(test)]
pub mod perturbation;

/// A fill rule tells us how to decide whether a point is "inside" a polyline.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FillRule {
    /// The point is "inside" if its winding number is odd.
    EvenOdd,
    /// The point is "inside" if its winding number is non-zero.
    #[default]
    NonZero,
}

impl FillRule {
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::EvenOdd => winding % 2 != 0,
            FillRule::NonZero => winding != 0,
        }
    }
}

/// Binary operations between sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    /// A point is in the union of two sets if it is in either one.
    Union,
    /// A point is in the intersection of two sets if it is in both.
    Intersection,
    /// A point is in the difference of two sets if it is in the first but not the second.
    Difference,
    /// A point is in the exclusive-or of two sets if it is in one or the other, but not both.
    Xor,
}

impl BooleanOp {
    pub fn contains(self, in_a: bool, in_b: bool) -> bool {
        match self {
            BooleanOp::Union => in_a || in_b,
            BooleanOp::Intersection => in_a && in_b,
            BooleanOp::Difference => in_a && !in_b,
            BooleanOp::Xor => in_a != in_b,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    pub fill_rule: FillRule,
    /// The precision of the first attempt. Retries after topology errors
    /// always end up on a fixed grid.
    pub precision: PrecisionModel,
}

/// Computes a boolean operation between two sets, each of which is described as a collection of closed polylines.
///
/// The polylines don't need to repeat their first point at the end.
pub fn boolean_op(
    set_a: &[Vec<(f64, f64)>],
    set_b: &[Vec<(f64, f64)>],
    fill_rule: FillRule,
    op: BooleanOp,
) -> Result<Vec<Polygon>> {
    let to_geom = |set: &[Vec<(f64, f64)>]| {
        Geometry::Collection(
            set.iter()
                .map(|ps| {
                    let mut pts: Vec<Coord> = ps.iter().map(|&(x, y)| Coord::new(x, y)).collect();
                    if let Some(&first) = pts.first() {
                        if pts.last() != Some(&first) {
                            pts.push(first);
                        }
                    }
                    Geometry::LineString(pts)
                })
                .collect(),
        )
    };
    let options = OverlayOptions {
        fill_rule,
        ..Default::default()
    };
    overlay(&to_geom(set_a), &to_geom(set_b), op, &options)
}

/// Computes a boolean operation between the areas of two geometries.
///
/// Polygons count with winding number one inside their shells, and closed
/// line strings count with their winding numbers. If noding at the requested
/// precision isn't robust enough, the inputs are snapped to each other and
/// tried again, and then snap rounded at decreasing precision.
pub fn overlay(
    a: &Geometry,
    b: &Geometry,
    op: BooleanOp,
    options: &OverlayOptions,
) -> Result<Vec<Polygon>> {
    check_finite(a.coords().iter().chain(&b.coords()))?;
    let inside = |d: Depth| {
        op.contains(
            options.fill_rule.is_inside(d.shape_a),
            options.fill_rule.is_inside(d.shape_b),
        )
    };

    let err = match overlay_once(a, b, &inside, options.precision) {
        Ok(polys) => return Ok(polys),
        Err(e) if e.is_topology() => e,
        Err(e) => return Err(e),
    };
    debug!("overlay failed ({err}), retrying with snapped inputs");

    let tolerance = snap::overlay_snap_tolerance_pair(a, b, options.precision);
    let (snapped_a, snapped_b) = snap::snap(a, b, tolerance)?;
    let mut last_err = match overlay_once(&snapped_a, &snapped_b, &inside, options.precision) {
        Ok(polys) => return Ok(polys),
        Err(e) if e.is_topology() => e,
        Err(e) => return Err(e),
    };
    debug!("snapped overlay failed ({last_err}), retrying with snap rounding");

    let both = Geometry::Collection(vec![a.clone(), b.clone()]);
    for digits in (0..=buffer::MAX_PRECISION_DIGITS).rev() {
        let scale = buffer::precision_scale_factor(&both, 0.0, digits);
        match overlay_once(a, b, &inside, PrecisionModel::fixed(scale)?) {
            Ok(polys) => {
                debug!("overlay succeeded with {digits} digits of precision");
                return Ok(polys);
            }
            Err(e) if e.is_topology() => last_err = e,
            Err(e) => return Err(e),
        }
    }
    Err(last_err)
}

/// The union of the areas of two geometries.
pub fn union(a: &Geometry, b: &Geometry) -> Result<Vec<Polygon>> {
    overlay(a, b, BooleanOp::Union, &OverlayOptions::default())
}

fn overlay_once(
    a: &Geometry,
    b: &Geometry,
    inside: &dyn Fn(Depth) -> bool,
    precision: PrecisionModel,
) -> Result<Vec<Polygon>> {
    let mut curves = overlay_curves(a, 0);
    curves.extend(overlay_curves(b, 1));
    match precision {
        PrecisionModel::Floating => {
            let noder = McIndexNoder::new(IntersectionAdder::new(LineIntersector::new()));
            OverlayBuilder::new(noder).build(curves, inside)
        }
        PrecisionModel::Fixed { scale } => {
            OverlayBuilder::new(SnapRounder::new(scale)?).build(curves, inside)
        }
    }
}
