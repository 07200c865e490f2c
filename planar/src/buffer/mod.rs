//! Buffering: the region within a distance of a geometry.
//!
//! Every component gets a raw offset curve, labelled so that the depth of a
//! point counts the curves covering it. The curves go through the depth
//! engine, and the buffer is the region of positive depth.

mod curve_set;
mod offset;
mod params;
mod simplify;

pub use curve_set::OffsetCurveSetBuilder;
pub use offset::{OffsetCurveBuilder, OffsetSegmentGenerator};
pub use params::{BufferParameters, EndCapStyle, JoinStyle};
pub use simplify::BufferInputLineSimplifier;

use log::debug;

use crate::{
    error::{check_finite, Error, Result},
    geom::{Geometry, Polygon},
    intersector::{LineIntersector, PrecisionModel},
    noding::{IntersectionAdder, McIndexNoder, Noder},
    overlay::{Depth, OverlayBuilder},
    snapround::SnapRounder,
};

/// The most significant digits kept when retrying at reduced precision.
pub const MAX_PRECISION_DIGITS: i32 = 12;

/// Computes buffers, falling back to snap rounding at decreasing precision
/// when full precision noding isn't robust enough.
#[derive(Clone, Copy, Debug, Default)]
pub struct BufferOp {
    params: BufferParameters,
}

impl BufferOp {
    pub fn new(params: BufferParameters) -> Self {
        BufferOp { params }
    }

    /// The buffer of `geom` at `distance`, as a list of polygons with
    /// clockwise shells and counter-clockwise holes.
    ///
    /// Negative distances shrink polygons, and give nothing for lines and
    /// points (unless the buffer is single sided).
    pub fn buffer(&self, geom: &Geometry, distance: f64) -> Result<Vec<Polygon>> {
        self.params.validate()?;
        check_finite(&geom.coords())?;
        if !distance.is_finite() {
            return Err(Error::InvalidArgument(format!("bad buffer distance {distance}")));
        }

        let noder = McIndexNoder::new(IntersectionAdder::new(LineIntersector::new()));
        let err = match self.buffer_with(geom, distance, PrecisionModel::Floating, noder) {
            Ok(polys) => return Ok(polys),
            Err(e) if e.is_topology() => e,
            Err(e) => return Err(e),
        };
        debug!("buffer failed at full precision ({err}), retrying with snap rounding");

        let mut last_err = err;
        for digits in (0..=MAX_PRECISION_DIGITS).rev() {
            let scale = precision_scale_factor(geom, distance, digits);
            let noder = SnapRounder::new(scale)?;
            match self.buffer_with(geom, distance, noder.precision(), noder) {
                Ok(polys) => {
                    debug!("buffer succeeded with {digits} digits of precision");
                    return Ok(polys);
                }
                Err(e) if e.is_topology() => {
                    debug!("buffer failed with {digits} digits of precision: {e}");
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err)
    }

    fn buffer_with<N: Noder>(
        &self,
        geom: &Geometry,
        distance: f64,
        precision: PrecisionModel,
        noder: N,
    ) -> Result<Vec<Polygon>> {
        let builder = OffsetCurveBuilder::new(precision, self.params);
        let curves = OffsetCurveSetBuilder::new(&builder, distance).curves(geom);
        debug!("{} raw offset curves", curves.len());
        OverlayBuilder::new(noder).build(curves, |d: Depth| d.shape_a >= 1)
    }
}

/// The buffer of `geom` at `distance`.
pub fn buffer(geom: &Geometry, distance: f64, params: &BufferParameters) -> Result<Vec<Polygon>> {
    BufferOp::new(*params).buffer(geom, distance)
}

/// A grid scale that keeps `digits` significant digits across the extent of
/// the buffer of `geom`.
pub fn precision_scale_factor(geom: &Geometry, distance: f64, digits: i32) -> f64 {
    let env = geom.envelope();
    let env_size = env.width().max(env.height());
    let buf_env_size = env_size + 2.0 * distance.max(0.0);
    let min_unit_log10 = buf_env_size.log10() + 1.0 - digits as f64;
    10f64.powf(-min_unit_log10)
}
