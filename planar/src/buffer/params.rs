use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndCapStyle {
    #[default]
    Round,
    Flat,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinStyle {
    #[default]
    Round,
    Mitre,
    Bevel,
}

/// How to build a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BufferParameters {
    /// The number of segments approximating a quarter circle.
    pub quadrant_segments: u32,
    pub end_cap_style: EndCapStyle,
    pub join_style: JoinStyle,
    /// For mitre joins, the largest allowed ratio of the mitre length to the
    /// buffer distance.
    pub mitre_limit: f64,
    /// Buffer lines on one side only: the left for positive distances, the
    /// right for negative ones.
    pub single_sided: bool,
}

impl BufferParameters {
    pub const DEFAULT_QUADRANT_SEGMENTS: u32 = 8;
    pub const DEFAULT_MITRE_LIMIT: f64 = 5.0;

    /// Sets the number of quadrant segments, the way the join style is
    /// traditionally folded into it: zero means bevel joins, and `-n` means
    /// mitre joins with limit `n`. Joins that aren't round don't need
    /// quadrant segments, so those get the default.
    pub fn set_quadrant_segments(&mut self, quad_segs: i32) {
        if quad_segs == 0 {
            self.join_style = JoinStyle::Bevel;
        }
        if quad_segs < 0 {
            self.join_style = JoinStyle::Mitre;
            self.mitre_limit = quad_segs.unsigned_abs() as f64;
        }
        self.quadrant_segments = quad_segs.max(1) as u32;
        if self.join_style != JoinStyle::Round {
            self.quadrant_segments = Self::DEFAULT_QUADRANT_SEGMENTS;
        }
    }

    pub fn with_quadrant_segments(mut self, quad_segs: i32) -> Self {
        self.set_quadrant_segments(quad_segs);
        self
    }

    pub fn with_end_cap_style(mut self, style: EndCapStyle) -> Self {
        self.end_cap_style = style;
        self
    }

    pub fn with_join_style(mut self, style: JoinStyle) -> Self {
        self.join_style = style;
        self
    }

    pub fn with_mitre_limit(mut self, limit: f64) -> Self {
        self.mitre_limit = limit;
        self
    }

    pub fn with_single_sided(mut self, single_sided: bool) -> Self {
        self.single_sided = single_sided;
        self
    }

    /// The largest relative error of approximating a circle with this many
    /// segments per quadrant.
    pub fn buffer_distance_error(quad_segs: u32) -> f64 {
        let alpha = std::f64::consts::FRAC_PI_2 / quad_segs as f64;
        1.0 - (alpha / 2.0).cos()
    }

    pub fn validate(&self) -> Result<()> {
        if self.quadrant_segments == 0 {
            return Err(Error::InvalidArgument(
                "quadrant segments must be positive".into(),
            ));
        }
        if !self.mitre_limit.is_finite() || self.mitre_limit <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "bad mitre limit {}",
                self.mitre_limit
            )));
        }
        Ok(())
    }
}

impl Default for BufferParameters {
    fn default() -> Self {
        BufferParameters {
            quadrant_segments: Self::DEFAULT_QUADRANT_SEGMENTS,
            end_cap_style: EndCapStyle::Round,
            join_style: JoinStyle::Round,
            mitre_limit: Self::DEFAULT_MITRE_LIMIT,
            single_sided: false,
        }
    }
}
