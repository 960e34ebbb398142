//! Axis-aligned viewport rectangle in the complex plane.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// Smallest span a region may have on either axis. Anything below this is
/// beyond f64 pixel resolution and produces degenerate coordinate steps.
pub const MIN_SPAN: f64 = 1e-15;

/// Largest span a region may have on either axis.
pub const MAX_SPAN: f64 = 1e8;

/// Rectangular region of the complex plane used as the calculation viewport.
///
/// Invariants (enforced at construction, preserved by immutability):
/// - all four components are finite,
/// - `top_left.re < bottom_right.re`,
/// - `top_left.im > bottom_right.im`,
/// - both spans are within `[MIN_SPAN, MAX_SPAN]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRegion", into = "RawRegion")]
pub struct ComplexRegion {
    top_left: Complex64,
    bottom_right: Complex64,
}

impl ComplexRegion {
    pub fn new(top_left: Complex64, bottom_right: Complex64) -> Result<Self, ParameterError> {
        for v in [top_left.re, top_left.im, bottom_right.re, bottom_right.im] {
            if !v.is_finite() {
                return Err(ParameterError::NonFiniteCoordinate);
            }
        }
        if top_left.re >= bottom_right.re || top_left.im <= bottom_right.im {
            return Err(ParameterError::InvertedRegion);
        }
        let region = Self {
            top_left,
            bottom_right,
        };
        for span in [region.width(), region.height()] {
            if span < MIN_SPAN {
                return Err(ParameterError::SpanTooSmall {
                    span,
                    floor: MIN_SPAN,
                });
            }
            if span > MAX_SPAN {
                return Err(ParameterError::SpanTooLarge {
                    span,
                    ceiling: MAX_SPAN,
                });
            }
        }
        Ok(region)
    }

    /// Region from raw bounds; `re` grows rightward, `im` grows upward.
    pub fn from_bounds(
        re_min: f64,
        re_max: f64,
        im_min: f64,
        im_max: f64,
    ) -> Result<Self, ParameterError> {
        Self::new(
            Complex64::new(re_min, im_max),
            Complex64::new(re_max, im_min),
        )
    }

    pub fn top_left(&self) -> Complex64 {
        self.top_left
    }

    pub fn bottom_right(&self) -> Complex64 {
        self.bottom_right
    }

    pub fn width(&self) -> f64 {
        self.bottom_right.re - self.top_left.re
    }

    pub fn height(&self) -> f64 {
        self.top_left.im - self.bottom_right.im
    }

    pub fn center(&self) -> Complex64 {
        Complex64::new(
            (self.top_left.re + self.bottom_right.re) * 0.5,
            (self.top_left.im + self.bottom_right.im) * 0.5,
        )
    }
}

/// Serde shape: `{ "top_left": { "re": .., "im": .. }, .. }`. Deserializing
/// runs the same validation as `ComplexRegion::new`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawRegion {
    top_left: PlanePoint,
    bottom_right: PlanePoint,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PlanePoint {
    re: f64,
    im: f64,
}

impl TryFrom<RawRegion> for ComplexRegion {
    type Error = ParameterError;

    fn try_from(raw: RawRegion) -> Result<Self, Self::Error> {
        ComplexRegion::new(
            Complex64::new(raw.top_left.re, raw.top_left.im),
            Complex64::new(raw.bottom_right.re, raw.bottom_right.im),
        )
    }
}

impl From<ComplexRegion> for RawRegion {
    fn from(region: ComplexRegion) -> Self {
        RawRegion {
            top_left: PlanePoint {
                re: region.top_left.re,
                im: region.top_left.im,
            },
            bottom_right: PlanePoint {
                re: region.bottom_right.re,
                im: region.bottom_right.im,
            },
        }
    }
}
