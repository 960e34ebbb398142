//! Validated calculation request: region, iteration cap, image size, and the
//! generator-specific custom parameter map.

use std::collections::BTreeMap;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::region::ComplexRegion;

/// Upper bound on `max_iterations`.
pub const MAX_ITERATIONS: u32 = 10_000;

/// Upper bound on each image dimension.
pub const MAX_IMAGE_DIMENSION: u32 = 8192;

/// Output raster dimensions, each in `1..=MAX_IMAGE_DIMENSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawImageSize", into = "RawImageSize")]
pub struct ImageSize {
    width: u32,
    height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Result<Self, ParameterError> {
        let in_range = |v: u32| (1..=MAX_IMAGE_DIMENSION).contains(&v);
        if !in_range(width) || !in_range(height) {
            return Err(ParameterError::ImageSizeOutOfRange {
                width,
                height,
                max: MAX_IMAGE_DIMENSION,
            });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawImageSize {
    width: u32,
    height: u32,
}

impl TryFrom<RawImageSize> for ImageSize {
    type Error = ParameterError;

    fn try_from(raw: RawImageSize) -> Result<Self, Self::Error> {
        ImageSize::new(raw.width, raw.height)
    }
}

impl From<ImageSize> for RawImageSize {
    fn from(size: ImageSize) -> Self {
        RawImageSize {
            width: size.width,
            height: size.height,
        }
    }
}

/// Value of a generator-specific custom parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex { re: f64, im: f64 },
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ParamValue::Float(v) => Some(v),
            ParamValue::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<Complex64> {
        match *self {
            ParamValue::Complex { re, im } => Some(Complex64::new(re, im)),
            ParamValue::Float(v) => Some(Complex64::new(v, 0.0)),
            ParamValue::Int(v) => Some(Complex64::new(v as f64, 0.0)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ParamValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Immutable, validated request for one fractal computation.
///
/// Constructed once, never mutated mid-calculation; the executor and all
/// workers only ever see `&FractalParameters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawParameters")]
pub struct FractalParameters {
    region: ComplexRegion,
    max_iterations: u32,
    image_size: ImageSize,
    custom_parameters: BTreeMap<String, ParamValue>,
}

impl FractalParameters {
    pub fn new(
        region: ComplexRegion,
        max_iterations: u32,
        image_size: ImageSize,
        custom_parameters: BTreeMap<String, ParamValue>,
    ) -> Result<Self, ParameterError> {
        if !(1..=MAX_ITERATIONS).contains(&max_iterations) {
            return Err(ParameterError::IterationsOutOfRange {
                got: max_iterations,
                max: MAX_ITERATIONS,
            });
        }
        Ok(Self {
            region,
            max_iterations,
            image_size,
            custom_parameters,
        })
    }

    pub fn region(&self) -> &ComplexRegion {
        &self.region
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    pub fn custom_parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.custom_parameters
    }

    pub fn custom(&self, name: &str) -> Option<&ParamValue> {
        self.custom_parameters.get(name)
    }

    /// Numeric custom parameter with a fallback default.
    pub fn custom_f64(&self, name: &str, default: f64) -> f64 {
        self.custom(name).and_then(ParamValue::as_f64).unwrap_or(default)
    }

    pub fn custom_complex(&self, name: &str) -> Option<Complex64> {
        self.custom(name).and_then(ParamValue::as_complex)
    }

    /// Same request at a different resolution (used for previews).
    pub fn with_image_size(&self, image_size: ImageSize) -> Self {
        Self {
            region: self.region,
            max_iterations: self.max_iterations,
            image_size,
            custom_parameters: self.custom_parameters.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawParameters {
    region: ComplexRegion,
    max_iterations: u32,
    image_size: ImageSize,
    #[serde(default)]
    custom_parameters: BTreeMap<String, ParamValue>,
}

impl TryFrom<RawParameters> for FractalParameters {
    type Error = ParameterError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        FractalParameters::new(
            raw.region,
            raw.max_iterations,
            raw.image_size,
            raw.custom_parameters,
        )
    }
}
