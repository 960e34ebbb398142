use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, ParameterError>;

/// Rejections raised while constructing calculation inputs.
///
/// All of these surface before anything is allocated; a value that carries
/// one of these never reaches the engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    #[error("region coordinate is not finite")]
    NonFiniteCoordinate,

    #[error("region corners are inverted: top_left must be left of and above bottom_right")]
    InvertedRegion,

    #[error("region span {span:e} is below the precision floor {floor:e}")]
    SpanTooSmall { span: f64, floor: f64 },

    #[error("region span {span:e} exceeds the maximum magnitude {ceiling:e}")]
    SpanTooLarge { span: f64, ceiling: f64 },

    #[error("max_iterations must be in 1..={max}, got {got}")]
    IterationsOutOfRange { got: u32, max: u32 },

    #[error("image dimensions must be in 1..={max} on each axis, got {width}x{height}")]
    ImageSizeOutOfRange { width: u32, height: u32, max: u32 },
}
