//! Error types for the sharpening kernel.

use thiserror::Error;

use crate::filters::raster::Region;

/// Error type for sharpening operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CasError {
    /// The region to render does not fit inside the addressable raster.
    #[error("region {region} lies outside raster bounds {bounds}")]
    RegionOutOfBounds {
        /// Requested region
        region: Region,
        /// Addressable area of the raster it was checked against
        bounds: Region,
    },

    /// Source and destination images differ in size.
    #[error("size mismatch: source is {src_width}x{src_height}, destination is {dst_width}x{dst_height}")]
    SizeMismatch {
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
    },

    /// Images must carry 3 (RGB) or 4 (RGBA) channels.
    #[error("unsupported channel count: expected 3 or 4, got {0}")]
    UnsupportedChannels(usize),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Flat buffer does not match the stated dimensions.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Result type for sharpening operations.
pub type CasResult<T> = Result<T, CasError>;
