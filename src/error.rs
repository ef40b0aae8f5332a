use std::ops::Range;

use thiserror::Error;

use crate::mosaic::Shape3;

/// Errors that can occur when recovering a coordinate from a tile identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Identifier does not start with `X_Y_` or `X_Y_Z_`
    #[error("Cannot parse coordinates from '{identifier}': expected 'x_y_name' or 'x_y_z_name'")]
    InvalidPrefix { identifier: String },

    /// A coordinate component does not fit the coordinate type
    #[error("Coordinate '{value}' in '{identifier}' is too large")]
    Overflow { identifier: String, value: String },
}

impl ParseError {
    /// The identifier that failed to parse.
    pub fn identifier(&self) -> &str {
        match self {
            ParseError::InvalidPrefix { identifier } => identifier,
            ParseError::Overflow { identifier, .. } => identifier,
        }
    }
}

/// Errors raised by the tile decoder and the volume encoder
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// File system error while reading or writing
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// TIFF decoding failed
    #[error("Failed to decode '{identifier}': {message}")]
    Decode { identifier: String, message: String },

    /// Tile uses a pixel layout the mosaic cannot place
    #[error("Unsupported layout in '{identifier}': {reason}")]
    UnsupportedLayout { identifier: String, reason: String },

    /// Decoded buffer length disagrees with its shape
    #[error("Tile '{identifier}' holds {actual} elements, shape requires {expected}")]
    ShapeMismatch {
        identifier: String,
        expected: usize,
        actual: usize,
    },

    /// TIFF encoding failed
    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },

    /// Written file does not carry a valid header
    #[error("Invalid TIFF header in {path}: {source}")]
    Header {
        path: String,
        #[source]
        source: HeaderError,
    },

    /// Written file is not the selected variant
    #[error("{path} was written as {found}, expected {expected}")]
    VariantMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors that can occur when parsing a TIFF header
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// First IFD offset points outside the file
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),
}

/// Errors raised by a bounds-checked write into the output volume
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// Destination box reaches past the allocated extent
    #[error("box z={z:?} y={y:?} x={x:?} exceeds output extent {extent}")]
    OutOfBounds {
        z: Range<usize>,
        y: Range<usize>,
        x: Range<usize>,
        extent: Shape3,
    },

    /// Source buffer length disagrees with its shape
    #[error("source holds {actual} elements, shape requires {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Errors that abort a mosaic run
#[derive(Debug, Clone, Error)]
pub enum MosaicError {
    /// Missing or invalid source/destination path
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One or more tile names do not follow the naming convention
    #[error("{}", summarize_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// No eligible tiles were found
    #[error("No TIFF tiles found in {0}")]
    EmptyInput(String),

    /// A tile's destination box does not fit the allocated output
    #[error("Tile '{identifier}' cannot be placed: {region}")]
    OutOfBounds {
        identifier: String,
        #[source]
        region: RegionError,
    },

    /// Output buffer cannot be sized or allocated
    #[error("Cannot allocate output volume: {0}")]
    Allocation(String),

    /// Tile decoding or volume encoding failed
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<ParseError> for MosaicError {
    fn from(err: ParseError) -> Self {
        MosaicError::Parse(vec![err])
    }
}

fn summarize_parse_errors(errors: &[ParseError]) -> String {
    match errors.first() {
        Some(first) if errors.len() == 1 => first.to_string(),
        Some(first) => format!("{} tile names could not be parsed, first: {}", errors.len(), first),
        None => "tile names could not be parsed".to_string(),
    }
}
