//! Tile sources.
//!
//! A [`TileSource`] enumerates tile identifiers once and decodes tiles on
//! demand. The engine only depends on this trait:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              MosaicEngine               │
//! └────────────────────┬────────────────────┘
//!                      │ identifiers() / decode(i)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           TileSource Trait              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │         DirectoryTileSource             │
//! │  (*.tif / *.tiff, tiff crate decoder)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The identifier order returned by a source is the enumeration order of the
//! run. It decides which tile sizes the output and which tile wins where
//! tiles overlap, so a source must return the same order for the whole run.

mod decode;
mod directory;

pub use decode::decode_tiff;
pub use directory::{is_tiff_name, DirectoryTileSource};

use crate::error::CodecError;
use crate::mosaic::{ElementBuffer, ElementType, Shape3, TileShape};

/// A decoded tile: element buffer plus its row-major shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTile {
    data: ElementBuffer,
    shape: TileShape,
}

impl DecodedTile {
    /// Pair a buffer with its shape.
    ///
    /// # Errors
    ///
    /// `CodecError::ShapeMismatch` if the buffer length is not the product
    /// of the shape.
    pub fn new(
        identifier: &str,
        data: ElementBuffer,
        shape: TileShape,
    ) -> Result<Self, CodecError> {
        let expected = shape.to_3d().element_count().unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(CodecError::ShapeMismatch {
                identifier: identifier.to_string(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    pub fn data(&self) -> &ElementBuffer {
        &self.data
    }

    /// Shape as decoded, (y, x) or (z, y, x).
    pub fn shape(&self) -> TileShape {
        self.shape
    }

    /// Shape promoted to (z, y, x).
    pub fn shape3(&self) -> Shape3 {
        self.shape.to_3d()
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }
}

/// Provider of tiles for one mosaic run.
pub trait TileSource {
    /// Tile identifiers in enumeration order.
    fn identifiers(&self) -> &[String];

    /// Decode the tile at `index` of [`identifiers`](Self::identifiers).
    fn decode(&self, index: usize) -> Result<DecodedTile, CodecError>;

    /// Human-readable location of the tiles, used in diagnostics.
    fn location(&self) -> String;
}
