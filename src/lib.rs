//! # Tile Mosaic
//!
//! Stitches a directory of positioned image tiles into one dense volume and
//! writes it as a TIFF stack.
//!
//! Each tile carries its placement in its file name: `X_Y_name.tif` for a
//! plane, `X_Y_Z_name.tif` for a stack. The output is sized from the tile
//! that dominates all others on every axis, zero-filled, and overwritten by
//! the tiles in enumeration order, so later tiles win where tiles overlap.
//! Volumes above the classic TIFF limit are written as BigTIFF.
//!
//! ## Architecture
//!
//! - [`mosaic`] - Coordinates, extent, output volume, sizing and the engine
//! - [`source`] - Tile enumeration and TIFF decoding
//! - [`mod@format`] - TIFF encoding and header verification
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use tile_mosaic::{DirectoryTileSource, MosaicEngine, TiffVolumeWriter};
//!
//! # fn main() -> Result<(), tile_mosaic::MosaicError> {
//! let source = DirectoryTileSource::open("/data/tiles", true)?;
//! let mut writer = TiffVolumeWriter::new("/data/mosaic.tif");
//! let report = MosaicEngine::new(source).run(&mut writer)?;
//! println!("{} tiles written as {}", report.tiles_placed, report.variant.name());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod mosaic;
pub mod source;

// Re-export commonly used types
pub use config::{AssembleConfig, Cli, Command, PlanConfig, PlanOutputFormat};
pub use error::{CodecError, HeaderError, MosaicError, ParseError, RegionError};
pub use format::{
    encode_volume, read_header, verify_variant, TiffHeader, TiffVolumeWriter, VolumeSink,
};
pub use mosaic::{
    parse_identifier, parse_identifiers, select_variant, Coord3, Coordinate, ElementType,
    MosaicEngine, MosaicPlan, MosaicReport, OutputLayout, OutputVariant, Shape3, Volume,
    CLASSIC_TIFF_MAX_BYTES,
};
pub use source::{decode_tiff, DecodedTile, DirectoryTileSource, TileSource};

/// Validate `config`, then assemble its source directory into its destination file.
pub fn assemble_directory(config: &AssembleConfig) -> Result<MosaicReport, MosaicError> {
    config.validate().map_err(MosaicError::Configuration)?;

    let source = DirectoryTileSource::open(&config.source, config.sort)?;
    let mut writer = TiffVolumeWriter::new(&config.dest);
    MosaicEngine::new(source).run(&mut writer)
}

/// Validate `config`, then compute the layout of its source directory.
pub fn plan_directory(config: &PlanConfig) -> Result<MosaicPlan, MosaicError> {
    config.validate().map_err(MosaicError::Configuration)?;

    let source = DirectoryTileSource::open(&config.source, config.sort)?;
    MosaicEngine::new(source).plan()
}
