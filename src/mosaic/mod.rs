//! Mosaic assembly.
//!
//! This module turns a set of positioned tiles into one dense volume:
//!
//! - [`coords`]: coordinate prefixes in tile names (`X_Y_` / `X_Y_Z_`)
//! - [`extent`]: designated tile selection and output extent
//! - [`volume`]: element types and the zero-filled output buffer
//! - [`sizing`]: classic TIFF vs BigTIFF selection
//! - [`engine`]: the run itself, over any [`TileSource`](crate::source::TileSource)
//!
//! All coordinates are in voxels. Shapes are row-major with x varying
//! fastest.

pub mod coords;
pub mod engine;
pub mod extent;
pub mod sizing;
pub mod volume;

pub use coords::{parse_identifier, parse_identifiers, Coord3, Coordinate, Shape3, TileShape};
pub use engine::{MosaicEngine, MosaicPlan, MosaicReport};
pub use extent::{compute_extent, select_designated, tiles_outside, Designated, OutputLayout};
pub use sizing::{
    select_variant, select_variant_for, select_variant_for_volume, OutputVariant,
    CLASSIC_TIFF_MAX_BYTES,
};
pub use volume::{CastInto, DestinationBox, Element, ElementBuffer, ElementType, Volume};
