//! Mosaic engine orchestrating one assembly run.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          MosaicEngine                            │
//! │  1. Parse every identifier     5. Allocate zeroed volume         │
//! │  2. Normalize to 3D            6. Copy tiles in enumeration      │
//! │  3. Select designated tile        order (last writer wins)       │
//! │  4. Decode it: extent + type   7. Select output variant          │
//! └──────────────────────────────────────────────────────────────────┘
//!            │                                        │
//!            ▼                                        ▼
//!     ┌─────────────┐                         ┌──────────────┐
//!     │ TileSource  │                         │  VolumeSink  │
//!     └─────────────┘                         └──────────────┘
//! ```
//!
//! Every error is fatal. A parse failure anywhere in the tile set aborts
//! before any tile is decoded or any memory is allocated; an out-of-bounds
//! tile aborts before the sink is called, so no partial output is written.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CodecError, MosaicError, RegionError};
use crate::format::VolumeSink;
use crate::source::{DecodedTile, TileSource};

use super::coords::{parse_identifiers, Coord3};
use super::extent::{compute_extent, select_designated, tiles_outside, Designated, OutputLayout};
use super::sizing::{select_variant, select_variant_for_volume, OutputVariant};
use super::volume::Volume;

// =============================================================================
// Reports
// =============================================================================

/// Layout of a run, computed without allocating the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicPlan {
    /// Number of tiles in the set
    pub tile_count: usize,
    /// Output layout
    pub layout: OutputLayout,
    /// Output size in bytes
    pub byte_size: u128,
    /// Encoding variant the output will use
    pub variant: OutputVariant,
    /// Tiles whose origin lies outside the output; assembly will fail on them
    pub tiles_outside: Vec<String>,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicReport {
    /// Number of tiles placed
    pub tiles_placed: usize,
    /// Output layout
    pub layout: OutputLayout,
    /// Output size in bytes
    pub byte_size: u64,
    /// Encoding variant used
    pub variant: OutputVariant,
}

/// State shared by planning and assembly.
struct Prepared {
    coordinates: Vec<Coord3>,
    designated: Designated,
    designated_tile: DecodedTile,
    layout: OutputLayout,
}

// =============================================================================
// MosaicEngine
// =============================================================================

/// Assembles the tiles of a [`TileSource`] into one volume.
///
/// # Example
///
/// ```ignore
/// use tile_mosaic::{DirectoryTileSource, MosaicEngine, TiffVolumeWriter};
///
/// let source = DirectoryTileSource::open("/data/tiles", false)?;
/// let engine = MosaicEngine::new(source);
/// let mut writer = TiffVolumeWriter::new("/data/mosaic.tif");
/// let report = engine.run(&mut writer)?;
/// println!("{} tiles, {} bytes", report.tiles_placed, report.byte_size);
/// ```
#[derive(Debug)]
pub struct MosaicEngine<S> {
    source: S,
}

impl<S: TileSource> MosaicEngine<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Compute the output layout without allocating the volume.
    ///
    /// Decodes only the designated tile.
    pub fn plan(&self) -> Result<MosaicPlan, MosaicError> {
        let prepared = self.prepare()?;
        let identifiers = self.source.identifiers();
        let byte_size = prepared.layout.byte_size();

        let tiles_outside = tiles_outside(&prepared.coordinates, prepared.layout.extent)
            .into_iter()
            .map(|index| identifiers[index].clone())
            .collect();

        Ok(MosaicPlan {
            tile_count: identifiers.len(),
            byte_size,
            variant: select_variant(byte_size),
            tiles_outside,
            layout: prepared.layout,
        })
    }

    /// Allocate the output and copy every tile into it.
    pub fn assemble(&self) -> Result<(Volume, OutputLayout), MosaicError> {
        let Prepared {
            coordinates,
            designated,
            designated_tile,
            layout,
        } = self.prepare()?;
        let identifiers = self.source.identifiers();

        let outside = tiles_outside(&coordinates, layout.extent);
        if !outside.is_empty() {
            warn!(
                "{} tile(s) start outside the output extent {}, first: {}",
                outside.len(),
                layout.extent,
                identifiers[outside[0]]
            );
        }

        let mut volume = Volume::zeros(layout.extent, layout.element_type)?;
        info!("Output data size: {} bytes", volume.byte_size());

        let mut designated_tile = Some(designated_tile);
        for (index, identifier) in identifiers.iter().enumerate() {
            info!(
                "Processing file #{}/{}: [{}]",
                index + 1,
                identifiers.len(),
                identifier
            );

            let reused = if index == designated.index {
                designated_tile.take()
            } else {
                None
            };
            let tile = match reused {
                Some(tile) => tile,
                None => self.source.decode(index)?,
            };
            let origin = coordinates[index];
            let shape = tile.shape3();

            if tile.element_type() != layout.element_type {
                debug!(
                    "Casting {} samples of {} to {}",
                    tile.element_type(),
                    identifier,
                    layout.element_type
                );
            }

            volume
                .write_region(origin, tile.data(), shape)
                .map_err(|region| place_error(identifier, region))?;
            debug!("Placed {} at {} with shape {}", identifier, origin, shape);
        }

        Ok((volume, layout))
    }

    /// Assemble and hand the volume to `sink`.
    pub fn run<K: VolumeSink>(&self, sink: &mut K) -> Result<MosaicReport, MosaicError> {
        let (volume, layout) = self.assemble()?;

        let variant = select_variant_for_volume(&volume);
        info!("Saving in BigTIFF mode: {}", variant.is_bigtiff());
        sink.write(&volume, variant)?;

        Ok(MosaicReport {
            tiles_placed: self.source.identifiers().len(),
            byte_size: volume.byte_size(),
            variant,
            layout,
        })
    }

    fn prepare(&self) -> Result<Prepared, MosaicError> {
        let identifiers = self.source.identifiers();
        info!("Read {} TIFF files", identifiers.len());

        let coordinates: Vec<Coord3> = parse_identifiers(identifiers)
            .map_err(|errors| {
                for e in &errors {
                    warn!("{}", e);
                }
                MosaicError::Parse(errors)
            })?
            .into_iter()
            .map(Coord3::from)
            .collect();

        let designated = select_designated(&coordinates)
            .ok_or_else(|| MosaicError::EmptyInput(self.source.location()))?;
        let designated_id = &identifiers[designated.index];

        let designated_tile = self.source.decode(designated.index)?;
        let tile_shape = designated_tile.shape3();
        info!(
            "Max coordinates found in file: {} x,y,z = {:?} image dims = {:?}",
            designated_id,
            [designated.origin.x, designated.origin.y, designated.origin.z],
            tile_shape.to_xyz()
        );

        let extent = compute_extent(designated.origin, tile_shape)?;
        let element_type = designated_tile.element_type();
        info!(
            "Output image dimensions (x/y/z): {:?} outType = {}",
            extent.to_xyz(),
            element_type
        );

        let layout = OutputLayout {
            designated: designated_id.clone(),
            origin: designated.origin,
            tile_shape,
            extent,
            element_type,
        };

        Ok(Prepared {
            coordinates,
            designated,
            designated_tile,
            layout,
        })
    }
}

fn place_error(identifier: &str, region: RegionError) -> MosaicError {
    match region {
        RegionError::LengthMismatch { expected, actual } => CodecError::ShapeMismatch {
            identifier: identifier.to_string(),
            expected,
            actual,
        }
        .into(),
        region @ RegionError::OutOfBounds { .. } => MosaicError::OutOfBounds {
            identifier: identifier.to_string(),
            region,
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
