//! Output extent calculation.
//!
//! The output volume is sized from one designated tile: the tile whose
//! coordinate is greater than or equal to the running best on every axis,
//! scanned in enumeration order. Its far corner (origin + shape) becomes the
//! output extent.
//!
//! This is not a bounding box. A tile that reaches further on one axis
//! without dominating on all of them does not grow the output:
//!
//! ```text
//! tile A  origin (0,0,0)  shape z=20 y=1 x=1
//! tile B  origin (1,1,1)  shape z=5  y=5 x=5
//!
//! designated = B, extent (x,y,z) = (6,6,6); A's z range 0..20 falls outside
//! ```
//!
//! Tiles that fall outside are rejected by the assembler, never silently
//! clipped.

use serde::Serialize;

use crate::error::MosaicError;

use super::coords::{Coord3, Shape3};
use super::volume::ElementType;

/// The tile that defines the output's far corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Designated {
    /// Position of the tile in enumeration order
    pub index: usize,
    /// Its normalized origin
    pub origin: Coord3,
}

/// Select the designated tile.
///
/// The running best starts below every coordinate, so the first tile is
/// always accepted. A later tile replaces the best only if it is `>=` on all
/// axes; ties on every axis move the selection to the later tile.
///
/// Returns `None` for an empty tile set.
pub fn select_designated(coordinates: &[Coord3]) -> Option<Designated> {
    let mut best: Option<Designated> = None;

    for (index, &origin) in coordinates.iter().enumerate() {
        let replace = match best {
            None => true,
            Some(current) => origin.dominates(&current.origin),
        };
        if replace {
            best = Some(Designated { index, origin });
        }
    }

    best
}

/// Output extent from the designated tile's origin and decoded shape.
///
/// Per axis: extent = origin + shape.
///
/// # Errors
///
/// `MosaicError::Allocation` if an axis overflows `usize`.
pub fn compute_extent(origin: Coord3, shape: Shape3) -> Result<Shape3, MosaicError> {
    let axis = |name: &str, o: usize, s: usize| {
        o.checked_add(s).ok_or_else(|| {
            MosaicError::Allocation(format!("{} extent {} + {} overflows", name, o, s))
        })
    };

    Ok(Shape3 {
        z: axis("z", origin.z, shape.z)?,
        y: axis("y", origin.y, shape.y)?,
        x: axis("x", origin.x, shape.x)?,
    })
}

/// Indices of tiles whose origin already lies outside `extent`.
///
/// These tiles cannot be placed whatever their shape.
pub fn tiles_outside(coordinates: &[Coord3], extent: Shape3) -> Vec<usize> {
    coordinates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.x >= extent.x || c.y >= extent.y || c.z >= extent.z)
        .map(|(index, _)| index)
        .collect()
}

// =============================================================================
// Layout
// =============================================================================

/// Everything known about the output before allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputLayout {
    /// Identifier of the designated tile
    pub designated: String,
    /// Origin of the designated tile
    pub origin: Coord3,
    /// Decoded shape of the designated tile
    pub tile_shape: Shape3,
    /// Output extent, (z, y, x)
    pub extent: Shape3,
    /// Output element type
    pub element_type: ElementType,
}

impl OutputLayout {
    /// Number of output elements, `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.extent.element_count()
    }

    /// Output size in bytes, computed without overflow.
    pub fn byte_size(&self) -> u128 {
        self.extent.z as u128
            * self.extent.y as u128
            * self.extent.x as u128
            * self.element_type.byte_width() as u128
    }
}

// =============================================================================
// Tests
// =============================================================================
