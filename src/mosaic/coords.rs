//! Tile placement coordinates and shapes.
//!
//! Tile files carry their origin in the output volume as a name prefix:
//!
//! ```text
//! x_y_anyName.tif      -> (x, y)      2D tile, z origin 0
//! x_y_z_anyName.tif    -> (x, y, z)   3D tile
//! ```
//!
//! Coordinates are written in (x, y, z) order while decoded pixel buffers
//! are row-major, so shapes are (y, x) or (z, y, x). Both are promoted to
//! a canonical 3D form ([`Coord3`], [`Shape3`]) before any extent arithmetic,
//! which lets 2D and 3D tiles be mixed freely in one mosaic.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use crate::error::ParseError;

// =============================================================================
// Coordinate / TileShape
// =============================================================================

/// Placement coordinate as recovered from a tile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    /// `(x, y)` from an `x_y_` prefix
    Xy([usize; 2]),
    /// `(x, y, z)` from an `x_y_z` prefix
    Xyz([usize; 3]),
}

impl Coordinate {
    /// Number of axes encoded in the identifier (2 or 3).
    pub const fn axes(&self) -> usize {
        match self {
            Coordinate::Xy(_) => 2,
            Coordinate::Xyz(_) => 3,
        }
    }

    /// Promote to 3D, placing 2D tiles on the first slice (z = 0).
    pub const fn to_3d(self) -> Coord3 {
        match self {
            Coordinate::Xy([x, y]) => Coord3 { x, y, z: 0 },
            Coordinate::Xyz([x, y, z]) => Coord3 { x, y, z },
        }
    }
}

/// Row-major extent of a decoded tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileShape {
    /// `(y, x)` single image
    Yx([usize; 2]),
    /// `(z, y, x)` image stack
    Zyx([usize; 3]),
}

impl TileShape {
    /// Promote to 3D, treating a 2D image as a single-slice stack.
    pub const fn to_3d(self) -> Shape3 {
        match self {
            TileShape::Yx([y, x]) => Shape3 { z: 1, y, x },
            TileShape::Zyx([z, y, x]) => Shape3 { z, y, x },
        }
    }
}

// =============================================================================
// Canonical 3D forms
// =============================================================================

/// Tile origin in output space, (x, y, z) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Coord3 {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Coord3 {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Already canonical.
    pub const fn to_3d(self) -> Coord3 {
        self
    }

    /// `true` if `self` is greater than or equal to `other` on every axis.
    pub const fn dominates(&self, other: &Coord3) -> bool {
        self.x >= other.x && self.y >= other.y && self.z >= other.z
    }
}

impl fmt::Display for Coord3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x={}, y={}, z={})", self.x, self.y, self.z)
    }
}

impl From<Coordinate> for Coord3 {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.to_3d()
    }
}

/// Tile extent, (z, y, x) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Shape3 {
    pub z: usize,
    pub y: usize,
    pub x: usize,
}

impl Shape3 {
    pub const fn new(z: usize, y: usize, x: usize) -> Self {
        Self { z, y, x }
    }

    /// Already canonical.
    pub const fn to_3d(self) -> Shape3 {
        self
    }

    /// Total element count, `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.z.checked_mul(self.y)?.checked_mul(self.x)
    }

    /// The same extent in (x, y, z) order.
    pub const fn to_xyz(self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }
}

impl fmt::Display for Shape3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(z={}, y={}, x={})", self.z, self.y, self.x)
    }
}

impl From<TileShape> for Shape3 {
    fn from(shape: TileShape) -> Self {
        shape.to_3d()
    }
}

// =============================================================================
// Identifier Parser
// =============================================================================

/// Tile name prefix pattern.
///
/// - Group 1: x (mandatory, followed by `_`)
/// - Group 2: y (mandatory, followed by `_`)
/// - Group 3: z (optional digits directly after the second `_`)
///
/// `[0-9]` rather than `\d`, which would also accept non-ASCII digits.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-9]+)_([0-9]+)_([0-9]+)?").expect("valid regex"))
}

/// Recover the placement coordinate from a tile identifier.
///
/// Everything after the recognized prefix is ignored, including the file
/// extension.
///
/// # Examples
///
/// ```
/// use tile_mosaic::mosaic::{parse_identifier, Coordinate};
///
/// assert_eq!(parse_identifier("10_20_tile.tif").unwrap(), Coordinate::Xy([10, 20]));
/// assert_eq!(parse_identifier("10_20_3_tile.tif").unwrap(), Coordinate::Xyz([10, 20, 3]));
/// assert!(parse_identifier("ab_1_2.tif").is_err());
/// ```
pub fn parse_identifier(identifier: &str) -> Result<Coordinate, ParseError> {
    let captures = identifier_pattern()
        .captures(identifier)
        .ok_or_else(|| ParseError::InvalidPrefix {
            identifier: identifier.to_string(),
        })?;

    let component = |index: usize| -> Result<Option<usize>, ParseError> {
        captures
            .get(index)
            .map(|m| {
                m.as_str().parse::<usize>().map_err(|_| ParseError::Overflow {
                    identifier: identifier.to_string(),
                    value: m.as_str().to_string(),
                })
            })
            .transpose()
    };

    let missing = || ParseError::InvalidPrefix {
        identifier: identifier.to_string(),
    };
    let x = component(1)?.ok_or_else(missing)?;
    let y = component(2)?.ok_or_else(missing)?;

    Ok(match component(3)? {
        Some(z) => Coordinate::Xyz([x, y, z]),
        None => Coordinate::Xy([x, y]),
    })
}

/// Parse every identifier of a tile set.
///
/// Either all names parse, or every failure is returned so the whole batch
/// can be rejected at once.
pub fn parse_identifiers<S: AsRef<str>>(identifiers: &[S]) -> Result<Vec<Coordinate>, Vec<ParseError>> {
    let mut coordinates = Vec::with_capacity(identifiers.len());
    let mut errors = Vec::new();

    for identifier in identifiers {
        match parse_identifier(identifier.as_ref()) {
            Ok(coordinate) => coordinates.push(coordinate),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(coordinates)
    } else {
        Err(errors)
    }
}

// =============================================================================
// Tests
// =============================================================================
