//! TIFF output encoding and header inspection.
//!
//! Decoding of input tiles lives in [`crate::source`]; this module covers
//! the output side:
//!
//! - [`writer`]: encodes an assembled volume as classic TIFF (with ImageJ
//!   metadata) or BigTIFF
//! - [`header`]: parses TIFF/BigTIFF headers to confirm what was written

pub mod header;
pub mod writer;

pub use header::{
    read_header, verify_variant, ByteOrder, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE,
};
pub use writer::{encode_volume, imagej_description, TiffVolumeWriter, VolumeSink};
