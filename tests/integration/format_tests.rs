//! Output format integration tests.
//!
//! Tests verify:
//! - Standard output is classic TIFF with ImageJ stack metadata
//! - BigTIFF output carries the BigTIFF header and no ImageJ metadata
//! - Written headers pass variant verification

use std::io::Cursor;

use tiff::decoder::Decoder;
use tiff::tags::Tag;

use tile_mosaic::mosaic::{Coord3, ElementBuffer};
use tile_mosaic::{
    assemble_directory, encode_volume, read_header, select_variant, verify_variant, CodecError,
    ElementType, OutputVariant, Shape3, Volume, CLASSIC_TIFF_MAX_BYTES,
};

use super::test_utils::{is_classic_tiff, read_output, TileDir};

#[test]
fn test_standard_output_has_imagej_stack_metadata() {
    let dir = TileDir::new();
    dir.write_u8("0_0_0_a.tif", 3, 2, 2, 1);

    assemble_directory(&dir.config(false)).unwrap();

    let bytes = std::fs::read(dir.output()).unwrap();
    assert!(is_classic_tiff(&bytes));

    let output = read_output(&dir.output());
    assert_eq!(output.pages, 3);
    assert_eq!(
        output.description.as_deref(),
        Some("ImageJ=1.11a\nimages=3\nslices=3\nloop=false\n")
    );
}

#[test]
fn test_single_plane_imagej_metadata() {
    let dir = TileDir::new();
    dir.write_u16("0_0_a.tif", 2, 2, &[1, 2, 3, 4]);

    assemble_directory(&dir.config(false)).unwrap();

    let output = read_output(&dir.output());
    assert_eq!(output.description.as_deref(), Some("ImageJ=1.11a\n"));
    assert_eq!(output.u16(), &[1, 2, 3, 4]);
}

#[test]
fn test_written_header_is_verified() {
    let dir = TileDir::new();
    dir.write_u8("0_0_a.tif", 1, 4, 4, 3);

    assemble_directory(&dir.config(false)).unwrap();

    let header = read_header(&dir.output()).unwrap();
    assert!(!header.is_bigtiff);
    assert!(verify_variant(&dir.output(), OutputVariant::Standard).is_ok());
    assert!(matches!(
        verify_variant(&dir.output(), OutputVariant::BigTiff),
        Err(CodecError::VariantMismatch { .. })
    ));
}

#[test]
fn test_bigtiff_encoding() {
    let shape = Shape3::new(2, 3, 3);
    let mut volume = Volume::zeros(shape, ElementType::U16).unwrap();
    let data = ElementBuffer::U16((0..18).collect());
    volume.write_region(Coord3::default(), &data, shape).unwrap();

    let mut bytes = Cursor::new(Vec::new());
    encode_volume(&mut bytes, &volume, OutputVariant::BigTiff, "memory").unwrap();
    let bytes = bytes.into_inner();

    // BigTIFF version 43
    assert_eq!(&bytes[0..4], &[0x49, 0x49, 0x2B, 0x00]);

    let mut decoder = Decoder::new(Cursor::new(bytes)).unwrap();
    assert!(decoder.get_tag_ascii_string(Tag::ImageDescription).is_err());
    assert_eq!(decoder.dimensions().unwrap(), (3, 3));
    assert!(decoder.more_images());
}

#[test]
fn test_variant_threshold() {
    assert_eq!(select_variant(CLASSIC_TIFF_MAX_BYTES), OutputVariant::Standard);
    assert_eq!(
        select_variant(CLASSIC_TIFF_MAX_BYTES + 1),
        OutputVariant::BigTiff
    );
}
