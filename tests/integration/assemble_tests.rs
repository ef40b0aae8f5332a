//! End-to-end assembly tests.
//!
//! Tests verify:
//! - Tiles land at the offsets encoded in their names
//! - Later tiles overwrite earlier ones where they overlap
//! - Fatal errors abort the run without writing output

use tile_mosaic::{
    assemble_directory, plan_directory, CodecError, ElementType, MosaicError, OutputVariant,
    PlanConfig, PlanOutputFormat, Shape3,
};

use super::test_utils::{read_output, TileDir};

// =============================================================================
// Placement
// =============================================================================

#[test]
fn test_assemble_2d_grid() {
    let dir = TileDir::new();
    dir.write_u8("0_0_a.tif", 1, 2, 2, 1)
        .write_u8("2_0_b.tif", 1, 2, 2, 2)
        .write_u8("0_2_c.tif", 1, 2, 2, 3)
        .write_u8("2_2_d.tif", 1, 2, 2, 4);

    let report = assemble_directory(&dir.config(true)).unwrap();
    assert_eq!(report.tiles_placed, 4);
    assert_eq!(report.layout.designated, "2_2_d.tif");
    assert_eq!(report.layout.extent, Shape3::new(1, 4, 4));
    assert_eq!(report.variant, OutputVariant::Standard);

    let output = read_output(&dir.output());
    assert_eq!(output.dims, (4, 4));
    assert_eq!(output.pages, 1);
    #[rustfmt::skip]
    assert_eq!(output.u8(), &[
        1, 1, 2, 2,
        1, 1, 2, 2,
        3, 3, 4, 4,
        3, 3, 4, 4,
    ]);
}

#[test]
fn test_assemble_3d_stacks() {
    let dir = TileDir::new();
    dir.write_u8("0_0_0_low.tif", 2, 1, 2, 5)
        .write_u8("0_0_2_high.tif", 2, 1, 2, 6);

    let report = assemble_directory(&dir.config(true)).unwrap();
    assert_eq!(report.layout.extent, Shape3::new(4, 1, 2));

    let output = read_output(&dir.output());
    assert_eq!(output.pages, 4);
    assert_eq!(output.u8(), &[5, 5, 5, 5, 6, 6, 6, 6]);
}

#[test]
fn test_gaps_are_zero_filled() {
    let dir = TileDir::new();
    dir.write_u8("0_0_a.tif", 1, 1, 1, 9)
        .write_u8("3_1_b.tif", 1, 1, 1, 7);

    assemble_directory(&dir.config(true)).unwrap();

    let output = read_output(&dir.output());
    assert_eq!(output.dims, (4, 2));
    assert_eq!(output.u8(), &[9, 0, 0, 0, 0, 0, 0, 7]);
}

#[test]
fn test_mixed_2d_and_3d_tiles() {
    let dir = TileDir::new();
    // Sorted: the stack is processed first, then the plane below it
    dir.write_u8("0_0_a_plane.tif", 1, 2, 2, 1)
        .write_u8("0_0_1_b_stack.tif", 2, 2, 2, 2);

    let report = assemble_directory(&dir.config(true)).unwrap();
    assert_eq!(report.layout.extent, Shape3::new(3, 2, 2));

    let output = read_output(&dir.output());
    assert_eq!(output.pages, 3);
    assert_eq!(&output.u8()[..4], &[1; 4]);
    assert_eq!(&output.u8()[4..], &[2; 8]);
}

#[test]
fn test_last_processed_tile_wins() {
    let dir = TileDir::new();
    dir.write_u8("5_5_a.tif", 1, 2, 2, 10)
        .write_u8("5_5_b.tif", 1, 2, 2, 20);

    assemble_directory(&dir.config(true)).unwrap();

    let output = read_output(&dir.output());
    assert_eq!(output.dims, (7, 7));
    let data = output.u8();
    // Rows 5 and 6, columns 5 and 6
    for index in [40, 41, 47, 48] {
        assert_eq!(data[index], 20);
    }
    assert_eq!(data.iter().filter(|&&v| v != 0).count(), 4);
}

#[test]
fn test_output_type_follows_designated_tile() {
    let dir = TileDir::new();
    dir.write_u8("0_0_a.tif", 1, 1, 1, 200)
        .write_u16("1_0_b.tif", 1, 1, &[1000]);

    let report = assemble_directory(&dir.config(true)).unwrap();
    assert_eq!(report.layout.element_type, ElementType::U16);

    let output = read_output(&dir.output());
    assert_eq!(output.u16(), &[200, 1000]);
}

// =============================================================================
// Fatal Errors
// =============================================================================

#[test]
fn test_bad_name_aborts_without_output() {
    let dir = TileDir::new();
    dir.write_u8("0_0_a.tif", 1, 1, 1, 1)
        .write_u8("ab_1_2.tif", 1, 1, 1, 1);

    let err = assemble_directory(&dir.config(true)).unwrap_err();
    match err {
        MosaicError::Parse(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].identifier(), "ab_1_2.tif");
        }
        other => panic!("expected parse error, got {:?}", other),
    }
    assert!(!dir.output().exists());
}

#[test]
fn test_bad_name_reported_before_decode_errors() {
    let dir = TileDir::new();
    dir.write_raw("0_0_corrupt.tif", b"not a tiff")
        .write_raw("plain.tif", b"not a tiff either");

    let err = assemble_directory(&dir.config(true)).unwrap_err();
    assert!(matches!(err, MosaicError::Parse(_)));
}

#[test]
fn test_out_of_bounds_aborts_without_output() {
    let dir = TileDir::new();
    // (1,1,1) dominates; the 20-page stack at the origin does not fit (6,6,6)
    dir.write_u8("0_0_0_long.tif", 20, 1, 1, 1)
        .write_u8("1_1_1_cube.tif", 5, 5, 5, 2);

    let err = assemble_directory(&dir.config(true)).unwrap_err();
    match err {
        MosaicError::OutOfBounds { identifier, .. } => assert_eq!(identifier, "0_0_0_long.tif"),
        other => panic!("expected out-of-bounds error, got {:?}", other),
    }
    assert!(!dir.output().exists());
}

#[test]
fn test_empty_directory() {
    let dir = TileDir::new();
    dir.write_raw("notes.txt", b"not a tile");

    let err = assemble_directory(&dir.config(false)).unwrap_err();
    assert!(matches!(err, MosaicError::EmptyInput(_)));
}

#[test]
fn test_corrupt_tile() {
    let dir = TileDir::new();
    dir.write_raw("0_0_a.tif", b"II*\0garbage");

    let err = assemble_directory(&dir.config(false)).unwrap_err();
    assert!(matches!(err, MosaicError::Codec(CodecError::Decode { .. })));
    assert!(!dir.output().exists());
}

#[test]
fn test_invalid_configuration() {
    let dir = TileDir::new();
    let mut config = dir.config(false);
    config.source = dir.tiles().join("missing");

    let err = assemble_directory(&config).unwrap_err();
    assert!(matches!(err, MosaicError::Configuration(_)));
}

// =============================================================================
// Planning
// =============================================================================

#[test]
fn test_plan_matches_assembly() {
    let dir = TileDir::new();
    dir.write_u8("0_0_a.tif", 1, 3, 4, 1)
        .write_u8("4_3_b.tif", 1, 3, 4, 2);

    let plan = plan_directory(&PlanConfig {
        source: dir.tiles(),
        sort: true,
        format: PlanOutputFormat::Json,
        verbose: false,
    })
    .unwrap();
    assert_eq!(plan.tile_count, 2);
    assert_eq!(plan.layout.extent, Shape3::new(1, 6, 8));
    assert_eq!(plan.byte_size, 48);
    assert!(plan.tiles_outside.is_empty());
    assert!(!dir.output().exists());

    let report = assemble_directory(&dir.config(true)).unwrap();
    assert_eq!(report.layout, plan.layout);
    assert_eq!(report.byte_size as u128, plan.byte_size);
}

#[test]
fn test_plan_serializes_to_json() {
    let dir = TileDir::new();
    dir.write_u8("1_2_3_a.tif", 2, 2, 2, 1);

    let plan = plan_directory(&PlanConfig {
        source: dir.tiles(),
        sort: false,
        format: PlanOutputFormat::Json,
        verbose: false,
    })
    .unwrap();

    let json: serde_json::Value = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["variant"], "standard");
    assert_eq!(json["layout"]["element_type"], "u8");
    assert_eq!(json["layout"]["origin"]["z"], 3);
    assert_eq!(json["layout"]["extent"]["x"], 3);
}
