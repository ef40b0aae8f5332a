//! Output encoding selection.
//!
//! Classic TIFF addresses its contents with 32-bit offsets. Volumes larger
//! than [`CLASSIC_TIFF_MAX_BYTES`] are written as BigTIFF, which ImageJ
//! cannot open directly (Bio-Formats can).

use serde::Serialize;

use super::volume::{ElementType, Volume};

/// Largest pixel payload written as classic TIFF: 4 GiB minus 256 bytes
/// reserved for the header and directories.
pub const CLASSIC_TIFF_MAX_BYTES: u128 = (1u128 << 32) - 256;

/// On-disk variant of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputVariant {
    /// Classic TIFF with ImageJ metadata
    Standard,
    /// BigTIFF with 64-bit offsets
    BigTiff,
}

impl OutputVariant {
    pub const fn name(&self) -> &'static str {
        match self {
            OutputVariant::Standard => "standard",
            OutputVariant::BigTiff => "bigtiff",
        }
    }

    pub const fn is_bigtiff(&self) -> bool {
        matches!(self, OutputVariant::BigTiff)
    }
}

/// Variant for a payload of `byte_size` bytes.
#[inline]
pub fn select_variant(byte_size: u128) -> OutputVariant {
    if byte_size > CLASSIC_TIFF_MAX_BYTES {
        OutputVariant::BigTiff
    } else {
        OutputVariant::Standard
    }
}

/// Variant for `element_count` elements of `element_type`.
pub fn select_variant_for(element_count: u64, element_type: ElementType) -> OutputVariant {
    select_variant(element_count as u128 * element_type.byte_width() as u128)
}

/// Variant for an assembled volume.
pub fn select_variant_for_volume(volume: &Volume) -> OutputVariant {
    select_variant_for(volume.element_count() as u64, volume.element_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosaic::coords::Shape3;

    #[test]
    fn test_threshold_value() {
        assert_eq!(CLASSIC_TIFF_MAX_BYTES, 4_294_967_040);
    }

    #[test]
    fn test_boundary_is_standard() {
        assert_eq!(select_variant(CLASSIC_TIFF_MAX_BYTES), OutputVariant::Standard);
    }

    #[test]
    fn test_one_byte_over_is_bigtiff() {
        assert_eq!(
            select_variant(CLASSIC_TIFF_MAX_BYTES + 1),
            OutputVariant::BigTiff
        );
    }

    #[test]
    fn test_small_and_empty_are_standard() {
        assert_eq!(select_variant(0), OutputVariant::Standard);
        assert_eq!(select_variant(1024), OutputVariant::Standard);
    }

    #[test]
    fn test_element_width_counts() {
        // 2^31 - 128 u16 elements is exactly the threshold
        let count = (1u64 << 31) - 128;
        assert_eq!(select_variant_for(count, ElementType::U16), OutputVariant::Standard);
        assert_eq!(
            select_variant_for(count + 1, ElementType::U16),
            OutputVariant::BigTiff
        );
        assert_eq!(select_variant_for(count, ElementType::U8), OutputVariant::Standard);
        assert_eq!(select_variant_for(count, ElementType::F32), OutputVariant::BigTiff);
    }

    #[test]
    fn test_no_overflow_on_huge_counts() {
        assert_eq!(
            select_variant_for(u64::MAX, ElementType::F64),
            OutputVariant::BigTiff
        );
    }

    #[test]
    fn test_volume_variant() {
        let volume = Volume::zeros(Shape3::new(2, 4, 4), ElementType::U16).unwrap();
        assert_eq!(select_variant_for_volume(&volume), OutputVariant::Standard);
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(OutputVariant::Standard.name(), "standard");
        assert!(OutputVariant::BigTiff.is_bigtiff());
        assert!(!OutputVariant::Standard.is_bigtiff());
    }
}
