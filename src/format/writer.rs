//! Volume encoding.
//!
//! The volume is written as one TIFF page per z slice. The
//! [`OutputVariant`] decides the container:
//!
//! - **Standard**: classic TIFF. When the sample type is one ImageJ reads
//!   natively, the first page carries an ImageJ `ImageDescription` so the
//!   file opens as a stack.
//! - **BigTiff**: 64-bit offsets, no ImageJ metadata (ImageJ cannot read
//!   BigTIFF; Bio-Formats can).

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use tiff::encoder::{colortype, TiffEncoder, TiffKind, TiffValue};
use tiff::tags::Tag;
use tiff::TiffResult;
use tracing::{debug, warn};

use crate::error::CodecError;
use crate::mosaic::{ElementBuffer, OutputVariant, Shape3, Volume};

use super::header::{verify_variant, TiffHeader};

/// ImageJ version string written into the description.
const IMAGEJ_VERSION: &str = "1.11a";

/// Consumer of an assembled volume.
pub trait VolumeSink {
    /// Serialize `volume` using the selected variant.
    fn write(&mut self, volume: &Volume, variant: OutputVariant) -> Result<(), CodecError>;
}

/// ImageJ `ImageDescription` for a stack of `slices` images.
pub fn imagej_description(slices: usize) -> String {
    if slices > 1 {
        format!(
            "ImageJ={}\nimages={}\nslices={}\nloop=false\n",
            IMAGEJ_VERSION, slices, slices
        )
    } else {
        format!("ImageJ={}\n", IMAGEJ_VERSION)
    }
}

// =============================================================================
// TiffVolumeWriter
// =============================================================================

/// Writes volumes to a TIFF file on disk.
#[derive(Debug, Clone)]
pub struct TiffVolumeWriter {
    path: PathBuf,
    verify: bool,
    header: Option<TiffHeader>,
}

impl TiffVolumeWriter {
    /// Writer for `path`. The written header is re-read and checked.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            verify: true,
            header: None,
        }
    }

    /// Skip re-reading the header after writing.
    pub fn without_verification(mut self) -> Self {
        self.verify = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header of the last verified write.
    pub fn header(&self) -> Option<&TiffHeader> {
        self.header.as_ref()
    }
}

impl VolumeSink for TiffVolumeWriter {
    fn write(&mut self, volume: &Volume, variant: OutputVariant) -> Result<(), CodecError> {
        let display = self.path.display().to_string();

        let file = File::create(&self.path).map_err(|e| CodecError::Io {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let mut writer = BufWriter::new(file);

        encode_volume(&mut writer, volume, variant, &display)?;

        writer.flush().map_err(|e| CodecError::Io {
            path: display.clone(),
            message: e.to_string(),
        })?;
        drop(writer);

        if self.verify {
            let header = verify_variant(&self.path, variant)?;
            debug!(
                "Verified {} header ({:?}, first IFD at {})",
                variant.name(),
                header.byte_order,
                header.first_ifd_offset
            );
            self.header = Some(header);
        }

        Ok(())
    }
}

/// Encode `volume` into any seekable writer.
///
/// `label` names the destination in error messages.
pub fn encode_volume<W: Write + Seek>(
    writer: W,
    volume: &Volume,
    variant: OutputVariant,
    label: &str,
) -> Result<(), CodecError> {
    let encode_err = |e: tiff::TiffError| CodecError::Encode {
        path: label.to_string(),
        message: e.to_string(),
    };

    let shape = volume.shape();
    if volume.element_count() == 0 {
        return Err(CodecError::Encode {
            path: label.to_string(),
            message: format!("volume {} is empty", shape),
        });
    }
    if u32::try_from(shape.x).is_err() || u32::try_from(shape.y).is_err() {
        return Err(CodecError::Encode {
            path: label.to_string(),
            message: format!("slice {}x{} exceeds TIFF dimension limits", shape.x, shape.y),
        });
    }

    match variant {
        OutputVariant::Standard => {
            let element_type = volume.element_type();
            let description = if element_type.is_imagej_compatible() {
                Some(imagej_description(shape.z))
            } else {
                warn!(
                    "{} samples are not ImageJ-compatible, writing plain TIFF without ImageJ metadata",
                    element_type
                );
                None
            };
            let encoder = TiffEncoder::new(writer).map_err(encode_err)?;
            write_slices(encoder, volume, description.as_deref()).map_err(encode_err)
        }
        OutputVariant::BigTiff => {
            let encoder = TiffEncoder::new_big(writer).map_err(encode_err)?;
            write_slices(encoder, volume, None).map_err(encode_err)
        }
    }
}

fn write_slices<W: Write + Seek, K: TiffKind>(
    mut encoder: TiffEncoder<W, K>,
    volume: &Volume,
    description: Option<&str>,
) -> TiffResult<()> {
    let shape = volume.shape();
    let e = &mut encoder;

    match volume.data() {
        ElementBuffer::U8(d) => write_pages::<_, _, colortype::Gray8>(e, shape, d, description),
        ElementBuffer::U16(d) => write_pages::<_, _, colortype::Gray16>(e, shape, d, description),
        ElementBuffer::U32(d) => write_pages::<_, _, colortype::Gray32>(e, shape, d, description),
        ElementBuffer::U64(d) => write_pages::<_, _, colortype::Gray64>(e, shape, d, description),
        ElementBuffer::I8(d) => write_pages::<_, _, colortype::GrayI8>(e, shape, d, description),
        ElementBuffer::I16(d) => write_pages::<_, _, colortype::GrayI16>(e, shape, d, description),
        ElementBuffer::I32(d) => write_pages::<_, _, colortype::GrayI32>(e, shape, d, description),
        ElementBuffer::I64(d) => write_pages::<_, _, colortype::GrayI64>(e, shape, d, description),
        ElementBuffer::F32(d) => {
            write_pages::<_, _, colortype::Gray32Float>(e, shape, d, description)
        }
        ElementBuffer::F64(d) => {
            write_pages::<_, _, colortype::Gray64Float>(e, shape, d, description)
        }
    }
}

fn write_pages<W, K, C>(
    encoder: &mut TiffEncoder<W, K>,
    shape: Shape3,
    data: &[C::Inner],
    description: Option<&str>,
) -> TiffResult<()>
where
    W: Write + Seek,
    K: TiffKind,
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
{
    // Dimensions were checked against u32 by the caller
    let width = shape.x as u32;
    let height = shape.y as u32;
    let plane = shape.y * shape.x;

    for (z, slice) in data.chunks_exact(plane).enumerate() {
        let mut image = encoder.new_image::<C>(width, height)?;
        if z == 0 {
            if let Some(description) = description {
                image
                    .encoder()
                    .write_tag(Tag::ImageDescription, description)?;
            }
        }
        image.write_data(slice)?;
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
