//! TIFF tile decoding.
//!
//! A single-page file is a 2D tile of shape (y, x). A multi-page file is a
//! stack of shape (z, y, x) with z = page count; every page must share the
//! first page's dimensions and sample type.
//!
//! Only single-sample (grayscale) images are supported. Multi-sample pixels
//! (RGB, gray + alpha, ...) would need a fourth axis the mosaic does not
//! have.

use std::io::{Read, Seek};

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::ColorType;

use crate::error::CodecError;
use crate::mosaic::{ElementBuffer, TileShape};

use super::DecodedTile;

/// Decode a TIFF stream into a tile.
pub fn decode_tiff<R: Read + Seek>(identifier: &str, reader: R) -> Result<DecodedTile, CodecError> {
    let decode_err = |e: tiff::TiffError| CodecError::Decode {
        identifier: identifier.to_string(),
        message: e.to_string(),
    };
    let unsupported = |reason: String| CodecError::UnsupportedLayout {
        identifier: identifier.to_string(),
        reason,
    };

    let mut decoder = Decoder::new(reader)
        .map_err(decode_err)?
        .with_limits(Limits::unlimited());

    let mut first_dims: Option<(u32, u32)> = None;
    let mut stack: Option<ElementBuffer> = None;
    let mut pages = 0usize;

    loop {
        match decoder.colortype().map_err(decode_err)? {
            ColorType::Gray(_) => {}
            other => {
                return Err(unsupported(format!(
                    "page {} has color type {:?}, only single-sample images can be placed",
                    pages, other
                )))
            }
        }

        let dims = decoder.dimensions().map_err(decode_err)?;
        match first_dims {
            None => first_dims = Some(dims),
            Some(first) if first != dims => {
                return Err(unsupported(format!(
                    "page {} is {}x{}, first page is {}x{}",
                    pages, dims.0, dims.1, first.0, first.1
                )))
            }
            Some(_) => {}
        }

        let page = into_buffer(decoder.read_image().map_err(decode_err)?)
            .ok_or_else(|| unsupported("unsupported sample format".to_string()))?;

        stack = Some(match stack {
            None => page,
            Some(existing) => append_page(existing, page).map_err(|(expected, found)| {
                unsupported(format!(
                    "page {} holds {} samples, first page holds {}",
                    pages, found, expected
                ))
            })?,
        });
        pages += 1;

        if !decoder.more_images() {
            break;
        }
        decoder.next_image().map_err(decode_err)?;
    }

    let (width, height) = first_dims.unwrap_or((0, 0));
    let data = stack.unwrap_or(ElementBuffer::U8(Vec::new()));
    let shape = if pages > 1 {
        TileShape::Zyx([pages, height as usize, width as usize])
    } else {
        TileShape::Yx([height as usize, width as usize])
    };

    DecodedTile::new(identifier, data, shape)
}

#[allow(unreachable_patterns)]
fn into_buffer(result: DecodingResult) -> Option<ElementBuffer> {
    Some(match result {
        DecodingResult::U8(data) => ElementBuffer::U8(data),
        DecodingResult::U16(data) => ElementBuffer::U16(data),
        DecodingResult::U32(data) => ElementBuffer::U32(data),
        DecodingResult::U64(data) => ElementBuffer::U64(data),
        DecodingResult::I8(data) => ElementBuffer::I8(data),
        DecodingResult::I16(data) => ElementBuffer::I16(data),
        DecodingResult::I32(data) => ElementBuffer::I32(data),
        DecodingResult::I64(data) => ElementBuffer::I64(data),
        DecodingResult::F32(data) => ElementBuffer::F32(data),
        DecodingResult::F64(data) => ElementBuffer::F64(data),
        _ => return None,
    })
}

/// Append `page` to `stack`; both must hold the same sample type.
///
/// On mismatch returns the (stack type, page type) names.
fn append_page(
    stack: ElementBuffer,
    page: ElementBuffer,
) -> Result<ElementBuffer, (&'static str, &'static str)> {
    macro_rules! extend {
        ($($variant:ident),*) => {
            match (stack, page) {
                $(
                    (ElementBuffer::$variant(mut a), ElementBuffer::$variant(b)) => {
                        a.extend_from_slice(&b);
                        Ok(ElementBuffer::$variant(a))
                    }
                )*
                (a, b) => Err((a.element_type().name(), b.element_type().name())),
            }
        };
    }

    extend!(U8, U16, U32, U64, I8, I16, I32, I64, F32, F64)
}
