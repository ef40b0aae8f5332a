//! Typed element buffers and the assembled output volume.
//!
//! All buffers are contiguous and row-major in (z, y, x) order. A buffer
//! carries exactly one [`ElementType`]; writing a tile of another type casts
//! every element with Rust `as` semantics (integer truncation, float to
//! integer saturation).

use std::ops::Range;

use serde::Serialize;

use crate::error::{MosaicError, RegionError};

use super::coords::{Coord3, Shape3};

// =============================================================================
// ElementType
// =============================================================================

/// Sample type of a tile or of the output volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ElementType {
    /// Size of one element in bytes.
    #[inline]
    pub const fn byte_width(self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 | ElementType::F32 => 4,
            ElementType::U64 | ElementType::I64 | ElementType::F64 => 8,
        }
    }

    /// Short lowercase name (`u8`, `f32`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        }
    }

    /// Sample types ImageJ opens natively as a hyperstack.
    pub const fn is_imagej_compatible(self) -> bool {
        matches!(self, ElementType::U8 | ElementType::U16 | ElementType::F32)
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Element casting
// =============================================================================

/// Numeric conversion with `as` semantics.
pub trait CastInto<T> {
    fn cast_into(self) -> T;
}

macro_rules! impl_cast_into {
    ($($src:ty),*) => {
        $( impl_cast_into!(@to $src; u8, u16, u32, u64, i8, i16, i32, i64, f32, f64); )*
    };
    (@to $src:ty; $($dst:ty),*) => {
        $(
            impl CastInto<$dst> for $src {
                #[inline(always)]
                fn cast_into(self) -> $dst {
                    self as $dst
                }
            }
        )*
    };
}

impl_cast_into!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

/// A primitive sample that can be stored in an [`ElementBuffer`].
pub trait Element:
    Copy
    + Default
    + CastInto<u8>
    + CastInto<u16>
    + CastInto<u32>
    + CastInto<u64>
    + CastInto<i8>
    + CastInto<i16>
    + CastInto<i32>
    + CastInto<i64>
    + CastInto<f32>
    + CastInto<f64>
{
    const TYPE: ElementType;

    /// Borrow the buffer as `&[Self]` if it holds this type.
    fn slice(buffer: &ElementBuffer) -> Option<&[Self]>;

    /// Wrap a vector of this type.
    fn into_buffer(data: Vec<Self>) -> ElementBuffer;
}

macro_rules! impl_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const TYPE: ElementType = ElementType::$variant;

                fn slice(buffer: &ElementBuffer) -> Option<&[Self]> {
                    match buffer {
                        ElementBuffer::$variant(data) => Some(data.as_slice()),
                        _ => None,
                    }
                }

                fn into_buffer(data: Vec<Self>) -> ElementBuffer {
                    ElementBuffer::$variant(data)
                }
            }
        )*
    };
}

impl_element!(
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);

// =============================================================================
// ElementBuffer
// =============================================================================

/// Contiguous element storage of a single [`ElementType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ElementBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Run `$body` with `$data` bound to the inner vector, whatever its type.
macro_rules! with_buffer {
    ($buffer:expr, $data:ident => $body:expr) => {
        match $buffer {
            ElementBuffer::U8($data) => $body,
            ElementBuffer::U16($data) => $body,
            ElementBuffer::U32($data) => $body,
            ElementBuffer::U64($data) => $body,
            ElementBuffer::I8($data) => $body,
            ElementBuffer::I16($data) => $body,
            ElementBuffer::I32($data) => $body,
            ElementBuffer::I64($data) => $body,
            ElementBuffer::F32($data) => $body,
            ElementBuffer::F64($data) => $body,
        }
    };
}


impl ElementBuffer {
    /// Allocate `len` zero elements of type `element_type`.
    ///
    /// Fails instead of aborting the process when the allocator cannot
    /// satisfy the request.
    pub fn zeros(element_type: ElementType, len: usize) -> Result<Self, MosaicError> {
        fn zeroed<T: Element>(len: usize) -> Result<ElementBuffer, MosaicError> {
            let mut data: Vec<T> = Vec::new();
            data.try_reserve_exact(len).map_err(|e| {
                MosaicError::Allocation(format!(
                    "{} elements of {}: {}",
                    len,
                    T::TYPE,
                    e
                ))
            })?;
            data.resize(len, T::default());
            Ok(T::into_buffer(data))
        }

        match element_type {
            ElementType::U8 => zeroed::<u8>(len),
            ElementType::U16 => zeroed::<u16>(len),
            ElementType::U32 => zeroed::<u32>(len),
            ElementType::U64 => zeroed::<u64>(len),
            ElementType::I8 => zeroed::<i8>(len),
            ElementType::I16 => zeroed::<i16>(len),
            ElementType::I32 => zeroed::<i32>(len),
            ElementType::I64 => zeroed::<i64>(len),
            ElementType::F32 => zeroed::<f32>(len),
            ElementType::F64 => zeroed::<f64>(len),
        }
    }

    /// Type of the stored elements.
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementBuffer::U8(_) => ElementType::U8,
            ElementBuffer::U16(_) => ElementType::U16,
            ElementBuffer::U32(_) => ElementType::U32,
            ElementBuffer::U64(_) => ElementType::U64,
            ElementBuffer::I8(_) => ElementType::I8,
            ElementBuffer::I16(_) => ElementType::I16,
            ElementBuffer::I32(_) => ElementType::I32,
            ElementBuffer::I64(_) => ElementType::I64,
            ElementBuffer::F32(_) => ElementType::F32,
            ElementBuffer::F64(_) => ElementType::F64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_buffer!(self, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow as a typed slice, `None` if the type differs.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(self)
    }
}

impl<T: Element> From<Vec<T>> for ElementBuffer {
    fn from(data: Vec<T>) -> Self {
        T::into_buffer(data)
    }
}

// =============================================================================
// Destination box
// =============================================================================

/// Half-open destination box of a tile, per axis in (z, y, x) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationBox {
    pub z: Range<usize>,
    pub y: Range<usize>,
    pub x: Range<usize>,
}

impl DestinationBox {
    /// `[origin, origin + shape)` per axis. Ends saturate, so an overflowing
    /// box can never fit.
    pub fn new(origin: Coord3, shape: Shape3) -> Self {
        Self {
            z: origin.z..origin.z.saturating_add(shape.z),
            y: origin.y..origin.y.saturating_add(shape.y),
            x: origin.x..origin.x.saturating_add(shape.x),
        }
    }

    /// `true` if the box lies fully inside `extent`.
    pub fn fits(&self, extent: Shape3) -> bool {
        self.z.end <= extent.z && self.y.end <= extent.y && self.x.end <= extent.x
    }
}

// =============================================================================
// Volume
// =============================================================================

/// The assembled output volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    shape: Shape3,
    data: ElementBuffer,
}

impl Volume {
    /// Allocate a zero-filled volume.
    ///
    /// # Errors
    ///
    /// `MosaicError::Allocation` if the element count overflows or the
    /// memory cannot be reserved.
    pub fn zeros(shape: Shape3, element_type: ElementType) -> Result<Self, MosaicError> {
        let len = shape
            .element_count()
            .filter(|len| len.checked_mul(element_type.byte_width()).is_some())
            .ok_or_else(|| {
                MosaicError::Allocation(format!(
                    "extent {} of {} overflows the address space",
                    shape, element_type
                ))
            })?;

        let data = ElementBuffer::zeros(element_type, len)?;
        Ok(Self { shape, data })
    }

    /// Extent in (z, y, x) order.
    pub fn shape(&self) -> Shape3 {
        self.shape
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn data(&self) -> &ElementBuffer {
        &self.data
    }

    /// Borrow the elements as a typed slice, `None` if the type differs.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        self.data.as_slice()
    }

    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    /// Total buffer size in bytes.
    pub fn byte_size(&self) -> u64 {
        self.element_count() as u64 * self.element_type().byte_width() as u64
    }

    /// Copy a tile into the box starting at `origin`, overwriting the
    /// previous contents.
    ///
    /// The whole box is checked before any element is written: a box that
    /// does not fit leaves the volume untouched.
    pub fn write_region(
        &mut self,
        origin: Coord3,
        source: &ElementBuffer,
        source_shape: Shape3,
    ) -> Result<(), RegionError> {
        let expected = source_shape.element_count().unwrap_or(usize::MAX);
        if source.len() != expected {
            return Err(RegionError::LengthMismatch {
                expected,
                actual: source.len(),
            });
        }

        let dest = DestinationBox::new(origin, source_shape);
        if !dest.fits(self.shape) {
            return Err(RegionError::OutOfBounds {
                z: dest.z,
                y: dest.y,
                x: dest.x,
                extent: self.shape,
            });
        }

        let extent = self.shape;
        with_buffer!(source, src => write_into(&mut self.data, extent, &dest, src));
        Ok(())
    }
}

fn write_into<S: Element>(
    data: &mut ElementBuffer,
    extent: Shape3,
    dest: &DestinationBox,
    src: &[S],
) {
    with_buffer!(data, dst => copy_box(dst, extent, dest, src))
}

/// Row-by-row copy of `src` (shaped like `dest`) into `dst` (shaped like
/// `extent`). `dest` must already lie inside `extent`.
fn copy_box<S, D>(dst: &mut [D], extent: Shape3, dest: &DestinationBox, src: &[S])
where
    S: CastInto<D> + Copy,
{
    let row_len = dest.x.len();
    if row_len == 0 {
        return;
    }

    let mut rows = src.chunks_exact(row_len);
    for z in dest.z.clone() {
        for y in dest.y.clone() {
            let Some(row) = rows.next() else {
                return;
            };
            let start = (z * extent.y + y) * extent.x + dest.x.start;
            for (out, &value) in dst[start..start + row_len].iter_mut().zip(row) {
                *out = value.cast_into();
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
