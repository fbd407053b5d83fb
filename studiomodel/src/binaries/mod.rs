use std::{fmt::Debug, marker::PhantomData, ops::Range};

use bytemuck::{Pod, Zeroable};

use crate::{error::ReadError, level::Level};

/// A fixed-layout record as it is stored on disk.
///
/// `WIRE_SIZE` is the number of bytes one record occupies in the file. It is
/// declared by hand for every kind and checked against the packed struct at
/// compile time, never taken from a host layout.
pub trait BinaryData: Pod {
    const WIRE_SIZE: usize;
    const LEVEL: Level;

    /// Converts every multi-byte field from file (little-endian) to host order.
    fn to_host(self) -> Self;
}

impl BinaryData for u16 {
    const WIRE_SIZE: usize = 2;
    const LEVEL: Level = Level::Index;

    fn to_host(self) -> Self {
        u16::from_le(self)
    }
}

/// Checks at compile time that a record's declared size matches its packed layout.
macro_rules! assert_wire_size {
    ($t:ty, $size:expr) => {
        const _: () = assert!(
            ::std::mem::size_of::<$t>() == $size
                && <$t as $crate::binaries::BinaryData>::WIRE_SIZE == $size
        );
    };
}

assert_wire_size!(u16, 2);

pub(crate) fn f32_from_le(value: f32) -> f32 {
    f32::from_bits(u32::from_le(value.to_bits()))
}

/// Immutable view over a complete file, with every read checked against its length.
///
/// Offsets are absolute byte addresses. Addresses are carried as `i64` so that
/// a negative relative offset resolved against a record address can be
/// reported rather than wrapping.
#[derive(Copy, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks that `size` bytes starting at `offset` lie inside the buffer.
    pub fn validate(&self, offset: i64, size: i64) -> Result<Range<usize>, ReadError> {
        if offset < 0 {
            return Err(ReadError::NegativeOffset { offset });
        }
        if size < 0 {
            return Err(ReadError::NegativeCount { count: size });
        }
        let out_of_bounds = ReadError::OffsetOutOfBounds {
            address: offset,
            size,
            len: self.data.len(),
        };
        let end = offset.checked_add(size).ok_or(out_of_bounds)?;
        if end > self.data.len() as i64 {
            return Err(out_of_bounds);
        }
        Ok(offset as usize..end as usize)
    }

    pub fn read_scalar<T: BinaryData>(&self, offset: i64) -> Result<T, ReadError> {
        let range = self.validate(offset, T::WIRE_SIZE as i64)?;
        Ok(bytemuck::pod_read_unaligned::<T>(&self.data[range]).to_host())
    }

    pub fn read_array<T: BinaryData>(&self, offset: i64, count: i64) -> Result<Vec<T>, ReadError> {
        let range = self.span::<T>(offset, count)?;
        Ok(self.data[range]
            .chunks_exact(T::WIRE_SIZE)
            .map(|c| bytemuck::pod_read_unaligned::<T>(c).to_host())
            .collect())
    }

    /// Like [`ByteReader::read_array`], but pairs each record with its own absolute address.
    pub fn read_records<T: BinaryData>(
        &self,
        offset: i64,
        count: i64,
    ) -> Result<Vec<(i64, T)>, ReadError> {
        let range = self.span::<T>(offset, count)?;
        Ok(self.data[range]
            .chunks_exact(T::WIRE_SIZE)
            .enumerate()
            .map(|(i, c)| {
                (
                    offset + (i * T::WIRE_SIZE) as i64,
                    bytemuck::pod_read_unaligned::<T>(c).to_host(),
                )
            })
            .collect())
    }

    fn span<T: BinaryData>(&self, offset: i64, count: i64) -> Result<Range<usize>, ReadError> {
        if count < 0 {
            return Err(ReadError::NegativeCount { count });
        }
        let size = count
            .checked_mul(T::WIRE_SIZE as i64)
            .ok_or(ReadError::OffsetOutOfBounds {
                address: offset,
                size: i64::MAX,
                len: self.data.len(),
            })?;
        self.validate(offset, size)
    }
}

/// Struct of (count, offset) for reading a table of `T` out of a vtx.
///
/// The offset is relative to the address of the record this pair is stored
/// in, not to the file or the start of the record's own table.
#[repr(C, packed)]
pub struct BinArray<T> {
    pub count: i32,
    pub offset: i32,
    _p: PhantomData<T>,
}

impl<T> BinArray<T> {
    pub fn new(count: i32, offset: i32) -> Self {
        Self {
            count,
            offset,
            _p: PhantomData,
        }
    }

    pub fn to_host(self) -> Self {
        Self::new(i32::from_le(self.count), i32::from_le(self.offset))
    }

    /// Absolute address of the table, given the absolute address of the owning record.
    pub fn resolve(&self, record: i64) -> i64 {
        record + self.offset as i64
    }
}

impl<T> Clone for BinArray<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for BinArray<T> {}

unsafe impl<T: 'static> Zeroable for BinArray<T> {}
unsafe impl<T: 'static> Pod for BinArray<T> {}

impl<T> Debug for BinArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.count;
        let offset = self.offset;
        f.debug_struct("BinArray")
            .field("count", &count)
            .field("offset", &offset)
            .finish()
    }
}
