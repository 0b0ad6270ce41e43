//! Flat-buffer columns, one per (component, field) pair.
//!
//! A [`Column`] owns one contiguous buffer of a single [`FieldKind`], indexed
//! by entity id. Growth reallocates and copies the occupied prefix; everything
//! else is an O(1) in-place read or write. All columns of a world grow in
//! lockstep so the index invariant (buffer index == entity id) holds across
//! every field of every component.

use fixedbitset::FixedBitSet;

use super::FieldKind;

/// One typed storage column.
///
/// Numeric kinds store a plain `Vec` of the scalar. Booleans are bit-packed.
/// `Str` keeps a flat byte region of `max_len` per slot plus a length table;
/// `Bytes` keeps an exact `len`-byte region per slot.
#[derive(Debug, Clone)]
pub enum Column {
    /// Signed 8-bit values.
    I8(Vec<i8>),
    /// Signed 16-bit values.
    I16(Vec<i16>),
    /// Signed 32-bit values.
    I32(Vec<i32>),
    /// Unsigned 8-bit values.
    U8(Vec<u8>),
    /// Unsigned 16-bit values.
    U16(Vec<u16>),
    /// Unsigned 32-bit values.
    U32(Vec<u32>),
    /// 32-bit float values.
    F32(Vec<f32>),
    /// 64-bit float values.
    F64(Vec<f64>),
    /// Bit-packed booleans.
    Bool(FixedBitSet),
    /// Fixed-capacity UTF-8 strings.
    Str {
        /// Flat storage, `max_len` bytes per slot.
        data: Vec<u8>,
        /// Stored length per slot.
        lens: Vec<u16>,
        /// Per-slot byte capacity.
        max_len: usize,
    },
    /// Fixed-length binary blobs.
    Bytes {
        /// Flat storage, `len` bytes per slot.
        data: Vec<u8>,
        /// Per-slot byte length.
        len: usize,
    },
}

impl Column {
    /// Allocate a column of `capacity` slots, all holding the kind's default
    /// value (zero, `false`, empty string, zeroed bytes).
    pub fn new(kind: FieldKind, capacity: usize) -> Self {
        match kind {
            FieldKind::I8 => Self::I8(vec![0; capacity]),
            FieldKind::I16 => Self::I16(vec![0; capacity]),
            FieldKind::I32 => Self::I32(vec![0; capacity]),
            FieldKind::U8 => Self::U8(vec![0; capacity]),
            FieldKind::U16 => Self::U16(vec![0; capacity]),
            FieldKind::U32 => Self::U32(vec![0; capacity]),
            FieldKind::F32 => Self::F32(vec![0.0; capacity]),
            FieldKind::F64 => Self::F64(vec![0.0; capacity]),
            FieldKind::Bool => Self::Bool(FixedBitSet::with_capacity(capacity)),
            FieldKind::Str { max_len } => Self::Str {
                data: vec![0; capacity * max_len],
                lens: vec![0; capacity],
                max_len,
            },
            FieldKind::Bytes { len } => Self::Bytes {
                data: vec![0; capacity * len],
                len,
            },
        }
    }

    /// Number of slots this column currently holds.
    pub fn capacity(&self) -> usize {
        match self {
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Bool(bits) => bits.len(),
            Self::Str { lens, .. } => lens.len(),
            Self::Bytes { data, len } => data.len() / len,
        }
    }

    /// Grow to `new_capacity` slots, preserving all existing values at
    /// indices `0..capacity()`. Never shrinks.
    pub fn grow(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity >= self.capacity());
        match self {
            Self::I8(v) => v.resize(new_capacity, 0),
            Self::I16(v) => v.resize(new_capacity, 0),
            Self::I32(v) => v.resize(new_capacity, 0),
            Self::U8(v) => v.resize(new_capacity, 0),
            Self::U16(v) => v.resize(new_capacity, 0),
            Self::U32(v) => v.resize(new_capacity, 0),
            Self::F32(v) => v.resize(new_capacity, 0.0),
            Self::F64(v) => v.resize(new_capacity, 0.0),
            Self::Bool(bits) => bits.grow(new_capacity),
            Self::Str {
                data,
                lens,
                max_len,
            } => {
                data.resize(new_capacity * *max_len, 0);
                lens.resize(new_capacity, 0);
            }
            Self::Bytes { data, len } => data.resize(new_capacity * *len, 0),
        }
    }

    /// Reset the slot at `index` to the kind's default value.
    pub fn clear_at(&mut self, index: usize) {
        match self {
            Self::I8(v) => v[index] = 0,
            Self::I16(v) => v[index] = 0,
            Self::I32(v) => v[index] = 0,
            Self::U8(v) => v[index] = 0,
            Self::U16(v) => v[index] = 0,
            Self::U32(v) => v[index] = 0,
            Self::F32(v) => v[index] = 0.0,
            Self::F64(v) => v[index] = 0.0,
            Self::Bool(bits) => bits.set(index, false),
            Self::Str { lens, .. } => lens[index] = 0,
            Self::Bytes { data, len } => data[index * *len..(index + 1) * *len].fill(0),
        }
    }

    /// Read the string at `index`.
    pub fn str_at(&self, index: usize) -> &str {
        match self {
            Self::Str {
                data,
                lens,
                max_len,
            } => {
                let start = index * max_len;
                let stored = &data[start..start + lens[index] as usize];
                // Writes only ever store validated UTF-8 prefixes.
                std::str::from_utf8(stored).unwrap_or_default()
            }
            _ => unreachable!("column kind is checked at field resolution"),
        }
    }

    /// Write a string at `index`, truncating at a character boundary if the
    /// value exceeds the field's byte capacity.
    pub fn set_str(&mut self, index: usize, value: &str) {
        match self {
            Self::Str {
                data,
                lens,
                max_len,
            } => {
                let mut end = value.len().min(*max_len);
                while !value.is_char_boundary(end) {
                    end -= 1;
                }
                if end < value.len() {
                    log::trace!("str write truncated from {} to {end} bytes", value.len());
                }
                let start = index * *max_len;
                data[start..start + end].copy_from_slice(&value.as_bytes()[..end]);
                lens[index] = end as u16;
            }
            _ => unreachable!("column kind is checked at field resolution"),
        }
    }

    /// Read the binary blob at `index`. Always the field's full declared
    /// length.
    pub fn bytes_at(&self, index: usize) -> &[u8] {
        match self {
            Self::Bytes { data, len } => &data[index * len..(index + 1) * len],
            _ => unreachable!("column kind is checked at field resolution"),
        }
    }

    /// Write a binary blob at `index`. Input shorter than the declared length
    /// is zero-padded; longer input is truncated.
    pub fn set_bytes(&mut self, index: usize, value: &[u8]) {
        match self {
            Self::Bytes { data, len } => {
                let slot = &mut data[index * *len..(index + 1) * *len];
                let copied = value.len().min(*len);
                slot[..copied].copy_from_slice(&value[..copied]);
                slot[copied..].fill(0);
            }
            _ => unreachable!("column kind is checked at field resolution"),
        }
    }
}
