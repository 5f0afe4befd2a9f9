//! MessagePack decoding: bytes → `Value`.
//!
//! [`type_of`] and [`value_of`] inspect a single tag byte without consuming
//! anything else. [`decode_value`] assembles them into a full decoder.

use bytes::Buf;

use super::marker::{Category, Family, Layout, TagDescriptor, descriptor_for};
use crate::error::PackError;
use crate::types::{Ext, Float, Int, Value};

/// Returns the family of a leading byte. Total over all 256 values.
pub fn type_of(tag: u8) -> Family {
    descriptor_for(tag).family
}

/// Returns the integer embedded in a fixint tag, `None` for every other family.
pub fn value_of(tag: u8) -> Option<i8> {
    let row = descriptor_for(tag);
    if row.category() != Category::Integer {
        return None;
    }
    row.embedded_value(tag)
}

/// Returns the length or count embedded in a fixstr, fixarray or fixmap tag.
pub fn embedded_len(tag: u8) -> Option<usize> {
    let row = descriptor_for(tag);
    if row.category() == Category::Integer {
        return None;
    }
    row.embedded_value(tag).map(|len| len as usize)
}

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    max_depth: usize,
    max_len: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_len: u32::MAX as usize,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth of arrays and maps.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the maximum length of any str, bin or ext payload and the
    /// maximum element count of any array or map.
    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = len;
        self
    }
}

/// Decodes a single value from the buffer with default limits.
pub fn decode_value(buf: &mut impl Buf) -> Result<Value, PackError> {
    decode_value_with(buf, &DecodeOptions::default())
}

pub fn decode_value_with(
    buf: &mut impl Buf,
    options: &DecodeOptions,
) -> Result<Value, PackError> {
    decode_at(buf, options, 0)
}

fn decode_at(
    buf: &mut impl Buf,
    options: &DecodeOptions,
    depth: usize,
) -> Result<Value, PackError> {
    ensure_remaining(buf, 1)?;
    let tag = buf.get_u8();
    let row = descriptor_for(tag);

    match row.family {
        Family::Unused => {
            tracing::debug!(tag, "reserved tag byte in input");
            Err(PackError::ReservedTag(tag))
        }
        Family::Nil => Ok(Value::Nil),
        Family::Bool => Ok(Value::Bool(tag != row.base_byte)),

        Family::PositiveFixInt => Ok(Value::Int(Int::U8(tag))),
        Family::NegativeFixInt => Ok(Value::Int(Int::I8(tag as i8))),
        Family::UInt8 | Family::UInt16 | Family::UInt32 | Family::UInt64 => {
            decode_int(buf, row, false)
        }
        Family::Int8 | Family::Int16 | Family::Int32 | Family::Int64 => {
            decode_int(buf, row, true)
        }

        Family::Float32 => {
            ensure_remaining(buf, 4)?;
            Ok(Value::Float(Float::F32(buf.get_f32())))
        }
        Family::Float64 => {
            ensure_remaining(buf, 8)?;
            Ok(Value::Float(Float::F64(buf.get_f64())))
        }

        _ => {
            let len = read_len(buf, row, tag)?;
            if len > options.max_len {
                tracing::debug!(
                    len,
                    limit = options.max_len,
                    family = %row.family,
                    "length limit exceeded"
                );
                return Err(PackError::LengthExceeded {
                    len,
                    limit: options.max_len,
                });
            }
            match row.category() {
                Category::Str => decode_str(buf, len),
                Category::Bin => {
                    ensure_remaining(buf, len)?;
                    Ok(Value::Bin(buf.copy_to_bytes(len)))
                }
                Category::Ext => {
                    ensure_remaining(buf, len.saturating_add(1))?;
                    let type_id = buf.get_i8();
                    Ok(Value::Ext(Ext::new(type_id, buf.copy_to_bytes(len))))
                }
                Category::Array => {
                    let depth = enter(options, depth)?;
                    // Every element takes at least one byte.
                    let mut items = Vec::with_capacity(len.min(buf.remaining()));
                    for _ in 0..len {
                        items.push(decode_at(buf, options, depth)?);
                    }
                    Ok(Value::Array(items))
                }
                Category::Map => {
                    let depth = enter(options, depth)?;
                    let mut pairs = Vec::with_capacity(len.min(buf.remaining() / 2));
                    for _ in 0..len {
                        let key = decode_at(buf, options, depth)?;
                        let value = decode_at(buf, options, depth)?;
                        pairs.push((key, value));
                    }
                    Ok(Value::Map(pairs))
                }
                // Scalar families are all matched above.
                _ => Err(PackError::ReservedTag(tag)),
            }
        }
    }
}

fn decode_int(buf: &mut impl Buf, row: &TagDescriptor, signed: bool) -> Result<Value, PackError> {
    let width = row.payload_width().unwrap_or(0);
    ensure_remaining(buf, usize::from(width))?;
    let int = match (width, signed) {
        (1, false) => Int::U8(buf.get_u8()),
        (2, false) => Int::U16(buf.get_u16()),
        (4, false) => Int::U32(buf.get_u32()),
        (8, false) => Int::U64(buf.get_u64()),
        (1, true) => Int::I8(buf.get_i8()),
        (2, true) => Int::I16(buf.get_i16()),
        (4, true) => Int::I32(buf.get_i32()),
        _ => Int::I64(buf.get_i64()),
    };
    Ok(Value::Int(int))
}

fn decode_str(buf: &mut impl Buf, len: usize) -> Result<Value, PackError> {
    ensure_remaining(buf, len)?;
    let bytes = buf.copy_to_bytes(len);
    let s = std::str::from_utf8(&bytes)?;
    Ok(Value::Str(s.to_owned()))
}

/// Reads the length or count that follows (or is embedded in) `tag`.
fn read_len(buf: &mut impl Buf, row: &TagDescriptor, tag: u8) -> Result<usize, PackError> {
    match row.layout {
        Layout::Embedded { .. } => Ok(row.embedded_value(tag).map_or(0, |len| len as usize)),
        Layout::Prefixed { width } => {
            let width = usize::from(width);
            ensure_remaining(buf, width)?;
            Ok(buf.get_uint(width) as usize)
        }
        Layout::Fixed { width } => Ok(usize::from(width)),
        Layout::Bare | Layout::Reserved => Ok(0),
    }
}

fn enter(options: &DecodeOptions, depth: usize) -> Result<usize, PackError> {
    if depth >= options.max_depth {
        tracing::debug!(limit = options.max_depth, "nesting limit exceeded");
        return Err(PackError::DepthExceeded(options.max_depth));
    }
    Ok(depth + 1)
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), PackError> {
    if buf.remaining() < needed {
        return Err(PackError::UnexpectedEnd {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}
