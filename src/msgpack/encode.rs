//! MessagePack encoding: `Pack` values → bytes.
//!
//! Every value is written in the same order: tag byte, length or count field
//! (when the selected family has one), payload. Tags are always the smallest
//! family able to hold the value.

use bytes::{BufMut, Bytes, BytesMut};

use super::marker::{Category, Family, Layout, TagDescriptor};
use super::select::{select_int, select_tag};
use crate::classify::{Datum, Pack, category_of};
use crate::error::PackError;
use crate::types::{Float, Int};

/// Encodes `value` into `buf`.
///
/// On error, bytes already written for enclosing containers stay in `buf`;
/// use [`encode_to_vec`] when a failed encode must leave nothing behind.
pub fn encode<T: Pack + ?Sized>(value: &T, buf: &mut impl BufMut) -> Result<(), PackError> {
    let category = category_of(&value.shape());
    let datum = value.datum();
    let size = datum.measure();
    match (category, datum) {
        (Category::Unknown, _) => Err(PackError::Unclassifiable),
        (Category::Void, Datum::Nil) => {
            encode_nil(buf);
            Ok(())
        }
        (Category::Bool, Datum::Bool(b)) => {
            encode_bool(buf, b);
            Ok(())
        }
        (Category::Integer, Datum::Int(i)) => encode_int(buf, i),
        (Category::Float, Datum::Float(f)) => encode_float(buf, f),
        (Category::Str | Category::Bin, Datum::Bytes(bytes)) => {
            put_blob(buf, category, size, bytes)
        }
        (Category::Array, Datum::Seq(items)) => {
            encode_header(buf, Category::Array, size)?;
            for item in items {
                encode(item, buf)?;
            }
            Ok(())
        }
        (Category::Map, Datum::Pairs(pairs)) => {
            encode_header(buf, Category::Map, size)?;
            for (key, value) in pairs {
                encode(key, buf)?;
                encode(value, buf)?;
            }
            Ok(())
        }
        (Category::Ext, Datum::Ext(type_id, data)) => put_ext(buf, type_id, size, &data),
        (category, datum) => Err(PackError::ShapeMismatch {
            category,
            found: datum.kind(),
        }),
    }
}

/// Encodes `value` into a fresh buffer.
pub fn encode_to_vec<T: Pack + ?Sized>(value: &T) -> Result<Vec<u8>, PackError> {
    let mut out = Vec::new();
    encode(value, &mut out)?;
    Ok(out)
}

pub fn encode_to_bytes<T: Pack + ?Sized>(value: &T) -> Result<Bytes, PackError> {
    let mut buf = BytesMut::new();
    encode(value, &mut buf)?;
    Ok(buf.freeze())
}

pub fn encode_nil(buf: &mut impl BufMut) {
    buf.put_u8(Family::Nil.descriptor().base_byte);
}

pub fn encode_bool(buf: &mut impl BufMut, value: bool) {
    buf.put_u8(Family::Bool.descriptor().base_byte + u8::from(value));
}

/// Encodes an integer as a fixint when it fits, else by operand width.
pub fn encode_int(buf: &mut impl BufMut, value: Int) -> Result<(), PackError> {
    let row = select_int(value)?;
    match value.as_fixint().and_then(|v| row.embed(i64::from(v))) {
        Some(tag) => buf.put_u8(tag),
        None => {
            buf.put_u8(row.base_byte);
            value.put_be(buf);
        }
    }
    Ok(())
}

pub fn encode_float(buf: &mut impl BufMut, value: Float) -> Result<(), PackError> {
    let row = select_tag(Category::Float, u64::from(value.width()))?;
    buf.put_u8(row.base_byte);
    value.put_be(buf);
    Ok(())
}

/// Writes `value` as str; the length field holds its UTF-8 byte count.
pub fn encode_str(buf: &mut impl BufMut, value: &str) -> Result<(), PackError> {
    put_blob(buf, Category::Str, value.len() as u64, value.as_bytes())
}

pub fn encode_bin(buf: &mut impl BufMut, value: &[u8]) -> Result<(), PackError> {
    put_blob(buf, Category::Bin, value.len() as u64, value)
}

/// Encodes an extension: tag, length field for ext 8/16/32, type byte, payload.
pub fn encode_ext(buf: &mut impl BufMut, type_id: i8, data: &[u8]) -> Result<(), PackError> {
    put_ext(buf, type_id, data.len() as u64, data)
}

fn put_blob(
    buf: &mut impl BufMut,
    category: Category,
    size: u64,
    data: &[u8],
) -> Result<(), PackError> {
    encode_header(buf, category, size)?;
    buf.put_slice(data);
    Ok(())
}

fn put_ext(buf: &mut impl BufMut, type_id: i8, size: u64, data: &[u8]) -> Result<(), PackError> {
    let row = select_tag(Category::Ext, size)?;
    buf.put_u8(row.base_byte);
    put_length(buf, row, size);
    buf.put_i8(type_id);
    buf.put_slice(data);
    Ok(())
}

/// Writes the tag and length field for a str, bin, array or map of `size`.
///
/// For arrays and maps the caller writes the `size` elements (or pairs)
/// afterwards; the count is the only framing.
pub fn encode_header(
    buf: &mut impl BufMut,
    category: Category,
    size: u64,
) -> Result<(), PackError> {
    let row = select_tag(category, size)?;
    match row.layout {
        Layout::Embedded { .. } => {
            // `select_tag` only returns an embedded row when `size` is in range.
            let tag = row.embed(size as i64).ok_or(PackError::SizeOverflow { category, size })?;
            buf.put_u8(tag);
        }
        _ => {
            buf.put_u8(row.base_byte);
            put_length(buf, row, size);
        }
    }
    Ok(())
}

fn put_length(buf: &mut impl BufMut, row: &TagDescriptor, size: u64) {
    let width = row.length_field_width();
    if width > 0 {
        buf.put_uint(size, usize::from(width));
    }
}
