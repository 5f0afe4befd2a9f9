//! Dynamic MessagePack values.

use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::{BufMut, Bytes};

use super::timestamp::{TIMESTAMP_TYPE, Timestamp};
use crate::error::PackError;

/// An integer that remembers its operand width and signedness.
///
/// Equality and hashing are numeric: `Int::U8(5) == Int::I64(5)`.
#[derive(Debug, Clone, Copy)]
pub enum Int {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
}

impl Int {
    /// Operand width in bytes.
    pub fn width(self) -> u8 {
        match self {
            Self::U8(_) | Self::I8(_) => 1,
            Self::U16(_) | Self::I16(_) => 2,
            Self::U32(_) | Self::I32(_) => 4,
            Self::U64(_) | Self::I64(_) => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Self::I8(_) | Self::I16(_) | Self::I32(_) | Self::I64(_))
    }

    pub fn to_i128(self) -> i128 {
        match self {
            Self::U8(v) => i128::from(v),
            Self::U16(v) => i128::from(v),
            Self::U32(v) => i128::from(v),
            Self::U64(v) => i128::from(v),
            Self::I8(v) => i128::from(v),
            Self::I16(v) => i128::from(v),
            Self::I32(v) => i128::from(v),
            Self::I64(v) => i128::from(v),
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        i64::try_from(self.to_i128()).ok()
    }

    pub fn as_u64(self) -> Option<u64> {
        u64::try_from(self.to_i128()).ok()
    }

    /// Returns the value if it fits a fixint tag (`-32..=127`).
    pub fn as_fixint(self) -> Option<i8> {
        let v = self.to_i128();
        (-32..=127).contains(&v).then_some(v as i8)
    }

    /// Writes the raw big-endian operand, `width()` bytes.
    pub fn put_be(self, buf: &mut impl BufMut) {
        match self {
            Self::U8(v) => buf.put_u8(v),
            Self::U16(v) => buf.put_u16(v),
            Self::U32(v) => buf.put_u32(v),
            Self::U64(v) => buf.put_u64(v),
            Self::I8(v) => buf.put_i8(v),
            Self::I16(v) => buf.put_i16(v),
            Self::I32(v) => buf.put_i32(v),
            Self::I64(v) => buf.put_i64(v),
        }
    }
}

impl PartialEq for Int {
    fn eq(&self, other: &Self) -> bool {
        self.to_i128() == other.to_i128()
    }
}

impl Eq for Int {}

impl Hash for Int {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_i128().hash(state);
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_i128())
    }
}

macro_rules! int_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Int {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

int_from!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, i8 => I8, i16 => I16, i32 => I32, i64 => I64);

/// A floating-point value of either IEEE 754 width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Float {
    F32(f32),
    F64(f64),
}

impl Float {
    pub fn width(self) -> u8 {
        match self {
            Self::F32(_) => 4,
            Self::F64(_) => 8,
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Self::F32(v) => f64::from(v),
            Self::F64(v) => v,
        }
    }

    pub fn put_be(self, buf: &mut impl BufMut) {
        match self {
            Self::F32(v) => buf.put_f32(v),
            Self::F64(v) => buf.put_f64(v),
        }
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
        }
    }
}

/// An application-defined extension payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ext {
    /// Type discriminator. Negative values are reserved by the format.
    pub type_id: i8,
    pub data: Bytes,
}

impl Ext {
    pub fn new(type_id: i8, data: impl Into<Bytes>) -> Self {
        Self {
            type_id,
            data: data.into(),
        }
    }

    pub fn is_timestamp(&self) -> bool {
        self.type_id == TIMESTAMP_TYPE
    }

    /// Interprets the payload as a timestamp extension.
    pub fn to_timestamp(&self) -> Result<Timestamp, PackError> {
        if !self.is_timestamp() {
            return Err(PackError::InvalidTimestamp(format!(
                "extension type {} is not a timestamp",
                self.type_id
            )));
        }
        Timestamp::from_ext_bytes(&self.data)
    }
}

impl From<Timestamp> for Ext {
    fn from(ts: Timestamp) -> Self {
        Self::new(TIMESTAMP_TYPE, ts.to_ext_bytes())
    }
}

/// A decoded MessagePack value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(Int),
    Float(Float),
    Str(String),
    Bin(Bytes),
    Array(Vec<Value>),
    /// Key/value pairs in wire order.
    Map(Vec<(Value, Value)>),
    Ext(Ext),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => i.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(i) => i.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(f.to_f64()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bin(&self) -> Option<&[u8]> {
        match self {
            Self::Bin(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Looks up the first entry whose key is the string `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Int(Int::from(v))
                }
            }
        )*
    };
}

value_from_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl From<Int> for Value {
    fn from(i: Int) -> Self {
        Self::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(Float::F32(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(Float::F64(f))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Bin(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Vec<(Value, Value)>> for Value {
    fn from(pairs: Vec<(Value, Value)>) -> Self {
        Self::Map(pairs)
    }
}

impl From<Ext> for Value {
    fn from(e: Ext) -> Self {
        Self::Ext(e)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Self::Ext(ts.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Nil, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Bin(b) => write!(f, "<{} bytes>", b.len()),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::Ext(e) => write!(f, "ext({}, <{} bytes>)", e.type_id, e.data.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_equality_is_numeric() {
        assert_eq!(Int::U8(5), Int::I64(5));
        assert_eq!(Int::I8(-1), Int::I32(-1));
        assert_ne!(Int::U64(u64::MAX), Int::I64(-1));
    }

    #[test]
    fn int_width_and_sign() {
        assert_eq!(Int::from(7u16).width(), 2);
        assert!(!Int::from(7u16).is_signed());
        assert_eq!(Int::from(-7i64).width(), 8);
        assert!(Int::from(-7i64).is_signed());
    }

    #[test]
    fn fixint_window() {
        assert_eq!(Int::U64(127).as_fixint(), Some(127));
        assert_eq!(Int::U64(128).as_fixint(), None);
        assert_eq!(Int::I16(-32).as_fixint(), Some(-32));
        assert_eq!(Int::I16(-33).as_fixint(), None);
    }

    #[test]
    fn int_put_be() {
        let mut buf = Vec::new();
        Int::I16(-2).put_be(&mut buf);
        Int::U32(0x0102_0304).put_be(&mut buf);
        assert_eq!(buf, vec![0xFF, 0xFE, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn display_nested() {
        let v = Value::Map(vec![(
            Value::from("xs"),
            Value::Array(vec![Value::from(1i32), Value::Nil, Value::from(true)]),
        )]);
        assert_eq!(v.to_string(), "{\"xs\": [1, nil, true]}");
    }

    #[test]
    fn map_lookup() {
        let v = Value::Map(vec![
            (Value::from("a"), Value::from(1u8)),
            (Value::from(2u8), Value::from("b")),
        ]);
        assert_eq!(v.get("a").and_then(Value::as_u64), Some(1));
        assert_eq!(v.get("b"), None);
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }
}
