//! The `Pack` capability and its implementations for standard types.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;
use std::time::SystemTime;

use bytes::{Bytes, BytesMut};

use super::Shape;
use crate::types::{Ext, Float, Int, TIMESTAMP_TYPE, Timestamp, Value};

/// A value that can be encoded as MessagePack.
///
/// `shape` declares which structural capabilities the value has and drives
/// classification; `datum` exposes the parts the encoder writes. The two must
/// agree: a STR shape decomposes into `Datum::Bytes`, a MAP shape into
/// `Datum::Pairs`, and so on.
pub trait Pack {
    fn shape(&self) -> Shape;

    fn datum(&self) -> Datum<'_>;
}

/// A borrowed decomposition of a packable value.
pub enum Datum<'a> {
    Nil,
    Bool(bool),
    Int(Int),
    Float(Float),
    /// Raw payload of a str or bin value.
    Bytes(&'a [u8]),
    Seq(Vec<&'a dyn Pack>),
    Pairs(Vec<(&'a dyn Pack, &'a dyn Pack)>),
    Ext(i8, Cow<'a, [u8]>),
    /// Nothing the encoder can write.
    Opaque,
}

impl Datum<'_> {
    /// The measured size used for tag selection: bytes for str, bin and ext
    /// payloads, elements for arrays, pairs for maps, operand width for
    /// numbers.
    pub fn measure(&self) -> u64 {
        match self {
            Self::Nil | Self::Bool(_) | Self::Opaque => 0,
            Self::Int(i) => u64::from(i.width()),
            Self::Float(f) => u64::from(f.width()),
            Self::Bytes(b) => b.len() as u64,
            Self::Seq(items) => items.len() as u64,
            Self::Pairs(pairs) => pairs.len() as u64,
            Self::Ext(_, data) => data.len() as u64,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bytes(_) => "bytes",
            Self::Seq(_) => "sequence",
            Self::Pairs(_) => "pairs",
            Self::Ext(..) => "extension",
            Self::Opaque => "opaque",
        }
    }
}

/// Borrowed bytes packed as a bin value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin<'a>(pub &'a [u8]);

// -- Scalars --

impl Pack for bool {
    fn shape(&self) -> Shape {
        Shape::BOOL
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Bool(*self)
    }
}

macro_rules! pack_int {
    ($($ty:ty),*) => {
        $(
            impl Pack for $ty {
                fn shape(&self) -> Shape {
                    Shape::INTEGER
                }

                fn datum(&self) -> Datum<'_> {
                    Datum::Int(Int::from(*self))
                }
            }
        )*
    };
}

pack_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Pack for Int {
    fn shape(&self) -> Shape {
        Shape::INTEGER
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Int(*self)
    }
}

impl Pack for f32 {
    fn shape(&self) -> Shape {
        Shape::FLOAT
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Float(Float::F32(*self))
    }
}

impl Pack for f64 {
    fn shape(&self) -> Shape {
        Shape::FLOAT
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Float(Float::F64(*self))
    }
}

impl Pack for () {
    fn shape(&self) -> Shape {
        Shape::NIL
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Nil
    }
}

impl<T: Pack> Pack for Option<T> {
    fn shape(&self) -> Shape {
        match self {
            Some(v) => v.shape(),
            None => Shape::NIL,
        }
    }

    fn datum(&self) -> Datum<'_> {
        match self {
            Some(v) => v.datum(),
            None => Datum::Nil,
        }
    }
}

// -- Strings and blobs --

impl Pack for str {
    fn shape(&self) -> Shape {
        Shape::STR
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Bytes(self.as_bytes())
    }
}

impl Pack for String {
    fn shape(&self) -> Shape {
        Shape::STR
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Bytes(self.as_bytes())
    }
}

impl Pack for Cow<'_, str> {
    fn shape(&self) -> Shape {
        Shape::STR
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Bytes(self.as_bytes())
    }
}

impl Pack for Bin<'_> {
    fn shape(&self) -> Shape {
        Shape::BIN
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Bytes(self.0)
    }
}

impl Pack for Bytes {
    fn shape(&self) -> Shape {
        Shape::BIN
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Bytes(self)
    }
}

impl Pack for BytesMut {
    fn shape(&self) -> Shape {
        Shape::BIN
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Bytes(self)
    }
}

// -- Sequences --

impl<T: Pack> Pack for [T] {
    fn shape(&self) -> Shape {
        Shape::SEQ
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Seq(self.iter().map(|item| item as &dyn Pack).collect())
    }
}

impl<T: Pack> Pack for Vec<T> {
    fn shape(&self) -> Shape {
        Shape::SEQ
    }

    fn datum(&self) -> Datum<'_> {
        self.as_slice().datum()
    }
}

impl<T: Pack> Pack for VecDeque<T> {
    fn shape(&self) -> Shape {
        Shape::SEQ
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Seq(self.iter().map(|item| item as &dyn Pack).collect())
    }
}

impl<T: Pack, const N: usize> Pack for [T; N] {
    fn shape(&self) -> Shape {
        Shape::tuple(N)
    }

    fn datum(&self) -> Datum<'_> {
        self.as_slice().datum()
    }
}

macro_rules! pack_tuple {
    ($arity:expr => $($name:ident . $idx:tt),+) => {
        impl<$($name: Pack),+> Pack for ($($name,)+) {
            fn shape(&self) -> Shape {
                Shape::tuple($arity)
            }

            fn datum(&self) -> Datum<'_> {
                Datum::Seq(vec![$(&self.$idx as &dyn Pack),+])
            }
        }
    };
}

pack_tuple!(1 => A.0);
pack_tuple!(2 => A.0, B.1);
pack_tuple!(3 => A.0, B.1, C.2);
pack_tuple!(4 => A.0, B.1, C.2, D.3);
pack_tuple!(5 => A.0, B.1, C.2, D.3, E.4);
pack_tuple!(6 => A.0, B.1, C.2, D.3, E.4, F.5);
pack_tuple!(7 => A.0, B.1, C.2, D.3, E.4, F.5, G.6);
pack_tuple!(8 => A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);

// -- Maps --

impl<K: Pack, V: Pack, S: BuildHasher> Pack for HashMap<K, V, S> {
    fn shape(&self) -> Shape {
        Shape::MAP
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Pairs(
            self.iter()
                .map(|(k, v)| (k as &dyn Pack, v as &dyn Pack))
                .collect(),
        )
    }
}

impl<K: Pack, V: Pack> Pack for BTreeMap<K, V> {
    fn shape(&self) -> Shape {
        Shape::MAP
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Pairs(
            self.iter()
                .map(|(k, v)| (k as &dyn Pack, v as &dyn Pack))
                .collect(),
        )
    }
}

// -- Extensions --

impl Pack for Ext {
    fn shape(&self) -> Shape {
        Shape::EXT
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Ext(self.type_id, Cow::Borrowed(&self.data))
    }
}

impl Pack for Timestamp {
    fn shape(&self) -> Shape {
        Shape::EXT
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Ext(TIMESTAMP_TYPE, Cow::Owned(self.to_ext_bytes()))
    }
}

impl Pack for SystemTime {
    fn shape(&self) -> Shape {
        Shape::EXT
    }

    fn datum(&self) -> Datum<'_> {
        Datum::Ext(
            TIMESTAMP_TYPE,
            Cow::Owned(Timestamp::from(*self).to_ext_bytes()),
        )
    }
}

// -- Indirection --

impl<T: Pack + ?Sized> Pack for &T {
    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn datum(&self) -> Datum<'_> {
        (**self).datum()
    }
}

impl<T: Pack + ?Sized> Pack for Box<T> {
    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn datum(&self) -> Datum<'_> {
        (**self).datum()
    }
}

// -- Dynamic values --

impl Pack for Value {
    fn shape(&self) -> Shape {
        match self {
            Self::Nil => Shape::NIL,
            Self::Bool(_) => Shape::BOOL,
            Self::Int(_) => Shape::INTEGER,
            Self::Float(_) => Shape::FLOAT,
            Self::Str(_) => Shape::STR,
            Self::Bin(_) => Shape::BIN,
            Self::Array(_) => Shape::SEQ,
            Self::Map(_) => Shape::MAP,
            Self::Ext(_) => Shape::EXT,
        }
    }

    fn datum(&self) -> Datum<'_> {
        match self {
            Self::Nil => Datum::Nil,
            Self::Bool(b) => Datum::Bool(*b),
            Self::Int(i) => Datum::Int(*i),
            Self::Float(f) => Datum::Float(*f),
            Self::Str(s) => Datum::Bytes(s.as_bytes()),
            Self::Bin(b) => Datum::Bytes(b),
            Self::Array(items) => items.as_slice().datum(),
            Self::Map(pairs) => Datum::Pairs(
                pairs
                    .iter()
                    .map(|(k, v)| (k as &dyn Pack, v as &dyn Pack))
                    .collect(),
            ),
            Self::Ext(e) => e.datum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_by_category() {
        assert_eq!("hello".datum().measure(), 5);
        assert_eq!(vec![1u8, 2, 3].datum().measure(), 3);
        assert_eq!((1u8, 2u8).datum().measure(), 2);
        assert_eq!(BTreeMap::from([(1u8, 2u8)]).datum().measure(), 1);
        assert_eq!(7u32.datum().measure(), 4);
        assert_eq!(1.0f64.datum().measure(), 8);
        assert_eq!(Ext::new(3, vec![0u8; 5]).datum().measure(), 5);
        assert_eq!(().datum().measure(), 0);
    }

    #[test]
    fn tuple_elements_in_order() {
        let t = (1u8, "x", true);
        let Datum::Seq(items) = t.datum() else {
            panic!("tuple must decompose into a sequence");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(items[0].datum(), Datum::Int(Int::U8(1))));
        assert!(matches!(items[1].datum(), Datum::Bytes(b"x")));
        assert!(matches!(items[2].datum(), Datum::Bool(true)));
    }

    #[test]
    fn value_map_keeps_wire_order() {
        let v = Value::Map(vec![
            (Value::from("b"), Value::from(1u8)),
            (Value::from("a"), Value::from(2u8)),
        ]);
        let Datum::Pairs(pairs) = v.datum() else {
            panic!("map must decompose into pairs");
        };
        assert!(matches!(pairs[0].0.datum(), Datum::Bytes(b"b")));
        assert!(matches!(pairs[1].0.datum(), Datum::Bytes(b"a")));
    }
}
