//! MessagePack binary encoding format.
//!
//! MessagePack is a self-describing binary format: every value begins with a
//! tag byte naming its family, optionally followed by a big-endian length
//! field and a payload. Small integers and short strings, arrays and maps are
//! packed directly into the tag byte.

pub mod decode;
pub mod encode;
pub mod marker;
pub mod select;

pub use decode::{DecodeOptions, decode_value, decode_value_with, type_of, value_of};
pub use encode::{encode, encode_to_bytes, encode_to_vec};
pub use marker::{Category, Family, TagDescriptor, descriptor_for, descriptor_for_family};
pub use select::{select_int, select_tag};
