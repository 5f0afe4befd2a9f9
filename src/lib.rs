//! mpackr: a pure-Rust MessagePack codec.
//!
//! Values are encoded with the smallest tag family that can hold them, and
//! arbitrary types take part by describing their structure rather than by
//! implementing a serializer.
//!
//! # Architecture
//!
//! - **`msgpack`**: Tag table, format selection, encoding and decoding
//! - **`classify`**: Structural classification (`Shape`) and the `Pack` capability
//! - **`types`**: Dynamic values (`Value`, `Int`, `Float`, `Ext`) and timestamps
//! - **`error`**: The crate error type
//!
//! ```
//! use mpackr::{decode_value, encode_to_vec, Value};
//!
//! let bytes = encode_to_vec(&(1u8, "hi", true)).unwrap();
//! assert_eq!(bytes, [0x93, 0x01, 0xA2, b'h', b'i', 0xC3]);
//!
//! let value = decode_value(&mut &bytes[..]).unwrap();
//! assert_eq!(value.as_array().map(<[Value]>::len), Some(3));
//! ```

pub mod classify;
pub mod error;
pub mod msgpack;
pub mod types;

pub use classify::{Bin, Datum, Pack, Shape, category_of, classify};
pub use error::PackError;
pub use msgpack::{
    Category, DecodeOptions, Family, decode_value, decode_value_with, encode, encode_to_bytes,
    encode_to_vec, type_of, value_of,
};
pub use types::{Ext, Float, Int, TIMESTAMP_TYPE, Timestamp, Value};
