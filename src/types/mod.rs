//! MessagePack value types.

mod timestamp;
mod value;

pub use timestamp::{TIMESTAMP_TYPE, Timestamp};
pub use value::{Ext, Float, Int, Value};
