//! MessagePack tag table.
//!
//! Every leading byte of an encoded value belongs to exactly one [`Family`].
//! The table below lists the families in increasing base-byte order; each row
//! claims the window `base_byte..=base_byte + extent`. The rows partition the
//! full byte space, which is verified when the lookup index is built.

use std::fmt;
use std::ops::RangeInclusive;

/// Semantic category of a value or tag family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Integer,
    Bool,
    Float,
    Str,
    Array,
    Map,
    Ext,
    Void,
    Bin,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Integer,
        Self::Bool,
        Self::Float,
        Self::Str,
        Self::Array,
        Self::Map,
        Self::Ext,
        Self::Void,
        Self::Bin,
        Self::Unknown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Bool => "BOOL",
            Self::Float => "FLOAT",
            Self::Str => "STR",
            Self::Array => "ARRAY",
            Self::Map => "MAP",
            Self::Ext => "EXT",
            Self::Void => "VOID",
            Self::Bin => "BIN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A MessagePack tag family. Discriminants are row indices into [`TAG_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Family {
    PositiveFixInt,
    FixMap,
    FixArray,
    FixStr,
    Nil,
    Unused,
    Bool,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    Float32,
    Float64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
    NegativeFixInt,
}

impl Family {
    pub fn category(self) -> Category {
        use Family::*;
        match self {
            PositiveFixInt | NegativeFixInt | UInt8 | UInt16 | UInt32 | UInt64 | Int8 | Int16
            | Int32 | Int64 => Category::Integer,
            Bool => Category::Bool,
            Float32 | Float64 => Category::Float,
            FixStr | Str8 | Str16 | Str32 => Category::Str,
            FixArray | Array16 | Array32 => Category::Array,
            FixMap | Map16 | Map32 => Category::Map,
            FixExt1 | FixExt2 | FixExt4 | FixExt8 | FixExt16 | Ext8 | Ext16 | Ext32 => {
                Category::Ext
            }
            Nil => Category::Void,
            Bin8 | Bin16 | Bin32 => Category::Bin,
            Unused => Category::Unknown,
        }
    }

    /// Returns `true` for integer families that carry a two's-complement payload.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::NegativeFixInt | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    pub fn descriptor(self) -> &'static TagDescriptor {
        descriptor_for_family(self)
    }

    pub fn name(self) -> &'static str {
        use Family::*;
        match self {
            PositiveFixInt => "positive fixint",
            FixMap => "fixmap",
            FixArray => "fixarray",
            FixStr => "fixstr",
            Nil => "nil",
            Unused => "(never used)",
            Bool => "bool",
            Bin8 => "bin 8",
            Bin16 => "bin 16",
            Bin32 => "bin 32",
            Ext8 => "ext 8",
            Ext16 => "ext 16",
            Ext32 => "ext 32",
            Float32 => "float 32",
            Float64 => "float 64",
            UInt8 => "uint 8",
            UInt16 => "uint 16",
            UInt32 => "uint 32",
            UInt64 => "uint 64",
            Int8 => "int 8",
            Int16 => "int 16",
            Int32 => "int 32",
            Int64 => "int 64",
            FixExt1 => "fixext 1",
            FixExt2 => "fixext 2",
            FixExt4 => "fixext 4",
            FixExt8 => "fixext 8",
            FixExt16 => "fixext 16",
            Str8 => "str 8",
            Str16 => "str 16",
            Str32 => "str 32",
            Array16 => "array 16",
            Array32 => "array 32",
            Map16 => "map 16",
            Map32 => "map 32",
            NegativeFixInt => "negative fixint",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the bytes after the tag are framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// A value or length in `min..=max` is packed into the tag byte.
    Embedded { min: i8, max: i8 },
    /// The tag byte is the entire value (nil, false, true).
    Bare,
    /// A big-endian length or count of `width` bytes follows the tag.
    Prefixed { width: u8 },
    /// A payload of exactly `width` bytes follows the tag.
    Fixed { width: u8 },
    /// No defined meaning.
    Reserved,
}

/// One row of the tag table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDescriptor {
    pub family: Family,
    pub base_byte: u8,
    /// Number of additional byte values after `base_byte` in the same family.
    pub extent: u8,
    pub layout: Layout,
}

impl TagDescriptor {
    const fn new(family: Family, base_byte: u8, extent: u8, layout: Layout) -> Self {
        Self {
            family,
            base_byte,
            extent,
            layout,
        }
    }

    pub fn category(&self) -> Category {
        self.family.category()
    }

    /// Returns `true` if `byte` falls in this row's window.
    pub fn contains(&self, byte: u8) -> bool {
        byte >= self.base_byte && byte - self.base_byte <= self.extent
    }

    /// Width of the length/count field following the tag, 0 if none.
    pub fn length_field_width(&self) -> u8 {
        match self.layout {
            Layout::Prefixed { width } => width,
            _ => 0,
        }
    }

    /// Width of a fixed payload implied by the tag, if any.
    pub fn payload_width(&self) -> Option<u8> {
        match self.layout {
            Layout::Fixed { width } => Some(width),
            _ => None,
        }
    }

    pub fn embedded_range(&self) -> Option<RangeInclusive<i8>> {
        match self.layout {
            Layout::Embedded { min, max } => Some(min..=max),
            _ => None,
        }
    }

    /// Largest size or count this family can represent.
    ///
    /// For prefixed families this is `2^(8 * width) - 1`; for fixed families it
    /// is the payload width in bytes; for embedded families the upper bound of
    /// the embedded range.
    pub fn capacity(&self) -> u64 {
        match self.layout {
            Layout::Embedded { max, .. } => max.max(0) as u64,
            Layout::Prefixed { width } => {
                let bits = 8 * u32::from(width.min(8));
                u64::MAX.checked_shr(64 - bits).unwrap_or(0)
            }
            Layout::Fixed { width } => u64::from(width),
            Layout::Bare | Layout::Reserved => 0,
        }
    }

    /// Returns the tag byte embedding `value`, or `None` if the family does
    /// not embed values or `value` is out of range.
    pub fn embed(&self, value: i64) -> Option<u8> {
        let range = self.embedded_range()?;
        if value < i64::from(*range.start()) || value > i64::from(*range.end()) {
            return None;
        }
        let offset = (value - i64::from(*range.start())) as u8;
        Some(self.base_byte + offset)
    }

    /// Recovers the value embedded in `byte`. The byte must belong to this row.
    pub fn embedded_value(&self, byte: u8) -> Option<i8> {
        let range = self.embedded_range()?;
        if !self.contains(byte) {
            return None;
        }
        Some((i16::from(*range.start()) + i16::from(byte - self.base_byte)) as i8)
    }
}

use Family as F;
use Layout::{Bare, Embedded, Fixed, Prefixed, Reserved};

const ROWS: [TagDescriptor; 36] = [
    TagDescriptor::new(F::PositiveFixInt, 0x00, 0x7F, Embedded { min: 0, max: 127 }),
    TagDescriptor::new(F::FixMap, 0x80, 0x0F, Embedded { min: 0, max: 15 }),
    TagDescriptor::new(F::FixArray, 0x90, 0x0F, Embedded { min: 0, max: 15 }),
    TagDescriptor::new(F::FixStr, 0xA0, 0x1F, Embedded { min: 0, max: 31 }),
    TagDescriptor::new(F::Nil, 0xC0, 0, Bare),
    TagDescriptor::new(F::Unused, 0xC1, 0, Reserved),
    TagDescriptor::new(F::Bool, 0xC2, 1, Bare),
    TagDescriptor::new(F::Bin8, 0xC4, 0, Prefixed { width: 1 }),
    TagDescriptor::new(F::Bin16, 0xC5, 0, Prefixed { width: 2 }),
    TagDescriptor::new(F::Bin32, 0xC6, 0, Prefixed { width: 4 }),
    TagDescriptor::new(F::Ext8, 0xC7, 0, Prefixed { width: 1 }),
    TagDescriptor::new(F::Ext16, 0xC8, 0, Prefixed { width: 2 }),
    TagDescriptor::new(F::Ext32, 0xC9, 0, Prefixed { width: 4 }),
    TagDescriptor::new(F::Float32, 0xCA, 0, Fixed { width: 4 }),
    TagDescriptor::new(F::Float64, 0xCB, 0, Fixed { width: 8 }),
    TagDescriptor::new(F::UInt8, 0xCC, 0, Fixed { width: 1 }),
    TagDescriptor::new(F::UInt16, 0xCD, 0, Fixed { width: 2 }),
    TagDescriptor::new(F::UInt32, 0xCE, 0, Fixed { width: 4 }),
    TagDescriptor::new(F::UInt64, 0xCF, 0, Fixed { width: 8 }),
    TagDescriptor::new(F::Int8, 0xD0, 0, Fixed { width: 1 }),
    TagDescriptor::new(F::Int16, 0xD1, 0, Fixed { width: 2 }),
    TagDescriptor::new(F::Int32, 0xD2, 0, Fixed { width: 4 }),
    TagDescriptor::new(F::Int64, 0xD3, 0, Fixed { width: 8 }),
    TagDescriptor::new(F::FixExt1, 0xD4, 0, Fixed { width: 1 }),
    TagDescriptor::new(F::FixExt2, 0xD5, 0, Fixed { width: 2 }),
    TagDescriptor::new(F::FixExt4, 0xD6, 0, Fixed { width: 4 }),
    TagDescriptor::new(F::FixExt8, 0xD7, 0, Fixed { width: 8 }),
    TagDescriptor::new(F::FixExt16, 0xD8, 0, Fixed { width: 16 }),
    TagDescriptor::new(F::Str8, 0xD9, 0, Prefixed { width: 1 }),
    TagDescriptor::new(F::Str16, 0xDA, 0, Prefixed { width: 2 }),
    TagDescriptor::new(F::Str32, 0xDB, 0, Prefixed { width: 4 }),
    TagDescriptor::new(F::Array16, 0xDC, 0, Prefixed { width: 2 }),
    TagDescriptor::new(F::Array32, 0xDD, 0, Prefixed { width: 4 }),
    TagDescriptor::new(F::Map16, 0xDE, 0, Prefixed { width: 2 }),
    TagDescriptor::new(F::Map32, 0xDF, 0, Prefixed { width: 4 }),
    TagDescriptor::new(F::NegativeFixInt, 0xE0, 0x1F, Embedded { min: -32, max: -1 }),
];

/// The process-wide tag table, ordered by base byte.
pub static TAG_TABLE: [TagDescriptor; 36] = ROWS;

const UNCLAIMED: u8 = u8::MAX;

// Row index for every byte value. Built at compile time; an overlapping or
// gapped table fails const evaluation.
static BYTE_INDEX: [u8; 256] = build_index(&ROWS);

const fn build_index(rows: &[TagDescriptor]) -> [u8; 256] {
    let mut index = [UNCLAIMED; 256];
    let mut r = 0;
    while r < rows.len() {
        let row = &rows[r];
        assert!(row.family as usize == r, "row order must match family discriminants");
        let mut b = row.base_byte as usize;
        let end = row.base_byte as usize + row.extent as usize;
        while b <= end {
            assert!(index[b] == UNCLAIMED, "tag table rows overlap");
            index[b] = r as u8;
            b += 1;
        }
        r += 1;
    }
    let mut b = 0;
    while b < 256 {
        assert!(index[b] != UNCLAIMED, "tag table leaves a byte unclaimed");
        b += 1;
    }
    index
}

/// Looks up the row whose window contains `byte`. Total over all byte values.
pub fn descriptor_for(byte: u8) -> &'static TagDescriptor {
    &TAG_TABLE[BYTE_INDEX[byte as usize] as usize]
}

pub fn descriptor_for_family(family: Family) -> &'static TagDescriptor {
    &TAG_TABLE[family as usize]
}

/// Ways a candidate tag table can fail to partition the byte space.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    #[error("row for {family} at {base:#04x} is out of order")]
    Unordered { family: Family, base: u8 },

    #[error("byte {0:#04x} claimed by more than one row")]
    Overlap(u8),

    #[error("byte {0:#04x} claimed by no row")]
    Gap(u8),
}

/// Checks that `rows` are ordered by base byte and cover every byte exactly once.
pub fn check_partition(rows: &[TagDescriptor]) -> Result<(), PartitionError> {
    if let Some(pair) = rows.windows(2).find(|w| w[1].base_byte <= w[0].base_byte) {
        return Err(PartitionError::Unordered {
            family: pair[1].family,
            base: pair[1].base_byte,
        });
    }
    let mut next: u16 = 0;
    for row in rows {
        let base = u16::from(row.base_byte);
        if base < next {
            return Err(PartitionError::Overlap(row.base_byte));
        }
        if base > next {
            return Err(PartitionError::Gap(next as u8));
        }
        next = base + u16::from(row.extent) + 1;
    }
    if next <= 0xFF {
        return Err(PartitionError::Gap(next as u8));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_scan(byte: u8) -> &'static TagDescriptor {
        TAG_TABLE
            .iter()
            .find(|row| row.contains(byte))
            .expect("table is total")
    }

    #[test]
    fn table_partitions_byte_space() {
        assert_eq!(check_partition(&TAG_TABLE), Ok(()));
    }

    #[test]
    fn index_agrees_with_linear_scan() {
        for byte in 0..=u8::MAX {
            assert_eq!(descriptor_for(byte), linear_scan(byte), "byte {byte:#04x}");
        }
    }

    #[test]
    fn family_lookup_matches_row() {
        for row in &TAG_TABLE {
            assert_eq!(descriptor_for_family(row.family), row);
            assert_eq!(descriptor_for(row.base_byte).family, row.family);
        }
    }

    #[test]
    fn only_c1_is_unused() {
        let unused: Vec<u8> = (0..=u8::MAX)
            .filter(|b| descriptor_for(*b).family == Family::Unused)
            .collect();
        assert_eq!(unused, vec![0xC1]);
        assert_eq!(descriptor_for(0xC1).category(), Category::Unknown);
    }

    #[test]
    fn well_known_bytes() {
        assert_eq!(descriptor_for(0x00).family, Family::PositiveFixInt);
        assert_eq!(descriptor_for(0x7F).family, Family::PositiveFixInt);
        assert_eq!(descriptor_for(0x8F).family, Family::FixMap);
        assert_eq!(descriptor_for(0x9F).family, Family::FixArray);
        assert_eq!(descriptor_for(0xBF).family, Family::FixStr);
        assert_eq!(descriptor_for(0xC0).family, Family::Nil);
        assert_eq!(descriptor_for(0xC2).family, Family::Bool);
        assert_eq!(descriptor_for(0xC3).family, Family::Bool);
        assert_eq!(descriptor_for(0xD9).family, Family::Str8);
        assert_eq!(descriptor_for(0xDF).family, Family::Map32);
        assert_eq!(descriptor_for(0xE0).family, Family::NegativeFixInt);
        assert_eq!(descriptor_for(0xFF).family, Family::NegativeFixInt);
    }

    #[test]
    fn capacities() {
        assert_eq!(Family::FixStr.descriptor().capacity(), 31);
        assert_eq!(Family::FixArray.descriptor().capacity(), 15);
        assert_eq!(Family::Str8.descriptor().capacity(), 0xFF);
        assert_eq!(Family::Array16.descriptor().capacity(), 0xFFFF);
        assert_eq!(Family::Map32.descriptor().capacity(), 0xFFFF_FFFF);
        assert_eq!(Family::FixExt16.descriptor().capacity(), 16);
        assert_eq!(Family::UInt64.descriptor().capacity(), 8);
    }

    #[test]
    fn capacity_of_hand_built_rows() {
        let row = |width| TagDescriptor {
            layout: Layout::Prefixed { width },
            ..*Family::Str8.descriptor()
        };
        assert_eq!(row(0).capacity(), 0);
        assert_eq!(row(3).capacity(), 0xFF_FFFF);
        assert_eq!(row(8).capacity(), u64::MAX);
        assert_eq!(row(12).capacity(), u64::MAX);
    }

    #[test]
    fn embed_and_recover() {
        let neg = Family::NegativeFixInt.descriptor();
        assert_eq!(neg.embed(-32), Some(0xE0));
        assert_eq!(neg.embed(-1), Some(0xFF));
        assert_eq!(neg.embed(-33), None);
        assert_eq!(neg.embedded_value(0xE0), Some(-32));
        assert_eq!(neg.embedded_value(0xFF), Some(-1));

        let fixstr = Family::FixStr.descriptor();
        assert_eq!(fixstr.embed(0), Some(0xA0));
        assert_eq!(fixstr.embed(31), Some(0xBF));
        assert_eq!(fixstr.embed(32), None);
        assert_eq!(fixstr.embedded_value(0xA5), Some(5));

        assert_eq!(Family::Nil.descriptor().embed(0), None);
    }

    #[test]
    fn partition_check_detects_gap() {
        let mut rows = TAG_TABLE.to_vec();
        rows.remove(5); // 0xC1
        assert_eq!(check_partition(&rows), Err(PartitionError::Gap(0xC1)));

        let rows = &TAG_TABLE[..TAG_TABLE.len() - 1];
        assert_eq!(check_partition(rows), Err(PartitionError::Gap(0xE0)));
    }

    #[test]
    fn partition_check_detects_overlap() {
        let mut rows = TAG_TABLE.to_vec();
        rows[3].extent = 0x20; // fixstr swallows 0xC0
        assert_eq!(check_partition(&rows), Err(PartitionError::Overlap(0xC0)));
    }

    #[test]
    fn partition_check_detects_disorder() {
        let mut rows = TAG_TABLE.to_vec();
        rows.swap(7, 8);
        assert_eq!(
            check_partition(&rows),
            Err(PartitionError::Unordered {
                family: Family::Bin8,
                base: 0xC4,
            })
        );
    }

    #[test]
    fn length_field_widths() {
        assert_eq!(Family::FixStr.descriptor().length_field_width(), 0);
        assert_eq!(Family::Str8.descriptor().length_field_width(), 1);
        assert_eq!(Family::Bin16.descriptor().length_field_width(), 2);
        assert_eq!(Family::Ext32.descriptor().length_field_width(), 4);
        assert_eq!(Family::Float64.descriptor().length_field_width(), 0);
        assert_eq!(Family::Float64.descriptor().payload_width(), Some(8));
    }
}
