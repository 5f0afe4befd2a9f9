//! Format selection: the most compact tag for a category and measured size.
//!
//! Each category owns an ordered candidate list derived from the tag table,
//! smallest capacity first. Selection returns the first candidate that can
//! hold the measured size, which makes every encoding minimal.

use std::sync::LazyLock;

use super::marker::{Category, Family, Layout, TAG_TABLE, TagDescriptor};
use crate::error::PackError;
use crate::types::Int;

static CANDIDATES: LazyLock<[Vec<Family>; 10]> =
    LazyLock::new(|| Category::ALL.map(derive_candidates));

fn derive_candidates(category: Category) -> Vec<Family> {
    let mut rows: Vec<&TagDescriptor> = TAG_TABLE
        .iter()
        .filter(|row| row.category() == category)
        .collect();
    // Stable: equal capacities keep table order (uint before int).
    rows.sort_by_key(|row| ordering_key(row));
    rows.into_iter().map(|row| row.family).collect()
}

fn ordering_key(row: &TagDescriptor) -> u64 {
    match row.layout {
        // fixint carries its value in the tag byte; nothing is smaller.
        Layout::Embedded { .. } if row.category() == Category::Integer => 0,
        _ => row.capacity(),
    }
}

/// Candidate families for `category`, most compact first.
pub fn candidates(category: Category) -> &'static [Family] {
    &CANDIDATES[category as usize]
}

/// Returns `true` if `row` can frame a value of the given measured size.
pub fn fits(row: &TagDescriptor, size: u64) -> bool {
    match row.layout {
        // Integer fixints are chosen by value in `select_int`, never by size.
        Layout::Embedded { .. } if row.category() == Category::Integer => false,
        Layout::Embedded { max, .. } => size <= max as u64,
        Layout::Prefixed { .. } => size <= row.capacity(),
        // fixext payloads must match exactly.
        Layout::Fixed { width } if row.category() == Category::Ext => size == u64::from(width),
        Layout::Fixed { width } => size <= u64::from(width),
        Layout::Bare => true,
        Layout::Reserved => false,
    }
}

/// Selects the smallest tag of `category` able to hold `size`.
///
/// `size` is a byte length for STR, BIN and EXT, an element or pair count for
/// ARRAY and MAP, and an operand width in bytes for INTEGER and FLOAT. Integer
/// selection through this function only considers the unsigned families; use
/// [`select_int`] for a concrete value.
pub fn select_tag(category: Category, size: u64) -> Result<&'static TagDescriptor, PackError> {
    first_fit(category, size, |row| !row.family.is_signed())
}

/// Selects the tag for an integer: fixint when the value fits `-32..=127`,
/// otherwise the family matching the operand's width and signedness.
pub fn select_int(value: Int) -> Result<&'static TagDescriptor, PackError> {
    if let Some(v) = value.as_fixint() {
        let family = if v >= 0 {
            Family::PositiveFixInt
        } else {
            Family::NegativeFixInt
        };
        return Ok(family.descriptor());
    }
    let signed = value.is_signed();
    first_fit(Category::Integer, u64::from(value.width()), |row| {
        row.family.is_signed() == signed
    })
}

fn first_fit(
    category: Category,
    size: u64,
    accept: impl Fn(&TagDescriptor) -> bool,
) -> Result<&'static TagDescriptor, PackError> {
    if category == Category::Unknown {
        return Err(PackError::Unclassifiable);
    }
    candidates(category)
        .iter()
        .map(|family| family.descriptor())
        .find(|row| accept(row) && fits(row, size))
        .ok_or_else(|| {
            tracing::trace!(%category, size, "no format covers measured size");
            PackError::SizeOverflow { category, size }
        })
}
