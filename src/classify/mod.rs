//! Structural type classification.
//!
//! A value describes its capabilities through a [`Shape`]; [`category_of`]
//! maps the shape to exactly one [`Category`] by walking the rules in a fixed
//! precedence order. Some shapes satisfy several predicates at once (a string
//! is also iterable, a tuple is also a sequence), so the first matching rule
//! wins.

mod pack;

pub use pack::{Bin, Datum, Pack};

use crate::msgpack::marker::Category;

/// Structural capabilities of a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shape {
    /// Contiguous UTF-8 text.
    pub string_like: bool,
    /// Contiguous opaque bytes.
    pub byte_blob: bool,
    /// Element count of a fixed-arity aggregate (tuples, arrays).
    pub arity: Option<usize>,
    /// Iterates key/value pairs.
    pub pairs: bool,
    /// Iterates elements.
    pub iterable: bool,
    pub boolean: bool,
    pub integral: bool,
    pub floating: bool,
    /// Nil, unit or an absent optional.
    pub nil: bool,
    /// Carries an extension type discriminator.
    pub ext: bool,
}

impl Shape {
    /// No capabilities; classifies as UNKNOWN.
    pub const NONE: Self = Self {
        string_like: false,
        byte_blob: false,
        arity: None,
        pairs: false,
        iterable: false,
        boolean: false,
        integral: false,
        floating: false,
        nil: false,
        ext: false,
    };

    pub const STR: Self = Self {
        string_like: true,
        iterable: true,
        ..Self::NONE
    };

    pub const BIN: Self = Self {
        byte_blob: true,
        iterable: true,
        ..Self::NONE
    };

    pub const SEQ: Self = Self {
        iterable: true,
        ..Self::NONE
    };

    pub const MAP: Self = Self {
        pairs: true,
        iterable: true,
        ..Self::NONE
    };

    pub const BOOL: Self = Self {
        boolean: true,
        ..Self::NONE
    };

    pub const INTEGER: Self = Self {
        integral: true,
        ..Self::NONE
    };

    pub const FLOAT: Self = Self {
        floating: true,
        ..Self::NONE
    };

    pub const NIL: Self = Self {
        nil: true,
        ..Self::NONE
    };

    pub const EXT: Self = Self {
        ext: true,
        ..Self::NONE
    };

    /// A fixed-arity aggregate of `arity` elements.
    pub const fn tuple(arity: usize) -> Self {
        Self {
            arity: Some(arity),
            iterable: true,
            ..Self::NONE
        }
    }
}

/// Maps a shape to its semantic category.
pub fn category_of(shape: &Shape) -> Category {
    if shape.string_like {
        Category::Str
    } else if shape.byte_blob {
        Category::Bin
    } else if shape.arity.is_some() {
        Category::Array
    } else if shape.pairs {
        Category::Map
    } else if shape.iterable {
        Category::Array
    } else if shape.boolean {
        Category::Bool
    } else if shape.integral {
        Category::Integer
    } else if shape.floating {
        Category::Float
    } else if shape.nil {
        Category::Void
    } else if shape.ext {
        Category::Ext
    } else {
        Category::Unknown
    }
}

/// Classifies a packable value.
pub fn classify<T: Pack + ?Sized>(value: &T) -> Category {
    category_of(&value.shape())
}
