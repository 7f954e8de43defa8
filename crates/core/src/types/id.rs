//! Newtype IDs normalized to a canonical string form.
//!
//! The Store API is not consistent about identifier types: products and cart
//! entries carry numeric IDs, search results come from a document store and may
//! carry strings, and category selections arrive as form text. Every ID is
//! normalized when it crosses the boundary so that `7`, `7.0`, `"7"` and
//! `" 07 "` all compare equal, instead of relying on loose comparisons later.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use serde::Deserialize;
use thiserror::Error;

/// Errors produced when normalizing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or whitespace only.
    #[error("identifier is empty")]
    Empty,
}

/// Normalize raw identifier text to its canonical form.
///
/// Integer-valued text is rendered without sign or leading zeros. Decimal
/// text (`"1.0"`, `"2.50"`, `"1e3"`) goes through the same normalization as a
/// JSON number, so `"1.0"` and `1` are the same ID. Anything else, including
/// digit strings too long for an `i64`, is kept verbatim after trimming.
///
/// # Errors
///
/// Returns [`IdError::Empty`] if the text is empty after trimming.
pub fn canonicalize(raw: &str) -> Result<String, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(n.to_string());
    }
    Ok(decimal_text(trimmed).map_or_else(|| trimmed.to_owned(), canonical_float))
}

/// Parse text with a fraction or exponent as a finite float.
fn decimal_text(text: &str) -> Option<f64> {
    if !text.contains(['.', 'e', 'E']) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Wire representation of an identifier before normalization.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawId {
    /// Convert to the canonical string form.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Empty`] for empty text.
    pub fn canonical(self) -> Result<String, IdError> {
        match self {
            Self::Int(n) => Ok(n.to_string()),
            Self::Float(n) => Ok(canonical_float(n)),
            Self::Text(s) => canonicalize(&s),
        }
    }
}

#[allow(clippy::cast_possible_truncation)] // guarded by the magnitude check
fn canonical_float(n: f64) -> String {
    if n.fract().abs() < f64::EPSILON && n.abs() < 9.0e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

/// Macro to define a type-safe, normalized ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as the canonical string and a `Deserialize` accepting numbers or strings
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `parse()`, `as_str()`
/// - `From<i32>`, `From<i64>` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use shopfront_core::define_id;
/// define_id!(WidgetId);
///
/// let a = WidgetId::from(7);
/// let b = WidgetId::parse(" 007 ").unwrap();
/// assert_eq!(a, b);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse and normalize an ID from raw text.
            ///
            /// # Errors
            ///
            /// Returns an error if the text is empty after trimming.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                $crate::types::id::canonicalize(raw).map(Self)
            }

            /// Get the canonical string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id.to_string())
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                raw.canonical()
                    .map(Self)
                    .map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    };
}

define_id!(ProductId);
define_id!(CategoryId);
