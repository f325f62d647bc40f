//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`DimensionValue`] - Validated, non-negative numeric dimension value
//! - [`ChangeSet`] - Ordered batch of raw parameter edits
//! - [`MaterialIndex`] - Index checked against a live materials list
//! - [`Slot`] - One editable entry of a batch sub-menu
//!
//! # Validation
//!
//! These types enforce validity at construction time. A negative or
//! non-numeric dimension cannot be represented as a `DimensionValue`, so it
//! can never be handed to the remote client.
//!
//! # Examples
//!
//! ```
//! use modelctl::core::types::{DimensionValue, MaterialIndex};
//!
//! assert_eq!(DimensionValue::parse("10").unwrap().as_f64(), 10.0);
//! assert!(DimensionValue::parse("-5").is_err());
//! assert!(DimensionValue::parse("ten").is_err());
//!
//! let materials = vec!["Steel".to_string(), "Aluminum".to_string()];
//! assert!(MaterialIndex::parse("1", materials.len()).is_ok());
//! assert!(MaterialIndex::parse("2", materials.len()).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("'{0}' is negative")]
    Negative(String),

    #[error("'{0}' is not a valid index")]
    InvalidIndex(String),

    #[error("index {index} is out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A validated dimension value.
///
/// Integers and decimals are accepted; the value is always finite and
/// never negative. Surrounding whitespace is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DimensionValue {
    Integer(u64),
    Float(f64),
}

impl DimensionValue {
    /// Parse and validate a raw operator input.
    ///
    /// # Errors
    ///
    /// - `TypeError::NotNumeric` if the input is not an integer or a finite decimal
    /// - `TypeError::Negative` if the value is below zero
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let trimmed = raw.trim();

        if let Ok(n) = trimmed.parse::<i64>() {
            return u64::try_from(n)
                .map(DimensionValue::Integer)
                .map_err(|_| TypeError::Negative(raw.to_string()));
        }

        let f = trimmed
            .parse::<f64>()
            .map_err(|_| TypeError::NotNumeric(raw.to_string()))?;

        if !f.is_finite() {
            return Err(TypeError::NotNumeric(raw.to_string()));
        }
        if f < 0.0 {
            return Err(TypeError::Negative(raw.to_string()));
        }
        // -0.0 compares equal to zero; normalize it
        Ok(DimensionValue::Float(f.abs()))
    }

    /// Value as sent over the wire.
    pub fn as_f64(&self) -> f64 {
        match *self {
            DimensionValue::Integer(n) => n as f64,
            DimensionValue::Float(f) => f,
        }
    }
}

impl std::fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionValue::Integer(n) => write!(f, "{}", n),
            DimensionValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// An ordered batch of raw parameter edits.
///
/// Keys are unique; setting an existing key overwrites its value but keeps
/// its original position.
///
/// ```
/// use modelctl::core::types::ChangeSet;
///
/// let mut set = ChangeSet::new();
/// set.set("w", "10");
/// set.set("h", "20");
/// set.set("w", "12");
///
/// let entries: Vec<_> = set.iter().collect();
/// assert_eq!(entries, vec![("w", "12"), ("h", "20")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Vec<(String, String)>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a raw value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// An index validated against a list length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialIndex(usize);

impl MaterialIndex {
    /// Parse an operator input and check it is within `0..len`.
    ///
    /// # Errors
    ///
    /// - `TypeError::InvalidIndex` if the input is not a non-negative integer
    /// - `TypeError::IndexOutOfRange` if it is not below `len`
    pub fn parse(raw: &str, len: usize) -> Result<Self, TypeError> {
        let index = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| TypeError::InvalidIndex(raw.to_string()))?;
        if index >= len {
            return Err(TypeError::IndexOutOfRange { index, len });
        }
        Ok(Self(index))
    }

    /// Get the raw index.
    pub fn get(&self) -> usize {
        self.0
    }
}

/// One editable entry in a batch sub-menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Slot {
    /// Parameter or dimension name on the model
    pub key: String,
    /// Label shown to the operator
    pub label: String,
}

impl Slot {
    /// Create a slot.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod dimension_value {
        use super::*;

        #[test]
        fn integers() {
            assert_eq!(DimensionValue::parse("0").unwrap(), DimensionValue::Integer(0));
            assert_eq!(DimensionValue::parse("42").unwrap(), DimensionValue::Integer(42));
            assert_eq!(DimensionValue::parse(" 7 ").unwrap(), DimensionValue::Integer(7));
        }

        #[test]
        fn decimals() {
            assert_eq!(DimensionValue::parse("2.5").unwrap(), DimensionValue::Float(2.5));
            assert_eq!(DimensionValue::parse("2.5").unwrap().as_f64(), 2.5);
        }

        #[test]
        fn negative_rejected() {
            assert_eq!(
                DimensionValue::parse("-5"),
                Err(TypeError::Negative("-5".into()))
            );
            assert_eq!(
                DimensionValue::parse("-0.1"),
                Err(TypeError::Negative("-0.1".into()))
            );
        }

        #[test]
        fn negative_zero_normalized() {
            let v = DimensionValue::parse("-0.0").unwrap();
            assert!(v.as_f64().is_sign_positive());
        }

        #[test]
        fn non_numeric_rejected() {
            for raw in ["", "abc", "10mm", "NaN", "inf", "1,5"] {
                assert!(
                    matches!(DimensionValue::parse(raw), Err(TypeError::NotNumeric(_))),
                    "{raw:?} should be rejected"
                );
            }
        }

        #[test]
        fn display() {
            assert_eq!(DimensionValue::Integer(10).to_string(), "10");
            assert_eq!(DimensionValue::Float(2.5).to_string(), "2.5");
        }
    }

    mod change_set {
        use super::*;

        #[test]
        fn overwrite_keeps_position() {
            let mut set = ChangeSet::new();
            set.set("a", "1");
            set.set("b", "2");
            set.set("a", "3");
            assert_eq!(set.len(), 2);
            assert_eq!(set.get("a"), Some("3"));
            assert_eq!(set.iter().next(), Some(("a", "3")));
        }

        #[test]
        fn clear_empties() {
            let mut set = ChangeSet::new();
            set.set("a", "");
            assert!(!set.is_empty());
            set.clear();
            assert!(set.is_empty());
        }
    }

    mod material_index {
        use super::*;

        #[test]
        fn in_range() {
            assert_eq!(MaterialIndex::parse("0", 2).unwrap().get(), 0);
            assert_eq!(MaterialIndex::parse("1\n", 2).unwrap().get(), 1);
        }

        #[test]
        fn out_of_range() {
            assert_eq!(
                MaterialIndex::parse("2", 2),
                Err(TypeError::IndexOutOfRange { index: 2, len: 2 })
            );
            assert!(MaterialIndex::parse("0", 0).is_err());
        }

        #[test]
        fn non_numeric() {
            assert!(matches!(
                MaterialIndex::parse("steel", 2),
                Err(TypeError::InvalidIndex(_))
            ));
            assert!(matches!(
                MaterialIndex::parse("-1", 2),
                Err(TypeError::InvalidIndex(_))
            ));
        }
    }
}
