//! Node identifiers using string interning for cheap copies and comparisons
//!
//! This module provides the [`Id`] type. Node identifiers are compared and
//! hashed constantly during inference and layout, and are only turned back
//! into strings at the export boundary.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// Access goes through a `Mutex`; identifiers are `Copy` and can be shared
/// freely between concurrently running pipelines.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned node identifier
///
/// # Examples
///
/// ```
/// use sketchmap_core::identifier::Id;
///
/// let root = Id::new("1");
/// assert_eq!(root, "1");
///
/// let generated = Id::from_index(0);
/// assert_eq!(generated, root);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates the identifier of the `idx`-th node created by inference.
    ///
    /// Identifiers are one-based decimal strings, so the same sketch always
    /// yields `"1"`, `"2"`, ... in node-creation order.
    pub fn from_index(idx: usize) -> Self {
        Self::new(&(idx + 1).to_string())
    }

    /// Returns an owned copy of the identifier text.
    pub fn to_text(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{value}")
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::new(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_interning_is_stable() {
        let a = Id::new("concept");
        let b = Id::new("concept");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "concept");
    }

    #[test]
    fn test_id_from_index_is_one_based() {
        assert_eq!(Id::from_index(0), "1");
        assert_eq!(Id::from_index(9), "10");
        assert_ne!(Id::from_index(1), Id::from_index(2));
    }

    #[test]
    fn test_id_str_comparison() {
        let id = Id::new("root");
        assert!(id == "root");
        assert!(id != "leaf");
    }
}
