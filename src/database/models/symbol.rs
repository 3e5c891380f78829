use serde::{Serialize, Serializer};
use std::fmt;

use crate::database::errors::StoreError;
use crate::utils::validation;

/// Canonical ticker symbol
///
/// Symbols are case-insensitive: `"aapl"` and `"AAPL"` name the same catalog
/// entry and the same ledger. Construction trims and uppercases the input, so
/// every value of this type is already in the form stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Canonicalize and validate a raw symbol
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let canonical = raw.trim().to_ascii_uppercase();

        if !validation::is_valid_symbol(&canonical) {
            return Err(StoreError::InvalidSymbol(raw.to_string()));
        }

        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
