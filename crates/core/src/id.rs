//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Store-assigned identifier of a drug record.
///
/// Identifiers are positive and never reused by the store. The SKU is the
/// caller-facing business key; this is the technical one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrugId(i64);

impl DrugId {
    /// Wrap a raw identifier, rejecting values the store never assigns.
    pub fn new(raw: i64) -> Result<Self, DomainError> {
        if raw <= 0 {
            return Err(DomainError::invalid_id(format!(
                "DrugId: must be positive, got {raw}"
            )));
        }
        Ok(Self(raw))
    }

    /// Wrap a raw identifier coming straight from the store.
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for DrugId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<DrugId> for i64 {
    fn from(value: DrugId) -> Self {
        value.0
    }
}

impl FromStr for DrugId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("DrugId: {e}")))?;
        Self::new(raw)
    }
}
