//! Product lifecycle states and their legal transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a product. `Active` moves to `Retired` exactly once; there
/// is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Accepting renames, re-descriptions and retirement.
    Active,
    /// Terminal; the product is frozen.
    Retired,
}

impl ProductStatus {
    /// Whether `retire` is legal from this state.
    #[must_use]
    pub fn can_retire(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether rename/re-describe is legal from this state.
    #[must_use]
    pub fn can_mutate(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Wire and log representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Retired => "RETIRED",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
