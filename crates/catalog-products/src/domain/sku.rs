//! Stock-keeping-unit identifier value object.

use std::fmt;

use catalog_core::error::{DomainError, FieldViolation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected SKU input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sku must not be blank")]
pub struct InvalidSku;

impl From<InvalidSku> for FieldViolation {
    fn from(_: InvalidSku) -> Self {
        FieldViolation::blank("sku")
    }
}

impl From<InvalidSku> for DomainError {
    fn from(err: InvalidSku) -> Self {
        DomainError::Validation(vec![err.into()])
    }
}

/// A validated, trimmed SKU. Two SKUs with the same text are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkuId(String);

impl SkuId {
    /// Validates `raw` and stores it trimmed. No case folding is applied.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSku` if `raw` is empty or whitespace only.
    pub fn new(raw: &str) -> Result<Self, InvalidSku> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidSku);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The SKU text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SkuId {
    type Error = InvalidSku;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<SkuId> for String {
    fn from(sku: SkuId) -> Self {
        sku.0
    }
}

impl fmt::Display for SkuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
