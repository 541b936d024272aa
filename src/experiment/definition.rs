//! Experiment Definition - immutable description supplied at registration

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Experiment Definition describes one decision point.
///
/// Variant indices live in `[0, variant_count)`. The `id` is opaque to the
/// engine and passed verbatim to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentDefinition {
    id: String,
    variant_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    testing_id: Option<i64>,
}

impl ExperimentDefinition {
    /// Create a new definition without a testing ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDefinition`] if `variant_count` is zero
    pub fn new(id: impl Into<String>, variant_count: usize) -> Result<Self> {
        Self::builder(id, variant_count).build()
    }

    /// Create a builder for a definition with optional fields.
    #[must_use]
    pub fn builder(id: impl Into<String>, variant_count: usize) -> ExperimentDefinitionBuilder {
        ExperimentDefinitionBuilder::new(id, variant_count)
    }

    /// Get the backend experiment ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the number of variants.
    #[must_use]
    pub const fn variant_count(&self) -> usize {
        self.variant_count
    }

    /// Get the testing ID used for query-string forcing, if any.
    #[must_use]
    pub const fn testing_id(&self) -> Option<i64> {
        self.testing_id
    }
}

/// Builder for `ExperimentDefinition`.
#[derive(Debug)]
pub struct ExperimentDefinitionBuilder {
    id: String,
    variant_count: usize,
    testing_id: Option<i64>,
}

impl ExperimentDefinitionBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, variant_count: usize) -> Self {
        Self {
            id: id.into(),
            variant_count,
            testing_id: None,
        }
    }

    /// Set the testing ID matched against the `force` query parameter.
    #[must_use]
    pub const fn testing_id(mut self, testing_id: i64) -> Self {
        self.testing_id = Some(testing_id);
        self
    }

    /// Build the `ExperimentDefinition`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDefinition`] if `variant_count` is zero
    pub fn build(self) -> Result<ExperimentDefinition> {
        if self.variant_count == 0 {
            return Err(Error::InvalidDefinition(format!(
                "experiment '{}' must have at least one variant",
                self.id
            )));
        }

        Ok(ExperimentDefinition {
            id: self.id,
            variant_count: self.variant_count,
            testing_id: self.testing_id,
        })
    }
}
