//! Registered Experiment - a definition plus its cached resolution

use serde::{Deserialize, Serialize};

use super::ExperimentDefinition;

/// A definition held by the registry together with the variant selected for it.
///
/// `selected_variant` starts unset at registration and is filled in by
/// resolution, hydration, or [`Registry::set_selected_index`](crate::registry::Registry::set_selected_index).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredExperiment {
    #[serde(flatten)]
    definition: ExperimentDefinition,
    selected_variant: Option<usize>,
}

impl RegisteredExperiment {
    /// Wrap a definition with no selected variant.
    #[must_use]
    pub const fn new(definition: ExperimentDefinition) -> Self {
        Self {
            definition,
            selected_variant: None,
        }
    }

    /// Get the underlying definition.
    #[must_use]
    pub const fn definition(&self) -> &ExperimentDefinition {
        &self.definition
    }

    /// Get the backend experiment ID.
    #[must_use]
    pub fn id(&self) -> &str {
        self.definition.id()
    }

    /// Get the number of variants.
    #[must_use]
    pub const fn variant_count(&self) -> usize {
        self.definition.variant_count()
    }

    /// Get the testing ID, if any.
    #[must_use]
    pub const fn testing_id(&self) -> Option<i64> {
        self.definition.testing_id()
    }

    /// Get the cached variant, if resolved.
    #[must_use]
    pub const fn selected_variant(&self) -> Option<usize> {
        self.selected_variant
    }

    pub(crate) fn select(&mut self, index: usize) {
        self.selected_variant = Some(index);
    }

    pub(crate) fn forget(&mut self) {
        self.selected_variant = None;
    }
}

impl From<ExperimentDefinition> for RegisteredExperiment {
    fn from(definition: ExperimentDefinition) -> Self {
        Self::new(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_starts_unset() {
        let def = ExperimentDefinition::new("abc", 2).unwrap();
        let mut exp = RegisteredExperiment::from(def);
        assert_eq!(exp.selected_variant(), None);
        assert_eq!(exp.id(), "abc");

        exp.select(1);
        assert_eq!(exp.selected_variant(), Some(1));

        exp.forget();
        assert_eq!(exp.selected_variant(), None);
    }
}
