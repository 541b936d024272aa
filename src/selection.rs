//! Mapping a resolved index to a declared option
//!
//! The engine resolves a number. A consumer (page, template, handler) declares
//! its options, each covering one or more variant indices, and asks which one to
//! use. Indices no option covers fall back to the first option.

use crate::experiment::RegisteredExperiment;
use crate::{Error, Result};

/// One declared option, covering one or several variant indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantOption {
    /// Chosen for exactly this index
    Single(usize),
    /// Chosen for any of these indices
    Many(Vec<usize>),
}

impl VariantOption {
    /// Number of indices this option covers.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(indices) => indices.len(),
        }
    }

    /// True for a `Many` with no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if this option covers `index`.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        match self {
            Self::Single(i) => *i == index,
            Self::Many(indices) => indices.contains(&index),
        }
    }
}

impl From<usize> for VariantOption {
    fn from(index: usize) -> Self {
        Self::Single(index)
    }
}

impl From<Vec<usize>> for VariantOption {
    fn from(indices: Vec<usize>) -> Self {
        Self::Many(indices)
    }
}

/// Ordered set of options declared for one experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSet {
    options: Vec<VariantOption>,
}

impl VariantSet {
    /// Create a set from options in declaration order.
    #[must_use]
    pub fn new<I, O>(options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<VariantOption>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Declared options.
    #[must_use]
    pub fn options(&self) -> &[VariantOption] {
        &self.options
    }

    /// Total number of indices covered, counting duplicates.
    #[must_use]
    pub fn declared_count(&self) -> usize {
        self.options.iter().map(VariantOption::len).sum()
    }

    /// Fail fast if the declared indices do not add up to the registered count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VariantCountMismatch`] when the counts differ
    pub fn validate(&self, experiment: &RegisteredExperiment) -> Result<()> {
        let actual = self.declared_count();
        if actual == experiment.variant_count() {
            return Ok(());
        }

        Err(Error::VariantCountMismatch {
            id: experiment.id().to_string(),
            expected: experiment.variant_count(),
            actual,
        })
    }

    /// Position of the first option covering `index`, or of the first option if
    /// none does. `None` only for an empty set.
    #[must_use]
    pub fn pick(&self, index: usize) -> Option<usize> {
        if self.options.is_empty() {
            return None;
        }
        Some(self.options.iter().position(|o| o.contains(index)).unwrap_or(0))
    }
}
