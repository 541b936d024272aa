//! Experiment definitions
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentDefinition (immutable) ──> RegisteredExperiment (+ selected_variant)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trueno_ab::experiment::ExperimentDefinition;
//!
//! let checkout = ExperimentDefinition::builder("exp-checkout", 2)
//!     .testing_id(7)
//!     .build()?;
//!
//! assert_eq!(checkout.variant_count(), 2);
//! # Ok::<(), trueno_ab::Error>(())
//! ```

mod definition;
mod registered;

pub use definition::{ExperimentDefinition, ExperimentDefinitionBuilder};
pub use registered::RegisteredExperiment;
