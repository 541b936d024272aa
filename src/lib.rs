//! # Trueno-AB: Experiment Variant Resolution
//!
//! **Version**: 0.1.0
//!
//! Trueno-AB assigns a stable variant index to a named experiment for a browser
//! tab or a server request. Variants come from a pluggable backend under a
//! bounded timeout, can be forced from the URL for QA, and survive across
//! requests through cookies set during server-side rendering.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: Every resolution failure stops at variant 0 instead of surfacing
//! - **Poka-Yoke safety**: Variant count mismatches fail at setup, not at render
//! - **Heijunka**: A slow backend never holds a page longer than the timeout
//! - **Genchi Genbutsu**: Forced variants via `?force=<testing id>&variant=<n>`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trueno_ab::backend::FixedBackend;
//! use trueno_ab::experiment::ExperimentDefinition;
//! use trueno_ab::registry::{RegisterOptions, Registry};
//! use trueno_ab::session::ExperimentSession;
//!
//! # async fn example() -> trueno_ab::Result<()> {
//! let registry = Arc::new(Registry::builder().timeout_ms(300).build());
//! registry.register_experiments(
//!     [("hero", ExperimentDefinition::new("exp-hero-banner", 2)?)],
//!     RegisterOptions::default(),
//! );
//!
//! let session = ExperimentSession::new(registry, FixedBackend::new(1));
//! let state = session.resolve("hero").await?;
//! println!("hero variant: {:?}", state.variant);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod backend;
pub mod config;
pub mod context;
pub mod cookie;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod query;
pub mod registry;
pub mod resolve;
pub mod selection;
pub mod session;
pub mod ssr;

pub use error::{Error, Result};
pub use registry::{RegisterOptions, Registry};
pub use ssr::SsrData;
