//! Regression model artifacts.
//!
//! - [`LinearModel`]: the fitted parameters and the [`Regressor`] seam
//! - [`FeatureColumns`]: the training column order
//! - [`ModelLoader`]: downloads both once and caches them for the process

pub mod columns;
pub mod linear;
pub mod loader;

pub use columns::{FeatureColumns, NUMERIC_SLOTS};
pub use linear::{LinearModel, Regressor};
pub use loader::{ArtifactLocation, ModelBundle, ModelLoader};
