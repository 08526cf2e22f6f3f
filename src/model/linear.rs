// Linear regression model

use crate::error::{PriceError, Result};
use serde::{Deserialize, Serialize};

/// Anything that maps a feature vector to a single number
pub trait Regressor: Send + Sync {
    /// Number of features the model expects
    fn n_features(&self) -> usize;

    /// Predicts a value for one feature vector
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// Fitted ordinary least squares parameters
///
/// Accepts the attribute names of a fitted scikit-learn estimator
/// (`coef_`, `intercept_`) as well as the plain names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// One weight per feature column
    #[serde(alias = "coef_")]
    pub coef: Vec<f64>,
    /// Bias term
    #[serde(alias = "intercept_", default)]
    pub intercept: f64,
}

impl LinearModel {
    /// Creates a model from weights and bias
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }

    /// Decodes a model from its JSON artifact
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let model: Self = serde_json::from_slice(bytes)
            .map_err(|e| PriceError::Deserialization(format!("linear model: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    /// Rejects empty or non-finite parameters
    pub fn validate(&self) -> Result<()> {
        if self.coef.is_empty() {
            return Err(PriceError::Deserialization(
                "linear model has no coefficients".into(),
            ));
        }
        if let Some(i) = self.coef.iter().position(|c| !c.is_finite()) {
            return Err(PriceError::Deserialization(format!(
                "linear model coefficient {} is not finite",
                i
            )));
        }
        if !self.intercept.is_finite() {
            return Err(PriceError::Deserialization(
                "linear model intercept is not finite".into(),
            ));
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coef.len() {
            return Err(PriceError::ModelMismatch(format!(
                "expected {} features, got {}",
                self.coef.len(),
                features.len()
            )));
        }

        let dot: f64 = self
            .coef
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        Ok(dot + self.intercept)
    }
}
