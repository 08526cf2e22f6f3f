//! Price prediction.
//!
//! Turns validated form input into a [`FeatureVector`] and runs it through
//! the cached model.

pub mod features;
pub mod form;

pub use features::FeatureVector;
pub use form::{PriceForm, PriceQuery, MAX_ROOMS, MAX_SQFT};

use crate::config::UnknownLocationPolicy;
use crate::error::{PriceError, Result};
use crate::model::ModelBundle;
use metrics::counter;
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Unrounded model output.
    pub raw: f64,
    /// Output rounded for display.
    pub price: f64,
    /// Whether the location had a feature column.
    pub location_matched: bool,
}

/// Runs queries against a model bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Predictor {
    policy: UnknownLocationPolicy,
}

impl Predictor {
    pub fn new(policy: UnknownLocationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnknownLocationPolicy {
        self.policy
    }

    /// Predict a price for one query.
    pub fn predict(&self, bundle: &ModelBundle, query: &PriceQuery) -> Result<Prediction> {
        info!(
            location = %query.location,
            sqft = query.sqft,
            bath = query.bath,
            bhk = query.size,
            "Prediction inputs"
        );

        let features = FeatureVector::build(&bundle.columns, query);

        match features.location_index() {
            Some(index) => info!(index, "Set location feature"),
            None => match self.policy {
                UnknownLocationPolicy::Proceed => {
                    warn!(location = %query.location, "Location not found in feature columns")
                }
                UnknownLocationPolicy::Reject => {
                    return Err(PriceError::UnknownLocation(query.location.clone()))
                }
            },
        }

        let raw = bundle.model.predict(features.as_slice())?;
        if !raw.is_finite() {
            return Err(PriceError::Internal(format!("model produced {}", raw)));
        }
        info!(raw, "Raw prediction");
        counter!("homeprice_predictions_total").increment(1);

        Ok(Prediction {
            raw,
            price: round_price(raw),
            location_matched: features.location_index().is_some(),
        })
    }
}

/// Round to two decimal places for display.
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
