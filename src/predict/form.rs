//! Form input and its validation.

use crate::error::{PriceError, Result};
use serde::{Deserialize, Serialize};

/// Largest accepted floor area.
pub const MAX_SQFT: f64 = 50_000.0;

/// Largest accepted bathroom or bedroom count.
pub const MAX_ROOMS: i64 = 20;

/// Raw form fields as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceForm {
    pub location: Option<String>,
    pub sqft: Option<String>,
    pub bath: Option<String>,
    pub size: Option<String>,
}

/// Validated prediction inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuery {
    /// Location name, matched exactly against the feature columns.
    pub location: String,
    /// Floor area in square feet, `0 < sqft <= 50000`.
    pub sqft: f64,
    /// Bathrooms, `1..=20`.
    pub bath: u32,
    /// Bedrooms (BHK), `1..=20`.
    pub size: u32,
}

impl PriceForm {
    /// Check presence, then numeric syntax, then ranges.
    pub fn validate(&self) -> Result<PriceQuery> {
        let location = required("location", &self.location)?;
        let sqft = required("sqft", &self.sqft)?;
        let bath = required("bath", &self.bath)?;
        let size = required("size", &self.size)?;

        let sqft = sqft
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(invalid_numeric)?;
        let bath = bath.trim().parse::<i64>().map_err(|_| invalid_numeric())?;
        let size = size.trim().parse::<i64>().map_err(|_| invalid_numeric())?;

        if sqft <= 0.0 || sqft > MAX_SQFT {
            return Err(PriceError::Validation(
                "Error: Square feet must be between 1 and 50,000".into(),
            ));
        }
        if !(1..=MAX_ROOMS).contains(&bath) {
            return Err(PriceError::Validation(
                "Error: Bathrooms must be between 1 and 20".into(),
            ));
        }
        if !(1..=MAX_ROOMS).contains(&size) {
            return Err(PriceError::Validation(
                "Error: Size (BHK) must be between 1 and 20".into(),
            ));
        }

        Ok(PriceQuery {
            location: location.to_string(),
            sqft,
            bath: bath as u32,
            size: size as u32,
        })
    }
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PriceError::Validation(format!("Error: {} is required", field))),
    }
}

fn invalid_numeric() -> PriceError {
    PriceError::Validation("Error: Invalid numeric input".into())
}
