// Feature column list

use crate::error::{PriceError, Result};
use std::collections::HashMap;

/// Slots reserved for the numeric inputs, in vector order
pub const NUMERIC_SLOTS: usize = 3;

/// Ordered feature-column names as used during training
///
/// The first [`NUMERIC_SLOTS`] entries are square footage, bathrooms and
/// bedrooms; every later entry is a location. The order is trusted, not
/// checked.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumns {
    names: Vec<String>,
    locations: HashMap<String, usize>,
}

impl FeatureColumns {
    /// Builds the list, indexing location names by their first occurrence
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.len() < NUMERIC_SLOTS {
            return Err(PriceError::Deserialization(format!(
                "feature columns need at least {} entries, got {}",
                NUMERIC_SLOTS,
                names.len()
            )));
        }

        let mut locations = HashMap::with_capacity(names.len() - NUMERIC_SLOTS);
        for (index, name) in names.iter().enumerate().skip(NUMERIC_SLOTS) {
            locations.entry(name.clone()).or_insert(index);
        }

        Ok(Self { names, locations })
    }

    /// Decodes the JSON array artifact
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| PriceError::Deserialization(format!("feature columns: {}", e)))?;
        let names: Vec<String> = serde_json::from_str(text)
            .map_err(|e| PriceError::Deserialization(format!("feature columns: {}", e)))?;
        Self::new(names)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of a location's one-hot slot, never one of the numeric slots
    pub fn location_index(&self, location: &str) -> Option<usize> {
        self.locations.get(location).copied()
    }

    /// Location names in column order, without duplicates
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .enumerate()
            .skip(NUMERIC_SLOTS)
            .filter(|(i, name)| self.locations.get(name.as_str()) == Some(i))
            .map(|(_, name)| name.as_str())
    }
}
