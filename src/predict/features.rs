//! Feature vector construction.

use super::form::PriceQuery;
use crate::model::FeatureColumns;

/// Fixed-layout model input: sqft, bath, bhk, then one-hot location flags.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
    location_index: Option<usize>,
}

impl FeatureVector {
    /// Build the vector for a query against the training columns.
    ///
    /// An unknown location leaves every location slot at zero.
    pub fn build(columns: &FeatureColumns, query: &PriceQuery) -> Self {
        let mut values = vec![0.0; columns.len()];
        values[0] = query.sqft;
        values[1] = f64::from(query.bath);
        values[2] = f64::from(query.size);

        let location_index = columns.location_index(&query.location);
        if let Some(index) = location_index {
            values[index] = 1.0;
        }

        Self {
            values,
            location_index,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Slot of the matched location, if any.
    pub fn location_index(&self) -> Option<usize> {
        self.location_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NUMERIC_SLOTS;

    fn columns() -> FeatureColumns {
        FeatureColumns::new(
            [
                "total_sqft",
                "bath",
                "bhk",
                "1st Block Jayanagar",
                "1st Phase JP Nagar 2",
                "1st Phase JP Nagar",
                "2nd Phase Judicial Layout",
                "Hebbal",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
        .unwrap()
    }

    fn query(location: &str, sqft: f64, bath: u32, size: u32) -> PriceQuery {
        PriceQuery {
            location: location.into(),
            sqft,
            bath,
            size,
        }
    }

    #[test]
    fn test_known_location_vector() {
        let v = FeatureVector::build(&columns(), &query("1st Phase JP Nagar", 1500.0, 2, 3));
        assert_eq!(v.as_slice(), &[1500.0, 2.0, 3.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(v.location_index(), Some(5));
    }

    #[test]
    fn test_unknown_location_sets_no_flag() {
        let v = FeatureVector::build(&columns(), &query("Atlantis", 900.0, 1, 1));
        assert_eq!(v.as_slice(), &[900.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(v.location_index(), None);
    }

    #[test]
    fn test_at_most_one_location_flag() {
        let cols = columns();
        let locations: Vec<String> = cols.locations().map(str::to_string).collect();
        for location in locations.iter().map(String::as_str).chain(["nowhere", "bath", ""]) {
            for (sqft, bath, size) in [(1.0, 1, 1), (1500.0, 2, 3), (50_000.0, 20, 20)] {
                let v = FeatureVector::build(&cols, &query(location, sqft, bath, size));
                assert_eq!(v.len(), cols.len());
                assert_eq!(&v.as_slice()[..NUMERIC_SLOTS], &[sqft, bath as f64, size as f64]);

                let flags = &v.as_slice()[NUMERIC_SLOTS..];
                let ones = flags.iter().filter(|x| **x == 1.0).count();
                assert!(ones <= 1);
                assert!(flags.iter().all(|x| *x == 0.0 || *x == 1.0));
                assert_eq!(ones == 1, v.location_index().is_some());
            }
        }
    }

    #[test]
    fn test_numeric_slot_names_are_not_locations() {
        let v = FeatureVector::build(&columns(), &query("bhk", 1000.0, 2, 2));
        assert_eq!(v.as_slice()[2], 2.0);
        assert_eq!(v.location_index(), None);
    }
}
