// Model artifacts and form inputs for integration tests

use std::path::Path;

/// Container name used by the fixtures.
pub const CONTAINER: &str = "homes";

/// Columns: three numeric slots and two locations.
pub const COLUMNS_JSON: &str = r#"["total_sqft", "bath", "bhk", "Hebbal", "Whitefield"]"#;

/// price = 10 + 0.1*sqft + 5*bath + 2*bhk + 30*[Hebbal] + 20*[Whitefield]
pub const MODEL_JSON: &str = r#"{"coef": [0.1, 5.0, 2.0, 30.0, 20.0], "intercept": 10.0}"#;

/// Model with scikit-learn style field names and a wrong width.
pub const NARROW_MODEL_JSON: &str = r#"{"coef_": [0.1, 5.0, 2.0], "intercept_": 10.0}"#;

/// Write the fixture artifacts as `{root}/{container}/models/...`.
pub fn write_artifacts(root: &Path, container: &str, model: &str, columns: &str) {
    let models = root.join(container).join("models");
    std::fs::create_dir_all(&models).expect("Failed to create models dir");
    std::fs::write(models.join("linear_model.json"), model).expect("Failed to write model");
    std::fs::write(models.join("X_columns.json"), columns).expect("Failed to write columns");
}

/// Form fields for a submission.
pub fn form<'a>(location: &'a str, sqft: &'a str, bath: &'a str, size: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("location", location),
        ("sqft", sqft),
        ("bath", bath),
        ("size", size),
    ]
}
