//! Category table driving the nearby sweep.
//!
//! Each entry pairs a human label (used as the free-text fallback query and
//! as the resulting records' `category_name`) with a places-service type.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearbyCategory {
    pub label: String,
    pub place_type: String,
}

impl NearbyCategory {
    fn new(label: &str, place_type: &str) -> Self {
        Self {
            label: label.to_owned(),
            place_type: place_type.to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<NearbyCategory>,
}

/// Built-in sweep order: lodging first, parks last.
#[must_use]
pub fn default_categories() -> Vec<NearbyCategory> {
    vec![
        NearbyCategory::new("hotels", "lodging"),
        NearbyCategory::new("hospitals", "hospital"),
        NearbyCategory::new("schools", "school"),
        NearbyCategory::new("universities", "university"),
        NearbyCategory::new("restaurants", "restaurant"),
        NearbyCategory::new("cafes", "cafe"),
        NearbyCategory::new("shopping malls", "shopping_mall"),
        NearbyCategory::new("parks", "park"),
    ]
}

/// Load and validate a category table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<Vec<NearbyCategory>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_categories(&content)
}

fn parse_categories(content: &str) -> Result<Vec<NearbyCategory>, ConfigError> {
    let file: CategoriesFile = serde_yaml::from_str(content)?;
    validate_categories(&file.categories)?;
    Ok(file.categories)
}

fn validate_categories(categories: &[NearbyCategory]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for category in categories {
        if category.label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category label must be non-empty".to_string(),
            ));
        }
        if category.place_type.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' has an empty place_type",
                category.label
            )));
        }
        if !seen.insert(category.label.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category label: '{}'",
                category.label
            )));
        }
    }

    Ok(())
}
