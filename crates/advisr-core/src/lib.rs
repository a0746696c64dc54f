pub mod app_config;
pub mod categories;
pub mod config;
pub mod forms;
pub mod geo;
pub mod icon;
pub mod location;
pub mod search_query;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use categories::{default_categories, load_categories, NearbyCategory};
pub use config::{load_app_config, load_app_config_from_env};
pub use forms::{CategoryForm, FieldError, LocationForm, NewCategory, NewLocation, ValidationError};
pub use geo::{haversine_km, Bounds, LatLng, DEFAULT_CENTER};
pub use icon::{category_emoji, select_icon, MarkerIcon};
pub use location::{
    dedup_by_place_id, AccessibilityOptions, Category, Location, LocationId, PlaceDetails,
    PlaceReview,
};
pub use search_query::SearchQuery;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[from] serde_yaml::Error),

    #[error("categories validation failed: {0}")]
    Validation(String),
}
