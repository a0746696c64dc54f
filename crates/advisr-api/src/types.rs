//! Wire types for the internal REST backend.
//!
//! The backend serializes decimal coordinates as strings (`"23.810300"`)
//! from its detail serializer and as numbers from some list views, so the
//! coordinate fields accept both.

use serde::{Deserialize, Deserializer};

use advisr_core::{Location, LocationId};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCategoryRef {
    pub id: Option<i64>,
    pub name: String,
}

/// One location as returned by `/locations/` and `/locations/search/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiLocation {
    pub id: i64,
    pub name: String,
    /// Flat category name from the list serializer.
    #[serde(default)]
    pub category_name: Option<String>,
    /// Nested category from the detail serializer.
    #[serde(default)]
    pub category: Option<ApiCategoryRef>,
    #[serde(deserialize_with = "de_coordinate")]
    pub latitude: f64,
    #[serde(deserialize_with = "de_coordinate")]
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl ApiLocation {
    /// Convert to the shared [`Location`] record.
    #[must_use]
    pub fn into_location(self) -> Location {
        let category_name = self
            .category_name
            .filter(|c| !c.is_empty())
            .or_else(|| self.category.map(|c| c.name));
        Location {
            id: LocationId::Internal(self.id),
            name: self.name,
            category_name,
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address,
            rating: self.rating,
            user_ratings_total: None,
            place_id: None,
            is_google_place: false,
            types: Vec::new(),
            accessibility_options: None,
            distance_km: self.distance,
        }
    }
}

fn de_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(f64),
        Str(String),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(v) => Ok(v),
        NumOrString::Str(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

/// Extract the item array from any accepted list shape: a bare array,
/// `{"results": [...]}`, or `{"data": [...]}`.
#[must_use]
pub fn list_items(body: serde_json::Value) -> Option<Vec<serde_json::Value>> {
    match body {
        serde_json::Value::Array(items) => Some(items),
        serde_json::Value::Object(mut map) => ["results", "data"].iter().find_map(|key| {
            match map.remove(*key) {
                Some(serde_json::Value::Array(items)) => Some(items),
                _ => None,
            }
        }),
        _ => None,
    }
}

/// Error message from a rejected write: the `detail` field, else `name`
/// (first entry when the backend returns a field error list).
#[must_use]
pub fn rejection_message(body: &serde_json::Value) -> Option<String> {
    ["detail", "name"].iter().find_map(|key| match body.get(*key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items.first()?.as_str().map(str::to_owned),
        _ => None,
    })
}
