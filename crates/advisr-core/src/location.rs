//! Normalized point-of-interest records shared by both data sources.

use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::geo::LatLng;

/// Identity of a [`Location`].
///
/// Internal records carry the backend's numeric primary key; external records
/// are identified by the places service `place_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationId {
    Internal(i64),
    External(String),
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationId::Internal(id) => write!(f, "{id}"),
            LocationId::External(place_id) => write!(f, "places_{place_id}"),
        }
    }
}

impl Serialize for LocationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LocationId::Internal(id) => serializer.serialize_i64(*id),
            LocationId::External(_) => serializer.collect_str(self),
        }
    }
}

/// Accessibility attributes returned by a details lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessibilityOptions {
    /// `Some(false)` is the only value that excludes a record from results.
    pub wheelchair_accessible_entrance: Option<bool>,
}

impl AccessibilityOptions {
    /// `true` only when the entrance was explicitly reported as inaccessible.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.wheelchair_accessible_entrance == Some(false)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub category_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub place_id: Option<String>,
    pub is_google_place: bool,
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_options: Option<AccessibilityOptions>,
    /// Kilometres from the search reference point, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Location {
    #[must_use]
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Key used for de-duplication: the external `place_id` when present,
    /// otherwise the rendered id.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        self.place_id
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    #[must_use]
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    /// Category label for display: explicit category name, else the first
    /// type tag.
    #[must_use]
    pub fn display_category(&self) -> Option<&str> {
        self.category_name
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.types.first().map(String::as_str))
    }
}

/// Remove records that share a [`Location::dedup_key`], keeping the first
/// occurrence and preserving order.
#[must_use]
pub fn dedup_by_place_id(locations: Vec<Location>) -> Vec<Location> {
    let mut seen = HashSet::new();
    locations
        .into_iter()
        .filter(|loc| seen.insert(loc.dedup_key()))
        .collect()
}

/// Category as served by the internal backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaceReview {
    pub rating: Option<f64>,
    pub author_name: Option<String>,
    pub text: Option<String>,
}

/// Rich details for one external place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    /// Fully resolved photo URLs, first one is the primary photo.
    pub photo_urls: Vec<String>,
    pub types: Vec<String>,
    pub website: Option<String>,
    pub international_phone_number: Option<String>,
    /// Monday-first opening hours lines.
    pub weekday_text: Vec<String>,
    pub reviews: Vec<PlaceReview>,
    pub url: Option<String>,
    pub accessibility_options: Option<AccessibilityOptions>,
}
