//! Request / response types for the external places service.
//!
//! `Raw*` structs mirror the service's JSON; [`Place`] and [`PlacesPage`] are
//! what the rest of the workspace consumes.

use serde::Deserialize;

use advisr_core::LatLng;

/// Typed-radius query: every place of `place_type` within `radius_m`.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub location: LatLng,
    pub radius_m: u32,
    pub place_type: String,
}

/// Free-text query biased to `location` / `radius_m`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchRequest {
    pub query: String,
    pub location: LatLng,
    pub radius_m: u32,
}

/// Summary record from a nearby or text search.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub place_id: String,
    pub name: String,
    pub position: LatLng,
    /// `formatted_address` from text search, `vicinity` from nearby search.
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub types: Vec<String>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacesPage {
    pub places: Vec<Place>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<RawDetails>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGeometry {
    pub location: RawLatLng,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPlace {
    pub place_id: String,
    pub name: String,
    pub geometry: RawGeometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl From<RawPlace> for Place {
    fn from(raw: RawPlace) -> Self {
        Self {
            place_id: raw.place_id,
            name: raw.name,
            position: LatLng::new(raw.geometry.location.lat, raw.geometry.location.lng),
            address: raw.formatted_address.or(raw.vicinity),
            rating: raw.rating,
            user_ratings_total: raw.user_ratings_total,
            types: raw.types,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPhoto {
    pub photo_reference: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawOpeningHours {
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawReview {
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub photos: Vec<RawPhoto>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<RawOpeningHours>,
    #[serde(default)]
    pub reviews: Vec<RawReview>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub wheelchair_accessible_entrance: Option<bool>,
}
