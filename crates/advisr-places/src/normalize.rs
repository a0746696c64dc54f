//! Conversion from places-service records into shared domain types.

use advisr_core::{AccessibilityOptions, Location, LocationId, PlaceDetails, PlaceReview};

use crate::types::{Place, RawDetails};

/// Fallback category label when neither a category input nor a type tag is
/// available.
pub const FALLBACK_CATEGORY: &str = "Place";

/// Category label for an external keyword-search result: the category the
/// user typed, else the first type tag, else [`FALLBACK_CATEGORY`].
#[must_use]
pub fn external_category_name(category_input: Option<&str>, types: &[String]) -> String {
    category_input
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .or_else(|| types.first().cloned())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_owned())
}

/// Convert a search result into a [`Location`] labelled with `category_name`.
#[must_use]
pub fn place_to_location(place: Place, category_name: String) -> Location {
    Location {
        id: LocationId::External(place.place_id.clone()),
        name: place.name,
        category_name: Some(category_name),
        latitude: place.position.lat,
        longitude: place.position.lng,
        address: place.address,
        rating: place.rating,
        user_ratings_total: place.user_ratings_total,
        place_id: Some(place.place_id),
        is_google_place: true,
        types: place.types,
        accessibility_options: None,
        distance_km: None,
    }
}

pub(crate) fn normalize_details(
    raw: RawDetails,
    photo_url: impl Fn(&str) -> String,
) -> PlaceDetails {
    PlaceDetails {
        name: raw.name,
        formatted_address: raw.formatted_address,
        rating: raw.rating,
        user_ratings_total: raw.user_ratings_total,
        photo_urls: raw
            .photos
            .iter()
            .map(|p| photo_url(&p.photo_reference))
            .collect(),
        types: raw.types,
        website: raw.website,
        international_phone_number: raw.international_phone_number,
        weekday_text: raw
            .opening_hours
            .map(|h| h.weekday_text)
            .unwrap_or_default(),
        reviews: raw
            .reviews
            .into_iter()
            .map(|r| PlaceReview {
                rating: r.rating,
                author_name: r.author_name,
                text: r.text,
            })
            .collect(),
        url: raw.url,
        accessibility_options: raw.wheelchair_accessible_entrance.map(|entrance| {
            AccessibilityOptions {
                wheelchair_accessible_entrance: Some(entrance),
            }
        }),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
