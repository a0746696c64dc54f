//! Result list panel entries.

use serde::Serialize;

use advisr_core::{category_emoji, haversine_km, LatLng, Location};

/// Tag shown on entries from the external places service.
pub const EXTERNAL_TAG: &str = "Google Maps";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    /// Marker key; selecting the entry focuses this marker.
    pub key: String,
    pub emoji: &'static str,
    pub name: String,
    pub category: Option<String>,
    pub source_tag: Option<&'static str>,
    pub rating: Option<f64>,
    pub distance_km: Option<f64>,
}

impl ListEntry {
    /// Distance as shown in the panel: metres below one kilometre.
    #[must_use]
    pub fn distance_label(&self) -> Option<String> {
        self.distance_km.map(format_distance)
    }
}

#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{km:.1} km")
    }
}

/// One entry per location, in order. Distance is the server-computed value
/// when present, else the great-circle distance from `reference`.
#[must_use]
pub fn list_entries(locations: &[&Location], reference: Option<LatLng>) -> Vec<ListEntry> {
    locations
        .iter()
        .map(|loc| ListEntry {
            key: loc.dedup_key(),
            emoji: category_emoji(loc),
            name: loc.name.clone(),
            category: loc.display_category().map(str::to_owned),
            source_tag: loc.is_google_place.then_some(EXTERNAL_TAG),
            rating: loc.rating,
            distance_km: loc
                .distance_km
                .or_else(|| reference.map(|r| haversine_km(r, loc.position()))),
        })
        .collect()
}
