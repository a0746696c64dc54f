//! Sequential nearby aggregation over the fixed category list.

use std::time::Duration;

use advisr_core::{dedup_by_place_id, LatLng, Location, NearbyCategory};
use advisr_places::{
    collect_text_pages, place_to_location, NearbyRequest, PageLimits, Place, PlacesService,
    TextSearchRequest, SERVICE_MAX_PAGES,
};

#[derive(Debug, Clone, Copy)]
pub struct NearbySettings {
    pub radius_m: u32,
    /// Bound on one category, typed query and fallback together.
    pub category_timeout: Duration,
    /// Pause between categories.
    pub category_delay: Duration,
    /// Pause between fallback text-search pages.
    pub page_delay: Duration,
}

/// Query every category around `reference`, one at a time, and merge the
/// results with duplicates removed (first occurrence wins).
///
/// `on_category` is called with the 1-based index, the total and the
/// category before each category starts. Failures and timeouts never abort
/// the aggregation; a timed-out category keeps what it collected.
pub async fn aggregate_nearby<S, F>(
    places: &S,
    reference: LatLng,
    categories: &[NearbyCategory],
    settings: NearbySettings,
    mut on_category: F,
) -> Vec<Location>
where
    S: PlacesService + ?Sized,
    F: FnMut(usize, usize, &NearbyCategory),
{
    let total = categories.len();
    let mut merged: Vec<Location> = Vec::new();

    for (i, category) in categories.iter().enumerate() {
        if i > 0 && !settings.category_delay.is_zero() {
            tokio::time::sleep(settings.category_delay).await;
        }
        on_category(i + 1, total, category);

        let mut found: Vec<Place> = Vec::new();
        let search = search_category(places, reference, category, settings, &mut found);
        if tokio::time::timeout(settings.category_timeout, search)
            .await
            .is_err()
        {
            tracing::warn!(
                category = %category.label,
                count = found.len(),
                timeout_ms = settings.category_timeout.as_millis(),
                "category timed out, keeping partial results"
            );
        }

        tracing::debug!(category = %category.label, count = found.len(), "category done");
        merged.extend(
            found
                .into_iter()
                .map(|p| place_to_location(p, category.label.clone())),
        );
    }

    let before = merged.len();
    let merged = dedup_by_place_id(merged);
    tracing::info!(
        categories = total,
        raw = before,
        count = merged.len(),
        "nearby aggregation complete"
    );
    merged
}

/// Typed nearby query, then the text fallback when it is empty or fails.
async fn search_category<S: PlacesService + ?Sized>(
    places: &S,
    reference: LatLng,
    category: &NearbyCategory,
    settings: NearbySettings,
    found: &mut Vec<Place>,
) {
    let nearby = places
        .nearby_search(&NearbyRequest {
            location: reference,
            radius_m: settings.radius_m,
            place_type: category.place_type.clone(),
        })
        .await;

    match nearby {
        Ok(page) if !page.places.is_empty() => {
            found.extend(page.places);
            return;
        }
        Ok(_) => {
            tracing::debug!(category = %category.label, "nearby search empty, trying text search");
        }
        Err(e) => {
            tracing::warn!(category = %category.label, error = %e, "nearby search failed, trying text search");
        }
    }

    let request = TextSearchRequest {
        query: category.label.clone(),
        location: reference,
        radius_m: settings.radius_m,
    };
    let limits = PageLimits::new(SERVICE_MAX_PAGES, settings.page_delay);
    if let Err(e) = collect_text_pages(places, &request, limits, found).await {
        tracing::warn!(
            category = %category.label,
            error = %e,
            kept = found.len(),
            "text search failed"
        );
    }
}
