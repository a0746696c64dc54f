//! Accessibility post-filter for external search results.

use std::time::Duration;

use futures::future::join_all;

use advisr_core::Location;
use advisr_places::PlacesService;

#[derive(Debug, Clone, Copy)]
pub struct DetailBatching {
    pub batch_size: usize,
    pub delay: Duration,
}

/// Look up details for every external record in batches, attach the
/// accessibility options, and drop records whose entrance was explicitly
/// reported as not wheelchair accessible.
///
/// Missing data or a failed lookup keeps the record. Internal records pass
/// through without a lookup.
pub async fn filter_accessible<S: PlacesService + ?Sized>(
    places: &S,
    mut locations: Vec<Location>,
    batching: DetailBatching,
) -> Vec<Location> {
    let batch_size = batching.batch_size.max(1);
    let batches = locations.len().div_ceil(batch_size);

    for (i, batch) in locations.chunks_mut(batch_size).enumerate() {
        let lookups = batch.iter().map(|loc| async move {
            match loc.place_id.as_deref() {
                Some(place_id) if loc.is_google_place => {
                    match places.place_details(place_id).await {
                        Ok(details) => details.accessibility_options,
                        Err(e) => {
                            tracing::debug!(place_id, error = %e, "details lookup failed, keeping place");
                            None
                        }
                    }
                }
                _ => None,
            }
        });
        let results = join_all(lookups).await;
        for (loc, options) in batch.iter_mut().zip(results) {
            if options.is_some() {
                loc.accessibility_options = options;
            }
        }

        if i + 1 < batches && !batching.delay.is_zero() {
            tokio::time::sleep(batching.delay).await;
        }
    }

    let before = locations.len();
    locations.retain(|loc| {
        !loc
            .accessibility_options
            .as_ref()
            .is_some_and(advisr_core::AccessibilityOptions::is_restricted)
    });
    tracing::debug!(
        before,
        kept = locations.len(),
        "accessibility filter applied"
    );
    locations
}
