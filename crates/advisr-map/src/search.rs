//! Keyword / filter search across the internal and external sources.

use std::time::Duration;

use advisr_core::{LatLng, Location, SearchQuery};
use advisr_places::{
    collect_text_pages, external_category_name, place_to_location, PageLimits, PlacesService,
    TextSearchRequest,
};

use crate::accessibility::{filter_accessible, DetailBatching};
use crate::directory::LocationDirectory;

#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub radius_m: u32,
    pub max_pages: usize,
    pub page_delay: Duration,
    pub batching: DetailBatching,
}

/// Results of one keyword search, by source.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub internal: Vec<Location>,
    pub external: Vec<Location>,
}

impl SearchResults {
    #[must_use]
    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Internal records followed by external ones. No cross-source
    /// de-duplication.
    #[must_use]
    pub fn combined(self) -> Vec<Location> {
        let mut all = self.internal;
        all.extend(self.external);
        all
    }
}

/// Run both branches concurrently. Neither branch fails: errors are logged
/// and contribute an empty (or partial) list.
///
/// `center` biases the external search; `reference` is forwarded to the
/// internal backend for distance calculation.
pub async fn keyword_search<D, S>(
    directory: &D,
    places: &S,
    query: &SearchQuery,
    center: LatLng,
    reference: Option<LatLng>,
    settings: SearchSettings,
) -> SearchResults
where
    D: LocationDirectory + ?Sized,
    S: PlacesService + ?Sized,
{
    let (internal, external) = tokio::join!(
        internal_branch(directory, query, reference),
        external_branch(places, query, center, settings),
    );
    tracing::info!(
        internal = internal.len(),
        external = external.len(),
        "keyword search complete"
    );
    SearchResults { internal, external }
}

async fn internal_branch<D: LocationDirectory + ?Sized>(
    directory: &D,
    query: &SearchQuery,
    reference: Option<LatLng>,
) -> Vec<Location> {
    let result = if query.is_empty() {
        directory.list_locations(reference).await
    } else {
        directory.search_locations(query, reference).await
    };
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "internal search failed");
        Vec::new()
    })
}

async fn external_branch<S: PlacesService + ?Sized>(
    places: &S,
    query: &SearchQuery,
    center: LatLng,
    settings: SearchSettings,
) -> Vec<Location> {
    let Some(text) = query.external_text_query() else {
        return Vec::new();
    };

    let request = TextSearchRequest {
        query: text,
        location: center,
        radius_m: settings.radius_m,
    };
    let mut found = Vec::new();
    let limits = PageLimits::new(settings.max_pages, settings.page_delay);
    if let Err(e) = collect_text_pages(places, &request, limits, &mut found).await {
        tracing::warn!(query = %request.query, error = %e, kept = found.len(), "external search failed");
    }

    let category_input = Some(query.category.as_str());
    let locations: Vec<Location> = found
        .into_iter()
        .map(|place| {
            let category = external_category_name(category_input, &place.types);
            place_to_location(place, category)
        })
        .collect();

    filter_accessible(places, locations, settings.batching).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{internal_location, place, FakeDirectory, FakePlaces};

    const CENTER: LatLng = LatLng::new(23.8103, 90.4125);

    fn settings() -> SearchSettings {
        SearchSettings {
            radius_m: 3000,
            max_pages: 3,
            page_delay: Duration::from_secs(2),
            batching: DetailBatching {
                batch_size: 5,
                delay: Duration::from_millis(500),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_lists_everything_internal_only() {
        let directory = FakeDirectory {
            all: vec![internal_location(1, "Inn"), internal_location(2, "Lodge")],
            ..FakeDirectory::default()
        };
        let places = FakePlaces::new();

        let results = keyword_search(
            &directory,
            &places,
            &SearchQuery::new("  ", "", ""),
            CENTER,
            None,
            settings(),
        )
        .await;

        assert_eq!(directory.calls(), vec!["list"]);
        assert!(places.calls().is_empty());
        assert!(results.external.is_empty());
        let names: Vec<_> = results.combined().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Inn", "Lodge"]);
    }

    #[tokio::test(start_paused = true)]
    async fn filtered_query_hits_both_sources_internal_first() {
        let directory = FakeDirectory {
            matches: vec![internal_location(7, "Ramp Hotel")],
            ..FakeDirectory::default()
        };
        let places = FakePlaces::new()
            .text(
                "Gulshan hotels ramp",
                vec![vec![place("g1", &["lodging"]), place("g2", &["lodging"])]],
            )
            .details("g2", Some(false));

        let results = keyword_search(
            &directory,
            &places,
            &SearchQuery::new("Gulshan", "hotels", "ramp"),
            CENTER,
            None,
            settings(),
        )
        .await;

        assert_eq!(directory.calls(), vec!["search:q=Gulshan ramp&category=hotels"]);
        assert_eq!(results.external.len(), 1);
        assert_eq!(results.external[0].category_name.as_deref(), Some("hotels"));
        let combined = results.combined();
        assert_eq!(combined[0].name, "Ramp Hotel");
        assert_eq!(combined[1].place_id.as_deref(), Some("g1"));
    }

    #[tokio::test(start_paused = true)]
    async fn external_category_falls_back_to_type() {
        let places = FakePlaces::new().text("ramp", vec![vec![place("c1", &["cafe", "food"])]]);
        let results = keyword_search(
            &FakeDirectory::default(),
            &places,
            &SearchQuery::new("", "", "ramp"),
            CENTER,
            None,
            settings(),
        )
        .await;
        assert_eq!(results.external[0].category_name.as_deref(), Some("cafe"));
    }

    #[tokio::test(start_paused = true)]
    async fn external_pages_capped_and_spaced() {
        let pages: Vec<Vec<_>> = (0..5).map(|i| vec![place(&format!("p{i}"), &[])]).collect();
        let places = FakePlaces::new().text("parks", pages);
        let started = tokio::time::Instant::now();

        let results = keyword_search(
            &FakeDirectory::default(),
            &places,
            &SearchQuery::new("", "parks", ""),
            CENTER,
            None,
            settings(),
        )
        .await;

        assert_eq!(results.external.len(), 3);
        assert_eq!(places.calls_with_prefix("text:").len(), 3);
        assert!(started.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn internal_failure_contributes_empty_list() {
        let directory = FakeDirectory {
            fail_reads: true,
            ..FakeDirectory::default()
        };
        let places = FakePlaces::new().text("cafes", vec![vec![place("c1", &["cafe"])]]);

        let results = keyword_search(
            &directory,
            &places,
            &SearchQuery::new("", "cafes", ""),
            CENTER,
            None,
            settings(),
        )
        .await;

        assert!(results.internal.is_empty());
        assert_eq!(results.len(), 1);
    }
}
