//! The places-and-map orchestrator.
//!
//! Drives one map view: resolves the device location, runs nearby and
//! keyword searches, and renders the winning result set as markers, a list
//! panel and popups on a [`MapSurface`]. Every refresh takes a
//! [`Generation`] up front and is rendered only if no newer refresh started
//! while it ran.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Datelike, Weekday};

use advisr_core::{
    AppConfig, Category, CategoryForm, LatLng, Location, LocationForm, NearbyCategory, SearchQuery,
};
use advisr_api::ApiError;
use advisr_places::PlacesService;

use crate::accessibility::DetailBatching;
use crate::directory::LocationDirectory;
use crate::error::SubmitError;
use crate::geolocation::{resolve_location, Geolocator, LocationSource, ResolveSettings, Resolution};
use crate::marker::{MarkerLayer, CURRENT_LOCATION_KEY};
use crate::nearby::{aggregate_nearby, NearbySettings};
use crate::panel::list_entries;
use crate::popup::{details_panel, location_popup};
use crate::search::{keyword_search, SearchSettings};
use crate::session::{Generation, Session};
use crate::surface::{MapSurface, Notice, FOCUS_ZOOM, INITIAL_ZOOM, LOCATED_ZOOM};

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    pub resolve: ResolveSettings,
    pub nearby: NearbySettings,
    pub search: SearchSettings,
}

impl OrchestratorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            resolve: ResolveSettings {
                default_center: config.default_center,
                guard: config.locate_guard(),
                watch_timeout: config.watch_timeout(),
            },
            nearby: NearbySettings {
                radius_m: config.search_radius_m,
                category_timeout: config.category_timeout(),
                category_delay: config.category_delay(),
                page_delay: config.nearby_page_delay(),
            },
            search: SearchSettings {
                radius_m: config.search_radius_m,
                max_pages: config.search_max_pages,
                page_delay: config.search_page_delay(),
                batching: DetailBatching {
                    batch_size: config.detail_batch_size,
                    delay: config.detail_batch_delay(),
                },
            },
        }
    }
}

/// What a refresh did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub generation: Generation,
    /// Markers drawn; zero when the refresh was stale.
    pub count: usize,
    /// `false` when a newer refresh superseded this one.
    pub applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshKind {
    Nearby,
    Search { filtered: bool },
}

/// The backend's own message for a rejected write, else the error text.
fn backend_message(error: &ApiError) -> String {
    match error {
        ApiError::Rejected { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn local_weekday() -> Weekday {
    chrono::Local::now().weekday()
}

pub struct Orchestrator {
    session: Session,
    directory: Arc<dyn LocationDirectory>,
    places: Arc<dyn PlacesService>,
    geolocator: Arc<dyn Geolocator>,
    surface: Arc<dyn MapSurface>,
    categories: Vec<NearbyCategory>,
    markers: Mutex<MarkerLayer>,
    settings: OrchestratorSettings,
    today: fn() -> Weekday,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        directory: Arc<dyn LocationDirectory>,
        places: Arc<dyn PlacesService>,
        geolocator: Arc<dyn Geolocator>,
        surface: Arc<dyn MapSurface>,
        categories: Vec<NearbyCategory>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            session: Session::new(settings.resolve.default_center),
            directory,
            places,
            geolocator,
            surface,
            categories,
            markers: Mutex::new(MarkerLayer::new()),
            settings,
            today: local_weekday,
        }
    }

    /// Override the weekday used to pick today's opening hours.
    #[must_use]
    pub fn with_clock(mut self, today: fn() -> Weekday) -> Self {
        self.today = today;
        self
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn layer(&self) -> MutexGuard<'_, MarkerLayer> {
        self.markers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initial flow: default view, category names, location, nearby places.
    pub async fn start(&self) -> RefreshOutcome {
        self.surface
            .set_view(self.session.default_center(), INITIAL_ZOOM);
        self.load_categories().await;
        self.locate().await;
        self.refresh_nearby().await
    }

    /// Fetch active category names for autocomplete. Failure leaves the
    /// previous names in place.
    pub async fn load_categories(&self) -> usize {
        match self.directory.active_categories().await {
            Ok(categories) => {
                let names: Vec<String> = categories.into_iter().map(|c| c.name).collect();
                let count = names.len();
                self.session.set_category_names(names);
                count
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load categories");
                0
            }
        }
    }

    #[must_use]
    pub fn suggest_categories(&self, prefix: &str) -> Vec<String> {
        self.session.suggest_categories(prefix)
    }

    /// Resolve the device location and move the map there, or fall back to
    /// the default centre with a notice.
    pub async fn locate(&self) -> Resolution {
        self.surface
            .set_status(Some("Finding your current location..."));
        let resolution =
            resolve_location(Arc::clone(&self.geolocator), self.settings.resolve).await;

        match &resolution.source {
            LocationSource::Device(position) => {
                tracing::info!(
                    lat = position.coords.lat,
                    lng = position.coords.lng,
                    accuracy_m = position.accuracy_m,
                    "device location resolved"
                );
                self.session.set_device_position(Some(*position));
                self.surface.set_view(position.coords, LOCATED_ZOOM);
                self.layer()
                    .set_current_location(self.surface.as_ref(), *position);
            }
            LocationSource::Fallback(error) => {
                self.session.set_device_position(None);
                self.surface.set_status(Some("Using default location..."));
                self.surface.set_view(resolution.coords, INITIAL_ZOOM);
                self.surface.notify(Notice::error(error.user_message()));
            }
        }
        resolution
    }

    /// Aggregate nearby places for every category around the session
    /// reference point and render them.
    pub async fn refresh_nearby(&self) -> RefreshOutcome {
        let generation = self.session.begin_refresh();
        let reference = self.session.reference();
        tracing::info!(generation = generation.value(), "nearby refresh started");

        let surface = Arc::clone(&self.surface);
        let locations = aggregate_nearby(
            self.places.as_ref(),
            reference,
            &self.categories,
            self.settings.nearby,
            |i, n, category| {
                surface.set_status(Some(&format!("Searching: {} ({i}/{n})", category.label)));
            },
        )
        .await;

        self.apply(generation, locations, RefreshKind::Nearby)
    }

    /// Keyword / filter search over both sources, biased to the map centre.
    pub async fn run_search(&self, query: &SearchQuery) -> RefreshOutcome {
        let generation = self.session.begin_refresh();
        let center = self.surface.center();
        let reference = self.session.device_position().map(|p| p.coords);
        tracing::info!(
            generation = generation.value(),
            location = %query.location,
            category = %query.category,
            keywords = %query.keywords,
            "keyword search started"
        );

        let results = keyword_search(
            self.directory.as_ref(),
            self.places.as_ref(),
            query,
            center,
            reference,
            self.settings.search,
        )
        .await;

        self.apply(
            generation,
            results.combined(),
            RefreshKind::Search {
                filtered: !query.is_empty(),
            },
        )
    }

    fn apply(
        &self,
        generation: Generation,
        locations: Vec<Location>,
        kind: RefreshKind,
    ) -> RefreshOutcome {
        let mut layer = self.layer();
        if !self.session.is_current(generation) {
            tracing::debug!(
                generation = generation.value(),
                current = self.session.current_generation().value(),
                "dropping stale results"
            );
            return RefreshOutcome {
                generation,
                count: 0,
                applied: false,
            };
        }

        let count = layer.replace_all(self.surface.as_ref(), locations);
        match (count, layer.bounds()) {
            (1, Some(bounds)) => self.surface.set_view(bounds.center(), LOCATED_ZOOM),
            (_, Some(bounds)) => self.surface.fit_bounds(bounds),
            (_, None) => {}
        }

        self.surface.show_list(list_entries(
            &layer.locations(),
            Some(self.session.reference()),
        ));
        self.surface.set_status(None);

        match kind {
            RefreshKind::Nearby if count > 0 => {
                self.surface
                    .notify(Notice::success(format!("{count} places found")));
            }
            RefreshKind::Nearby => {
                self.surface
                    .notify(Notice::error("No places found. Please try again."));
            }
            RefreshKind::Search { filtered: true } if count > 0 => {
                self.surface
                    .notify(Notice::success(format!("Found {count} location(s)")));
            }
            RefreshKind::Search { .. } => {}
        }

        tracing::info!(generation = generation.value(), count, "results rendered");
        RefreshOutcome {
            generation,
            count,
            applied: true,
        }
    }

    /// Remove every result marker; the current-location marker stays.
    pub fn clear_markers(&self) {
        self.layer().clear();
        self.surface.show_list(Vec::new());
    }

    /// Marker click: close other popups, fetch details for external records,
    /// and open this marker's popup. Returns `false` for an unknown key.
    pub async fn select_marker(&self, key: &str) -> bool {
        if key == CURRENT_LOCATION_KEY {
            return self.layer().open_current_location();
        }
        let Some(location) = self.layer().location(key).cloned() else {
            return false;
        };

        let details = self.fetch_details(&location).await;
        let html = location_popup(&location, details.as_ref(), (self.today)());
        self.layer().open_exclusive(key, html)
    }

    /// List-entry click: centre on the marker at focus zoom and open it.
    pub async fn focus_location(&self, key: &str) -> bool {
        let Some(position) = self.layer().location(key).map(Location::position) else {
            return false;
        };
        self.surface.set_view(position, FOCUS_ZOOM);
        self.select_marker(key).await
    }

    /// Render the details panel for a displayed record.
    pub async fn show_details(&self, key: &str) -> bool {
        let Some(location) = self.layer().location(key).cloned() else {
            return false;
        };
        let details = self.fetch_details(&location).await;
        self.surface
            .show_details(details_panel(&location, details.as_ref(), (self.today)()));
        true
    }

    async fn fetch_details(&self, location: &Location) -> Option<advisr_core::PlaceDetails> {
        let place_id = location.place_id.as_deref().filter(|_| location.is_google_place)?;
        match self.places.place_details(place_id).await {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::warn!(place_id, error = %e, "details lookup failed, using summary");
                None
            }
        }
    }

    /// Fill a form's coordinates from a picked point, or the map centre.
    pub fn coordinates_from_map(&self, form: &mut LocationForm, picked: Option<LatLng>) {
        let point = picked.unwrap_or_else(|| self.surface.center());
        form.set_coordinates(point);
        let message = if picked.is_some() {
            "Location coordinates set from map click!"
        } else {
            "Location coordinates set from map center!"
        };
        self.surface.notify(Notice::success(message));
    }

    /// Validate and submit a new location, then reload the unfiltered list
    /// and centre on the new record.
    ///
    /// # Errors
    ///
    /// [`SubmitError::Invalid`] when validation fails (nothing is sent),
    /// [`SubmitError::Backend`] when the backend rejects the write.
    pub async fn create_location(&self, form: &LocationForm) -> Result<Location, SubmitError> {
        let payload = match form.validate() {
            Ok(payload) => payload,
            Err(e) => {
                self.surface.notify(Notice::error(e.to_string()));
                return Err(e.into());
            }
        };

        match self.directory.create_location(&payload).await {
            Ok(created) => {
                tracing::info!(name = %created.name, "location created");
                self.run_search(&SearchQuery::default()).await;
                self.surface.set_view(created.position(), FOCUS_ZOOM);
                self.surface
                    .notify(Notice::success("Location added successfully!"));
                Ok(created)
            }
            Err(e) => {
                self.surface
                    .notify(Notice::error(format!("Error saving location: {}", backend_message(&e))));
                Err(e.into())
            }
        }
    }

    /// Validate and submit a new category; on success the active category
    /// names are fetched again for autocomplete.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_location`].
    pub async fn create_category(&self, form: &CategoryForm) -> Result<Category, SubmitError> {
        let payload = match form.validate() {
            Ok(payload) => payload,
            Err(e) => {
                self.surface.notify(Notice::error(e.to_string()));
                return Err(e.into());
            }
        };

        match self.directory.create_category(&payload).await {
            Ok(category) => {
                tracing::info!(name = %category.name, "category created");
                self.load_categories().await;
                self.surface
                    .notify(Notice::success("Category added successfully!"));
                Ok(category)
            }
            Err(e) => {
                self.surface
                    .notify(Notice::error(format!("Error saving category: {}", backend_message(&e))));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
