//! Command handlers. Each one drives the orchestrator against a headless
//! GeoJSON surface and prints the result on stdout.

use std::sync::Arc;

use advisr_api::ApiClient;
use advisr_core::{
    default_categories, load_categories, AppConfig, CategoryForm, LatLng, LocationForm,
    SearchQuery,
};
use advisr_map::{
    FixedGeolocator, GeoJsonSurface, Geolocator, LocationDirectory, Orchestrator,
    OrchestratorSettings, UnsupportedGeolocator,
};
use advisr_places::GooglePlacesClient;

pub(crate) fn point(lat: Option<f64>, lng: Option<f64>) -> Option<LatLng> {
    lat.zip(lng).map(|(lat, lng)| LatLng::new(lat, lng))
}

pub(crate) fn search_url(location: &str, category: &str, keywords: &str) -> String {
    SearchQuery::new(location, category, keywords).navigation_path()
}

pub(crate) struct App {
    orchestrator: Orchestrator,
    directory: Arc<ApiClient>,
    surface: GeoJsonSurface,
    position: Option<LatLng>,
}

impl App {
    /// Wire the HTTP clients, the category table and a surface centred on
    /// `position` (or the configured default centre).
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be constructed or the categories
    /// file cannot be loaded.
    pub(crate) fn build(config: &AppConfig, position: Option<LatLng>) -> anyhow::Result<Self> {
        let directory = Arc::new(ApiClient::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?);
        let places = Arc::new(GooglePlacesClient::new(
            &config.places_base_url,
            &config.places_api_key,
            config.request_timeout_secs,
            &config.user_agent,
        )?);
        let categories = match &config.categories_path {
            Some(path) => load_categories(path)?,
            None => default_categories(),
        };
        let geolocator: Arc<dyn Geolocator> = match position {
            Some(coords) => Arc::new(FixedGeolocator::new(coords, 0.0)),
            None => Arc::new(UnsupportedGeolocator),
        };
        let surface = GeoJsonSurface::new(position.unwrap_or(config.default_center));

        let orchestrator = Orchestrator::new(
            Arc::clone(&directory) as Arc<dyn LocationDirectory>,
            places,
            geolocator,
            Arc::new(surface.clone()),
            categories,
            OrchestratorSettings::from_config(config),
        );

        Ok(Self {
            orchestrator,
            directory,
            surface,
            position,
        })
    }

    fn print_map(&self) -> anyhow::Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(&self.surface.to_feature_collection())?
        );
        Ok(())
    }

    pub(crate) async fn nearby(&self) -> anyhow::Result<()> {
        let outcome = self.orchestrator.start().await;
        tracing::info!(count = outcome.count, "nearby run finished");
        self.print_map()
    }

    pub(crate) async fn search(&self, query: &SearchQuery) -> anyhow::Result<()> {
        if self.position.is_some() {
            self.orchestrator.locate().await;
        }
        let outcome = self.orchestrator.run_search(query).await;
        tracing::info!(count = outcome.count, "search finished");
        self.print_map()
    }

    pub(crate) async fn categories(&self) -> anyhow::Result<()> {
        let categories = self.directory.active_categories().await?;
        println!("{}", serde_json::to_string_pretty(&categories)?);
        Ok(())
    }

    pub(crate) async fn add_location(&self, form: &LocationForm) -> anyhow::Result<()> {
        let created = self.orchestrator.create_location(form).await?;
        tracing::info!(name = %created.name, id = %created.id, "location added");
        self.print_map()
    }

    pub(crate) async fn add_category(&self, form: &CategoryForm) -> anyhow::Result<()> {
        let category = self.orchestrator.create_category(form).await?;
        println!("{}", serde_json::to_string_pretty(&category)?);
        Ok(())
    }
}
