//! Places-and-map orchestration: location resolution, nearby aggregation,
//! keyword search and marker rendering over a pluggable map surface.

pub mod accessibility;
pub mod directory;
pub mod error;
pub mod geojson;
pub mod geolocation;
pub mod marker;
pub mod nearby;
pub mod orchestrator;
pub mod panel;
pub mod popup;
pub mod search;
pub mod session;
pub mod surface;
pub mod task;

#[cfg(test)]
mod test_support;

pub use accessibility::{filter_accessible, DetailBatching};
pub use directory::LocationDirectory;
pub use error::SubmitError;
pub use geojson::GeoJsonSurface;
pub use geolocation::{
    resolve_location, FixedGeolocator, GeolocationError, Geolocator, LocationSource, Position,
    PositionOptions, Resolution, ResolveSettings, UnsupportedGeolocator,
};
pub use marker::{Marker, MarkerLayer, CURRENT_LOCATION_KEY, CURRENT_LOCATION_TITLE};
pub use nearby::{aggregate_nearby, NearbySettings};
pub use orchestrator::{Orchestrator, OrchestratorSettings, RefreshOutcome};
pub use panel::{format_distance, list_entries, ListEntry};
pub use search::{keyword_search, SearchResults, SearchSettings};
pub use session::{Generation, Session};
pub use surface::{MapSurface, MarkerSpec, Notice, NoticeKind};
pub use task::{race, CancellableTask, RaceOutcome};
