pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod service;
pub mod types;

pub use client::GooglePlacesClient;
pub use error::PlacesError;
pub use normalize::{external_category_name, place_to_location};
pub use pagination::{collect_text_pages, PageLimits, SERVICE_MAX_PAGES};
pub use service::PlacesService;
pub use types::{NearbyRequest, Place, PlacesPage, TextSearchRequest};
