use std::sync::Arc;

use async_trait::async_trait;

use advisr_core::PlaceDetails;

use crate::error::PlacesError;
use crate::types::{NearbyRequest, PlacesPage, TextSearchRequest};

/// Port for the external places-search service.
///
/// Implemented over HTTP by [`crate::GooglePlacesClient`]; orchestration
/// tests substitute in-memory fakes.
#[async_trait]
pub trait PlacesService: Send + Sync {
    /// Places of one type around a point. A single page; nearby results are
    /// never paginated by the orchestrator.
    async fn nearby_search(&self, request: &NearbyRequest) -> Result<PlacesPage, PlacesError>;

    /// One page of a free-text search. `page_token` is the previous page's
    /// `next_page_token`; when present the other request fields are ignored
    /// by the service.
    async fn text_search(
        &self,
        request: &TextSearchRequest,
        page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError>;

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError>;
}

#[async_trait]
impl<T: PlacesService + ?Sized> PlacesService for Arc<T> {
    async fn nearby_search(&self, request: &NearbyRequest) -> Result<PlacesPage, PlacesError> {
        (**self).nearby_search(request).await
    }

    async fn text_search(
        &self,
        request: &TextSearchRequest,
        page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError> {
        (**self).text_search(request, page_token).await
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        (**self).place_details(place_id).await
    }
}
