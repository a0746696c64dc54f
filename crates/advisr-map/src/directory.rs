use async_trait::async_trait;

use advisr_api::{ApiClient, ApiError};
use advisr_core::{Category, LatLng, Location, NewCategory, NewLocation, SearchQuery};

/// Port for the internal locations backend.
#[async_trait]
pub trait LocationDirectory: Send + Sync {
    async fn active_categories(&self) -> Result<Vec<Category>, ApiError>;

    async fn list_locations(&self, reference: Option<LatLng>) -> Result<Vec<Location>, ApiError>;

    async fn search_locations(
        &self,
        query: &SearchQuery,
        reference: Option<LatLng>,
    ) -> Result<Vec<Location>, ApiError>;

    async fn create_location(&self, payload: &NewLocation) -> Result<Location, ApiError>;

    async fn create_category(&self, payload: &NewCategory) -> Result<Category, ApiError>;
}

#[async_trait]
impl LocationDirectory for ApiClient {
    async fn active_categories(&self) -> Result<Vec<Category>, ApiError> {
        ApiClient::active_categories(self).await
    }

    async fn list_locations(&self, reference: Option<LatLng>) -> Result<Vec<Location>, ApiError> {
        ApiClient::list_locations(self, reference).await
    }

    async fn search_locations(
        &self,
        query: &SearchQuery,
        reference: Option<LatLng>,
    ) -> Result<Vec<Location>, ApiError> {
        ApiClient::search_locations(self, query, reference).await
    }

    async fn create_location(&self, payload: &NewLocation) -> Result<Location, ApiError> {
        ApiClient::create_location(self, payload).await
    }

    async fn create_category(&self, payload: &NewCategory) -> Result<Category, ApiError> {
        ApiClient::create_category(self, payload).await
    }
}
