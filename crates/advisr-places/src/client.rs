//! Reqwest-backed adapter for the Google Places web service.
//!
//! Owns transport details only: URL construction, the API key, HTTP and
//! service-status error mapping, and JSON decoding. Normalization into
//! [`advisr_core::Location`] happens in [`crate::normalize`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use advisr_core::PlaceDetails;

use crate::error::PlacesError;
use crate::normalize::normalize_details;
use crate::service::PlacesService;
use crate::types::{
    DetailsResponse, NearbyRequest, Place, PlacesPage, RawPlace, SearchResponse,
    TextSearchRequest,
};

/// Field mask for details lookups. Limits billing to what the popup, the
/// details panel and the accessibility filter read.
const DETAIL_FIELDS: &str = "name,formatted_address,rating,user_ratings_total,photos,types,\
website,international_phone_number,opening_hours,reviews,url,wheelchair_accessible_entrance";

const PHOTO_MAX_WIDTH: u32 = 400;

/// HTTP client for the places `nearbysearch`, `textsearch` and `details`
/// JSON endpoints.
pub struct GooglePlacesClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl GooglePlacesClient {
    /// Creates a client rooted at `base_url`
    /// (e.g. `https://maps.googleapis.com/maps/api/place`).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
        })
    }

    /// Public URL of a photo, usable directly as an `<img src>`.
    #[must_use]
    pub fn photo_url(&self, photo_reference: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}photo", self.base_url.path()));
        url.query_pairs_mut()
            .append_pair("maxwidth", &PHOTO_MAX_WIDTH.to_string())
            .append_pair("photo_reference", photo_reference)
            .append_pair("key", &self.api_key);
        url.to_string()
    }

    /// Builds `{base}{endpoint}` with the API key plus `params`.
    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, PlacesError> {
        // The key travels in the query string; log the endpoint path only.
        let endpoint = url.path().to_owned();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                url: endpoint,
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: endpoint,
            source: e,
        })
    }

    async fn search(&self, url: Url) -> Result<PlacesPage, PlacesError> {
        let endpoint = url.path().to_owned();
        let response: SearchResponse = self.get_json(url).await?;
        check_status(&response.status, response.error_message)?;

        let total = response.results.len();
        let places: Vec<Place> = response
            .results
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<RawPlace>(item) {
                Ok(raw) => Some(Place::from(raw)),
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "skipping malformed place");
                    None
                }
            })
            .collect();
        tracing::debug!(endpoint = %endpoint, total, kept = places.len(), "places page fetched");

        Ok(PlacesPage {
            places,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

/// `OK` and `ZERO_RESULTS` are successes; every other status is an error.
fn check_status(status: &str, error_message: Option<String>) -> Result<(), PlacesError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(PlacesError::Status {
            status: other.to_owned(),
            message: error_message.unwrap_or_else(|| "no error message".to_owned()),
        }),
    }
}

fn location_param(request_location: advisr_core::LatLng) -> String {
    format!("{},{}", request_location.lat, request_location.lng)
}

#[async_trait]
impl PlacesService for GooglePlacesClient {
    async fn nearby_search(&self, request: &NearbyRequest) -> Result<PlacesPage, PlacesError> {
        let url = self.build_url(
            "nearbysearch/json",
            &[
                ("location", location_param(request.location)),
                ("radius", request.radius_m.to_string()),
                ("type", request.place_type.clone()),
            ],
        )?;
        self.search(url).await
    }

    async fn text_search(
        &self,
        request: &TextSearchRequest,
        page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError> {
        let params = match page_token {
            Some(token) => vec![("pagetoken", token.to_owned())],
            None => vec![
                ("query", request.query.clone()),
                ("location", location_param(request.location)),
                ("radius", request.radius_m.to_string()),
            ],
        };
        let url = self.build_url("textsearch/json", &params)?;
        self.search(url).await
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            "details/json",
            &[
                ("place_id", place_id.to_owned()),
                ("fields", DETAIL_FIELDS.to_owned()),
            ],
        )?;
        let response: DetailsResponse = self.get_json(url).await?;
        check_status(&response.status, response.error_message)?;
        let raw = response.result.unwrap_or_default();
        Ok(normalize_details(raw, |reference| self.photo_url(reference)))
    }
}
