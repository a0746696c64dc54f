//! HTTP client for the internal locations backend.
//!
//! Wraps `reqwest` with backend-specific list-envelope handling and typed
//! conversion into [`Location`] records. Read endpoints surface failures as
//! [`ApiError`]; callers decide whether a failure degrades to an empty list.

use std::time::Duration;

use reqwest::{Client, Url};

use advisr_core::{Category, LatLng, Location, NewCategory, NewLocation, SearchQuery};

use crate::error::ApiError;
use crate::types::{list_items, rejection_message, ApiLocation};

/// Client for the internal REST API.
///
/// Use [`ApiClient::new`] with the configured base URL, e.g.
/// `http://localhost:8000/api`; tests point it at a wiremock server.
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a new client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Fetches active categories (`GET /categories/active/`).
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ApiError::UnexpectedShape`] / [`ApiError::Deserialize`] on a bad body.
    pub async fn active_categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint("categories/active/", &[])?;
        let items = self.get_list(&url).await?;
        items
            .into_iter()
            .map(|item| {
                serde_json::from_value::<Category>(item).map_err(|e| ApiError::Deserialize {
                    context: format!("category from {url}"),
                    source: e,
                })
            })
            .collect()
    }

    /// Fetches every location (`GET /locations/`).
    ///
    /// When `reference` is given its coordinates are sent as `lat` / `lng` so
    /// the backend fills in `distance`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::active_categories`].
    pub async fn list_locations(
        &self,
        reference: Option<LatLng>,
    ) -> Result<Vec<Location>, ApiError> {
        let params = reference_params(reference);
        let url = self.endpoint("locations/", &params)?;
        self.get_locations(&url).await
    }

    /// Filtered search (`GET /locations/search/?q=&category=`).
    ///
    /// # Errors
    ///
    /// Same as [`Self::active_categories`].
    pub async fn search_locations(
        &self,
        query: &SearchQuery,
        reference: Option<LatLng>,
    ) -> Result<Vec<Location>, ApiError> {
        let mut params = query.internal_params();
        params.extend(reference_params(reference));
        let url = self.endpoint("locations/search/", &params)?;
        self.get_locations(&url).await
    }

    /// Creates a location (`POST /locations/`) and returns the stored record.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Rejected`] when the backend answers non-2xx.
    /// - [`ApiError::Http`] / [`ApiError::Deserialize`] otherwise.
    pub async fn create_location(&self, payload: &NewLocation) -> Result<Location, ApiError> {
        let url = self.endpoint("locations/", &[])?;
        let body = self.post_json(&url, payload).await?;
        let created: ApiLocation =
            serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
                context: format!("created location from {url}"),
                source: e,
            })?;
        Ok(created.into_location())
    }

    /// Creates a category (`POST /categories/`).
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_location`].
    pub async fn create_category(&self, payload: &NewCategory) -> Result<Category, ApiError> {
        let url = self.endpoint("categories/", &[])?;
        let body = self.post_json(&url, payload).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
            context: format!("created category from {url}"),
            source: e,
        })
    }

    /// Joins `path` to the base URL and appends percent-encoded parameters.
    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get_locations(&self, url: &Url) -> Result<Vec<Location>, ApiError> {
        let items = self.get_list(url).await?;
        let total = items.len();
        let locations: Vec<Location> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<ApiLocation>(item) {
                Ok(loc) => Some(loc.into_location()),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "skipping malformed location record");
                    None
                }
            })
            .collect();
        tracing::debug!(url = %url, total, kept = locations.len(), "internal locations fetched");
        Ok(locations)
    }

    async fn get_list(&self, url: &Url) -> Result<Vec<serde_json::Value>, ApiError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;
        list_items(value).ok_or_else(|| ApiError::UnexpectedShape {
            context: url.to_string(),
        })
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &Url,
        payload: &T,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self.client.post(url.clone()).json(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let value: serde_json::Value = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
                context: url.to_string(),
                source: e,
            })?
        };

        if !status.is_success() {
            let message = rejection_message(&value)
                .unwrap_or_else(|| format!("request to {} failed", url.path()));
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(value)
    }
}

fn reference_params(reference: Option<LatLng>) -> Vec<(&'static str, String)> {
    reference
        .map(|p| vec![("lat", p.lat.to_string()), ("lng", p.lng.to_string())])
        .unwrap_or_default()
}
