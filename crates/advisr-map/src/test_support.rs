//! In-memory fakes for the places and directory ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use advisr_api::ApiError;
use advisr_core::{
    AccessibilityOptions, Category, LatLng, Location, LocationId, NewCategory, NewLocation,
    PlaceDetails, SearchQuery,
};
use advisr_places::{
    NearbyRequest, Place, PlacesError, PlacesPage, PlacesService, TextSearchRequest,
};

use crate::directory::LocationDirectory;

pub fn place(id: &str, types: &[&str]) -> Place {
    Place {
        place_id: id.to_owned(),
        name: format!("Place {id}"),
        position: LatLng::new(23.80, 90.41),
        address: Some(format!("{id} street")),
        rating: Some(4.0),
        user_ratings_total: Some(10),
        types: types.iter().map(|t| (*t).to_owned()).collect(),
    }
}

pub fn internal_location(id: i64, name: &str) -> Location {
    Location {
        id: LocationId::Internal(id),
        name: name.to_owned(),
        category_name: Some("Hotels".to_owned()),
        latitude: 23.79,
        longitude: 90.40,
        address: None,
        rating: None,
        user_ratings_total: None,
        place_id: None,
        is_google_place: false,
        types: Vec::new(),
        accessibility_options: None,
        distance_km: None,
    }
}

fn service_error() -> PlacesError {
    PlacesError::Status {
        status: "UNKNOWN_ERROR".to_owned(),
        message: "scripted failure".to_owned(),
    }
}

/// Scripted places service. Unscripted nearby types and text queries return
/// empty pages; unscripted details return empty details.
#[derive(Default)]
pub struct FakePlaces {
    nearby: HashMap<String, Option<Vec<Place>>>,
    nearby_delay: HashMap<String, Duration>,
    text_pages: HashMap<String, Vec<Vec<Place>>>,
    text_delay: Duration,
    details: HashMap<String, Option<PlaceDetails>>,
    calls: Mutex<Vec<String>>,
}

impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nearby(mut self, place_type: &str, places: Vec<Place>) -> Self {
        self.nearby.insert(place_type.to_owned(), Some(places));
        self
    }

    pub fn nearby_fails(mut self, place_type: &str) -> Self {
        self.nearby.insert(place_type.to_owned(), None);
        self
    }

    pub fn nearby_delay(mut self, place_type: &str, delay: Duration) -> Self {
        self.nearby_delay.insert(place_type.to_owned(), delay);
        self
    }

    pub fn text(mut self, query: &str, pages: Vec<Vec<Place>>) -> Self {
        self.text_pages.insert(query.to_owned(), pages);
        self
    }

    pub fn text_delay(mut self, delay: Duration) -> Self {
        self.text_delay = delay;
        self
    }

    pub fn details(mut self, place_id: &str, entrance: Option<bool>) -> Self {
        self.details.insert(
            place_id.to_owned(),
            Some(PlaceDetails {
                name: Some(format!("Detailed {place_id}")),
                accessibility_options: entrance.map(|e| AccessibilityOptions {
                    wheelchair_accessible_entrance: Some(e),
                }),
                ..PlaceDetails::default()
            }),
        );
        self
    }

    pub fn details_fail(mut self, place_id: &str) -> Self {
        self.details.insert(place_id.to_owned(), None);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlacesService for FakePlaces {
    async fn nearby_search(&self, request: &NearbyRequest) -> Result<PlacesPage, PlacesError> {
        self.record(format!("nearby:{}", request.place_type));
        if let Some(delay) = self.nearby_delay.get(&request.place_type) {
            tokio::time::sleep(*delay).await;
        }
        match self.nearby.get(&request.place_type) {
            Some(Some(places)) => Ok(PlacesPage {
                places: places.clone(),
                next_page_token: None,
            }),
            Some(None) => Err(service_error()),
            None => Ok(PlacesPage::default()),
        }
    }

    async fn text_search(
        &self,
        request: &TextSearchRequest,
        page_token: Option<&str>,
    ) -> Result<PlacesPage, PlacesError> {
        let (query, index) = match page_token {
            Some(token) => {
                let (q, i) = token.rsplit_once('#').unwrap();
                (q.to_owned(), i.parse::<usize>().unwrap())
            }
            None => (request.query.clone(), 0),
        };
        self.record(format!("text:{query}#{index}"));
        if !self.text_delay.is_zero() {
            tokio::time::sleep(self.text_delay).await;
        }
        let pages = self.text_pages.get(&query).cloned().unwrap_or_default();
        let places = pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < pages.len()).then(|| format!("{query}#{}", index + 1));
        Ok(PlacesPage {
            places,
            next_page_token,
        })
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        self.record(format!("details:{place_id}"));
        match self.details.get(place_id) {
            Some(Some(details)) => Ok(details.clone()),
            Some(None) => Err(service_error()),
            None => Ok(PlaceDetails::default()),
        }
    }
}

/// Scripted internal backend.
#[derive(Default)]
pub struct FakeDirectory {
    pub all: Vec<Location>,
    pub matches: Vec<Location>,
    pub categories: Vec<Category>,
    pub fail_reads: bool,
    pub reject_writes: Option<String>,
    /// Categories accepted by `create_category`; served by later reads.
    pub created: Mutex<Vec<Category>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn read_error() -> ApiError {
        ApiError::UnexpectedStatus {
            status: 502,
            url: "http://backend.test/api/".to_owned(),
        }
    }
}

#[async_trait]
impl LocationDirectory for FakeDirectory {
    async fn active_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.record("categories".to_owned());
        if self.fail_reads {
            return Err(Self::read_error());
        }
        let mut all = self.categories.clone();
        all.extend(self.created.lock().unwrap().iter().cloned());
        Ok(all)
    }

    async fn list_locations(&self, _: Option<LatLng>) -> Result<Vec<Location>, ApiError> {
        self.record("list".to_owned());
        if self.fail_reads {
            return Err(Self::read_error());
        }
        Ok(self.all.clone())
    }

    async fn search_locations(
        &self,
        query: &SearchQuery,
        _: Option<LatLng>,
    ) -> Result<Vec<Location>, ApiError> {
        let params: Vec<String> = query
            .internal_params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        self.record(format!("search:{}", params.join("&")));
        if self.fail_reads {
            return Err(Self::read_error());
        }
        Ok(self.matches.clone())
    }

    async fn create_location(&self, payload: &NewLocation) -> Result<Location, ApiError> {
        self.record(format!("create_location:{}", payload.name));
        if let Some(message) = &self.reject_writes {
            return Err(ApiError::Rejected {
                status: 400,
                message: message.clone(),
            });
        }
        let mut created = internal_location(100, &payload.name);
        created.latitude = payload.latitude;
        created.longitude = payload.longitude;
        Ok(created)
    }

    async fn create_category(&self, payload: &NewCategory) -> Result<Category, ApiError> {
        self.record(format!("create_category:{}", payload.name));
        if let Some(message) = &self.reject_writes {
            return Err(ApiError::Rejected {
                status: 400,
                message: message.clone(),
            });
        }
        let category = Category {
            id: 50,
            name: payload.name.clone(),
            icon: payload.icon.clone(),
        };
        self.created.lock().unwrap().push(category.clone());
        Ok(category)
    }
}
