use std::time::Duration;

use async_trait::async_trait;

use advisr_core::{default_categories, LatLng, DEFAULT_CENTER};

use super::*;
use crate::accessibility::DetailBatching;
use crate::geojson::GeoJsonSurface;
use crate::geolocation::{
    FixedGeolocator, GeolocationError, Position, PositionOptions, UnsupportedGeolocator,
};
use crate::marker::CURRENT_LOCATION_TITLE;
use crate::surface::NoticeKind;
use crate::test_support::{internal_location, place, FakeDirectory, FakePlaces};

const DEVICE: LatLng = LatLng::new(23.7808, 90.4106);

struct DeniedGeolocator;

#[async_trait]
impl Geolocator for DeniedGeolocator {
    async fn current_position(&self, _: PositionOptions) -> Result<Position, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }

    async fn watch_position(&self, _: PositionOptions) -> Result<Position, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}

fn settings() -> OrchestratorSettings {
    OrchestratorSettings {
        resolve: ResolveSettings {
            default_center: DEFAULT_CENTER,
            guard: Duration::from_secs(12),
            watch_timeout: Duration::from_secs(5),
        },
        nearby: NearbySettings {
            radius_m: 3000,
            category_timeout: Duration::from_secs(12),
            category_delay: Duration::from_millis(300),
            page_delay: Duration::from_millis(1500),
        },
        search: SearchSettings {
            radius_m: 3000,
            max_pages: 3,
            page_delay: Duration::from_secs(2),
            batching: DetailBatching {
                batch_size: 5,
                delay: Duration::from_millis(500),
            },
        },
    }
}

fn monday() -> Weekday {
    Weekday::Mon
}

struct Harness {
    orchestrator: Orchestrator,
    surface: GeoJsonSurface,
    directory: Arc<FakeDirectory>,
    places: Arc<FakePlaces>,
}

fn harness(
    directory: FakeDirectory,
    places: FakePlaces,
    geolocator: Arc<dyn Geolocator>,
) -> Harness {
    let surface = GeoJsonSurface::new(DEFAULT_CENTER);
    let directory = Arc::new(directory);
    let places = Arc::new(places);
    let orchestrator = Orchestrator::new(
        Arc::clone(&directory) as Arc<dyn LocationDirectory>,
        Arc::clone(&places) as Arc<dyn PlacesService>,
        geolocator,
        Arc::new(surface.clone()),
        default_categories(),
        settings(),
    )
    .with_clock(monday);
    Harness {
        orchestrator,
        surface,
        directory,
        places,
    }
}

fn three_restaurants() -> FakePlaces {
    FakePlaces::new().nearby(
        "restaurant",
        vec![
            place("r1", &["restaurant"]),
            place("r2", &["restaurant"]),
            place("r3", &["restaurant"]),
        ],
    )
}

fn notice_texts(surface: &GeoJsonSurface, kind: NoticeKind) -> Vec<String> {
    surface
        .notices()
        .into_iter()
        .filter(|n| n.kind == kind)
        .map(|n| n.text)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn denied_location_falls_back_and_still_renders() {
    let h = harness(
        FakeDirectory::default(),
        three_restaurants(),
        Arc::new(DeniedGeolocator),
    );

    let outcome = h.orchestrator.start().await;

    assert!(outcome.applied);
    assert_eq!(outcome.count, 3);
    assert!(h.orchestrator.session().device_position().is_none());
    assert_eq!(h.surface.marker_count(), 3);
    assert_eq!(
        notice_texts(&h.surface, NoticeKind::Error),
        vec![GeolocationError::PermissionDenied.user_message()]
    );
    assert_eq!(
        notice_texts(&h.surface, NoticeKind::Success),
        vec!["3 places found"]
    );
    assert_eq!(h.surface.list().len(), 3);
    assert_eq!(h.surface.status(), None);
    // Every category was queried around the default centre.
    assert_eq!(h.places.calls_with_prefix("nearby:").len(), 8);
}

#[tokio::test(start_paused = true)]
async fn denied_location_with_hanging_service_renders_within_timeouts() {
    let categories = default_categories();
    let places = categories.iter().fold(FakePlaces::new(), |fake, c| {
        fake.nearby_delay(&c.place_type, Duration::from_secs(3600))
    });
    let h = harness(FakeDirectory::default(), places, Arc::new(DeniedGeolocator));
    let started = tokio::time::Instant::now();

    let outcome = h.orchestrator.start().await;

    let n = u32::try_from(categories.len()).unwrap();
    let nearby = settings().nearby;
    let bound = nearby.category_timeout * n + nearby.category_delay * (n - 1);
    assert!(started.elapsed() <= bound, "took {:?}", started.elapsed());
    assert!(outcome.applied);
    assert_eq!(outcome.count, 0);
    assert_eq!(h.places.calls_with_prefix("nearby:").len(), categories.len());
    assert!(h.places.calls_with_prefix("text:").is_empty());
    assert_eq!(
        notice_texts(&h.surface, NoticeKind::Error),
        vec![
            GeolocationError::PermissionDenied.user_message(),
            "No places found. Please try again."
        ]
    );
    assert_eq!(h.surface.status(), None);
}

#[tokio::test(start_paused = true)]
async fn unsupported_platform_uses_default_centre() {
    let h = harness(
        FakeDirectory::default(),
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );

    let resolution = h.orchestrator.locate().await;

    assert_eq!(resolution.coords, DEFAULT_CENTER);
    assert!(h.surface.center().approx_eq(&DEFAULT_CENTER, 1e-9));
    assert_eq!(h.surface.zoom(), INITIAL_ZOOM);
    assert_eq!(h.surface.status().as_deref(), Some("Using default location..."));
}

#[tokio::test(start_paused = true)]
async fn empty_nearby_reports_no_places() {
    let h = harness(
        FakeDirectory::default(),
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );

    let outcome = h.orchestrator.refresh_nearby().await;

    assert!(outcome.applied);
    assert_eq!(outcome.count, 0);
    assert_eq!(
        notice_texts(&h.surface, NoticeKind::Error),
        vec!["No places found. Please try again."]
    );
}

#[tokio::test(start_paused = true)]
async fn current_location_marker_survives_refreshes() {
    let h = harness(
        FakeDirectory {
            all: vec![internal_location(1, "Inn")],
            ..FakeDirectory::default()
        },
        three_restaurants(),
        Arc::new(FixedGeolocator::new(DEVICE, 20.0)),
    );

    h.orchestrator.start().await;
    assert_eq!(h.surface.marker_count(), 4);
    assert!(h
        .surface
        .marker_titles()
        .iter()
        .any(|t| t == CURRENT_LOCATION_TITLE));

    h.orchestrator.run_search(&SearchQuery::default()).await;
    assert_eq!(h.surface.marker_count(), 2);

    h.orchestrator.clear_markers();
    assert_eq!(h.surface.marker_titles(), vec![CURRENT_LOCATION_TITLE]);
    assert!(h.surface.list().is_empty());
}

#[tokio::test(start_paused = true)]
async fn nearby_uses_device_position_as_reference() {
    let h = harness(
        FakeDirectory::default(),
        three_restaurants(),
        Arc::new(FixedGeolocator::new(DEVICE, 20.0)),
    );

    h.orchestrator.locate().await;
    assert_eq!(h.surface.zoom(), LOCATED_ZOOM);
    assert!(h.orchestrator.session().reference().approx_eq(&DEVICE, 1e-9));

    h.orchestrator.refresh_nearby().await;
    let expected = advisr_core::haversine_km(DEVICE, LatLng::new(23.80, 90.41));
    let list = h.surface.list();
    assert!(!list.is_empty());
    for entry in list {
        let km = entry.distance_km.expect("distance from the device position");
        assert!((km - expected).abs() < 1e-9);
    }
}

#[tokio::test(start_paused = true)]
async fn stale_refresh_is_dropped() {
    let h = harness(
        FakeDirectory {
            all: vec![internal_location(1, "Inn"), internal_location(2, "Lodge")],
            ..FakeDirectory::default()
        },
        three_restaurants().nearby_delay("lodging", Duration::from_secs(5)),
        Arc::new(UnsupportedGeolocator),
    );

    let everything = SearchQuery::default();
    let (nearby, search) = tokio::join!(
        h.orchestrator.refresh_nearby(),
        h.orchestrator.run_search(&everything),
    );

    assert!(search.applied);
    assert!(search.generation > nearby.generation);
    assert!(!nearby.applied);
    assert_eq!(nearby.count, 0);
    let names: Vec<_> = h.surface.list().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["Inn", "Lodge"]);
    assert!(notice_texts(&h.surface, NoticeKind::Success).is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_search_shows_internal_list_only() {
    let h = harness(
        FakeDirectory {
            all: vec![internal_location(1, "Inn"), internal_location(2, "Lodge")],
            ..FakeDirectory::default()
        },
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );

    let outcome = h.orchestrator.run_search(&SearchQuery::default()).await;

    assert_eq!(outcome.count, 2);
    assert!(h.places.calls().is_empty());
    assert_eq!(h.directory.calls(), vec!["list"]);
    assert!(h.surface.notices().is_empty());
    assert!(h.surface.fitted_bounds().is_some());
}

#[tokio::test(start_paused = true)]
async fn filtered_search_announces_count() {
    let h = harness(
        FakeDirectory {
            matches: vec![internal_location(7, "Ramp Hotel")],
            ..FakeDirectory::default()
        },
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );

    let outcome = h
        .orchestrator
        .run_search(&SearchQuery::new("", "", "ramp"))
        .await;

    assert_eq!(outcome.count, 1);
    assert_eq!(h.surface.zoom(), LOCATED_ZOOM);
    assert_eq!(
        notice_texts(&h.surface, NoticeKind::Success),
        vec!["Found 1 location(s)"]
    );
}

#[tokio::test(start_paused = true)]
async fn selecting_markers_keeps_one_popup_open() {
    let h = harness(
        FakeDirectory::default(),
        three_restaurants().details("r2", Some(true)),
        Arc::new(UnsupportedGeolocator),
    );
    h.orchestrator.refresh_nearby().await;

    assert!(h.orchestrator.select_marker("r1").await);
    assert!(h.orchestrator.select_marker("r2").await);

    let open = h.surface.open_popups();
    assert_eq!(open.len(), 1);
    assert!(open[0].contains("Detailed r2"));
    assert_eq!(
        h.places.calls_with_prefix("details:"),
        vec!["details:r1", "details:r2"]
    );
    assert!(!h.orchestrator.select_marker("missing").await);
}

#[tokio::test(start_paused = true)]
async fn failed_details_fall_back_to_summary_popup() {
    let h = harness(
        FakeDirectory::default(),
        three_restaurants().details_fail("r3"),
        Arc::new(UnsupportedGeolocator),
    );
    h.orchestrator.refresh_nearby().await;

    assert!(h.orchestrator.focus_location("r3").await);

    assert_eq!(h.surface.zoom(), FOCUS_ZOOM);
    let open = h.surface.open_popups();
    assert_eq!(open.len(), 1);
    assert!(open[0].contains("Place r3"));
}

#[tokio::test(start_paused = true)]
async fn internal_records_open_without_lookup() {
    let h = harness(
        FakeDirectory {
            all: vec![internal_location(1, "Inn")],
            ..FakeDirectory::default()
        },
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );
    h.orchestrator.run_search(&SearchQuery::default()).await;

    assert!(h.orchestrator.show_details("1").await);

    assert!(h.places.calls().is_empty());
    assert!(h.surface.details().is_some_and(|html| html.contains("Inn")));
}

#[tokio::test(start_paused = true)]
async fn current_location_popup_opens_on_select() {
    let h = harness(
        FakeDirectory::default(),
        FakePlaces::new(),
        Arc::new(FixedGeolocator::new(DEVICE, 20.0)),
    );
    h.orchestrator.locate().await;

    assert!(h.orchestrator.select_marker(CURRENT_LOCATION_KEY).await);

    let open = h.surface.open_popups();
    assert_eq!(open.len(), 1);
    assert!(open[0].contains("Accuracy: 20m"));
}

#[tokio::test(start_paused = true)]
async fn invalid_form_is_never_sent() {
    let h = harness(
        FakeDirectory::default(),
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );
    let form = LocationForm {
        name: "  ".to_owned(),
        latitude: "23.78".to_owned(),
        longitude: "abc".to_owned(),
        ..LocationForm::default()
    };

    let err = h.orchestrator.create_location(&form).await.unwrap_err();

    match err {
        SubmitError::Invalid(e) => {
            assert!(e.has_field("name"));
            assert!(e.has_field("longitude"));
        }
        SubmitError::Backend(e) => panic!("unexpected backend error: {e}"),
    }
    assert!(h.directory.calls().is_empty());
    assert_eq!(notice_texts(&h.surface, NoticeKind::Error).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn created_location_reloads_and_centres() {
    let h = harness(
        FakeDirectory::default(),
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );
    let mut form = LocationForm {
        name: "Ramp Cafe".to_owned(),
        ..LocationForm::default()
    };
    h.orchestrator
        .coordinates_from_map(&mut form, Some(LatLng::new(23.7925, 90.4078)));
    assert_eq!(form.latitude, "23.792500");

    let created = h.orchestrator.create_location(&form).await.unwrap();

    assert_eq!(created.name, "Ramp Cafe");
    assert_eq!(h.directory.calls(), vec!["create_location:Ramp Cafe", "list"]);
    assert_eq!(h.surface.zoom(), FOCUS_ZOOM);
    assert!(h.surface.center().approx_eq(&LatLng::new(23.7925, 90.4078), 1e-9));
    assert_eq!(
        notice_texts(&h.surface, NoticeKind::Success),
        vec![
            "Location coordinates set from map click!",
            "Location added successfully!"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn map_centre_fills_coordinates_without_pick() {
    let h = harness(
        FakeDirectory::default(),
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );
    let mut form = LocationForm::default();

    h.orchestrator.coordinates_from_map(&mut form, None);

    assert_eq!(form.latitude, "23.810300");
    assert_eq!(form.longitude, "90.412500");
}

#[tokio::test(start_paused = true)]
async fn rejected_category_surfaces_backend_message() {
    let h = harness(
        FakeDirectory {
            reject_writes: Some("Category already exists".to_owned()),
            ..FakeDirectory::default()
        },
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );
    let form = CategoryForm {
        name: "Hotels".to_owned(),
        icon: String::new(),
    };

    let err = h.orchestrator.create_category(&form).await.unwrap_err();

    assert!(matches!(err, SubmitError::Backend(_)));
    assert_eq!(
        notice_texts(&h.surface, NoticeKind::Error),
        vec!["Error saving category: Category already exists"]
    );
}

#[tokio::test(start_paused = true)]
async fn created_category_refetches_active_categories() {
    let h = harness(
        FakeDirectory {
            categories: vec![advisr_core::Category {
                id: 1,
                name: "Hotels".to_owned(),
                icon: String::new(),
            }],
            ..FakeDirectory::default()
        },
        FakePlaces::new(),
        Arc::new(UnsupportedGeolocator),
    );
    assert_eq!(h.orchestrator.load_categories().await, 1);

    h.orchestrator
        .create_category(&CategoryForm {
            name: "Hostels".to_owned(),
            icon: String::new(),
        })
        .await
        .unwrap();

    assert_eq!(
        h.orchestrator.suggest_categories("hos"),
        vec!["Hostels".to_owned()]
    );
    assert_eq!(h.orchestrator.suggest_categories("H").len(), 2);
    assert_eq!(
        h.directory.calls(),
        vec!["categories", "create_category:Hostels", "categories"]
    );
}
