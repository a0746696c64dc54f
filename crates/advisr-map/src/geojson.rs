//! In-memory rendering surface that serializes to a GeoJSON
//! `FeatureCollection`.
//!
//! Used by the CLI to print the map state and by tests to observe what the
//! orchestrator drew.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{json, Value};

use advisr_core::{Bounds, LatLng, MarkerIcon};

use crate::marker::Marker;
use crate::panel::ListEntry;
use crate::surface::{MapSurface, MarkerSpec, Notice, INITIAL_ZOOM};

/// Notices kept for display; older ones expire first.
pub const MAX_NOTICES: usize = 5;

#[derive(Debug, Clone)]
struct DrawnMarker {
    key: String,
    position: LatLng,
    title: String,
    icon: MarkerIcon,
    popup: Option<String>,
    popup_open: bool,
}

#[derive(Debug)]
struct SurfaceState {
    center: LatLng,
    zoom: u8,
    fitted: Option<Bounds>,
    next_id: u64,
    markers: BTreeMap<u64, DrawnMarker>,
    status: Option<String>,
    notices: Vec<Notice>,
    list: Vec<ListEntry>,
    details: Option<String>,
}

/// Shared-state surface; clones observe the same map.
#[derive(Debug, Clone)]
pub struct GeoJsonSurface {
    state: Arc<Mutex<SurfaceState>>,
}

fn lock(state: &Mutex<SurfaceState>) -> MutexGuard<'_, SurfaceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl GeoJsonSurface {
    #[must_use]
    pub fn new(center: LatLng) -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState {
                center,
                zoom: INITIAL_ZOOM,
                fitted: None,
                next_id: 0,
                markers: BTreeMap::new(),
                status: None,
                notices: Vec::new(),
                list: Vec::new(),
                details: None,
            })),
        }
    }

    #[must_use]
    pub fn zoom(&self) -> u8 {
        lock(&self.state).zoom
    }

    #[must_use]
    pub fn fitted_bounds(&self) -> Option<Bounds> {
        lock(&self.state).fitted
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        lock(&self.state).markers.len()
    }

    /// Titles in draw order.
    #[must_use]
    pub fn marker_titles(&self) -> Vec<String> {
        lock(&self.state)
            .markers
            .values()
            .map(|m| m.title.clone())
            .collect()
    }

    #[must_use]
    pub fn marker_positions(&self) -> Vec<LatLng> {
        lock(&self.state)
            .markers
            .values()
            .map(|m| m.position)
            .collect()
    }

    /// Content of every open popup.
    #[must_use]
    pub fn open_popups(&self) -> Vec<String> {
        lock(&self.state)
            .markers
            .values()
            .filter(|m| m.popup_open)
            .filter_map(|m| m.popup.clone())
            .collect()
    }

    #[must_use]
    pub fn status(&self) -> Option<String> {
        lock(&self.state).status.clone()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.state).notices.clone()
    }

    #[must_use]
    pub fn list(&self) -> Vec<ListEntry> {
        lock(&self.state).list.clone()
    }

    #[must_use]
    pub fn details(&self) -> Option<String> {
        lock(&self.state).details.clone()
    }

    /// The whole map as a GeoJSON `FeatureCollection`. Viewport, status and
    /// panels travel as foreign members next to `features`.
    #[must_use]
    pub fn to_feature_collection(&self) -> Value {
        let state = lock(&self.state);
        let features: Vec<Value> = state
            .markers
            .values()
            .map(|m| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [m.position.lng, m.position.lat],
                    },
                    "properties": {
                        "key": m.key,
                        "title": m.title,
                        "icon_url": m.icon.url(),
                        "icon_size": m.icon.size_px(),
                        "popup_open": m.popup_open,
                        "popup": m.popup,
                    },
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
            "viewport": {
                "center": [state.center.lng, state.center.lat],
                "zoom": state.zoom,
                "bounds": state.fitted.map(|b| json!([
                    b.south_west.lng, b.south_west.lat, b.north_east.lng, b.north_east.lat
                ])),
            },
            "status": state.status,
            "notices": state.notices,
            "list": state.list,
            "details": state.details,
        })
    }
}

impl MapSurface for GeoJsonSurface {
    fn set_view(&self, center: LatLng, zoom: u8) {
        let mut state = lock(&self.state);
        state.center = center;
        state.zoom = zoom;
    }

    fn center(&self) -> LatLng {
        lock(&self.state).center
    }

    fn fit_bounds(&self, bounds: Bounds) {
        let mut state = lock(&self.state);
        state.center = bounds.center();
        state.fitted = Some(bounds);
    }

    fn add_marker(&self, spec: MarkerSpec) -> Box<dyn Marker> {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.markers.insert(
            id,
            DrawnMarker {
                key: spec.key,
                position: spec.position,
                title: spec.title.clone(),
                icon: spec.icon,
                popup: None,
                popup_open: false,
            },
        );
        Box::new(GeoJsonMarker {
            id,
            title: spec.title,
            icon: spec.icon,
            position: spec.position,
            popup_open: false,
            disposed: false,
            state: Arc::clone(&self.state),
        })
    }

    fn set_status(&self, text: Option<&str>) {
        lock(&self.state).status = text.map(str::to_owned);
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(kind = ?notice.kind, text = %notice.text, "notice");
        let mut state = lock(&self.state);
        state.notices.push(notice);
        let excess = state.notices.len().saturating_sub(MAX_NOTICES);
        state.notices.drain(..excess);
    }

    fn show_list(&self, entries: Vec<ListEntry>) {
        lock(&self.state).list = entries;
    }

    fn show_details(&self, html: String) {
        lock(&self.state).details = Some(html);
    }
}

/// Handle to one marker on a [`GeoJsonSurface`].
struct GeoJsonMarker {
    id: u64,
    title: String,
    icon: MarkerIcon,
    position: LatLng,
    popup_open: bool,
    disposed: bool,
    state: Arc<Mutex<SurfaceState>>,
}

impl GeoJsonMarker {
    fn update(&self, f: impl FnOnce(&mut DrawnMarker)) {
        if self.disposed {
            return;
        }
        if let Some(drawn) = lock(&self.state).markers.get_mut(&self.id) {
            f(drawn);
        }
    }
}

impl Marker for GeoJsonMarker {
    fn position(&self) -> LatLng {
        self.position
    }

    fn set_position(&mut self, position: LatLng) {
        self.position = position;
        self.update(|m| m.position = position);
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn icon(&self) -> MarkerIcon {
        self.icon
    }

    fn open_popup(&mut self, html: String) {
        self.popup_open = true;
        self.update(|m| {
            m.popup = Some(html);
            m.popup_open = true;
        });
    }

    fn close_popup(&mut self) {
        self.popup_open = false;
        self.update(|m| m.popup_open = false);
    }

    fn is_popup_open(&self) -> bool {
        self.popup_open
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        lock(&self.state).markers.remove(&self.id);
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(key: &str, lat: f64, lng: f64) -> MarkerSpec {
        MarkerSpec {
            key: key.to_owned(),
            position: LatLng::new(lat, lng),
            title: key.to_uppercase(),
            icon: MarkerIcon::Food,
        }
    }

    #[test]
    fn features_use_lng_lat_order() {
        let surface = GeoJsonSurface::new(LatLng::new(23.8103, 90.4125));
        let _marker = surface.add_marker(spec("a", 23.7, 90.3));

        let fc = surface.to_feature_collection();
        assert_eq!(fc["type"], "FeatureCollection");
        assert_eq!(fc["features"][0]["geometry"]["coordinates"], json!([90.3, 23.7]));
        assert_eq!(fc["features"][0]["properties"]["title"], "A");
        assert_eq!(fc["viewport"]["zoom"], INITIAL_ZOOM);
    }

    #[test]
    fn disposed_marker_leaves_surface() {
        let surface = GeoJsonSurface::new(LatLng::new(0.0, 0.0));
        let mut marker = surface.add_marker(spec("a", 1.0, 1.0));
        let _other = surface.add_marker(spec("b", 2.0, 2.0));
        marker.dispose();
        marker.dispose();
        assert_eq!(surface.marker_titles(), vec!["B".to_owned()]);

        marker.open_popup("<p>gone</p>".to_owned());
        assert!(surface.open_popups().is_empty());
    }

    #[test]
    fn fit_bounds_recenters() {
        let surface = GeoJsonSurface::new(LatLng::new(0.0, 0.0));
        let bounds = Bounds::covering([LatLng::new(10.0, 20.0), LatLng::new(12.0, 24.0)])
            .expect("two points");
        surface.fit_bounds(bounds);
        assert!(surface.center().approx_eq(&LatLng::new(11.0, 22.0), 1e-9));
        assert_eq!(surface.fitted_bounds(), Some(bounds));
    }

    #[test]
    fn status_and_notices_are_recorded() {
        let surface = GeoJsonSurface::new(LatLng::new(0.0, 0.0));
        surface.set_status(Some("Searching: parks (8/8)"));
        surface.notify(Notice::success("3 places found"));
        surface.set_status(None);

        assert!(surface.status().is_none());
        assert_eq!(surface.notices(), vec![Notice::success("3 places found")]);
        let fc = surface.to_feature_collection();
        assert_eq!(fc["notices"][0]["kind"], "success");
    }

    #[test]
    fn only_recent_notices_are_kept() {
        let surface = GeoJsonSurface::new(LatLng::new(0.0, 0.0));
        for i in 0..MAX_NOTICES + 3 {
            surface.notify(Notice::error(format!("failure {i}")));
        }

        let notices = surface.notices();
        assert_eq!(notices.len(), MAX_NOTICES);
        assert_eq!(notices[0].text, "failure 3");
        assert_eq!(
            notices.last().map(|n| n.text.as_str()),
            Some(format!("failure {}", MAX_NOTICES + 2).as_str())
        );
        let fc = surface.to_feature_collection();
        assert_eq!(fc["notices"].as_array().map(Vec::len), Some(MAX_NOTICES));
    }
}
