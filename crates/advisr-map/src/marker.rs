//! Marker handles and the layer that owns the displayed set.

use std::collections::HashSet;

use advisr_core::{select_icon, Bounds, LatLng, Location, MarkerIcon};

use crate::geolocation::Position;
use crate::popup::current_location_popup;
use crate::surface::{MapSurface, MarkerSpec};

/// Key of the synthetic device-position marker.
pub const CURRENT_LOCATION_KEY: &str = "current-location";

/// Title of the synthetic device-position marker.
pub const CURRENT_LOCATION_TITLE: &str = "Your Current Location";

/// One drawn marker. Owns its popup content.
pub trait Marker: Send {
    fn position(&self) -> LatLng;
    fn set_position(&mut self, position: LatLng);
    fn title(&self) -> &str;
    fn icon(&self) -> MarkerIcon;
    /// Replace the popup content and show it.
    fn open_popup(&mut self, html: String);
    fn close_popup(&mut self);
    fn is_popup_open(&self) -> bool;
    /// Remove the marker from its surface. Further calls are no-ops.
    fn dispose(&mut self);
}

struct PlacedMarker {
    location: Location,
    marker: Box<dyn Marker>,
}

/// The displayed marker set plus the long-lived current-location marker.
///
/// The result markers are always replaced as a whole; the current-location
/// marker is never touched by a refresh or a clear.
#[derive(Default)]
pub struct MarkerLayer {
    current_location: Option<Box<dyn Marker>>,
    current_popup: Option<String>,
    placed: Vec<PlacedMarker>,
}

impl MarkerLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the current-location marker, or move the existing one.
    pub fn set_current_location(&mut self, surface: &dyn MapSurface, position: Position) {
        self.current_popup = Some(current_location_popup(position));
        match self.current_location.as_mut() {
            Some(marker) => marker.set_position(position.coords),
            None => {
                self.current_location = Some(surface.add_marker(MarkerSpec {
                    key: CURRENT_LOCATION_KEY.to_owned(),
                    position: position.coords,
                    title: CURRENT_LOCATION_TITLE.to_owned(),
                    icon: MarkerIcon::CurrentLocation,
                }));
            }
        }
    }

    #[must_use]
    pub fn has_current_location(&self) -> bool {
        self.current_location.is_some()
    }

    /// Dispose every result marker and draw one per location. Locations whose
    /// key was already drawn are skipped. Returns the number drawn.
    pub fn replace_all(&mut self, surface: &dyn MapSurface, locations: Vec<Location>) -> usize {
        self.clear();
        let mut seen = HashSet::new();
        for location in locations {
            let key = location.dedup_key();
            if !seen.insert(key.clone()) {
                tracing::debug!(key = %key, "skipping duplicate marker");
                continue;
            }
            let marker = surface.add_marker(MarkerSpec {
                key,
                position: location.position(),
                title: location.name.clone(),
                icon: select_icon(&location),
            });
            self.placed.push(PlacedMarker { location, marker });
        }
        self.placed.len()
    }

    /// Remove all result markers; the current-location marker stays.
    pub fn clear(&mut self) {
        for mut placed in self.placed.drain(..) {
            placed.marker.close_popup();
            placed.marker.dispose();
        }
    }

    pub fn close_all_popups(&mut self) {
        for placed in &mut self.placed {
            placed.marker.close_popup();
        }
        if let Some(marker) = self.current_location.as_mut() {
            marker.close_popup();
        }
    }

    /// Close every popup, then open `html` on the marker keyed `key`.
    /// Returns `false` when no such marker is displayed.
    pub fn open_exclusive(&mut self, key: &str, html: String) -> bool {
        self.close_all_popups();
        match self.placed.iter_mut().find(|p| p.location.dedup_key() == key) {
            Some(placed) => {
                placed.marker.open_popup(html);
                true
            }
            None => false,
        }
    }

    /// Close every popup and open the current-location one.
    pub fn open_current_location(&mut self) -> bool {
        self.close_all_popups();
        match (self.current_location.as_mut(), self.current_popup.clone()) {
            (Some(marker), Some(html)) => {
                marker.open_popup(html);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn location(&self, key: &str) -> Option<&Location> {
        self.placed
            .iter()
            .map(|p| &p.location)
            .find(|l| l.dedup_key() == key)
    }

    #[must_use]
    pub fn locations(&self) -> Vec<&Location> {
        self.placed.iter().map(|p| &p.location).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Bounds of the result markers, `None` when there are none.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::covering(self.placed.iter().map(|p| p.marker.position()))
    }
}
