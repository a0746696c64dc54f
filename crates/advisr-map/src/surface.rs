//! Rendering surface port: viewport, markers, status line and panels.

use serde::Serialize;

use advisr_core::{Bounds, LatLng, MarkerIcon};

use crate::marker::Marker;
use crate::panel::ListEntry;

/// Zoom used before any location is known.
pub const INITIAL_ZOOM: u8 = 12;
/// Zoom after a device fix, and when fitting a single marker.
pub const LOCATED_ZOOM: u8 = 14;
/// Zoom when focusing a list entry.
pub const FOCUS_ZOOM: u8 = 15;

/// Everything a surface needs to draw one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    /// Stable key, the location's de-duplication key.
    pub key: String,
    pub position: LatLng,
    pub title: String,
    pub icon: MarkerIcon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// A map rendering backend.
///
/// Implementations own the viewport and the drawn markers; markers handed
/// out by [`MapSurface::add_marker`] stay on the surface until disposed.
pub trait MapSurface: Send + Sync {
    fn set_view(&self, center: LatLng, zoom: u8);
    fn center(&self) -> LatLng;
    fn fit_bounds(&self, bounds: Bounds);
    fn add_marker(&self, spec: MarkerSpec) -> Box<dyn Marker>;
    /// Progress line; `None` hides it.
    fn set_status(&self, text: Option<&str>);
    fn notify(&self, notice: Notice);
    fn show_list(&self, entries: Vec<ListEntry>);
    fn show_details(&self, html: String);
}
