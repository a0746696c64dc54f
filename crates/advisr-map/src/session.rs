//! Per-map search session state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use advisr_core::LatLng;

use crate::geolocation::Position;

/// Refresh counter value a computation started under.
///
/// Taken with [`Session::begin_refresh`]; results are applied only while
/// [`Session::is_current`] still holds for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Shared state for one map view: where the user is, which refresh is
/// authoritative, and the category names offered for autocomplete.
#[derive(Debug)]
pub struct Session {
    generation: AtomicU64,
    default_center: LatLng,
    device: RwLock<Option<Position>>,
    category_names: RwLock<Vec<String>>,
}

impl Session {
    #[must_use]
    pub fn new(default_center: LatLng) -> Self {
        Self {
            generation: AtomicU64::new(0),
            default_center,
            device: RwLock::new(None),
            category_names: RwLock::new(Vec::new()),
        }
    }

    /// Start a new refresh. Every earlier generation becomes stale.
    pub fn begin_refresh(&self) -> Generation {
        Generation(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation.load(Ordering::SeqCst) == generation.0
    }

    #[must_use]
    pub fn current_generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn default_center(&self) -> LatLng {
        self.default_center
    }

    /// Device fix from the latest successful resolution, if any.
    #[must_use]
    pub fn device_position(&self) -> Option<Position> {
        *self.device.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_device_position(&self, position: Option<Position>) {
        *self.device.write().unwrap_or_else(PoisonError::into_inner) = position;
    }

    /// Search reference point: the device fix, else the default centre.
    #[must_use]
    pub fn reference(&self) -> LatLng {
        self.device_position()
            .map_or(self.default_center, |p| p.coords)
    }

    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.category_names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_category_names(&self, names: Vec<String>) {
        *self
            .category_names
            .write()
            .unwrap_or_else(PoisonError::into_inner) = names;
    }

    /// Category names containing `prefix`, case-insensitively, for
    /// autocomplete. An empty prefix matches everything.
    #[must_use]
    pub fn suggest_categories(&self, prefix: &str) -> Vec<String> {
        let needle = prefix.trim().to_lowercase();
        self.category_names()
            .into_iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect()
    }
}
