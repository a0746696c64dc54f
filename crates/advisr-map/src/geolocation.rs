//! Device location resolution with a guard timer and a watch fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use advisr_core::LatLng;

use crate::task::{race, CancellableTask, RaceOutcome};

/// A device fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coords: LatLng,
    /// Horizontal accuracy radius in metres.
    pub accuracy_m: f64,
}

/// Options passed to the platform location API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the platform may return.
    pub maximum_age: Duration,
}

impl PositionOptions {
    /// Single high-accuracy request.
    pub const CURRENT: Self = Self {
        high_accuracy: true,
        timeout: Duration::from_secs(15),
        maximum_age: Duration::from_secs(60),
    };

    /// Relaxed watch used after a request timeout.
    pub const WATCH: Self = Self {
        high_accuracy: false,
        timeout: Duration::from_secs(5),
        maximum_age: Duration::from_secs(30),
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("location lookup failed: {0}")]
    Unknown(String),
    #[error("location is not supported on this platform")]
    Unsupported,
}

impl GeolocationError {
    /// Text shown to the user when resolution falls back to the default
    /// centre.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location access permission denied. Please enable location access in your browser settings."
            }
            Self::PositionUnavailable => "Location information unavailable.",
            Self::Timeout => "Location request timeout.",
            Self::Unsupported => "Geolocation is not available on this device.",
            Self::Unknown(_) => "Current location could not be found.",
        }
    }
}

/// Platform location API.
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// One-shot position request.
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Position, GeolocationError>;

    /// First fix delivered by a position watch. The watch is cleared once it
    /// reports.
    async fn watch_position(&self, options: PositionOptions)
        -> Result<Position, GeolocationError>;
}

/// Always reports the same fix. Used when coordinates are supplied up front.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: Position,
}

impl FixedGeolocator {
    #[must_use]
    pub fn new(coords: LatLng, accuracy_m: f64) -> Self {
        Self {
            position: Position { coords, accuracy_m },
        }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self, _: PositionOptions) -> Result<Position, GeolocationError> {
        Ok(self.position)
    }

    async fn watch_position(&self, _: PositionOptions) -> Result<Position, GeolocationError> {
        Ok(self.position)
    }
}

/// Platform without a location API.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocator;

#[async_trait]
impl Geolocator for UnsupportedGeolocator {
    async fn current_position(&self, _: PositionOptions) -> Result<Position, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }

    async fn watch_position(&self, _: PositionOptions) -> Result<Position, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Where the resolved coordinate came from.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    Device(Position),
    /// Default centre, with the failure that caused the fallback.
    Fallback(GeolocationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub coords: LatLng,
    pub source: LocationSource,
}

impl Resolution {
    fn device(position: Position) -> Self {
        Self {
            coords: position.coords,
            source: LocationSource::Device(position),
        }
    }

    fn fallback(default_center: LatLng, error: GeolocationError) -> Self {
        Self {
            coords: default_center,
            source: LocationSource::Fallback(error),
        }
    }

    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match &self.source {
            LocationSource::Device(p) => Some(*p),
            LocationSource::Fallback(_) => None,
        }
    }
}

/// Timing for [`resolve_location`].
#[derive(Debug, Clone, Copy)]
pub struct ResolveSettings {
    pub default_center: LatLng,
    /// Bound on the whole single-request attempt.
    pub guard: Duration,
    /// Bound on the watch fallback.
    pub watch_timeout: Duration,
}

/// Resolve the device location.
///
/// The position request races a guard timer; whichever finishes first wins
/// and the other is cancelled. A guard win falls back to the default centre.
/// A `Timeout` reported by the request itself gets one relaxed watch attempt.
/// Every other failure falls back to the default centre. Never fails.
pub async fn resolve_location(
    geolocator: Arc<dyn Geolocator>,
    settings: ResolveSettings,
) -> Resolution {
    let request = {
        let geolocator = Arc::clone(&geolocator);
        CancellableTask::spawn(async move {
            geolocator
                .current_position(PositionOptions::CURRENT)
                .await
        })
    };
    let guard = CancellableTask::spawn(tokio::time::sleep(settings.guard));

    let first = match race(request, guard).await {
        RaceOutcome::Left(Some(result)) => result,
        RaceOutcome::Left(None) => Err(GeolocationError::Unknown(
            "position request aborted".to_owned(),
        )),
        RaceOutcome::Right(_) => {
            tracing::warn!(guard_ms = settings.guard.as_millis(), "location guard elapsed");
            return Resolution::fallback(settings.default_center, GeolocationError::Timeout);
        }
    };

    match first {
        Ok(position) => Resolution::device(position),
        Err(GeolocationError::Timeout) => {
            tracing::info!("location request timed out, trying watch");
            watch_fallback(geolocator.as_ref(), settings).await
        }
        Err(error) => {
            tracing::warn!(error = %error, "location resolution failed");
            Resolution::fallback(settings.default_center, error)
        }
    }
}

async fn watch_fallback(geolocator: &dyn Geolocator, settings: ResolveSettings) -> Resolution {
    let options = PositionOptions {
        timeout: settings.watch_timeout,
        ..PositionOptions::WATCH
    };
    match tokio::time::timeout(settings.watch_timeout, geolocator.watch_position(options)).await
    {
        Ok(Ok(position)) => Resolution::device(position),
        Ok(Err(error)) => {
            tracing::warn!(error = %error, "watch fallback failed");
            Resolution::fallback(settings.default_center, error)
        }
        Err(_) => {
            tracing::warn!("watch fallback timed out");
            Resolution::fallback(settings.default_center, GeolocationError::Timeout)
        }
    }
}
