//! Device geolocation seam.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::LocationError;
use crate::state::PartialAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DevicePosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Platform location provider.
pub trait Geolocator: Send + Sync {
    fn request_permission(&self) -> impl Future<Output = Permission> + Send;

    /// # Errors
    ///
    /// Implementations return [`LocationError::Unavailable`] when the
    /// platform cannot produce a fix.
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<DevicePosition, LocationError>> + Send;

    /// Best-effort reverse geocoding. Providers without one return `None`.
    fn reverse_geocode(
        &self,
        _position: DevicePosition,
    ) -> impl Future<Output = Option<PartialAddress>> + Send {
        async { None }
    }
}

/// A geolocator that answers with a fixed reading.
///
/// Used by the CLI, where coordinates come from arguments rather than a
/// device, and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticGeolocator {
    position: Option<DevicePosition>,
    address: Option<PartialAddress>,
    denied: bool,
}

impl StaticGeolocator {
    /// Permission granted, position available.
    #[must_use]
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Some(DevicePosition {
                latitude,
                longitude,
            }),
            ..Self::default()
        }
    }

    /// Permission denied.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }

    /// Permission granted but no fix available.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_address(mut self, address: PartialAddress) -> Self {
        self.address = Some(address);
        self
    }
}

impl Geolocator for StaticGeolocator {
    async fn request_permission(&self) -> Permission {
        if self.denied {
            Permission::Denied
        } else {
            Permission::Granted
        }
    }

    async fn current_position(&self) -> Result<DevicePosition, LocationError> {
        self.position
            .ok_or_else(|| LocationError::Unavailable("no position fix".to_string()))
    }

    async fn reverse_geocode(&self, _position: DevicePosition) -> Option<PartialAddress> {
        self.address.clone()
    }
}
