//! The location state machine.
//!
//! ```text
//! none ──device──▶ loading ──▶ coordinates
//!                     └──────▶ error        (permission, timeout, no fix)
//! any  ──zip─────▶ zipCode | error          (invalid or unknown zip)
//! any  ──clear───▶ none
//! ```
//!
//! Every request takes a sequence number. A device reading that completes
//! after a newer request (another device request, a zip, a clear) was made is
//! dropped, so the last request wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use findhelp_core::{AppConfig, KeyValueStore, ZipTable};
use tokio::sync::watch;

use crate::error::LocationError;
use crate::geolocation::{Geolocator, Permission};
use crate::persist;
use crate::state::{LocationState, ZipCode};

const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

pub struct LocationResolver<G> {
    geolocator: G,
    store: Arc<dyn KeyValueStore>,
    zip_table: &'static ZipTable,
    geolocation_timeout: Duration,
    state: watch::Sender<LocationState>,
    sequence: AtomicU64,
}

impl<G: Geolocator> LocationResolver<G> {
    /// Starts in [`LocationState::None`]; call [`Self::restore`] to load the
    /// persisted location.
    pub fn new(geolocator: G, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(LocationState::None);
        Self {
            geolocator,
            store,
            zip_table: ZipTable::bundled(),
            geolocation_timeout: DEFAULT_GEOLOCATION_TIMEOUT,
            state,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn from_config(geolocator: G, store: Arc<dyn KeyValueStore>, config: &AppConfig) -> Self {
        Self::new(geolocator, store)
            .with_geolocation_timeout(Duration::from_secs(config.geolocation_timeout_secs))
    }

    #[must_use]
    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_zip_table(mut self, zip_table: &'static ZipTable) -> Self {
        self.zip_table = zip_table;
        self
    }

    pub fn state(&self) -> LocationState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every effective state change. Transitions to a
    /// structurally identical state are not broadcast.
    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.state.subscribe()
    }

    /// Request the device position: `loading`, then `coordinates` or `error`.
    ///
    /// A result that arrives after a newer request was issued is discarded
    /// and the current state is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::PermissionDenied`], [`LocationError::Timeout`],
    /// or the geolocator's own error; the state moves to `error` in each case.
    pub async fn use_device_location(&self) -> Result<LocationState, LocationError> {
        let ticket = self.next_ticket();
        self.transition(LocationState::Loading);

        let outcome = self.read_device().await;

        if !self.is_current(ticket) {
            tracing::debug!(ticket, "discarding superseded device location result");
            return Ok(self.state());
        }

        match outcome {
            Ok(next) => {
                if let LocationState::Coordinates {
                    latitude,
                    longitude,
                    location,
                } = &next
                {
                    self.persist(persist::save_coordinates(
                        self.store.as_ref(),
                        *latitude,
                        *longitude,
                        location.as_ref(),
                    ));
                }
                self.transition(next.clone());
                Ok(next)
            }
            Err(err) => {
                tracing::warn!(error = %err, "device location failed");
                self.transition(LocationState::Error {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Permission and the fix share one deadline. Reverse geocoding gets its
    /// own; when it runs out the coordinates are kept without an address.
    async fn read_device(&self) -> Result<LocationState, LocationError> {
        let position = tokio::time::timeout(self.geolocation_timeout, async {
            if self.geolocator.request_permission().await == Permission::Denied {
                return Err(LocationError::PermissionDenied);
            }
            self.geolocator.current_position().await
        })
        .await
        .map_err(|_| LocationError::Timeout {
            secs: self.geolocation_timeout.as_secs(),
        })??;

        let address = tokio::time::timeout(
            self.geolocation_timeout,
            self.geolocator.reverse_geocode(position),
        )
        .await
        .unwrap_or_else(|_| {
            tracing::warn!("reverse geocoding timed out; keeping coordinates without an address");
            None
        });

        Ok(LocationState::Coordinates {
            latitude: position.latitude,
            longitude: position.longitude,
            location: address,
        })
    }

    /// Resolve a user-entered zip.
    ///
    /// Validation happens before any lookup; a malformed or unknown zip moves
    /// the state to `error`, never to a `zipCode` state without coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidZip`] or [`LocationError::ZipNotFound`].
    pub fn set_zip_code(&self, input: &str) -> Result<LocationState, LocationError> {
        self.next_ticket();

        let resolved = ZipCode::parse(input).and_then(|zip_code| {
            self.zip_table
                .lookup(zip_code.as_str())
                .map(|location| (zip_code.clone(), location))
                .ok_or_else(|| LocationError::ZipNotFound {
                    zip: zip_code.to_string(),
                })
        });

        match resolved {
            Ok((zip_code, location)) => {
                self.persist(persist::save_zip(self.store.as_ref(), &zip_code, location));
                let next = LocationState::ZipCode { zip_code, location };
                self.transition(next.clone());
                Ok(next)
            }
            Err(err) => {
                tracing::debug!(input, error = %err, "zip code rejected");
                self.transition(LocationState::Error {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Forget the location, in memory and on disk.
    pub fn clear(&self) {
        self.next_ticket();
        self.persist(persist::clear(self.store.as_ref()));
        self.transition(LocationState::None);
    }

    /// Reload the persisted location. A device snapshot takes priority over a
    /// zip snapshot. Reloading a value equal to the current state emits
    /// nothing.
    pub fn restore(&self) -> LocationState {
        if let Some(next) = self.load_persisted() {
            if self.transition(next) {
                tracing::debug!("restored persisted location");
            }
        }
        self.state()
    }

    fn load_persisted(&self) -> Option<LocationState> {
        let store = self.store.as_ref();

        match persist::load_coordinates(store) {
            Ok(Some(snapshot)) => {
                return Some(LocationState::Coordinates {
                    latitude: snapshot.latitude,
                    longitude: snapshot.longitude,
                    location: snapshot.location,
                })
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "ignoring unreadable device snapshot"),
        }

        match persist::load_zip(store) {
            Ok(Some(snapshot)) => {
                // The table is authoritative; a zip that no longer resolves is dropped.
                let Some(location) = self.zip_table.lookup(snapshot.zip_code.as_str()) else {
                    tracing::warn!(zip = %snapshot.zip_code, "persisted zip no longer resolves");
                    return None;
                };
                Some(LocationState::ZipCode {
                    zip_code: snapshot.zip_code,
                    location,
                })
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable zip snapshot");
                None
            }
        }
    }

    /// Replace the state unless it is structurally equal to the current one.
    /// Returns whether a change was broadcast.
    fn transition(&self, next: LocationState) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            let state = self.state.borrow().to_string();
            tracing::debug!(state = %state, "location state changed");
        }
        changed
    }

    fn next_ticket(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket
    }

    fn persist(&self, result: Result<(), LocationError>) {
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist location; keeping in-memory state");
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
