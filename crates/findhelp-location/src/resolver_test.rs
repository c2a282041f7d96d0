use std::sync::Arc;
use std::time::Duration;

use findhelp_core::{Coordinate, KeyValueStore, MemoryStore, StoreError};
use tokio::sync::Notify;

use super::*;
use crate::geolocation::{DevicePosition, StaticGeolocator};
use crate::state::PartialAddress;

fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

fn resolver(geolocator: StaticGeolocator) -> (LocationResolver<StaticGeolocator>, Arc<dyn KeyValueStore>) {
    let store = memory_store();
    (LocationResolver::new(geolocator, Arc::clone(&store)), store)
}

/// Grants permission but never produces a fix.
struct PendingGeolocator;

impl Geolocator for PendingGeolocator {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<DevicePosition, LocationError> {
        std::future::pending().await
    }
}

/// Never answers the permission prompt.
struct UnansweredPromptGeolocator;

impl Geolocator for UnansweredPromptGeolocator {
    async fn request_permission(&self) -> Permission {
        std::future::pending().await
    }

    async fn current_position(&self) -> Result<DevicePosition, LocationError> {
        Ok(DevicePosition {
            latitude: 34.0,
            longitude: -119.0,
        })
    }
}

/// Produces a fix immediately but reverse geocoding never completes.
struct StalledReverseGeolocator;

impl Geolocator for StalledReverseGeolocator {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<DevicePosition, LocationError> {
        Ok(DevicePosition {
            latitude: 34.42,
            longitude: -119.70,
        })
    }

    async fn reverse_geocode(&self, _position: DevicePosition) -> Option<PartialAddress> {
        std::future::pending().await
    }
}

/// Produces a fix only once released.
struct GatedGeolocator {
    release: Notify,
}

impl Geolocator for GatedGeolocator {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<DevicePosition, LocationError> {
        self.release.notified().await;
        Ok(DevicePosition {
            latitude: 34.0,
            longitude: -119.0,
        })
    }
}

/// Reads succeed with nothing stored; every write fails.
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: key.to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.set(key, "")
    }
}

#[test]
fn starts_with_no_location() {
    let (resolver, _) = resolver(StaticGeolocator::unavailable());
    assert_eq!(resolver.state(), LocationState::None);
}

#[tokio::test]
async fn device_location_resolves_to_coordinates_and_persists() {
    let address = PartialAddress {
        city: Some("Santa Barbara".into()),
        region: Some("CA".into()),
        postal_code: Some("93101".into()),
    };
    let (resolver, store) =
        resolver(StaticGeolocator::at(34.42, -119.70).with_address(address.clone()));
    let mut rx = resolver.subscribe();

    let state = resolver.use_device_location().await.unwrap();

    let expected = LocationState::Coordinates {
        latitude: 34.42,
        longitude: -119.70,
        location: Some(address),
    };
    assert_eq!(state, expected);
    assert_eq!(resolver.state(), expected);
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), expected);

    let snapshot = persist::load_coordinates(store.as_ref()).unwrap().unwrap();
    assert!((snapshot.latitude - 34.42).abs() < f64::EPSILON);
}

#[tokio::test]
async fn permission_denied_moves_to_error() {
    let (resolver, store) = resolver(StaticGeolocator::denied());
    let err = resolver.use_device_location().await.unwrap_err();
    assert!(matches!(err, LocationError::PermissionDenied));
    assert!(matches!(resolver.state(), LocationState::Error { .. }));
    assert!(persist::load_coordinates(store.as_ref()).unwrap().is_none());
}

#[tokio::test]
async fn missing_fix_moves_to_error() {
    let (resolver, _) = resolver(StaticGeolocator::unavailable());
    let err = resolver.use_device_location().await.unwrap_err();
    assert!(matches!(err, LocationError::Unavailable(_)));
    assert!(matches!(resolver.state(), LocationState::Error { .. }));
}

#[tokio::test]
async fn device_request_times_out_instead_of_hanging() {
    let resolver = LocationResolver::new(PendingGeolocator, memory_store())
        .with_geolocation_timeout(Duration::from_millis(50));
    let err = resolver.use_device_location().await.unwrap_err();
    assert!(matches!(err, LocationError::Timeout { .. }), "got {err:?}");
    assert!(matches!(resolver.state(), LocationState::Error { .. }));
}

#[tokio::test]
async fn unanswered_permission_prompt_times_out() {
    let resolver = LocationResolver::new(UnansweredPromptGeolocator, memory_store())
        .with_geolocation_timeout(Duration::from_millis(50));
    let err = resolver.use_device_location().await.unwrap_err();
    assert!(matches!(err, LocationError::Timeout { .. }), "got {err:?}");
    assert!(!resolver.state().is_loading());
}

#[tokio::test]
async fn stalled_reverse_geocode_keeps_coordinates_without_address() {
    let resolver = LocationResolver::new(StalledReverseGeolocator, memory_store())
        .with_geolocation_timeout(Duration::from_millis(50));

    let state = tokio::time::timeout(Duration::from_secs(2), resolver.use_device_location())
        .await
        .expect("device request must finish")
        .unwrap();

    assert!(matches!(state, LocationState::Coordinates { location: None, .. }), "got {state:?}");
    assert_eq!(resolver.state(), state);
}

#[test]
fn known_zip_resolves_with_coordinates() {
    let (resolver, store) = resolver(StaticGeolocator::unavailable());
    let state = resolver.set_zip_code("93101").unwrap();
    match state {
        LocationState::ZipCode { zip_code, location } => {
            assert_eq!(zip_code.as_str(), "93101");
            assert_eq!(location, Coordinate::new(34.419_25, -119.708_08));
        }
        other => panic!("expected zip state, got {other:?}"),
    }
    assert!(persist::load_zip(store.as_ref()).unwrap().is_some());
}

#[test]
fn unknown_zip_moves_to_error_never_to_zip_state() {
    let (resolver, store) = resolver(StaticGeolocator::unavailable());
    let err = resolver.set_zip_code("00000").unwrap_err();
    assert!(matches!(err, LocationError::ZipNotFound { ref zip } if zip == "00000"));
    assert!(matches!(resolver.state(), LocationState::Error { .. }));
    assert!(persist::load_zip(store.as_ref()).unwrap().is_none());
}

#[test]
fn malformed_zip_is_rejected_before_lookup() {
    let (resolver, _) = resolver(StaticGeolocator::unavailable());
    let err = resolver.set_zip_code("9310a").unwrap_err();
    assert!(matches!(err, LocationError::InvalidZip { .. }));
    assert!(matches!(resolver.state(), LocationState::Error { .. }));
}

#[test]
fn error_is_recovered_by_a_new_user_action() {
    let (resolver, _) = resolver(StaticGeolocator::unavailable());
    resolver.set_zip_code("00000").unwrap_err();
    resolver.set_zip_code("93108").unwrap();
    assert!(matches!(resolver.state(), LocationState::ZipCode { .. }));
}

#[tokio::test]
async fn zip_after_device_replaces_the_whole_state() {
    let (resolver, store) = resolver(StaticGeolocator::at(34.0, -119.0));
    resolver.use_device_location().await.unwrap();
    resolver.set_zip_code("93108").unwrap();

    assert!(matches!(resolver.state(), LocationState::ZipCode { .. }));
    assert!(persist::load_coordinates(store.as_ref()).unwrap().is_none());
}

#[test]
fn clear_resets_state_and_storage() {
    let (resolver, store) = resolver(StaticGeolocator::unavailable());
    resolver.set_zip_code("93101").unwrap();
    resolver.clear();
    assert_eq!(resolver.state(), LocationState::None);
    assert!(persist::load_zip(store.as_ref()).unwrap().is_none());
}

#[test]
fn restore_prefers_device_coordinates_over_zip() {
    let store = memory_store();
    persist::save_zip(
        store.as_ref(),
        &ZipCode::parse("93101").unwrap(),
        Coordinate::new(34.419_25, -119.708_08),
    )
    .unwrap();
    persist::save_coordinates(store.as_ref(), 34.5, -119.5, None).unwrap();

    let resolver = LocationResolver::new(StaticGeolocator::unavailable(), store);
    let state = resolver.restore();
    assert_eq!(
        state,
        LocationState::Coordinates {
            latitude: 34.5,
            longitude: -119.5,
            location: None,
        }
    );
}

#[test]
fn restore_loads_zip_snapshot() {
    let store = memory_store();
    let first = LocationResolver::new(StaticGeolocator::unavailable(), Arc::clone(&store));
    first.set_zip_code("93108").unwrap();

    let second = LocationResolver::new(StaticGeolocator::unavailable(), store);
    assert_eq!(second.restore(), first.state());
}

#[test]
fn restore_of_identical_value_emits_nothing() {
    let (resolver, _) = resolver(StaticGeolocator::unavailable());
    resolver.set_zip_code("93101").unwrap();

    let mut rx = resolver.subscribe();
    rx.borrow_and_update();
    resolver.restore();
    resolver.restore();
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn restore_with_nothing_persisted_keeps_state() {
    let (resolver, _) = resolver(StaticGeolocator::unavailable());
    assert_eq!(resolver.restore(), LocationState::None);
}

#[test]
fn restore_ignores_unreadable_snapshots() {
    let store = memory_store();
    store.set(persist::COORDINATES_KEY, "garbage").unwrap();
    let resolver = LocationResolver::new(StaticGeolocator::unavailable(), store);
    assert_eq!(resolver.restore(), LocationState::None);
}

#[test]
fn persistence_failure_keeps_in_memory_transition() {
    let resolver = LocationResolver::new(StaticGeolocator::unavailable(), Arc::new(ReadOnlyStore));
    resolver.set_zip_code("93101").unwrap();
    assert!(matches!(resolver.state(), LocationState::ZipCode { .. }));
}

#[tokio::test]
async fn superseded_device_result_is_discarded() {
    let resolver = LocationResolver::new(
        GatedGeolocator {
            release: Notify::new(),
        },
        memory_store(),
    );

    let (device, ()) = tokio::join!(resolver.use_device_location(), async {
        tokio::task::yield_now().await;
        resolver.set_zip_code("93101").unwrap();
        resolver.geolocator.release.notify_one();
    });

    let state = device.unwrap();
    assert!(matches!(state, LocationState::ZipCode { .. }), "got {state:?}");
    assert!(matches!(resolver.state(), LocationState::ZipCode { .. }));
}
