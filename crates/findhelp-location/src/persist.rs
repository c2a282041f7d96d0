//! Location snapshots in the key-value store.

use chrono::{DateTime, Utc};
use findhelp_core::{Coordinate, KeyValueStore};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::LocationError;
use crate::state::{PartialAddress, ZipCode};

pub(crate) const ZIP_KEY: &str = "location.zip_code";
pub(crate) const COORDINATES_KEY: &str = "location.coordinates";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ZipSnapshot {
    pub zip_code: ZipCode,
    pub lat: f64,
    pub lng: f64,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CoordinatesSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub location: Option<PartialAddress>,
    pub saved_at: DateTime<Utc>,
}

/// Store the zip and drop any device snapshot, so a restart restores the
/// location the user chose last.
pub(crate) fn save_zip(
    store: &dyn KeyValueStore,
    zip_code: &ZipCode,
    location: Coordinate,
) -> Result<(), LocationError> {
    let snapshot = ZipSnapshot {
        zip_code: zip_code.clone(),
        lat: location.lat,
        lng: location.lng,
        saved_at: Utc::now(),
    };
    write(store, ZIP_KEY, &snapshot)?;
    store.remove(COORDINATES_KEY)?;
    Ok(())
}

pub(crate) fn save_coordinates(
    store: &dyn KeyValueStore,
    latitude: f64,
    longitude: f64,
    location: Option<&PartialAddress>,
) -> Result<(), LocationError> {
    let snapshot = CoordinatesSnapshot {
        latitude,
        longitude,
        location: location.cloned(),
        saved_at: Utc::now(),
    };
    write(store, COORDINATES_KEY, &snapshot)
}

pub(crate) fn clear(store: &dyn KeyValueStore) -> Result<(), LocationError> {
    store.remove(ZIP_KEY)?;
    store.remove(COORDINATES_KEY)?;
    Ok(())
}

pub(crate) fn load_zip(store: &dyn KeyValueStore) -> Result<Option<ZipSnapshot>, LocationError> {
    read(store, ZIP_KEY)
}

pub(crate) fn load_coordinates(
    store: &dyn KeyValueStore,
) -> Result<Option<CoordinatesSnapshot>, LocationError> {
    read(store, COORDINATES_KEY)
}

fn write<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &'static str,
    value: &T,
) -> Result<(), LocationError> {
    let body =
        serde_json::to_string(value).map_err(|source| LocationError::Snapshot { key, source })?;
    store.set(key, &body)?;
    Ok(())
}

fn read<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &'static str,
) -> Result<Option<T>, LocationError> {
    let Some(body) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&body)
        .map(Some)
        .map_err(|source| LocationError::Snapshot { key, source })
}
