//! Saved-location command handlers.

use std::sync::Arc;

use findhelp_core::AppConfig;
use findhelp_directory::SearchContext;
use findhelp_location::{LocationResolver, LocationState, PartialAddress, StaticGeolocator};

use crate::open_store;

fn resolver(
    config: &AppConfig,
    geolocator: StaticGeolocator,
) -> anyhow::Result<LocationResolver<StaticGeolocator>> {
    Ok(LocationResolver::from_config(
        geolocator,
        open_store(config)?,
        config,
    ))
}

pub(crate) fn run_zip(config: &AppConfig, zip: &str) -> anyhow::Result<()> {
    let resolver = resolver(config, StaticGeolocator::unavailable())?;
    let state = resolver.set_zip_code(zip)?;
    println!("location set: {state}");
    Ok(())
}

pub(crate) async fn run_locate(
    config: &AppConfig,
    latitude: f64,
    longitude: f64,
    postal_code: Option<String>,
    city: Option<String>,
) -> anyhow::Result<()> {
    let mut geolocator = StaticGeolocator::at(latitude, longitude);
    if postal_code.is_some() || city.is_some() {
        geolocator = geolocator.with_address(PartialAddress {
            city,
            region: None,
            postal_code,
        });
    }
    let resolver = resolver(config, geolocator)?;
    let state = resolver.use_device_location().await?;
    println!("location set: {state}");
    Ok(())
}

pub(crate) fn run_show(config: &AppConfig) -> anyhow::Result<()> {
    let resolver = resolver(config, StaticGeolocator::unavailable())?;
    match resolver.restore() {
        LocationState::None => println!("no saved location"),
        state => println!("{state}"),
    }
    Ok(())
}

pub(crate) fn run_clear(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    LocationResolver::from_config(StaticGeolocator::unavailable(), Arc::clone(&store), config)
        .clear();
    // The last search was tied to the forgotten location.
    SearchContext::clear(store.as_ref())?;
    println!("saved location and last search cleared");
    Ok(())
}
