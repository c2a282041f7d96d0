//! Dedup keys and the first-seen accumulator.

use std::collections::HashSet;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::types::Resource;

const SERVICE_AT_LOCATION_ID_KEYS: &[&str] = &["idServiceAtLocation", "serviceAtLocationId"];
const SERVICE_ID_KEYS: &[&str] = &["idService", "serviceId"];
const LOCATION_ID_KEYS: &[&str] = &["idLocation", "locationId"];
const FALLBACK_ID_KEYS: &[&str] = &["id", "_id"];

/// Compute the composite dedup key for a raw provider record.
///
/// Preference order: service-at-location id, service id paired with location
/// id, service id alone, generic id. Records with none of these fall back to
/// a SHA-256 over lower-cased name, address, city, and zip, hex-encoded.
#[must_use]
pub fn dedup_key(raw: &Value, name: &str, address: &str, city: &str, zip: &str) -> String {
    if let Some(id) = first_id(raw, SERVICE_AT_LOCATION_ID_KEYS) {
        return format!("sal:{id}");
    }

    let service = first_id(raw, SERVICE_ID_KEYS);
    let location = first_id(raw, LOCATION_ID_KEYS);
    match (service, location) {
        (Some(s), Some(l)) => return format!("svc:{s}@loc:{l}"),
        (Some(s), None) => return format!("svc:{s}"),
        _ => {}
    }

    if let Some(id) = first_id(raw, FALLBACK_ID_KEYS) {
        return format!("id:{id}");
    }

    let input = format!(
        "{}\x00{}\x00{}\x00{}",
        name.trim().to_lowercase(),
        address.trim().to_lowercase(),
        city.trim().to_lowercase(),
        zip.trim(),
    );
    format!("hash:{:x}", Sha256::digest(input.as_bytes()))
}

/// First non-empty id among `keys`; numeric ids are rendered as text.
fn first_id(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match raw.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accumulates pages into one list, keeping the first occurrence of each
/// key in the order it was first seen.
#[derive(Debug, Clone, Default)]
pub struct ResultAccumulator {
    items: Vec<Resource>,
    seen: HashSet<String>,
}

impl ResultAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unseen items; returns how many were added.
    pub fn merge<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = Resource>,
    {
        let before = self.items.len();
        for item in items {
            if self.seen.insert(item.key.clone()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    #[must_use]
    pub fn items(&self) -> &[Resource] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
