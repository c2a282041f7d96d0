//! Normalization of directory responses into [`ResourcePage`]s.
//!
//! Providers disagree on envelope and record field names. Each lookup below
//! tries the known aliases in order and takes the first usable value.

use serde_json::Value;

use crate::dedup::dedup_key;
use crate::error::DirectoryError;
use crate::types::{Resource, ResourcePage};

const ITEMS_KEYS: &[&str] = &["results", "resources", "items"];
const TOTAL_KEYS: &[&str] = &["total", "count", "totalCount"];

/// Normalize one response body.
///
/// `offset` is the offset the page was requested at and feeds `has_more`.
///
/// # Errors
///
/// Returns [`DirectoryError::MalformedResponse`] when the body is not a JSON
/// object, carries no items array, or the array holds non-object entries.
pub fn normalize_page(
    body: &Value,
    offset: u32,
    context: &str,
) -> Result<ResourcePage, DirectoryError> {
    let Some(envelope) = body.as_object() else {
        return Err(malformed(context, "response is not a JSON object"));
    };

    let Some(raw_items) = ITEMS_KEYS
        .iter()
        .find_map(|k| envelope.get(*k).and_then(Value::as_array))
    else {
        return Err(malformed(context, "response has no items array"));
    };

    let mut items = Vec::with_capacity(raw_items.len());
    for (index, raw) in raw_items.iter().enumerate() {
        if !raw.is_object() {
            return Err(malformed(
                context,
                &format!("item {index} is not a JSON object"),
            ));
        }
        items.push(normalize_resource(raw));
    }

    let total = TOTAL_KEYS
        .iter()
        .find_map(|k| envelope.get(*k).and_then(as_count))
        .unwrap_or(items.len() as u64);

    Ok(ResourcePage::new(items, total, offset))
}

/// Map one provider record onto a [`Resource`].
#[must_use]
pub fn normalize_resource(raw: &Value) -> Resource {
    let service_name = first_text(raw, &["nameService", "serviceName", "name"]);
    let organization_name = first_text(raw, &["nameOrganization", "organizationName"]);
    let address_line1 = first_text(raw, &["address1", "addressLine1", "address"]);
    let city = first_text(raw, &["city"]);
    let zip_code = first_text(raw, &["postalCode", "zipCode", "zip"]);

    let key = dedup_key(
        raw,
        service_name
            .as_deref()
            .or(organization_name.as_deref())
            .unwrap_or_default(),
        address_line1.as_deref().unwrap_or_default(),
        city.as_deref().unwrap_or_default(),
        zip_code.as_deref().unwrap_or_default(),
    );

    Resource {
        key,
        service_name,
        organization_name,
        description: first_text(raw, &["description", "descriptionService"]),
        address_line1,
        city,
        state: first_text(raw, &["stateProvince", "state"]),
        zip_code,
        latitude: first_number(raw, &["latitude", "lat"]),
        longitude: first_number(raw, &["longitude", "lng", "lon"]),
        distance_miles: first_number(raw, &["distance", "distanceMiles"]),
        phone: first_text(raw, &["phone", "phoneNumber"]),
        website: first_text(raw, &["website", "url"]),
        raw_data: raw.clone(),
    }
}

fn malformed(context: &str, reason: &str) -> DirectoryError {
    tracing::warn!(context, reason, "malformed directory response");
    DirectoryError::MalformedResponse {
        context: context.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Non-negative integer, sent either as a number or a numeric string.
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First non-blank string among `keys`. Numbers are accepted and rendered,
/// since some providers send zip codes as integers.
fn first_text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match raw.get(*k)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_number(raw: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match raw.get(*k)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn normalizes_results_and_total() {
        let body = json!({
            "results": [
                {"idServiceAtLocation": "sal-1", "nameService": "Pantry", "postalCode": "93101", "distance": 1.2},
                {"idServiceAtLocation": "sal-2", "nameService": "Shelter"}
            ],
            "total": 10
        });
        let page = normalize_page(&body, 0, "test").expect("valid page");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 10);
        assert!(page.has_more);
        assert_eq!(page.items[0].key, "sal:sal-1");
        assert_eq!(page.items[0].zip_code.as_deref(), Some("93101"));
        assert_eq!(page.items[0].distance_miles, Some(1.2));
    }

    #[test]
    fn accepts_resources_and_count_aliases() {
        let body = json!({"resources": [{"id": 1}, {"id": 2}], "count": "2"});
        let page = normalize_page(&body, 0, "test").expect("valid page");
        assert_eq!(page.total, 2);
        assert!(!page.has_more);
    }

    #[test]
    fn missing_total_falls_back_to_item_count() {
        let body = json!({"items": [{"id": "a"}, {"id": "b"}, {"id": "c"}]});
        let page = normalize_page(&body, 0, "test").expect("valid page");
        assert_eq!(page.total, 3);
        assert!(!page.has_more);
    }

    #[test]
    fn empty_items_is_a_valid_empty_page() {
        let body = json!({"results": [], "total": 0});
        let page = normalize_page(&body, 0, "test").expect("valid page");
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn non_object_body_is_malformed() {
        let err = normalize_page(&json!([1, 2, 3]), 0, "test").unwrap_err();
        assert!(matches!(err, DirectoryError::MalformedResponse { .. }));
    }

    #[test]
    fn missing_items_is_malformed_not_empty() {
        let err = normalize_page(&json!({"total": 0}), 0, "test").unwrap_err();
        assert!(matches!(err, DirectoryError::MalformedResponse { .. }));

        let err = normalize_page(&json!({"results": "none"}), 0, "test").unwrap_err();
        assert!(matches!(err, DirectoryError::MalformedResponse { .. }));
    }

    #[test]
    fn non_object_item_is_malformed() {
        let err = normalize_page(&json!({"results": [{"id": 1}, "oops"]}), 0, "test").unwrap_err();
        match err {
            DirectoryError::MalformedResponse { reason, .. } => assert!(reason.contains("item 1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn resource_fields_use_aliases_and_numeric_strings() {
        let raw = json!({
            "serviceId": 7,
            "locationId": 3,
            "serviceName": "Clinic",
            "organizationName": "County Health",
            "address": "300 N San Antonio Rd",
            "city": "Santa Barbara",
            "state": "CA",
            "zip": 93110,
            "latitude": "34.44",
            "longitude": -119.77,
            "distanceMiles": "2.5",
            "phoneNumber": "805-555-0100",
            "url": "https://example.org"
        });
        let r = normalize_resource(&raw);
        assert_eq!(r.key, "svc:7@loc:3");
        assert_eq!(r.display_name(), "Clinic");
        assert_eq!(r.organization_name.as_deref(), Some("County Health"));
        assert_eq!(r.zip_code.as_deref(), Some("93110"));
        assert_eq!(r.latitude, Some(34.44));
        assert_eq!(r.distance_miles, Some(2.5));
        assert_eq!(r.phone.as_deref(), Some("805-555-0100"));
        assert_eq!(r.website.as_deref(), Some("https://example.org"));
        assert_eq!(r.raw_data, raw);
    }
}
