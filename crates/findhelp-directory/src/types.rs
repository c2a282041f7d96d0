//! Normalized directory records.
//!
//! Providers disagree on field names; [`crate::normalize`] maps every known
//! variant onto these types. Only `key`, `zip_code`, and `distance_miles`
//! drive deduplication and ranking; the rest is carried for display.

use serde::{Deserialize, Serialize};

/// One service offered at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Composite dedup key; see [`crate::dedup::dedup_key`].
    pub key: String,
    pub service_name: Option<String>,
    pub organization_name: Option<String>,
    pub description: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Provider-computed distance from the search location.
    pub distance_miles: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// The provider's record, preserved as received.
    pub raw_data: serde_json::Value,
}

impl Resource {
    /// Service name, then organization name, then the dedup key.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.service_name
            .as_deref()
            .or(self.organization_name.as_deref())
            .unwrap_or(&self.key)
    }
}

/// One page of results, in provider order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePage {
    pub items: Vec<Resource>,
    /// Provider total, or `items.len()` when the provider sent none.
    pub total: u64,
    /// `offset + items.len() < total`, computed locally.
    pub has_more: bool,
}

impl ResourcePage {
    /// Builds a page and derives `has_more` from the request offset.
    ///
    /// An empty page never reports more results, so a provider whose total
    /// overstates what it can return does not cause endless continuation.
    #[must_use]
    pub fn new(items: Vec<Resource>, total: u64, offset: u32) -> Self {
        let fetched_through = u64::from(offset) + items.len() as u64;
        let has_more = !items.is_empty() && fetched_through < total;
        Self {
            items,
            total,
            has_more,
        }
    }
}
