//! Client-side ordering of accumulated results.

use std::cmp::Ordering;

use findhelp_core::{distance, Coordinate, DistanceUnit, ZipTable};

use crate::query::SortBy;
use crate::types::Resource;

/// Return `items` ordered by `sort_by`. Every ordering is stable, so ties
/// keep first-seen order.
///
/// Distance prefers the provider's `distance_miles`; otherwise it is the
/// Haversine distance from `origin` to the item's zip in `zip_table`. Items
/// with no derivable distance sort last.
#[must_use]
pub fn rank(
    items: &[Resource],
    sort_by: SortBy,
    origin: Option<Coordinate>,
    zip_table: &ZipTable,
) -> Vec<Resource> {
    let mut ranked = items.to_vec();
    match sort_by {
        SortBy::Relevance => {}
        SortBy::Distance => {
            ranked.sort_by_cached_key(|r| DistanceKey(miles_from(r, origin, zip_table)));
        }
        SortBy::Name => {
            ranked.sort_by_cached_key(|r| r.display_name().to_lowercase());
        }
    }
    ranked
}

/// Distance to an item in miles, as used for ranking.
#[must_use]
pub fn miles_from(item: &Resource, origin: Option<Coordinate>, zip_table: &ZipTable) -> Option<f64> {
    item.distance_miles.or_else(|| {
        let origin = origin?;
        let target = zip_table.lookup(item.zip_code.as_deref()?)?;
        Some(distance(origin, target, DistanceUnit::Miles))
    })
}

/// Ascending by distance with unknown distances last.
#[derive(PartialEq)]
struct DistanceKey(Option<f64>);

impl Eq for DistanceKey {}

impl PartialOrd for DistanceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DistanceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}
