//! Search term and location encoding.
//!
//! A [`SearchQuery`] is the identity of one search session: the resolved
//! term plus the location it runs against. [`SearchRequest`] adds the page
//! window and renders the provider's query parameters.

use std::str::FromStr;

use findhelp_core::{AppConfig, Coordinate, LocationMode, Taxonomy};
use findhelp_location::LocationState;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// How the term is sent to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SearchTerm {
    /// Free-text search; always lower-cased and trimmed.
    Keyword(String),
    /// Search by provider taxonomy code (`keywordIsTaxonomyCode=true`).
    TaxonomyCode(String),
}

impl SearchTerm {
    /// Resolve free text into a search term.
    ///
    /// Subcategory names map to their taxonomy code. Otherwise the text is
    /// resolved as a category: a code-addressed category searches by its
    /// code, and everything else (keyword categories, unmatched text)
    /// searches by the text itself.
    #[must_use]
    pub fn resolve(text: &str, is_subcategory: bool, taxonomy: &Taxonomy) -> Self {
        let code = if is_subcategory {
            taxonomy.subcategory_code_by_name(text)
        } else {
            taxonomy
                .resolve_category(text)
                .and_then(findhelp_core::CategoryDescriptor::taxonomy_code)
        };

        match code {
            Some(code) => SearchTerm::TaxonomyCode(code.to_owned()),
            None => SearchTerm::Keyword(text.trim().to_lowercase()),
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            SearchTerm::Keyword(v) | SearchTerm::TaxonomyCode(v) => v,
        }
    }

    #[must_use]
    pub fn is_taxonomy_code(&self) -> bool {
        matches!(self, SearchTerm::TaxonomyCode(_))
    }
}

/// The location parameters sent with every search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchLocation {
    /// A known zip: postal-code mode, bounded radius, distance ordering.
    PostalCode { zip: String, radius_miles: u32 },
    /// No zip known: search a named service region.
    Region { name: String, mode: LocationMode },
}

impl SearchLocation {
    #[must_use]
    pub fn mode(&self) -> LocationMode {
        match self {
            SearchLocation::PostalCode { .. } => LocationMode::PostalCode,
            SearchLocation::Region { mode, .. } => *mode,
        }
    }
}

impl std::fmt::Display for SearchLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchLocation::PostalCode { zip, radius_miles } => {
                write!(f, "{zip} (within {radius_miles} mi)")
            }
            SearchLocation::Region { name, mode } => write!(f, "{name} ({mode})"),
        }
    }
}

/// Turns a [`LocationState`] into the location a search runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationPolicy {
    pub fallback_region: String,
    pub fallback_mode: LocationMode,
    pub max_distance_miles: u32,
}

impl Default for LocationPolicy {
    fn default() -> Self {
        Self {
            fallback_region: "Santa Barbara County, CA".to_string(),
            fallback_mode: LocationMode::Within,
            max_distance_miles: 25,
        }
    }
}

impl LocationPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            fallback_region: config.fallback_region.clone(),
            fallback_mode: config.fallback_location_mode,
            max_distance_miles: config.max_distance_miles,
        }
    }

    /// Zip states and device positions with a 5-digit postal code search by
    /// zip; every other state falls back to the configured region.
    #[must_use]
    pub fn search_location(&self, state: &LocationState) -> SearchLocation {
        match state.postal_code() {
            Some(zip) => SearchLocation::PostalCode {
                zip: zip.as_str().to_owned(),
                radius_miles: self.max_distance_miles,
            },
            None => SearchLocation::Region {
                name: self.fallback_region.clone(),
                mode: self.fallback_mode,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    Distance,
    Name,
}

impl SortBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Distance => "distance",
            SortBy::Name => "name",
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortBy::Relevance),
            "distance" => Ok(SortBy::Distance),
            "name" => Ok(SortBy::Name),
            other => Err(format!(
                "unknown sort '{other}'; expected relevance, distance, or name"
            )),
        }
    }
}

/// Per-call search options.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub is_subcategory: bool,
    pub location: LocationState,
    pub sort_by: SortBy,
    pub offset: u32,
    pub page_size: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            is_subcategory: false,
            location: LocationState::None,
            sort_by: SortBy::Relevance,
            offset: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A resolved search: what to look for, where, and how to order it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// The text as entered, kept for display and the persisted context.
    pub text: String,
    pub is_subcategory: bool,
    pub term: SearchTerm,
    pub location: SearchLocation,
    /// Reference point for client-side distance ranking.
    pub origin: Option<Coordinate>,
    pub sort_by: SortBy,
}

impl SearchQuery {
    /// Resolve `text` and `opts.location` into a query. The page window in
    /// `opts` is ignored.
    #[must_use]
    pub fn resolve(
        text: &str,
        opts: &SearchOptions,
        taxonomy: &Taxonomy,
        policy: &LocationPolicy,
    ) -> Self {
        Self {
            text: text.trim().to_owned(),
            is_subcategory: opts.is_subcategory,
            term: SearchTerm::resolve(text, opts.is_subcategory, taxonomy),
            location: policy.search_location(&opts.location),
            origin: opts.location.coordinate(),
            sort_by: opts.sort_by,
        }
    }

    /// Two queries belong to the same session when term and location agree.
    #[must_use]
    pub fn same_search(&self, other: &SearchQuery) -> bool {
        self.term == other.term && self.location == other.location
    }

    #[must_use]
    pub fn page(&self, offset: u32, page_size: u32) -> SearchRequest {
        SearchRequest {
            term: self.term.clone(),
            location: self.location.clone(),
            offset,
            page_size,
        }
    }
}

/// One page request against the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: SearchTerm,
    pub location: SearchLocation,
    pub offset: u32,
    pub page_size: u32,
}

impl SearchRequest {
    #[must_use]
    pub fn build(
        text: &str,
        opts: &SearchOptions,
        taxonomy: &Taxonomy,
        policy: &LocationPolicy,
    ) -> Self {
        SearchQuery::resolve(text, opts, taxonomy, policy).page(opts.offset, opts.page_size)
    }

    /// Provider query parameters, in a fixed order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("keywords", self.term.value().to_owned()),
            (
                "keywordIsTaxonomyCode",
                self.term.is_taxonomy_code().to_string(),
            ),
        ];

        match &self.location {
            SearchLocation::PostalCode { zip, radius_miles } => {
                pairs.push(("location", zip.clone()));
                pairs.push(("locationMode", LocationMode::PostalCode.as_param().to_owned()));
                pairs.push(("distance", radius_miles.to_string()));
                pairs.push(("orderByDistance", "true".to_owned()));
            }
            SearchLocation::Region { name, mode } => {
                pairs.push(("location", name.clone()));
                pairs.push(("locationMode", mode.as_param().to_owned()));
            }
        }

        pairs.push(("offset", self.offset.to_string()));
        pairs.push(("pageSize", self.page_size.to_string()));
        pairs
    }
}
