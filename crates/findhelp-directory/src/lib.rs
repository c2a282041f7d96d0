//! Resource search against the external directory service.
//!
//! [`DirectoryClient`] turns a [`SearchRequest`] into one HTTP call and
//! normalizes the provider's response into a [`ResourcePage`].
//! [`SearchSession`] accumulates pages for one term/location into a
//! deduplicated, order-stable list and drives "load more".

pub mod client;
pub mod context;
pub mod dedup;
pub mod error;
pub mod normalize;
pub mod query;
pub mod rank;
pub mod session;
pub mod types;

pub use client::DirectoryClient;
pub use context::SearchContext;
pub use dedup::{dedup_key, ResultAccumulator};
pub use error::DirectoryError;
pub use query::{LocationPolicy, SearchLocation, SearchOptions, SearchQuery, SearchRequest, SearchTerm, SortBy};
pub use rank::rank;
pub use session::{LoadOutcome, ResourceSource, SearchSession, SkipReason};
pub use types::{Resource, ResourcePage};
