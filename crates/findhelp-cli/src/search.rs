//! Directory search command handlers.

use std::sync::Arc;

use findhelp_core::{AppConfig, MemoryStore, Taxonomy, ZipTable};
use findhelp_directory::rank::miles_from;
use findhelp_directory::{
    DirectoryClient, DirectoryError, LoadOutcome, LocationPolicy, SearchContext, SearchOptions,
    SearchQuery, SearchSession, SortBy,
};
use findhelp_location::{LocationResolver, StaticGeolocator};

use crate::open_store;

#[derive(Debug)]
pub(crate) struct SearchArgs {
    pub term: String,
    pub subcategory: bool,
    pub sort: SortBy,
    pub pages: u32,
    pub zip: Option<String>,
}

pub(crate) async fn run_search(
    config: &AppConfig,
    taxonomy: &Taxonomy,
    args: SearchArgs,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let location = match &args.zip {
        // A one-off zip is resolved in memory and never saved.
        Some(zip) => LocationResolver::new(StaticGeolocator::unavailable(), Arc::new(MemoryStore::new()))
            .set_zip_code(zip)?,
        None => LocationResolver::from_config(StaticGeolocator::unavailable(), Arc::clone(&store), config)
            .restore(),
    };
    if !location.is_resolved() {
        println!("no saved location; searching the default region");
    }

    let opts = SearchOptions {
        is_subcategory: args.subcategory,
        location,
        sort_by: args.sort,
        ..SearchOptions::default()
    };
    let query = SearchQuery::resolve(&args.term, &opts, taxonomy, &LocationPolicy::from_config(config));
    let origin = query.origin;
    println!(
        "searching {} near {}",
        describe_term(&query),
        query.location
    );

    let session = SearchSession::new(DirectoryClient::new(config)?, config.page_size).with_store(store);
    session.start(query).await.map_err(surface)?;
    for _ in 1..args.pages.max(1) {
        match session.load_more().await.map_err(surface)? {
            LoadOutcome::Loaded { .. } => {}
            LoadOutcome::Skipped(_) | LoadOutcome::Stale => break,
        }
    }

    let results = session.ranked();
    if results.is_empty() {
        println!("no resources found");
        return Ok(());
    }
    for (index, resource) in results.iter().enumerate() {
        let miles = miles_from(resource, origin, ZipTable::bundled())
            .map(|m| format!("{m:.1} mi"))
            .unwrap_or_default();
        let place = [resource.city.as_deref(), resource.zip_code.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:>3}. {:<40} {:<24} {miles}",
            index + 1,
            resource.display_name(),
            place
        );
    }
    println!(
        "{} of {} shown{}",
        results.len(),
        session.total(),
        if session.has_more() { "; more available" } else { "" }
    );
    Ok(())
}

pub(crate) fn run_last(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    match SearchContext::load(store.as_ref())? {
        Some(context) => {
            let kind = if context.is_subcategory {
                "subcategory"
            } else {
                "term"
            };
            println!("{kind} \"{}\" near {}", context.term, context.location);
        }
        None => println!("no previous search"),
    }
    Ok(())
}

fn describe_term(query: &SearchQuery) -> String {
    if query.term.is_taxonomy_code() {
        format!("\"{}\" (taxonomy code {})", query.text, query.term.value())
    } else {
        format!("\"{}\"", query.term.value())
    }
}

/// Log the full error and hand the user-facing message to `anyhow`.
fn surface(error: DirectoryError) -> anyhow::Error {
    tracing::error!(error = %error, "directory search failed");
    anyhow::anyhow!(error.user_message())
}
