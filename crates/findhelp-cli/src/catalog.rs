//! Taxonomy and distance command handlers. These never touch the network.

use findhelp_core::{distance, lookup_zip, DistanceUnit, Taxonomy};
use findhelp_directory::SearchTerm;

pub(crate) fn run_categories(taxonomy: &Taxonomy) {
    for category in taxonomy.categories() {
        let query = match category.taxonomy_code() {
            Some(code) => format!("code {code}"),
            None => format!("keywords: {}", category.keywords().join(", ")),
        };
        println!("{:<16} {:<24} {query}", category.id, category.name);
        for sub in taxonomy.subcategories(&category.id) {
            println!("  {:<30} {}", sub.name, sub.taxonomy_code);
        }
    }
}

pub(crate) fn run_resolve(taxonomy: &Taxonomy, term: &str, subcategory: bool) {
    if !subcategory {
        match taxonomy.resolve_category(term) {
            Some(category) => println!("category: {} ({})", category.name, category.id),
            None => println!("category: no match"),
        }
    }
    match SearchTerm::resolve(term, subcategory, taxonomy) {
        SearchTerm::TaxonomyCode(code) => println!("search:   taxonomy code {code}"),
        SearchTerm::Keyword(keyword) => println!("search:   keyword \"{keyword}\""),
    }
}

pub(crate) fn run_distance(from: &str, to: &str, km: bool) -> anyhow::Result<()> {
    let a = lookup_zip(from).ok_or_else(|| anyhow::anyhow!("zip code {from} was not found"))?;
    let b = lookup_zip(to).ok_or_else(|| anyhow::anyhow!("zip code {to} was not found"))?;
    let unit = if km {
        DistanceUnit::Kilometers
    } else {
        DistanceUnit::Miles
    };
    println!("{:.2} {}", distance(a, b, unit), unit.suffix());
    Ok(())
}
