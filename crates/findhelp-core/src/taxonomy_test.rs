use super::*;

const SAMPLE: &str = r"
categories:
  - id: food
    name: Food
    keywords: [food, meals, pantry]
    subcategories:
      - { id: food-pantries, name: Food Pantries, taxonomy_code: BD-1800.2000 }
  - id: housing
    name: Housing
    taxonomy_code: BH
    subcategories:
      - { id: emergency-shelter, name: Emergency Shelter, taxonomy_code: BH-1800 }
";

fn sample() -> Taxonomy {
    Taxonomy::from_yaml(SAMPLE).unwrap()
}

#[test]
fn bundled_taxonomy_is_valid() {
    let taxonomy = Taxonomy::bundled();
    assert!(!taxonomy.categories().is_empty());
    for category in taxonomy.categories() {
        let has_code = category.taxonomy_code().is_some();
        let has_keywords = !category.keywords().is_empty();
        assert!(has_code ^ has_keywords, "category {} breaks code xor keywords", category.id);
    }
}

#[test]
fn resolving_a_category_name_returns_that_category() {
    let taxonomy = Taxonomy::bundled();
    for category in taxonomy.categories() {
        let resolved = taxonomy.resolve_category(&category.name).map(|c| c.id.as_str());
        assert_eq!(resolved, Some(category.id.as_str()), "name {:?}", category.name);
    }
}

#[test]
fn mental_health_is_not_shadowed_by_healthcare() {
    let taxonomy = Taxonomy::bundled();
    assert_eq!(taxonomy.resolve_category("Mental Health").unwrap().id, "mental-health");
    assert_eq!(taxonomy.resolve_category("health clinic").unwrap().id, "healthcare");
}

#[test]
fn resolving_a_category_id_returns_that_category() {
    let taxonomy = Taxonomy::bundled();
    for category in taxonomy.categories() {
        let resolved = taxonomy.resolve_category(&category.id).unwrap();
        assert_eq!(resolved, category);
    }
}

#[test]
fn exact_id_match_is_case_insensitive_and_trimmed() {
    let taxonomy = sample();
    assert_eq!(taxonomy.resolve_category("  HOUSING ").unwrap().id, "housing");
}

#[test]
fn keyword_contained_in_term_matches() {
    let taxonomy = sample();
    let category = taxonomy.resolve_category("Food Pantry Near Me").unwrap();
    assert_eq!(category.id, "food");
}

#[test]
fn term_contained_in_keyword_matches() {
    let taxonomy = sample();
    assert_eq!(taxonomy.resolve_category("meal").unwrap().id, "food");
}

#[test]
fn taxonomy_code_category_matches_only_exact_code_or_id() {
    let taxonomy = sample();
    assert_eq!(taxonomy.resolve_category("BH").unwrap().id, "housing");
    assert_eq!(taxonomy.resolve_category("bh").unwrap().id, "housing");
    assert_eq!(taxonomy.resolve_category("housing").unwrap().id, "housing");
    assert!(taxonomy.resolve_category("BH-1800").is_none());
    assert!(taxonomy.resolve_category("affordable housing help").is_none());
}

#[test]
fn unknown_or_empty_term_resolves_to_none() {
    let taxonomy = sample();
    assert!(taxonomy.resolve_category("veterinarian").is_none());
    assert!(taxonomy.resolve_category("   ").is_none());
}

#[test]
fn first_declared_keyword_category_wins() {
    let yaml = r"
categories:
  - id: first
    name: First
    keywords: [help]
  - id: second
    name: Second
    keywords: [help]
";
    let taxonomy = Taxonomy::from_yaml(yaml).unwrap();
    assert_eq!(taxonomy.resolve_category("help now").unwrap().id, "first");
}

#[test]
fn subcategory_code_lookup() {
    let taxonomy = sample();
    assert_eq!(
        taxonomy.subcategory_taxonomy_code("food", "food-pantries"),
        Some("BD-1800.2000")
    );
    assert_eq!(taxonomy.subcategory_taxonomy_code("food", "emergency-shelter"), None);
    assert_eq!(taxonomy.subcategory_taxonomy_code("unknown", "food-pantries"), None);
    assert_eq!(taxonomy.subcategory_taxonomy_code("housing", "nope"), None);
}

#[test]
fn subcategory_code_result_outlives_the_category_argument() {
    let taxonomy = sample();
    let code = {
        let category_id = String::from("  FOOD ");
        taxonomy.subcategory_taxonomy_code(&category_id, "Food-Pantries")
    };
    assert_eq!(code, Some("BD-1800.2000"));
}

#[test]
fn subcategory_code_by_name_is_case_insensitive() {
    let taxonomy = sample();
    assert_eq!(
        taxonomy.subcategory_code_by_name("emergency shelter"),
        Some("BH-1800")
    );
    assert_eq!(taxonomy.subcategory_code_by_name("Bike Repair"), None);
}

#[test]
fn subcategories_are_listed_per_category() {
    let taxonomy = sample();
    let ids: Vec<&str> = taxonomy.subcategories("food").map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["food-pantries"]);
}

#[test]
fn validate_rejects_code_and_keywords_together() {
    let yaml = r"
categories:
  - id: both
    name: Both
    taxonomy_code: BD
    keywords: [food]
";
    let err = Taxonomy::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("both a taxonomy_code and keywords"));
}

#[test]
fn validate_rejects_neither_code_nor_keywords() {
    let yaml = r"
categories:
  - id: neither
    name: Neither
    keywords: []
";
    let err = Taxonomy::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("needs either"));
}

#[test]
fn validate_rejects_duplicate_category_ids() {
    let yaml = r"
categories:
  - { id: food, name: Food, keywords: [food] }
  - { id: FOOD, name: More Food, keywords: [meals] }
";
    let err = Taxonomy::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate category id"));
}

#[test]
fn validate_rejects_empty_name() {
    let yaml = r"
categories:
  - { id: food, name: '  ', keywords: [food] }
";
    assert!(matches!(
        Taxonomy::from_yaml(yaml),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    assert!(matches!(
        Taxonomy::from_yaml("categories: [unterminated"),
        Err(ConfigError::TaxonomyFileParse(_))
    ));
}

#[test]
fn load_taxonomy_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taxonomy.yaml");
    std::fs::write(&path, SAMPLE).unwrap();
    let taxonomy = load_taxonomy(&path).unwrap();
    assert_eq!(taxonomy.categories().len(), 2);
}

#[test]
fn load_taxonomy_missing_file_is_io_error() {
    let err = load_taxonomy(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::TaxonomyFileIo { .. }));
}
