//! Category and subcategory lookup.
//!
//! Maps free-form terms (a tapped category id, a typed keyword, a taxonomy
//! code) to a canonical [`CategoryDescriptor`]. The table is YAML; a copy is
//! bundled into the binary and may be replaced with [`load_taxonomy`].

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const BUNDLED_TAXONOMY_YAML: &str = include_str!("../data/taxonomy.yaml");

static BUNDLED: LazyLock<Taxonomy> = LazyLock::new(|| {
    Taxonomy::from_yaml(BUNDLED_TAXONOMY_YAML).expect("bundled taxonomy is valid")
});

/// How a category is addressed when searching the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryQuery {
    TaxonomyCode(String),
    Keywords(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDescriptor {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub query: CategoryQuery,
}

impl CategoryDescriptor {
    #[must_use]
    pub fn taxonomy_code(&self) -> Option<&str> {
        match &self.query {
            CategoryQuery::TaxonomyCode(code) => Some(code),
            CategoryQuery::Keywords(_) => None,
        }
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        match &self.query {
            CategoryQuery::TaxonomyCode(_) => &[],
            CategoryQuery::Keywords(keywords) => keywords,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryDescriptor {
    pub id: String,
    pub name: String,
    pub taxonomy_code: String,
    pub category_id: String,
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    categories: Vec<CategoryRecord>,
}

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    id: String,
    name: String,
    icon: Option<String>,
    taxonomy_code: Option<String>,
    keywords: Option<Vec<String>>,
    #[serde(default)]
    subcategories: Vec<SubcategoryRecord>,
}

#[derive(Debug, Deserialize)]
struct SubcategoryRecord {
    id: String,
    name: String,
    taxonomy_code: String,
}

/// The validated category table, in declaration order.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<CategoryDescriptor>,
    subcategories: Vec<SubcategoryDescriptor>,
}

impl Taxonomy {
    /// The table compiled into the binary.
    #[must_use]
    pub fn bundled() -> &'static Taxonomy {
        &BUNDLED
    }

    /// Parse and validate a taxonomy from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TaxonomyFileParse`] for malformed YAML and
    /// [`ConfigError::Validation`] when a record breaks the table invariants.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: TaxonomyFile = serde_yaml::from_str(yaml)?;
        Self::from_records(file.categories)
    }

    fn from_records(records: Vec<CategoryRecord>) -> Result<Self, ConfigError> {
        let mut seen_ids = HashSet::new();
        let mut categories = Vec::with_capacity(records.len());
        let mut subcategories = Vec::new();

        for record in records {
            let id = record.id.trim().to_string();
            let name = record.name.trim().to_string();
            if id.is_empty() || name.is_empty() {
                return Err(ConfigError::Validation(
                    "category id and name must be non-empty".to_string(),
                ));
            }
            if !seen_ids.insert(id.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate category id: '{id}'"
                )));
            }

            let code = record
                .taxonomy_code
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            let keywords: Vec<String> = record
                .keywords
                .unwrap_or_default()
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();

            let query = match (code, keywords.is_empty()) {
                (Some(code), true) => CategoryQuery::TaxonomyCode(code),
                (None, false) => CategoryQuery::Keywords(keywords),
                (Some(_), false) => {
                    return Err(ConfigError::Validation(format!(
                        "category '{id}' has both a taxonomy_code and keywords"
                    )))
                }
                (None, true) => {
                    return Err(ConfigError::Validation(format!(
                        "category '{id}' needs either a taxonomy_code or keywords"
                    )))
                }
            };

            let mut seen_sub_ids = HashSet::new();
            for sub in record.subcategories {
                let sub_id = sub.id.trim().to_string();
                let sub_code = sub.taxonomy_code.trim().to_string();
                if sub_id.is_empty() || sub.name.trim().is_empty() || sub_code.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "subcategory of '{id}' needs an id, name, and taxonomy_code"
                    )));
                }
                if !seen_sub_ids.insert(sub_id.to_lowercase()) {
                    return Err(ConfigError::Validation(format!(
                        "duplicate subcategory id '{sub_id}' in category '{id}'"
                    )));
                }
                subcategories.push(SubcategoryDescriptor {
                    id: sub_id,
                    name: sub.name.trim().to_string(),
                    taxonomy_code: sub_code,
                    category_id: id.clone(),
                });
            }

            categories.push(CategoryDescriptor {
                id,
                name,
                icon: record.icon.filter(|i| !i.trim().is_empty()),
                query,
            });
        }

        Ok(Self {
            categories,
            subcategories,
        })
    }

    #[must_use]
    pub fn categories(&self) -> &[CategoryDescriptor] {
        &self.categories
    }

    /// Case-insensitive lookup by category id.
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&CategoryDescriptor> {
        let id = id.trim();
        self.categories
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(id))
    }

    pub fn subcategories(&self, category_id: &str) -> impl Iterator<Item = &SubcategoryDescriptor> + '_ {
        let category_id = category_id.trim().to_owned();
        self.subcategories
            .iter()
            .filter(move |s| s.category_id.eq_ignore_ascii_case(&category_id))
    }

    /// Resolve a free-form term to a category.
    ///
    /// Matching is case-insensitive on the trimmed term and tries, in order:
    /// exact category id; keyword substring in either direction (first
    /// category in declaration order wins); exact taxonomy code.
    #[must_use]
    pub fn resolve_category(&self, term: &str) -> Option<&CategoryDescriptor> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return None;
        }

        if let Some(category) = self.categories.iter().find(|c| c.id.to_lowercase() == term) {
            return Some(category);
        }

        let by_keyword = self.categories.iter().find(|c| {
            c.keywords()
                .iter()
                .any(|k| term.contains(k.as_str()) || k.contains(term.as_str()))
        });
        if by_keyword.is_some() {
            return by_keyword;
        }

        self.categories
            .iter()
            .find(|c| c.taxonomy_code().is_some_and(|code| code.to_lowercase() == term))
    }

    /// Taxonomy code for a subcategory, or `None` if either id is unknown.
    #[must_use]
    pub fn subcategory_taxonomy_code(&self, category_id: &str, subcategory_id: &str) -> Option<&str> {
        let (category_id, subcategory_id) = (category_id.trim(), subcategory_id.trim());
        self.subcategories
            .iter()
            .find(|s| {
                s.category_id.eq_ignore_ascii_case(category_id)
                    && s.id.eq_ignore_ascii_case(subcategory_id)
            })
            .map(|s| s.taxonomy_code.as_str())
    }

    /// Taxonomy code for a subcategory display name, searched across all
    /// categories.
    #[must_use]
    pub fn subcategory_code_by_name(&self, name: &str) -> Option<&str> {
        let name = name.trim().to_lowercase();
        self.subcategories
            .iter()
            .find(|s| s.name.to_lowercase() == name)
            .map(|s| s.taxonomy_code.as_str())
    }
}

/// Load and validate a taxonomy override from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::TaxonomyFileIo`] if the file cannot be read, or any
/// error from [`Taxonomy::from_yaml`].
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TaxonomyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Taxonomy::from_yaml(&content)
}

#[cfg(test)]
#[path = "taxonomy_test.rs"]
mod tests;
