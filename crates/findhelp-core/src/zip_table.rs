//! Bundled postal-code reference table.
//!
//! The table ships inside the binary as JSON (`data/zip_coordinates.json`)
//! mapping 5-digit zip strings to `{ lat, lng }`. It is read-only reference
//! data and is never refreshed at runtime.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::geo::Coordinate;

const BUNDLED_ZIP_JSON: &str = include_str!("../data/zip_coordinates.json");

static BUNDLED: LazyLock<ZipTable> = LazyLock::new(|| {
    ZipTable::from_json(BUNDLED_ZIP_JSON).expect("bundled zip table is valid JSON")
});

/// Immutable zip → coordinate lookup.
#[derive(Debug, Clone, Default)]
pub struct ZipTable {
    entries: HashMap<String, Coordinate>,
}

impl ZipTable {
    /// The table compiled into the binary.
    #[must_use]
    pub fn bundled() -> &'static ZipTable {
        &BUNDLED
    }

    /// Parse a table from its JSON form. Keys are normalized with
    /// [`normalize_zip`]; entries whose key does not normalize to five
    /// digits are dropped.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when `json` is not an object of
    /// `{ lat, lng }` records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, Coordinate> = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .filter_map(|(zip, coord)| {
                let zip = normalize_zip(&zip);
                (zip.len() == 5).then_some((zip, coord))
            })
            .collect();
        Ok(Self { entries })
    }

    /// Look up the coordinate for `zip` after normalization.
    ///
    /// Unknown zips return `None`; no default coordinate is fabricated.
    #[must_use]
    pub fn lookup(&self, zip: &str) -> Option<Coordinate> {
        self.entries.get(&normalize_zip(zip)).copied()
    }

    #[must_use]
    pub fn contains(&self, zip: &str) -> bool {
        self.lookup(zip).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All zips in the table, sorted.
    #[must_use]
    pub fn zips(&self) -> Vec<&str> {
        let mut zips: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        zips.sort_unstable();
        zips
    }
}

/// Strip every non-digit character and keep at most the first five digits.
#[must_use]
pub fn normalize_zip(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).take(5).collect()
}

/// Look up `zip` in the bundled table.
#[must_use]
pub fn lookup_zip(zip: &str) -> Option<Coordinate> {
    ZipTable::bundled().lookup(zip)
}
