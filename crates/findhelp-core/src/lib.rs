pub mod app_config;
pub mod config;
pub mod geo;
pub mod store;
pub mod taxonomy;
pub mod zip_table;

pub use app_config::{AppConfig, Environment, LocationMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance, Coordinate, DistanceUnit};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use taxonomy::{
    load_taxonomy, CategoryDescriptor, CategoryQuery, SubcategoryDescriptor, Taxonomy,
};
pub use zip_table::{lookup_zip, normalize_zip, ZipTable};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read taxonomy file {path}: {source}")]
    TaxonomyFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse taxonomy file: {0}")]
    TaxonomyFileParse(#[from] serde_yaml::Error),

    #[error("taxonomy validation failed: {0}")]
    Validation(String),
}
