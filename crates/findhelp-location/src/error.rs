use findhelp_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationError {
    /// The user denied location access; recoverable only from system settings.
    #[error("location permission denied")]
    PermissionDenied,

    /// No device position arrived within the bounded wait.
    #[error("timed out after {secs}s waiting for a device position")]
    Timeout { secs: u64 },

    #[error("device location unavailable: {0}")]
    Unavailable(String),

    /// Rejected before any lookup: not a 5-digit zip.
    #[error("\"{input}\" is not a valid 5-digit zip code")]
    InvalidZip { input: String },

    /// Well-formed, but absent from the reference table.
    #[error("zip code {zip} was not found")]
    ZipNotFound { zip: String },

    #[error("location store error: {0}")]
    Store(#[from] StoreError),

    #[error("stored location snapshot under {key} is unreadable: {source}")]
    Snapshot {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
