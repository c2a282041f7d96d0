use thiserror::Error;

const GENERIC_FAILURE: &str = "Something went wrong loading resources. Please try again.";

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Transport failure (DNS, TLS, connect, timeout). Recoverable by retrying.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The directory answered with a non-2xx status.
    #[error("directory returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    /// The directory answered 2xx with a body that breaks the response
    /// contract. Never treated as an empty result.
    #[error("malformed directory response for {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    #[error("invalid directory URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl DirectoryError {
    /// Text suitable for showing to the person searching.
    ///
    /// Provider errors surface the directory's own `message` (or raw body)
    /// when there is one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DirectoryError::Network(_) => {
                "Unable to reach the resource directory. Check your connection and try again."
                    .to_string()
            }
            DirectoryError::Provider { body, .. } => provider_message(body)
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            DirectoryError::MalformedResponse { .. } | DirectoryError::InvalidBaseUrl { .. } => {
                GENERIC_FAILURE.to_string()
            }
        }
    }
}

fn provider_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let from_json = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|v| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|k| v.get(*k).and_then(serde_json::Value::as_str).map(str::to_owned))
        });
    Some(from_json.unwrap_or_else(|| trimmed.to_owned()))
}
