//! HTTP client for the resource directory search endpoint.
//!
//! One [`SearchRequest`] maps to one GET. Non-2xx statuses surface as
//! [`DirectoryError::Provider`] with the body intact; 2xx bodies are
//! normalized by [`crate::normalize`]. Nothing here retries.

use std::time::Duration;

use findhelp_core::AppConfig;
use reqwest::{Client, Url};

use crate::error::DirectoryError;
use crate::normalize::normalize_page;
use crate::query::SearchRequest;
use crate::types::ResourcePage;

/// Client for the directory search endpoint.
///
/// Use [`DirectoryClient::new`] with loaded configuration, or
/// [`DirectoryClient::with_base_url`] to point at a mock server in tests.
pub struct DirectoryClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl DirectoryClient {
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidBaseUrl`] if `FINDHELP_DIRECTORY_URL`
    /// is unset or unparseable, or [`DirectoryError::Network`] if the
    /// underlying `reqwest::Client` cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, DirectoryError> {
        let url = config
            .require_directory_url()
            .map_err(|e| DirectoryError::InvalidBaseUrl {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Self::with_base_url(
            url,
            config.request_timeout_secs,
            &config.user_agent,
            config.directory_api_key.as_deref(),
        )
    }

    /// # Errors
    ///
    /// Returns [`DirectoryError::Network`] if the underlying
    /// `reqwest::Client` cannot be constructed, or
    /// [`DirectoryError::InvalidBaseUrl`] if `base_url` is not a valid
    /// absolute URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        api_key: Option<&str>,
    ) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url.trim()).map_err(|e| DirectoryError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.map(str::to_owned),
        })
    }

    /// Fetch one page of results.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::Network`] on transport failure.
    /// - [`DirectoryError::Provider`] on a non-2xx status.
    /// - [`DirectoryError::MalformedResponse`] if the body is not JSON, not
    ///   an object, or lacks an items array.
    pub async fn search(&self, request: &SearchRequest) -> Result<ResourcePage, DirectoryError> {
        let url = self.build_url(request);
        tracing::debug!(
            term = request.term.value(),
            taxonomy = request.term.is_taxonomy_code(),
            location = %request.location,
            offset = request.offset,
            page_size = request.page_size,
            "directory search request"
        );

        let mut builder = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.header("Api-Key", key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "directory returned error status");
            return Err(DirectoryError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let context = format!(
            "search(keywords={}, offset={})",
            request.term.value(),
            request.offset
        );
        let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(context = %context, error = %e, "directory response is not valid JSON");
            DirectoryError::MalformedResponse {
                context: context.clone(),
                reason: format!("invalid JSON: {e}"),
            }
        })?;

        let page = normalize_page(&json, request.offset, &context)?;
        tracing::info!(
            term = request.term.value(),
            offset = request.offset,
            items = page.items.len(),
            total = page.total,
            has_more = page.has_more,
            "directory search complete"
        );
        Ok(page)
    }

    /// Appends the request's parameters to the endpoint URL, keeping any
    /// query the configured URL already carries.
    fn build_url(&self, request: &SearchRequest) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in request.query_pairs() {
                pairs.append_pair(k, &v);
            }
        }
        url
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
