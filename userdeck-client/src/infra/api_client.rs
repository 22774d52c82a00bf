use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::infra::constants::defaults;
use crate::infra::errors::SyncError;

/// HTTP client for the users backend
#[derive(Clone, Debug)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Result<Self, SyncError> {
        Self::with_timeout(
            base_url,
            Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let base_url = normalize_base_url(base_url);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SyncError::server(None, format!("Failed to create HTTP client: {e}"))
            })?;

        info!(
            "[ApiClient] Creating new API client with base URL: {}",
            base_url
        );

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an absolute URL from an API path
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    /// Execute a request and map transport and status failures
    async fn execute_request<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, SyncError> {
        let response = request.send().await.map_err(|e| {
            warn!("[ApiClient] Request failed before a response: {}", e);
            SyncError::from(e)
        })?;

        match response.status() {
            status if status.is_success() => {
                if status == StatusCode::NO_CONTENT {
                    return Err(SyncError::server(
                        Some(status.as_u16()),
                        "Empty response from server (204 No Content)",
                    ));
                }
                Ok(response.json().await?)
            }
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(SyncError::server(
                    Some(status.as_u16()),
                    format!(
                        "Request failed with status {}: {}",
                        status, error_text
                    ),
                ))
            }
        }
    }

    /// GET request with query pairs
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let url = self.build_url(path);
        debug!("GET request to: {} {:?}", url, query);

        let request = self.client.get(&url).query(query);
        self.execute_request(request).await
    }

    /// PATCH request with a JSON body
    pub async fn patch<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, SyncError> {
        let url = self.build_url(path);
        debug!("PATCH request to: {}", url);

        let request = self.client.patch(&url).json(body);
        self.execute_request(request).await
    }
}

/// Add `http://` when the scheme is missing and trim a trailing slash.
fn normalize_base_url(raw: String) -> String {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    let with_scheme =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed
        } else {
            format!("http://{}", trimmed)
        };
    if with_scheme != raw {
        warn!(
            "[ApiClient] Normalized base URL from '{}' to '{}'",
            raw, with_scheme
        );
    }
    with_scheme
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_scheme_and_loses_trailing_slash() {
        let client = ApiClient::new("localhost:3000/".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.build_url("/api/users"),
            "http://localhost:3000/api/users"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let client = ApiClient::new("https://admin.local".to_string()).unwrap();
        assert_eq!(
            client.build_url("https://other.local/api/users"),
            "https://other.local/api/users"
        );
    }
}
