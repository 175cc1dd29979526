//! HTTP directory client.
//!
//! `GET {base_url}/services/{service_id}` answers
//! `{ "endpoint": ..., "price": ..., "currency": ..., "payee": ... }`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use tollgate_types::{Address, Amount, Currency, ServiceDescriptor, ServiceId, Url};

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};
use crate::traits::ServiceDirectory;

/// Directory entry as served over the wire.
#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    endpoint: Url,
    price: Amount,
    #[serde(default)]
    currency: Currency,
    payee: Address,
}

/// Client for an HTTP service directory. Does not cache.
#[derive(Clone)]
pub struct HttpDirectory {
    client: Client,
    base_url: String,
}

impl HttpDirectory {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> DirectoryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create from a directory config.
    pub fn from_config(config: &DirectoryConfig) -> DirectoryResult<Self> {
        Self::new(&config.base_url, config.request_timeout)
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ServiceDirectory for HttpDirectory {
    async fn resolve(&self, service_id: &ServiceId) -> DirectoryResult<ServiceDescriptor> {
        let url = format!("{}/services/{}", self.base_url, service_id);
        debug!(url = %url, "Resolving service");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(service = %service_id, error = %e, "Directory request failed");
            DirectoryError::from(e)
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::UnknownService(service_id.clone()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::unavailable(format!(
                "directory returned {}: {}",
                status, body
            )));
        }

        let entry: DirectoryEntry = response
            .json()
            .await
            .map_err(|e| DirectoryError::malformed(service_id, e.to_string()))?;

        debug!(
            service = %service_id,
            endpoint = %entry.endpoint,
            price = %entry.price,
            currency = %entry.currency,
            "Resolved service"
        );

        Ok(ServiceDescriptor::new(
            service_id.clone(),
            entry.endpoint,
            entry.price,
            entry.currency,
            entry.payee,
        ))
    }
}
