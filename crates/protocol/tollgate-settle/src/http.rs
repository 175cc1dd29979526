//! HTTP client for the settlement network.
//!
//! Endpoints, relative to the configured base URL:
//! - `POST /transactions`: submit a signed transfer
//! - `GET /transactions/{id}`: transaction status (404 when unknown)
//! - `GET /accounts/{address}/balance?currency=`: `{ "balance": ... }`
//! - `GET /accounts/{address}/nonce`: `{ "nonce": ... }`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tollgate_account::{AccountError, AccountResult, BalanceSource, SignedTransfer};
use tollgate_types::{Address, Amount, Currency, TransactionId};

use crate::config::SettleConfig;
use crate::error::{SettleError, SettleResult};
use crate::traits::{SettlementNetwork, TransactionStatus};

#[derive(Serialize)]
struct SubmitRequest<'a> {
    #[serde(flatten)]
    transfer: &'a SignedTransfer,
    transaction_id: TransactionId,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    transaction_id: Option<TransactionId>,
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

impl StatusResponse {
    fn into_status(self) -> SettleResult<TransactionStatus> {
        match self.status.to_ascii_lowercase().as_str() {
            "pending" | "submitted" => Ok(TransactionStatus::Pending),
            "confirmed" | "success" => Ok(TransactionStatus::Confirmed),
            "failed" | "rejected" | "reverted" => Ok(TransactionStatus::Failed {
                reason: self.reason.unwrap_or(self.status),
            }),
            "unknown" => Ok(TransactionStatus::Unknown),
            other => Err(SettleError::invalid_response(format!(
                "unrecognised transaction status '{}'",
                other
            ))),
        }
    }
}

#[derive(Deserialize)]
struct BalanceResponse {
    balance: Amount,
}

#[derive(Deserialize)]
struct NonceResponse {
    nonce: u64,
}

/// JSON-over-HTTP settlement network client.
///
/// Also serves as the account's [`BalanceSource`].
#[derive(Clone)]
pub struct HttpSettlementNetwork {
    client: Client,
    base_url: String,
}

impl HttpSettlementNetwork {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> SettleResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SettleError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create from a settlement config.
    pub fn from_config(config: &SettleConfig) -> SettleResult<Self> {
        Self::new(&config.base_url, config.request_timeout)
    }

    async fn error_body(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if body.is_empty() {
            status.to_string()
        } else {
            format!("{}: {}", status, body)
        }
    }

    async fn get_account<T>(&self, url: &str) -> AccountResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AccountError::network_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AccountError::network_unavailable(format!(
                "ledger returned {}",
                Self::error_body(response).await
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AccountError::invalid_response(e.to_string()))
    }
}

#[async_trait]
impl SettlementNetwork for HttpSettlementNetwork {
    async fn submit(&self, transfer: &SignedTransfer) -> SettleResult<TransactionStatus> {
        let url = format!("{}/transactions", self.base_url);
        let transaction_id = transfer.transaction_id();
        debug!(url = %url, tx = %transaction_id, nonce = transfer.nonce, "Submitting transfer");

        let request = SubmitRequest {
            transfer,
            transaction_id: transaction_id.clone(),
        };
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if status.is_client_error() {
            let reason = Self::error_body(response).await;
            warn!(tx = %transaction_id, reason = %reason, "Transfer rejected");
            return Err(SettleError::rejected(reason));
        }
        if !status.is_success() {
            return Err(SettleError::network(format!(
                "settlement network returned {}",
                Self::error_body(response).await
            )));
        }

        let ack: StatusResponse = response
            .json()
            .await
            .map_err(|e| SettleError::invalid_response(format!("submit ack: {}", e)))?;
        if let Some(acked) = &ack.transaction_id {
            if acked != &transaction_id {
                return Err(SettleError::invalid_response(format!(
                    "network acknowledged {} for {}",
                    acked, transaction_id
                )));
            }
        }

        let status = ack.into_status()?;
        info!(tx = %transaction_id, status = status.label(), "Transfer submitted");
        Ok(status)
    }

    async fn transaction_status(&self, id: &TransactionId) -> SettleResult<TransactionStatus> {
        let url = format!("{}/transactions/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(TransactionStatus::Unknown);
        }
        if !status.is_success() {
            return Err(SettleError::network(format!(
                "settlement network returned {}",
                Self::error_body(response).await
            )));
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| SettleError::invalid_response(format!("status: {}", e)))?;
        let status = body.into_status()?;
        debug!(tx = %id, status = status.label(), "Polled transaction");
        Ok(status)
    }
}

#[async_trait]
impl BalanceSource for HttpSettlementNetwork {
    async fn balance(&self, address: &Address, currency: Currency) -> AccountResult<Amount> {
        let url = format!(
            "{}/accounts/{}/balance?currency={}",
            self.base_url, address, currency
        );
        let body: BalanceResponse = self.get_account(&url).await?;
        Ok(body.balance)
    }

    async fn next_nonce(&self, address: &Address) -> AccountResult<u64> {
        let url = format!("{}/accounts/{}/nonce", self.base_url, address);
        let body: NonceResponse = self.get_account(&url).await?;
        Ok(body.nonce)
    }
}
