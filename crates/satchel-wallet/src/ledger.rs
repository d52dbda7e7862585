//! Blocking HTTP client for the ledger service.
//!
//! | Call                  | Request                                             | Success   |
//! |-----------------------|-----------------------------------------------------|-----------|
//! | `utxos`               | `GET /utxos?pubKeyHash=<hex>`                       | 200       |
//! | `spendable_utxos`     | `GET /spendable_utxos?pubKeyHash=<hex>&amount=<n>`  | 200       |
//! | `submit_transaction`  | `POST /transaction` with the transaction as JSON    | 200, 201  |
//!
//! Any other status becomes [`LedgerError::Status`] carrying the response
//! body. Requests are never retried.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use satchel_core::constants::{SPENDABLE_UTXOS_PATH, TRANSACTION_PATH, UTXOS_PATH};
use satchel_core::error::LedgerError;
use satchel_core::traits::LedgerService;
use satchel_core::types::{PubKeyHash, SpendableOutputs, Transaction, TxOutput};

/// [`LedgerService`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    endpoint: String,
    client: Client,
}

impl HttpLedgerClient {
    /// Client for `endpoint` with no request timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, LedgerError> {
        Self::with_timeout(endpoint, None)
    }

    /// Client for `endpoint`. `None` waits indefinitely.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, LedgerError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_owned();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        Ok(Self { endpoint, client })
    }

    /// Base URL without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, LedgerError> {
        let url = self.url(path);
        debug!(%url, ?query, "ledger GET");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let (status, body) = read_body(response)?;
        if status != StatusCode::OK {
            return Err(LedgerError::Status {
                status: status.as_u16(),
                message: body,
            });
        }
        serde_json::from_str(&body).map_err(|e| LedgerError::Malformed(e.to_string()))
    }
}

fn read_body(response: Response) -> Result<(StatusCode, String), LedgerError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| LedgerError::Transport(e.to_string()))?;
    Ok((status, body))
}

impl LedgerService for HttpLedgerClient {
    fn utxos(&self, pubkey_hash: &PubKeyHash) -> Result<Vec<TxOutput>, LedgerError> {
        self.get_json(UTXOS_PATH, &[("pubKeyHash", pubkey_hash.to_hex())])
    }

    fn spendable_utxos(
        &self,
        pubkey_hash: &PubKeyHash,
        amount: u64,
    ) -> Result<SpendableOutputs, LedgerError> {
        self.get_json(
            SPENDABLE_UTXOS_PATH,
            &[
                ("pubKeyHash", pubkey_hash.to_hex()),
                ("amount", amount.to_string()),
            ],
        )
    }

    fn submit_transaction(&self, tx: &Transaction) -> Result<(), LedgerError> {
        let url = self.url(TRANSACTION_PATH);
        debug!(%url, txid = %tx.id, inputs = tx.inputs.len(), "ledger POST");
        let response = self
            .client
            .post(&url)
            .json(tx)
            .send()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let (status, body) = read_body(response)?;
        match status {
            StatusCode::OK | StatusCode::CREATED => {
                info!(txid = %tx.id, "transaction accepted");
                Ok(())
            }
            _ => {
                warn!(txid = %tx.id, status = status.as_u16(), %body, "transaction rejected");
                Err(LedgerError::Status {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}
