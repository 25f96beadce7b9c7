use super::{
    ContractCall, LedgerClient, LedgerError, PendingTx, Receipt,
    models::{RpcReceipt, RpcRequest, RpcResponse, TransactionRequest},
};
use crate::{config::LedgerConfig, utils::to_hex_prefixed};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tracing::{debug, info, warn};

/// Talks to a node that signs for its own accounts (hardhat / anvil / geth
/// dev mode), so transactions go out through `eth_sendTransaction`.
pub struct JsonRpcLedger {
    client:          Client,
    url:             String,
    from:            String,
    contract:        Option<String>,
    poll_interval:   Duration,
    confirm_retries: u32,
    next_id:         AtomicU64,
}

impl JsonRpcLedger {
    pub async fn connect(cfg: &LedgerConfig) -> Result<Self, LedgerError> {
        let mut ledger = Self {
            client:          Client::new(),
            url:             cfg.rpc_url.trim().to_string(),
            from:            String::new(),
            contract:        cfg.contract_address.clone(),
            poll_interval:   Duration::from_millis(cfg.poll_interval_ms),
            confirm_retries: cfg.confirm_retries,
            next_id:         AtomicU64::new(1),
        };

        ledger.from = match &cfg.from {
            Some(addr) => addr.clone(),
            None => {
                let accounts: Vec<String> = ledger.call("eth_accounts", json!([])).await?;
                accounts.into_iter().next().ok_or(LedgerError::NoAccount)?
            }
        };
        info!(account = %ledger.from, node = %ledger.url, "ledger client ready");
        Ok(ledger)
    }

    pub fn sender(&self) -> &str {
        &self.from
    }

    pub fn contract(&self) -> Option<&str> {
        self.contract.as_deref()
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, LedgerError> {
        let req = RpcRequest {
            jsonrpc: "2.0",
            id:      self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let transport = |source| LedgerError::Transport { url: self.url.clone(), source };

        let http = self.client
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(transport)?;

        let status = http.status();
        if !status.is_success() {
            let body = http.text().await.unwrap_or_default();
            return Err(LedgerError::Http {
                url:    self.url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let resp: RpcResponse = http.json().await.map_err(transport)?;

        if let Some(err) = resp.error {
            return Err(LedgerError::Rpc {
                method:  method.to_string(),
                code:    err.code,
                message: err.message,
            });
        }
        serde_json::from_value(resp.result)
            .map_err(|e| LedgerError::Malformed(format!("`{}` result: {}", method, e)))
    }

    async fn send_transaction(&self, to: Option<String>, data: &[u8]) -> Result<PendingTx, LedgerError> {
        let tx = TransactionRequest {
            from: self.from.clone(),
            to,
            data: to_hex_prefixed(data),
        };
        let hash: String = self.call("eth_sendTransaction", json!([tx])).await?;
        debug!(tx = %hash, "transaction accepted");
        Ok(PendingTx { hash })
    }

    async fn fetch_receipt(&self, hash: &str) -> Result<Option<RpcReceipt>, LedgerError> {
        self.call("eth_getTransactionReceipt", json!([hash])).await
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedger {
    async fn submit(&self, call: &ContractCall) -> Result<PendingTx, LedgerError> {
        let to = self.contract.clone().ok_or(LedgerError::NoContract)?;
        debug!(method = %call.method, args = call.args.len(), "submitting call");
        self.send_transaction(Some(to), &call.calldata()).await
    }

    async fn submit_creation(&self, bytecode: &[u8]) -> Result<PendingTx, LedgerError> {
        self.send_transaction(None, bytecode).await
    }

    async fn confirm(&self, pending: PendingTx) -> Result<Receipt, LedgerError> {
        let mut failures = 0u32;
        let mut backoff = self.poll_interval;

        loop {
            match self.fetch_receipt(&pending.hash).await {
                Ok(Some(raw)) => return Receipt::try_from(raw),
                Ok(None) => tokio::time::sleep(self.poll_interval).await,
                Err(e) if e.is_transient() && failures < self.confirm_retries => {
                    failures += 1;
                    warn!(
                        tx = %pending.hash,
                        attempt = failures,
                        retry_in_ms = backoff.as_millis() as u64,
                        error = %e,
                        "receipt lookup failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
