pub mod models;         // JSON-RPC wire types
pub mod rpc;            // LedgerClient over Ethereum JSON-RPC

use crate::abi::{self, Token};

use async_trait::async_trait;
use thiserror::Error;

/// A named contract method with its arguments in ABI order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    pub method: String,
    pub args:   Vec<Token>,
}

impl ContractCall {
    pub fn new(method: impl Into<String>, args: Vec<Token>) -> Self {
        Self { method: method.into(), args }
    }

    pub fn calldata(&self) -> Vec<u8> {
        abi::encode_call(&self.method, &self.args)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Reverted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash:          String,
    pub gas_used:         u64,
    pub status:           TxStatus,
    pub contract_address: Option<String>,
}

impl Receipt {
    pub fn ensure_success(self) -> Result<Self, LedgerError> {
        match self.status {
            TxStatus::Success  => Ok(self),
            TxStatus::Reverted => Err(LedgerError::Reverted {
                tx_hash:  self.tx_hash,
                gas_used: self.gas_used,
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transport error talking to `{url}`")]
    Transport {
        url:    String,
        #[source]
        source: reqwest::Error,
    },

    #[error("`{url}` answered HTTP {status}: {body}")]
    Http { url: String, status: u16, body: String },

    #[error("node rejected `{method}` (code {code}): {message}")]
    Rpc { method: String, code: i64, message: String },

    #[error("malformed node response: {0}")]
    Malformed(String),

    #[error("transaction {tx_hash} reverted after using {gas_used} gas")]
    Reverted { tx_hash: String, gas_used: u64 },

    #[error("node exposes no account to send transactions from")]
    NoAccount,

    #[error("no contract address configured for contract calls")]
    NoContract,
}

impl LedgerError {
    // a failed round trip or a 5xx is worth repeating; anything else the node said is final
    pub fn is_transient(&self) -> bool {
        match self {
            LedgerError::Transport { .. }    => true,
            LedgerError::Http { status, .. } => *status >= 500,
            _                                => false,
        }
    }
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Sends a call to the target contract; returns once the node accepted it.
    async fn submit(&self, call: &ContractCall) -> Result<PendingTx, LedgerError>;

    /// Sends a contract-creation transaction carrying `bytecode`.
    async fn submit_creation(&self, bytecode: &[u8]) -> Result<PendingTx, LedgerError>;

    /// Waits until the transaction is mined. A reverted transaction still
    /// yields a receipt; see [`Receipt::ensure_success`].
    async fn confirm(&self, pending: PendingTx) -> Result<Receipt, LedgerError>;
}
