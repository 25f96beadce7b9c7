use crate::config::PinningConfig;

use async_trait::async_trait;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PinError {
    #[error("pinning request failed")]
    Transport(#[from] reqwest::Error),

    #[error("pinning service answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed pinning response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait PinningService: Send + Sync {
    /// Stores `payload` and returns its content identifier.
    async fn pin(&self, payload: Vec<u8>) -> Result<String, PinError>;
}

// response line of /api/v0/add
#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// IPFS HTTP API (`/api/v0/add?pin=true`).
pub struct HttpPinner {
    client:   Client,
    endpoint: String,
    token:    Option<String>,
}

impl HttpPinner {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client:   Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(cfg: &PinningConfig) -> Self {
        let token = cfg
            .token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|t| !t.is_empty());
        Self::new(cfg.endpoint.trim(), token)
    }
}

#[async_trait]
impl PinningService for HttpPinner {
    async fn pin(&self, payload: Vec<u8>) -> Result<String, PinError> {
        let part = Part::bytes(payload)
            .file_name("record.json")
            .mime_str("application/json")?;
        let form = Form::new().part("file", part);

        let mut req = self.client
            .post(format!("{}/api/v0/add", self.endpoint))
            .query(&[("pin", "true")])
            .multipart(form);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PinError::Rejected { status: status.as_u16(), body });
        }

        let added: AddResponse = resp
            .json()
            .await
            .map_err(|e| PinError::Malformed(e.to_string()))?;
        if added.hash.is_empty() {
            return Err(PinError::Malformed("empty content id".into()));
        }
        debug!(cid = %added.hash, "pinned");
        Ok(added.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_loses_trailing_slash() {
        let p = HttpPinner::new("http://ipfs:5001/", None);
        assert_eq!(p.endpoint, "http://ipfs:5001");
    }

    #[test]
    fn unset_token_variable_means_no_token() {
        let cfg = PinningConfig {
            enabled:   true,
            endpoint:  "http://ipfs:5001".into(),
            token_env: Some("MEDCHAIN_BENCH_TEST_TOKEN_THAT_IS_NOT_SET".into()),
        };
        assert!(HttpPinner::from_config(&cfg).token.is_none());
    }
}
