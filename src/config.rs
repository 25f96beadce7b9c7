use crate::utils::is_address;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{fs, path::PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/bench.toml";
pub const CONFIG_PATH_ENV: &str = "MEDCHAIN_BENCH_CONFIG";

#[derive(Clone, Debug, Deserialize)]
pub struct BenchConfig {
    pub ledger:  LedgerConfig,
    #[serde(default)]
    pub run:     RunConfig,
    #[serde(default)]
    pub pinning: PinningConfig,
    #[serde(default)]
    pub deploy:  DeployConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LedgerConfig {
    pub rpc_url:          String,           // ex http://127.0.0.1:8545
    #[serde(default)]
    pub from:             Option<String>,   // sender; first of eth_accounts when unset
    #[serde(default)]
    pub contract_address: Option<String>,   // target of the benchmark calls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,              // receipt polling cadence, also the first backoff step
    #[serde(default = "default_confirm_retries")]
    pub confirm_retries:  u32,              // transport failures tolerated while confirming
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub row_limit:    usize,
    pub patients_csv: PathBuf,
    pub doctors_csv:  PathBuf,
    pub report_path:  PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            row_limit:    10_000,
            patients_csv: PathBuf::from("data/patient.csv"),
            doctors_csv:  PathBuf::from("data/doctor.csv"),
            report_path:  PathBuf::from("performanceLightweight.json"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PinningConfig {
    pub enabled:   bool,
    pub endpoint:  String,                  // IPFS HTTP API root, ex http://127.0.0.1:5001
    pub token_env: Option<String>,          // env var holding a bearer token, if the gateway wants one
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            enabled:   false,
            endpoint:  "http://127.0.0.1:5001".to_string(),
            token_env: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub artifacts: Vec<PathBuf>,            // hardhat artifact JSON files
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            artifacts: vec![
                PathBuf::from("artifacts/contracts/BasicMedicalContract.sol/BasicMedicalContract.json"),
                PathBuf::from("artifacts/contracts/LightweightMedicalContract.sol/LightweightMedicalContract.json"),
            ],
        }
    }
}

fn default_poll_interval_ms() -> u64 { 250 }
fn default_confirm_retries() -> u32 { 3 }

impl BenchConfig {
    pub fn load(path: &str) -> Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading config file `{}`", path))?;
        Self::from_toml_str(&s)
            .with_context(|| format!("parsing `{}` as TOML", path))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: BenchConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let url = self.ledger.rpc_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("ledger.rpc_url must be an http(s) URL, got `{}`", url);
        }
        if self.ledger.poll_interval_ms == 0 {
            bail!("ledger.poll_interval_ms must be at least 1");
        }
        if let Some(addr) = &self.ledger.contract_address {
            if !is_address(addr) {
                bail!("ledger.contract_address `{}` is not a 0x-prefixed 20-byte address", addr);
            }
        }
        if let Some(from) = &self.ledger.from {
            if !is_address(from) {
                bail!("ledger.from `{}` is not a 0x-prefixed 20-byte address", from);
            }
        }
        if self.pinning.enabled && self.pinning.endpoint.trim().is_empty() {
            bail!("pinning is enabled but pinning.endpoint is empty");
        }
        Ok(())
    }
}

// MEDCHAIN_BENCH_CONFIG overrides the default location
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
