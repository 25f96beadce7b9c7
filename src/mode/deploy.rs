use crate::{
    config::BenchConfig,
    ledger::{LedgerClient, rpc::JsonRpcLedger},
    utils::strip_0x,
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::info;

// the two fields we need from a hardhat compilation artifact
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub bytecode:      String,
}

impl Artifact {
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading artifact `{}`", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing artifact `{}`", path.display()))
    }

    pub fn init_code(&self) -> Result<Vec<u8>> {
        let hex_code = strip_0x(self.bytecode.trim());
        if hex_code.is_empty() {
            bail!("{} has no bytecode (abstract contract or interface?)", self.contract_name);
        }
        hex::decode(hex_code)
            .with_context(|| format!("decoding bytecode of {}", self.contract_name))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub contract: String,
    pub address:  String,
    pub gas_used: u64,
}

pub async fn deploy_all(ledger: &dyn LedgerClient, artifacts: &[Artifact]) -> Result<Vec<Deployment>> {
    let mut out = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let code = artifact.init_code()?;
        let pending = ledger
            .submit_creation(&code)
            .await
            .with_context(|| format!("sending {} creation", artifact.contract_name))?;
        let receipt = ledger
            .confirm(pending)
            .await
            .and_then(|r| r.ensure_success())
            .with_context(|| format!("confirming {} creation", artifact.contract_name))?;
        let address = receipt
            .contract_address
            .ok_or_else(|| anyhow!("receipt for {} carries no contract address", artifact.contract_name))?;

        info!(contract = %artifact.contract_name, %address, gas = receipt.gas_used, "contract deployed");
        out.push(Deployment {
            contract: artifact.contract_name.clone(),
            address,
            gas_used: receipt.gas_used,
        });
    }

    Ok(out)
}

pub async fn run(cfg: BenchConfig) -> Result<()> {
    let ledger = JsonRpcLedger::connect(&cfg.ledger)
        .await
        .context("connecting to ledger node")?;
    info!(account = ledger.sender(), "deploying contracts");

    let artifacts = cfg
        .deploy
        .artifacts
        .iter()
        .map(|p| Artifact::load(p))
        .collect::<Result<Vec<_>>>()?;

    deploy_all(&ledger, &artifacts).await?;
    Ok(())
}
