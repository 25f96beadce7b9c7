use crate::{
    clock::SystemClock,
    config::BenchConfig,
    dataset,
    ledger::rpc::JsonRpcLedger,
    pinning::HttpPinner,
    runner::Runner,
};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub async fn run(cfg: BenchConfig) -> Result<()> {
    let ledger = JsonRpcLedger::connect(&cfg.ledger)
        .await
        .context("connecting to ledger node")?;
    info!(
        account  = ledger.sender(),
        contract = ledger.contract().unwrap_or("<unset>"),
        "submitting transactions"
    );

    let patients = dataset::read_rows(&cfg.run.patients_csv)?;
    let doctors  = dataset::read_rows(&cfg.run.doctors_csv)?;

    let mut runner = Runner::new(Arc::new(ledger), Arc::new(SystemClock::new()));
    if cfg.pinning.enabled {
        info!(endpoint = %cfg.pinning.endpoint, "content pinning enabled");
        runner = runner.with_pinner(Arc::new(HttpPinner::from_config(&cfg.pinning)));
    }

    runner
        .run_to_file(&patients, &doctors, cfg.run.row_limit, &cfg.run.report_path)
        .await?;
    Ok(())
}
