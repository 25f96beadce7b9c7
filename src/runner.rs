use crate::{
    clock::Clock,
    ledger::{ContractCall, LedgerClient, LedgerError, Receipt},
    metrics::{self, CallOutcome, MetricsReport},
    pinning::PinningService,
    records::{self, Action, RecordError, RecordKind, Row, TypedRecord},
};

use anyhow::Context;
use std::{path::Path, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

/// How far a row got before something failed. Rows only move forward:
/// Validated -> Added -> Deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowStage {
    Validated,
    Added,
    Deleted,
}

impl RowStage {
    pub fn next_action(self) -> Option<Action> {
        match self {
            RowStage::Validated => Some(Action::Add),
            RowStage::Added     => Some(Action::Delete),
            RowStage::Deleted   => None,
        }
    }

    fn advance(self) -> Self {
        match self {
            RowStage::Validated => RowStage::Added,
            RowStage::Added | RowStage::Deleted => RowStage::Deleted,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("{kind} {id}: {action} call failed at stage {stage:?}")]
    Ledger {
        kind:   RecordKind,
        id:     String,
        stage:  RowStage,
        action: Action,
        #[source]
        source: LedgerError,
    },
}

pub struct Runner {
    ledger: Arc<dyn LedgerClient>,
    pinner: Option<Arc<dyn PinningService>>,
    clock:  Arc<dyn Clock>,
}

impl Runner {
    pub fn new(ledger: Arc<dyn LedgerClient>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, pinner: None, clock }
    }

    /// Turns on content pinning for every record of the run.
    pub fn with_pinner(mut self, pinner: Arc<dyn PinningService>) -> Self {
        self.pinner = Some(pinner);
        self
    }

    pub fn pinning_enabled(&self) -> bool {
        self.pinner.is_some()
    }

    /// Patients first, then doctors, each in source order and capped at
    /// `limit` rows. The first ledger or coercion failure ends the run.
    pub async fn run(&self, patients: &[Row], doctors: &[Row], limit: usize) -> Result<MetricsReport, RunError> {
        let mut report = MetricsReport::default();

        for (kind, rows) in [(RecordKind::Patient, patients), (RecordKind::Doctor, doctors)] {
            let take = limit.min(rows.len());
            info!(%kind, rows = take, pinning = self.pinning_enabled(), "submitting {} rows", kind);

            for row in &rows[..take] {
                self.process_row(kind, row, &mut report).await?;
            }
        }

        info!(calls = report.total_calls(), "run complete");
        Ok(report)
    }

    /// Runs to completion and only then writes the report; a failed run leaves
    /// `dest` untouched.
    pub async fn run_to_file(
        &self,
        patients: &[Row],
        doctors:  &[Row],
        limit:    usize,
        dest:     &Path,
    ) -> anyhow::Result<MetricsReport> {
        let report = self.run(patients, doctors, limit).await?;
        metrics::persist(&report, dest)
            .with_context(|| format!("saving metrics to `{}`", dest.display()))?;
        info!(path = %dest.display(), "performance metrics saved");
        Ok(report)
    }

    async fn process_row(&self, kind: RecordKind, row: &Row, report: &mut MetricsReport) -> Result<(), RunError> {
        let id = records::raw_id(kind, row).to_string();

        if let Some(field) = records::missing_required(kind, row) {
            warn!(%kind, id = %id, missing = field, "skipping invalid {} row", kind);
            return Ok(());
        }

        let record = records::coerce(kind, row)?;
        let span = info_span!("row", %kind, id = %id);

        async {
            let content_ref = self.pin(&record).await;

            let mut stage = RowStage::Validated;
            while let Some(action) = stage.next_action() {
                let call = ContractCall::new(kind.method(action), record.args(action, content_ref.as_deref()));
                info!("{} {}", action, kind);

                let (receipt, elapsed) = self
                    .timed_call(&call)
                    .await
                    .map_err(|source| RunError::Ledger {
                        kind,
                        id: id.clone(),
                        stage,
                        action,
                        source,
                    })?;

                debug!(gas = receipt.gas_used, tx = %receipt.tx_hash, "confirmed");
                report.record(kind, action, CallOutcome::new(id.clone(), receipt.gas_used, elapsed));
                stage = stage.advance();
            }
            Ok::<(), RunError>(())
        }
        .instrument(span)
        .await
    }

    // The clock brackets submit + confirm and nothing else; the status check
    // happens after the timer stops.
    async fn timed_call(&self, call: &ContractCall) -> Result<(Receipt, Duration), LedgerError> {
        let start = self.clock.now();
        let pending = self.ledger.submit(call).await?;
        let receipt = self.ledger.confirm(pending).await?;
        let elapsed = self.clock.now().saturating_sub(start);

        Ok((receipt.ensure_success()?, elapsed))
    }

    async fn pin(&self, record: &TypedRecord) -> Option<String> {
        let pinner = self.pinner.as_ref()?;

        let payload = match record.canonical_json() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "could not serialise record for pinning");
                return None;
            }
        };

        match pinner.pin(payload).await {
            Ok(cid) => {
                debug!(%cid, "record pinned");
                Some(cid)
            }
            Err(e) => {
                warn!(error = %e, "pinning failed, submitting without content reference");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_only_move_forward() {
        let mut stage = RowStage::Validated;
        let mut actions = Vec::new();
        while let Some(a) = stage.next_action() {
            actions.push(a);
            stage = stage.advance();
        }
        assert_eq!(actions, vec![Action::Add, Action::Delete]);
        assert_eq!(stage, RowStage::Deleted);
        assert_eq!(RowStage::Deleted.advance(), RowStage::Deleted);
    }
}
