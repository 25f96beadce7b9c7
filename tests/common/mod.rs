#![allow(dead_code)]

pub mod node;

use async_trait::async_trait;
use medchain_bench::{
    ledger::{ContractCall, LedgerClient, LedgerError, PendingTx, Receipt, TxStatus},
    pinning::{PinError, PinningService},
    records::Row,
};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// In-memory ledger: records every call, charges a fixed gas per method and
/// can be told to revert the n-th confirmation (1-based).
pub struct FakeLedger {
    pub calls:     Mutex<Vec<ContractCall>>,
    pub creations: Mutex<Vec<Vec<u8>>>,
    revert_on:     Option<usize>,
    confirms:      AtomicUsize,
    submitted:     AtomicUsize,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            calls:     Mutex::new(Vec::new()),
            creations: Mutex::new(Vec::new()),
            revert_on: None,
            confirms:  AtomicUsize::new(0),
            submitted: AtomicUsize::new(0),
        }
    }

    pub fn reverting_on_confirm(n: usize) -> Self {
        Self { revert_on: Some(n), ..Self::new() }
    }

    pub fn gas_for(method: &str) -> u64 {
        match method {
            "addPatient"    => 187_204,
            "deletePatient" => 41_022,
            "addDoctor"     => 230_118,
            "deleteDoctor"  => 44_907,
            _               => 1_000_000,
        }
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.method.clone()).collect()
    }

    pub fn confirm_count(&self) -> usize {
        self.confirms.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn submit(&self, call: &ContractCall) -> Result<PendingTx, LedgerError> {
        let n = self.submitted.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call.clone());
        Ok(PendingTx { hash: format!("{}:{}", n, call.method) })
    }

    async fn submit_creation(&self, bytecode: &[u8]) -> Result<PendingTx, LedgerError> {
        let n = self.submitted.fetch_add(1, Ordering::SeqCst);
        self.creations.lock().unwrap().push(bytecode.to_vec());
        Ok(PendingTx { hash: format!("{}:create", n) })
    }

    async fn confirm(&self, pending: PendingTx) -> Result<Receipt, LedgerError> {
        let n = self.confirms.fetch_add(1, Ordering::SeqCst) + 1;
        let (idx, method) = pending.hash.split_once(':').unwrap();
        let status = if self.revert_on == Some(n) { TxStatus::Reverted } else { TxStatus::Success };
        let contract_address = (method == "create").then(|| format!("0x{:040x}", idx.parse::<u64>().unwrap() + 1));

        Ok(Receipt {
            tx_hash: pending.hash.clone(),
            gas_used: Self::gas_for(method),
            status,
            contract_address,
        })
    }
}

pub struct StaticPinner(pub &'static str);

#[async_trait]
impl PinningService for StaticPinner {
    async fn pin(&self, _payload: Vec<u8>) -> Result<String, PinError> {
        Ok(self.0.to_string())
    }
}

pub struct RecordingPinner {
    pub payloads: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl PinningService for RecordingPinner {
    async fn pin(&self, payload: Vec<u8>) -> Result<String, PinError> {
        let mut p = self.payloads.lock().unwrap();
        p.push(payload);
        Ok(format!("bafy{}", p.len()))
    }
}

pub struct FailingPinner;

#[async_trait]
impl PinningService for FailingPinner {
    async fn pin(&self, _payload: Vec<u8>) -> Result<String, PinError> {
        Err(PinError::Rejected { status: 502, body: "gateway down".into() })
    }
}

pub fn row(pairs: &[(&str, &str)]) -> Row {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn patient(id: &str) -> Row {
    row(&[
        ("patient_id", id), ("age", "45"), ("highBP", "1"), ("highChol", "0"),
        ("cholCheck", "1"), ("bmi", "28"), ("smoker", "0"), ("stroke", "0"),
    ])
}

pub fn doctor(id: &str) -> Row {
    row(&[
        ("doctor_id", id), ("doctor_name", "Amina Yusuf"), ("crdntls", "MD"),
        ("gender", "F"), ("hospital_name", "LUTH"), ("country", "Nigeria"),
        ("specialty", "Cardiology"),
    ])
}
