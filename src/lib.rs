pub mod abi;            // calldata encoding: keccak selectors, uint256/string words
pub mod clock;          // time source used to measure each call
pub mod config;         // loads config/bench.toml
pub mod dataset;        // CSV files -> rows of string fields
pub mod ledger;         // LedgerClient trait + Ethereum JSON-RPC client
pub mod metrics;        // call outcomes, the metrics report and its persistence
pub mod mode;           // per-binary orchestration (bench, deploy)
pub mod pinning;        // content pinning over the IPFS HTTP API
pub mod records;        // patient/doctor rows, validation, typed records
pub mod runner;         // batch submission runner: validate -> pin -> add -> delete
pub mod utils;          // logging init, hex/address helpers
