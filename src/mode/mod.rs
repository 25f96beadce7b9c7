pub mod bench;          // CSV -> contract calls -> metrics report
pub mod deploy;         // contract creation from hardhat artifacts
