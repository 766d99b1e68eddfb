// Payroll Register Analyzer - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod extract;
pub mod ledger;
pub mod numeric;
pub mod person;
pub mod report;

// Re-export commonly used types
pub use extract::parse_document;
pub use ledger::{
    analyze, derive, Analysis, BankRow, Derived, EntityKind, LedgerSummary, OwnerDetail,
    WorkerRow, BALANCE_TOLERANCE,
};
pub use numeric::{format_amount, parse_amount, round2};
pub use person::{Meta, Person};
pub use report::{bank_rows_csv, render, AnalysisResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
