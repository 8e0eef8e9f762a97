//! Core business rules for the yard: vehicle purchases, dispositions,
//! impound holds, driver cash drawers, and NMVTIS/MV2459 compliance
//! exports.
//!
//! The [`Engine`] owns a [`sea_orm::DatabaseConnection`] and an
//! injectable [`Clock`]; every multi-row write runs inside one database
//! transaction. Entity modules pair a domain struct with its sea-orm
//! model; the `ops` module holds one `impl Engine` block per concern.

pub use clock::{Clock, FixedClock, SystemClock};
pub use commands::{HoldNewCmd, HoldStatusCmd, LedgerEntryCmd, SaleNewCmd, VehicleNewCmd};
pub use error::{EngineError, SaleWarning};
pub use holds::{HOLD_PERIOD_DAYS, HoldStatus, ImpoundHold};
pub use ledger::{CashLedgerEntry, LedgerEntryKind};
pub use money::MoneyCents;
pub use mv2459::Mv2459Document;
pub use ops::{Engine, EngineBuilder, SaleOutcome};
pub use reports::{ComplianceReportEntry, ReportKind, ReportStatus};
pub use sales::SaleRecord;
pub use vehicles::{Disposition, VehicleRecord};
pub use yards::YardSettings;

mod clock;
mod commands;
mod error;
pub mod holds;
pub mod ledger;
mod money;
pub mod mv2459;
mod ops;
pub mod reports;
pub mod sales;
mod util;
pub mod vehicles;
pub mod yards;

type ResultEngine<T> = Result<T, EngineError>;
