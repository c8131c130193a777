//! Tjänster för PLM Dashboard
//!
//! Affärslogik ovanpå lagringen: startdata, dagsskifte, export/import
//! och nyckeltal.

pub mod dashboard;
pub mod rollover;
pub mod seeder;
pub mod transfer;

pub use dashboard::{DashboardService, DashboardSummary};
pub use rollover::{RolloverEngine, RolloverOutcome};
pub use seeder::Seeder;
pub use transfer::TransferService;
