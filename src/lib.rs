//! PLM Dashboard - lokal lagring och tjänster för projektuppföljning
//!
//! Uppgifter, RFI:er, risker, TFR-poster och dagliga tag-ups i en
//! SQLite-fil, med startdata, dagsskifte och export/import.

pub mod app;
pub mod db;
pub mod models;
pub mod services;
pub mod ui;
pub mod utils;

// Re-exports
pub use app::App;
pub use db::Database;
pub use models::*;
pub use ui::Route;
pub use utils::error::{AppError, AppResult};
