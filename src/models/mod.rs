pub mod record;
pub mod meta;
pub mod team;
pub mod tagup;
pub mod task;
pub mod rfi;
pub mod risk;
pub mod tfr;
pub mod snapshot;
pub mod config;

pub use record::*;
pub use meta::*;
pub use team::*;
pub use tagup::*;
pub use task::*;
pub use rfi::*;
pub use risk::*;
pub use tfr::*;
pub use snapshot::*;
pub use config::*;
