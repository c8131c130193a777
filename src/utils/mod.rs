pub mod date;
pub mod error;
pub mod ids;
pub mod path;

pub use date::DateService;
pub use error::{AppError, AppResult};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
