pub mod errors;
pub mod telemetry;
pub mod types;

pub use errors::{AppError, AppResult, ErrorCode, ErrorKind};
pub use types::*;
