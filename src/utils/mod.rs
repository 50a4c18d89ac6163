pub mod error;
pub mod logging;

pub use error::{AppError, FatalReason};
pub use logging::init_logging;
