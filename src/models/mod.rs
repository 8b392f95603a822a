pub mod appointment;
pub mod enums;
pub mod filters;

pub use appointment::*;
pub use enums::*;
pub use filters::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("person name is required")]
    PersonRequired,

    #[error("reminder amount must be at least 1")]
    ReminderAmountZero,

    #[error("unparsable timestamp: {0}")]
    BadTimestamp(String),
}
