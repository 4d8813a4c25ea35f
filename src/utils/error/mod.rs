//! Error handling for the tracker

mod error;

pub use error::{ErrorDetail, ErrorResponse, Result, TrackerError};
