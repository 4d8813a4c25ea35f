//! Utility modules for the tracker
//!
//! - **error**: Error handling and HTTP error mapping

pub mod error;

pub use error::{Result, TrackerError};
