//! Utility types and functions.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`Warning`] - Soft failures accumulated instead of raised
//! - [`json`] - Comment-tolerant JSON reading and atomic JSON writing

mod error;
mod warning;
pub mod json;

pub use error::*;
pub use warning::Warning;
