//! Subsite Shared Types and Utilities
//!
//! Tenant and content records, store errors, and database helpers shared by
//! the API server and operator tools.

pub mod db;
pub mod error;
pub mod types;

pub use db::*;
pub use error::*;
pub use types::*;
