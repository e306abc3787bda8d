//! # publy-core
//!
//! Core crate for Publy. Contains the configuration schemas and the
//! unified error system shared by the relay engine and the HTTP layer.
//!
//! This crate has **no** internal dependencies on other Publy crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
