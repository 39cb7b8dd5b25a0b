//! # draftmill-core
//!
//! Core crate for Draftmill. Contains configuration schemas, the fast-queue
//! trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Draftmill crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
