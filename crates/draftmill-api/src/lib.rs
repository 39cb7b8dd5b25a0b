//! # draftmill-api
//!
//! HTTP API layer for Draftmill built on Axum.
//!
//! Provides the scheduler trigger endpoint, queue status, job endpoints,
//! health check, and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
