//! # draftmill-database
//!
//! PostgreSQL connection management and concrete store implementations
//! for the Draftmill entities.

pub mod connection;
pub mod migration;
pub mod stores;
