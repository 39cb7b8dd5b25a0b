//! HTTP request handlers.

pub mod dispatch;
pub mod health;
pub mod jobs;
