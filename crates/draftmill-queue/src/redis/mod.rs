//! Redis fast-queue backend.

pub mod client;
pub mod operations;

pub use client::RedisClient;
pub use operations::RedisFastQueue;
