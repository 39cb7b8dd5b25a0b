//! # draftmill-queue
//!
//! Fast-queue backends for Draftmill. The fast queue holds ready-to-run
//! job ids for low-latency pickup; it is an accelerator in front of the
//! job store, never the store of record.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::FastQueueManager;
