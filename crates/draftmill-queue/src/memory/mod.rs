//! In-memory fast-queue backend.

pub mod queue;

pub use queue::MemoryFastQueue;
