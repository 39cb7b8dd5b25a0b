//! Cross-crate trait definitions.

pub mod queue;
