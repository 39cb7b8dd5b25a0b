//! Background job dispatch and pipeline orchestration for Draftmill.
//!
//! This crate provides:
//! - A dispatcher that reserves and executes exactly one job per invocation
//! - A handler registry mapping job types to async handlers
//! - The retry/outcome policy finalizing each execution
//! - A pipeline chainer that advances multi-stage article production
//! - Stage handlers for the article pipeline and document embedding
//! - An optional cron ticker for deployments without an external scheduler

pub mod chain;
pub mod dispatcher;
pub mod engine;
pub mod handlers;
pub mod outcome;
pub mod queue;
pub mod registry;
pub mod ticker;
pub mod trigger;

pub use chain::PipelineChainer;
pub use dispatcher::Dispatcher;
pub use engine::{ContentEngine, HttpContentEngine};
pub use outcome::RunOutcome;
pub use queue::{EnqueueOptions, JobQueue, QueueStats};
pub use registry::{HandlerRegistry, JobExecutionError, JobHandler};
pub use ticker::DispatchTicker;
pub use trigger::{ChannelTrigger, NoopTrigger, SelfTrigger};
