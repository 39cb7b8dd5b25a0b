//! Self-trigger strategies for chained jobs.
//!
//! After enqueuing the next stage, the chainer fires an injected trigger
//! instead of calling back into the dispatcher, which would couple the two
//! and complicate ownership. Production deployments rely on the external
//! scheduler's next tick; development can wire a channel-backed trigger to
//! a drain loop for immediate turnaround.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Strategy notified whenever a chained job has been enqueued.
#[async_trait]
pub trait SelfTrigger: Send + Sync + std::fmt::Debug + 'static {
    /// Signal that a freshly enqueued job is ready for dispatch.
    async fn fire(&self);
}

/// Trigger that does nothing; the next scheduler tick picks the job up.
#[derive(Debug, Default)]
pub struct NoopTrigger;

#[async_trait]
impl SelfTrigger for NoopTrigger {
    async fn fire(&self) {}
}

/// Trigger that nudges a local drain loop over a channel.
#[derive(Debug)]
pub struct ChannelTrigger {
    tx: mpsc::Sender<()>,
}

impl ChannelTrigger {
    /// Create a trigger and the receiver a drain loop should listen on.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl SelfTrigger for ChannelTrigger {
    async fn fire(&self) {
        // A full channel means a wakeup is already queued.
        if let Err(mpsc::error::TrySendError::Closed(())) = self.tx.try_send(()) {
            tracing::warn!("Dispatch trigger receiver dropped; relying on scheduler ticks");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_trigger_wakes_receiver() {
        let (trigger, mut rx) = ChannelTrigger::new(4);
        trigger.fire().await;
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_full_channel_is_not_an_error() {
        let (trigger, _rx) = ChannelTrigger::new(1);
        trigger.fire().await;
        trigger.fire().await;
    }
}
