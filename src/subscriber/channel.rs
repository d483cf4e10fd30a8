use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::subscriber::Subscriber;
use crate::utils::error::DeliveryError;

/// Subscriber that forwards every delivered message into a channel.
///
/// The receiving half is owned by whoever consumes the messages (a
/// connection writer, a worker, a test). Once the receiver is dropped or the
/// subscriber is shut down, deliveries fail with [`DeliveryError::Closed`].
pub struct ChannelSubscriber<M> {
    /// Unique identifier for the subscriber (`subscriber-<uuid>` unless given).
    id: String,

    /// Channel the delivered messages are pushed into.
    sender: UnboundedSender<Arc<M>>,

    closed: AtomicBool,
}

impl<M> ChannelSubscriber<M> {
    /// Creates a subscriber with a freshly generated id.
    pub fn new(sender: UnboundedSender<Arc<M>>) -> Self {
        Self::with_id(format!("subscriber-{}", uuid::Uuid::new_v4()), sender)
    }

    /// Creates a subscriber with the given id.
    pub fn with_id(id: impl Into<String>, sender: UnboundedSender<Arc<M>>) -> Self {
        Self {
            id: id.into(),
            sender,
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a subscriber together with the receiving end of its channel.
    pub fn channel() -> (Self, UnboundedReceiver<Arc<M>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Returns `true` once the subscriber was shut down or its receiver dropped.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.sender.is_closed()
    }
}

impl<M> fmt::Debug for ChannelSubscriber<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSubscriber")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[async_trait]
impl<M> Subscriber<M> for ChannelSubscriber<M>
where
    M: Send + Sync + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, ctx: &CancellationToken, message: Arc<M>) -> Result<(), DeliveryError> {
        if ctx.is_cancelled() {
            return Err(DeliveryError::Cancelled);
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(DeliveryError::Closed);
        }
        self.sender.send(message).map_err(|_| DeliveryError::Closed)
    }

    async fn shutdown(&self, _ctx: &CancellationToken) {
        self.closed.store(true, Ordering::Release);
    }
}
