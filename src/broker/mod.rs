//! Broker
//!
//! The broker routes publishes and subscriptions to named topics, creating
//! topics lazily on first use.
//!
//! - `engine`: [`MemoryBroker`], the in-process implementation.
//! - `topic`: per-topic subscriber set and concurrent fan-out.
//! - `outcome`: per-subscriber delivery results of a publish.

pub mod engine;
pub mod outcome;
pub mod topic;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::subscriber::SubscriberRef;
use crate::utils::error::BrokerError;

pub use engine::MemoryBroker;
pub use outcome::{DeliveryOutcome, PublishReport};
pub use topic::{Topic, TopicName};

/// Publish/subscribe broker contract.
///
/// Implementations other than [`MemoryBroker`] (for example one talking to a
/// remote broker) report connectivity or protocol failures as
/// [`BrokerError::Transport`], unchanged and without retrying.
#[async_trait]
pub trait Broker<M>: Send + Sync
where
    M: Send + Sync + 'static,
{
    /// Publishes `message` to `topic`.
    ///
    /// Every subscriber of the topic receives the message even if others
    /// fail; any failure is reported afterwards as [`BrokerError::Publish`].
    async fn publish(
        &self,
        ctx: &CancellationToken,
        topic: TopicName,
        message: M,
    ) -> Result<(), BrokerError>;

    /// Subscribes `subscriber` to `topic`. Subscribing the same id again is a no-op.
    async fn subscribe(
        &self,
        ctx: &CancellationToken,
        topic: TopicName,
        subscriber: SubscriberRef<M>,
    ) -> Result<(), BrokerError>;

    /// Lists the topics known to this broker, in no particular order.
    async fn topics(&self, ctx: &CancellationToken) -> Result<Vec<TopicName>, BrokerError>;

    /// Shuts down all subscribers gracefully.
    async fn shutdown(&self, ctx: &CancellationToken);
}
