//! The `subscriber` module defines the receiving side of the Pub/Sub system.
//!
//! A [`Subscriber`] is an identity-bearing capability: the broker only ever
//! asks it for its [`id`](Subscriber::id) and hands it messages through
//! [`deliver`](Subscriber::deliver). Construction and ownership stay with
//! the caller.
//!
//! Bundled implementations:
//! - [`ChannelSubscriber`]: forwards messages into a tokio mpsc channel.
//! - [`LogSubscriber`]: logs every message it receives.
//! - [`FnSubscriber`]: wraps an async closure.

pub mod channel;
pub mod func;
pub mod log;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::utils::error::DeliveryError;

pub use channel::ChannelSubscriber;
pub use func::FnSubscriber;
pub use log::LogSubscriber;

/// Receiver of messages published to the topics it joined.
///
/// ### Implementation requirements
/// - `deliver` may be called concurrently, for different messages and from
///   several topics at once.
/// - `deliver` must honour `ctx`: when it is (or becomes) cancelled, return
///   promptly with an error instead of blocking. The broker does not enforce this.
/// - `id` must be stable for the lifetime of the subscriber. It is the join
///   key within a topic, so two logical subscribers must never share one.
/// - The message is shared with every other subscriber of the publish and
///   must be treated as read-only.
///
/// Panics inside `deliver` are caught by the topic and reported as
/// [`DeliveryError::Panicked`] for this subscriber only.
#[async_trait]
pub trait Subscriber<M>: Send + Sync + 'static {
    /// Stable identity of this subscriber.
    fn id(&self) -> &str;

    /// Delivers one message.
    async fn deliver(&self, ctx: &CancellationToken, message: Arc<M>) -> Result<(), DeliveryError>;

    /// Stops accepting deliveries and releases resources.
    ///
    /// Called once by the broker during shutdown. Default: no-op.
    async fn shutdown(&self, _ctx: &CancellationToken) {}
}

/// Shared handle to a subscriber, as stored by topics.
pub type SubscriberRef<M> = Arc<dyn Subscriber<M>>;
