//! Topic management and fan-out
//!
//! A `Topic` maps subscriber ids to subscribers and fans a published message
//! out to all of them concurrently.
//!
//! ## Architecture
//! ```text
//! publish(msg)
//!     │  read lock: snapshot subscribers, release
//!     ├──► task 1 ──► subscriber1.deliver() ──► outcome 1
//!     │         └──► panic → DeliveryError::Panicked
//!     ├──► task 2 ──► subscriber2.deliver() ──► outcome 2
//!     └──► task N ──► subscriberN.deliver() ──► outcome N
//!     join-all ──► Vec<DeliveryOutcome> (unordered)
//! ```
//!
//! ## Rules
//! - Each topic has its own `RwLock`; a slow publish on one topic never
//!   blocks another topic.
//! - Publishes take the read lock only while snapshotting, so they run
//!   concurrently with each other and never observe a half-applied subscribe.
//! - One outcome per subscriber present in the snapshot, regardless of
//!   success, failure or panic.
//! - No early exit: publish waits for every task, including those that return
//!   early because `ctx` was cancelled.

use std::any::Any;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, trace, warn};

use crate::broker::outcome::DeliveryOutcome;
use crate::subscriber::SubscriberRef;
use crate::utils::error::DeliveryError;

/// Name of a topic. Compared byte-for-byte: case-sensitive, no normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicName(String);

impl TopicName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TopicName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TopicName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&TopicName> for TopicName {
    fn from(name: &TopicName) -> Self {
        name.clone()
    }
}

impl Borrow<str> for TopicName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TopicName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A topic and its current subscribers.
pub struct Topic<M> {
    name: TopicName,
    subscribers: RwLock<HashMap<String, SubscriberRef<M>>>,
}

impl<M> Topic<M>
where
    M: Send + Sync + 'static,
{
    /// Create a new topic with the given name and no subscribers.
    pub fn new(name: impl Into<TopicName>) -> Self {
        Self {
            name: name.into(),
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &TopicName {
        &self.name
    }

    /// Attach a subscriber under its id. Re-attaching an id replaces the
    /// stored subscriber, so the set never holds an id twice.
    pub async fn subscribe(&self, subscriber: SubscriberRef<M>) {
        let id = subscriber.id().to_string();
        let mut subscribers = self.subscribers.write().await;
        if subscribers.insert(id.clone(), subscriber).is_some() {
            trace!(topic = %self.name, subscriber = %id, "subscriber replaced");
        } else {
            trace!(topic = %self.name, subscriber = %id, "subscriber attached");
        }
    }

    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.subscribers.read().await.contains_key(id)
    }

    /// Point-in-time copy of the subscriber set.
    pub async fn snapshot(&self) -> Vec<SubscriberRef<M>> {
        self.subscribers.read().await.values().cloned().collect()
    }

    /// Deliver `message` to every current subscriber concurrently and
    /// return one outcome per subscriber, in no particular order.
    pub async fn publish(&self, ctx: &CancellationToken, message: Arc<M>) -> Vec<DeliveryOutcome<M>> {
        let subscribers = self.snapshot().await;

        let handles: Vec<_> = subscribers
            .iter()
            .map(|subscriber| {
                let s = Arc::clone(subscriber);
                let ctx = ctx.clone();
                let message = Arc::clone(&message);
                tokio::spawn(async move {
                    let fut = s.deliver(&ctx, message);
                    match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        Ok(result) => result,
                        Err(panic_err) => Err(DeliveryError::Panicked(panic_message(&*panic_err))),
                    }
                })
            })
            .collect();

        let results = join_all(handles).await;

        subscribers
            .into_iter()
            .zip(results)
            .map(|(subscriber, joined)| {
                let result = match joined {
                    Ok(result) => result,
                    Err(join_err) if join_err.is_panic() => {
                        Err(DeliveryError::Panicked(panic_message(&*join_err.into_panic())))
                    }
                    Err(join_err) => Err(DeliveryError::Aborted(join_err.to_string())),
                };
                match &result {
                    Ok(()) => {
                        trace!(topic = %self.name, subscriber = %subscriber.id(), "delivered");
                    }
                    Err(DeliveryError::Panicked(info)) => {
                        error!(
                            topic = %self.name,
                            subscriber = %subscriber.id(),
                            panic = %info,
                            "subscriber panicked"
                        );
                    }
                    Err(e) => {
                        warn!(
                            topic = %self.name,
                            subscriber = %subscriber.id(),
                            error = %e,
                            label = e.as_label(),
                            "delivery failed"
                        );
                    }
                }
                DeliveryOutcome::new(subscriber, result)
            })
            .collect()
    }
}

impl<M> fmt::Debug for Topic<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic").field("name", &self.name).finish_non_exhaustive()
    }
}

pub(crate) fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
