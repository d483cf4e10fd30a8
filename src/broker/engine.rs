//! Broker engine
//!
//! This module contains the in-memory broker implementation responsible for:
//! - keeping the registry of topics, created lazily on first use
//! - routing publishes and subscriptions to the addressed topic
//! - aggregating per-subscriber delivery failures into a single error
//! - coordinating graceful shutdown of every subscriber
//!
//! Concurrency and usage notes:
//! - Locking is two-level. The registry lock is held only to look up or
//!   insert a topic; delivery happens under the topic's own lock, so topics
//!   never contend with each other.
//! - The broker is meant to be shared as `Arc<MemoryBroker<M>>`; every
//!   operation takes `&self`.
//! - In-flight publishes and subscribes are tracked so that `shutdown` can
//!   let them drain before subscribers are told to stop.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::join_all;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tracing::{debug, error, info, warn};

use crate::broker::Broker;
use crate::broker::outcome::PublishReport;
use crate::broker::topic::{Topic, TopicName, panic_message};
use crate::config::BrokerSettings;
use crate::subscriber::SubscriberRef;
use crate::utils::error::BrokerError;

pub struct MemoryBroker<M> {
    topics: RwLock<HashMap<TopicName, Arc<Topic<M>>>>,
    in_flight: TaskTracker,
    closed: AtomicBool,
    shutdown_grace: Duration,
}

impl<M> Default for MemoryBroker<M>
where
    M: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M> MemoryBroker<M>
where
    M: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::with_settings(&BrokerSettings::default())
    }

    pub fn with_settings(settings: &BrokerSettings) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            in_flight: TaskTracker::new(),
            closed: AtomicBool::new(false),
            shutdown_grace: settings.shutdown_grace(),
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns the topic if it has been created.
    pub async fn topic(&self, name: &str) -> Option<Arc<Topic<M>>> {
        self.topics.read().await.get(name).cloned()
    }

    async fn topic_or_create(&self, name: TopicName) -> Arc<Topic<M>> {
        if let Some(topic) = self.topics.read().await.get(&name) {
            return Arc::clone(topic);
        }

        let mut topics = self.topics.write().await;
        let topic = topics.entry(name).or_insert_with_key(|name| {
            debug!(topic = %name, "topic created");
            Arc::new(Topic::new(name.clone()))
        });
        Arc::clone(topic)
    }

    /// Registers an operation with the in-flight tracker, then checks the
    /// broker is still open. The token must be held until the operation is
    /// complete: shutdown waits for every outstanding token before it
    /// snapshots subscribers, so an admitted operation can never slip past it.
    fn admit(&self) -> Result<TaskTrackerToken, BrokerError> {
        let token = self.in_flight.token();
        if self.closed.load(Ordering::SeqCst) {
            Err(BrokerError::ShutDown)
        } else {
            Ok(token)
        }
    }

    /// Publishes `message` and returns every per-subscriber outcome.
    ///
    /// Unlike [`Broker::publish`], delivery failures are not turned into an
    /// error here; inspect the report or call [`PublishReport::into_result`].
    pub async fn publish_report(
        &self,
        ctx: &CancellationToken,
        topic: TopicName,
        message: M,
    ) -> Result<PublishReport<M>, BrokerError> {
        self.publish_arc(ctx, topic, Arc::new(message)).await
    }

    /// Same as [`publish_report`](Self::publish_report) for an already shared message.
    pub async fn publish_arc(
        &self,
        ctx: &CancellationToken,
        topic: TopicName,
        message: Arc<M>,
    ) -> Result<PublishReport<M>, BrokerError> {
        let _admitted = self.admit()?;

        let topic = self.topic_or_create(topic).await;
        let outcomes = topic.publish(ctx, message).await;

        Ok(PublishReport::new(topic.name().clone(), outcomes))
    }

    async fn drain_in_flight(&self, ctx: &CancellationToken) {
        self.in_flight.close();
        tokio::select! {
            _ = self.in_flight.wait() => {
                debug!("in-flight operations drained");
            }
            _ = ctx.cancelled() => {
                warn!(in_flight = self.in_flight.len(), "shutdown cancelled before operations drained");
            }
            _ = tokio::time::sleep(self.shutdown_grace) => {
                warn!(
                    grace = ?self.shutdown_grace,
                    in_flight = self.in_flight.len(),
                    "shutdown grace exceeded with operations still in flight"
                );
            }
        }
    }

    /// Every distinct subscriber across all topics.
    async fn all_subscribers(&self) -> Vec<SubscriberRef<M>> {
        let topics: Vec<_> = self.topics.read().await.values().cloned().collect();

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for topic in topics {
            for subscriber in topic.snapshot().await {
                if seen.insert(Arc::as_ptr(&subscriber).cast::<()>() as usize) {
                    out.push(subscriber);
                }
            }
        }
        out
    }
}

impl<M> fmt::Debug for MemoryBroker<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBroker")
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .field("in_flight", &self.in_flight.len())
            .field("shutdown_grace", &self.shutdown_grace)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<M> Broker<M> for MemoryBroker<M>
where
    M: Send + Sync + 'static,
{
    async fn publish(
        &self,
        ctx: &CancellationToken,
        topic: TopicName,
        message: M,
    ) -> Result<(), BrokerError> {
        let report = self.publish_report(ctx, topic, message).await?;
        report.into_result().map_err(|err| {
            warn!(
                topic = %err.topic(),
                failed = err.failed(),
                total = err.total(),
                "publish completed with failed deliveries"
            );
            BrokerError::from(err)
        })
    }

    async fn subscribe(
        &self,
        _ctx: &CancellationToken,
        topic: TopicName,
        subscriber: SubscriberRef<M>,
    ) -> Result<(), BrokerError> {
        let _admitted = self.admit()?;

        let topic = self.topic_or_create(topic).await;
        debug!(topic = %topic.name(), subscriber = %subscriber.id(), "subscribe");
        topic.subscribe(subscriber).await;
        Ok(())
    }

    async fn topics(&self, _ctx: &CancellationToken) -> Result<Vec<TopicName>, BrokerError> {
        Ok(self.topics.read().await.keys().cloned().collect())
    }

    /// 1. Rejects new publishes and subscriptions.
    /// 2. Waits for in-flight publishes and subscribes, bounded by `ctx` and the shutdown grace.
    /// 3. Calls [`Subscriber::shutdown`](crate::subscriber::Subscriber::shutdown)
    ///    once per distinct subscriber, concurrently.
    ///
    /// Calling it again is a no-op.
    async fn shutdown(&self, ctx: &CancellationToken) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("broker shutting down");

        self.drain_in_flight(ctx).await;

        let subscribers = self.all_subscribers().await;
        let count = subscribers.len();
        join_all(subscribers.iter().map(|s| async move {
            let fut = s.shutdown(ctx);
            if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                error!(
                    subscriber = %s.id(),
                    panic = %panic_message(&*panic_err),
                    "subscriber panicked during shutdown"
                );
            }
        }))
        .await;

        info!(subscribers = count, "broker shut down");
    }
}
