//! The `error` module defines the error types used within `popsub`.
//!
//! There are three layers, matching where a failure can happen:
//!
//! - [`DeliveryError`]: one subscriber failed to accept one message.
//! - [`PublishError`]: the aggregate of every failed delivery of a single publish.
//! - [`BrokerError`]: what the broker surface returns to callers.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::broker::topic::TopicName;

/// Failure of a single subscriber to accept a single message.
///
/// Produced by [`Subscriber::deliver`](crate::subscriber::Subscriber::deliver)
/// implementations, or by the topic itself when the delivery task panicked
/// or was aborted by the runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The cancellation token passed to the delivery was cancelled.
    #[error("delivery cancelled")]
    Cancelled,

    /// The subscriber no longer accepts messages.
    #[error("subscriber closed")]
    Closed,

    /// The delivery panicked; the payload of the panic is kept as text.
    #[error("subscriber panicked: {0}")]
    Panicked(String),

    /// The delivery task was aborted before it could report a result.
    #[error("delivery aborted: {0}")]
    Aborted(String),

    /// Subscriber-specific failure described by a message.
    #[error("{0}")]
    Failed(String),

    /// Subscriber-specific failure carrying its own error type.
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl DeliveryError {
    /// Shorthand for [`DeliveryError::Failed`].
    pub fn failed(msg: impl Into<String>) -> Self {
        DeliveryError::Failed(msg.into())
    }

    /// Wraps an arbitrary error as [`DeliveryError::Other`].
    pub fn other<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DeliveryError::Other(Box::new(err))
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Cancelled => "delivery_cancelled",
            DeliveryError::Closed => "delivery_closed",
            DeliveryError::Panicked(_) => "delivery_panicked",
            DeliveryError::Aborted(_) => "delivery_aborted",
            DeliveryError::Failed(_) => "delivery_failed",
            DeliveryError::Other(_) => "delivery_other",
        }
    }
}

/// Aggregate error for a publish in which at least one delivery failed.
///
/// Every non-failing subscriber still received the message. The display
/// form is `"{failed} of {total} deliveries to topic '{topic}' failed: "`
/// followed by `id: error` pairs sorted by subscriber id.
#[derive(Debug)]
pub struct PublishError {
    topic: TopicName,
    total: usize,
    failures: Vec<(String, DeliveryError)>,
}

impl PublishError {
    pub(crate) fn new(
        topic: TopicName,
        total: usize,
        mut failures: Vec<(String, DeliveryError)>,
    ) -> Self {
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            topic,
            total,
            failures,
        }
    }

    /// Topic the message was published to.
    pub fn topic(&self) -> &TopicName {
        &self.topic
    }

    /// Number of subscribers the message was fanned out to.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of deliveries that failed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Failing subscriber ids with their errors, sorted by id.
    pub fn failures(&self) -> &[(String, DeliveryError)] {
        &self.failures
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} deliveries to topic '{}' failed",
            self.failed(),
            self.total,
            self.topic
        )?;
        for (i, (id, err)) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{id}: {err}")?;
        }
        Ok(())
    }
}

impl StdError for PublishError {}

/// Errors returned by a [`Broker`](crate::broker::Broker).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BrokerError {
    /// One or more deliveries of a publish failed.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The broker has been shut down and rejects new work.
    #[error("broker is shut down")]
    ShutDown,

    /// Connectivity or protocol failure of a remote broker, surfaced unchanged.
    #[error(transparent)]
    Transport(Box<dyn StdError + Send + Sync>),
}

impl BrokerError {
    /// Wraps a remote broker's connectivity or protocol error as [`BrokerError::Transport`].
    pub fn transport<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        BrokerError::Transport(Box::new(err))
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BrokerError::Publish(_) => "broker_publish_failed",
            BrokerError::ShutDown => "broker_shut_down",
            BrokerError::Transport(_) => "broker_transport",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn transport_error_passes_through_unchanged() {
        let err = BrokerError::transport(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));

        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.as_label(), "broker_transport");
        let inner = err.source().and_then(|e| e.downcast_ref::<io::Error>());
        assert_eq!(
            inner.map(io::Error::kind),
            Some(io::ErrorKind::ConnectionRefused)
        );
    }

    #[test]
    fn publish_error_lists_failures_sorted_by_id() {
        let err = PublishError::new(
            TopicName::from("orders"),
            3,
            vec![
                ("b".to_string(), DeliveryError::Cancelled),
                ("a".to_string(), DeliveryError::Closed),
            ],
        );
        assert_eq!(
            err.to_string(),
            "2 of 3 deliveries to topic 'orders' failed: a: subscriber closed; b: delivery cancelled"
        );
    }
}
