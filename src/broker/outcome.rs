//! Delivery outcomes
//!
//! A publish produces one [`DeliveryOutcome`] per subscriber that was attached
//! when fan-out began. [`PublishReport`] bundles them with the topic and is
//! what callers needing per-subscriber detail receive; [`PublishReport::into_result`]
//! collapses it into the scalar contract of [`Broker::publish`](crate::broker::Broker::publish).

use std::fmt;

use crate::broker::topic::TopicName;
use crate::subscriber::SubscriberRef;
use crate::utils::error::{DeliveryError, PublishError};

/// Result of delivering one message to one subscriber.
pub struct DeliveryOutcome<M> {
    subscriber: SubscriberRef<M>,
    result: Result<(), DeliveryError>,
}

impl<M: 'static> DeliveryOutcome<M> {
    pub(crate) fn new(subscriber: SubscriberRef<M>, result: Result<(), DeliveryError>) -> Self {
        Self { subscriber, result }
    }

    pub fn subscriber(&self) -> &SubscriberRef<M> {
        &self.subscriber
    }

    pub fn subscriber_id(&self) -> &str {
        self.subscriber.id()
    }

    pub fn result(&self) -> &Result<(), DeliveryError> {
        &self.result
    }

    pub fn error(&self) -> Option<&DeliveryError> {
        self.result.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl<M: 'static> fmt::Debug for DeliveryOutcome<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryOutcome")
            .field("subscriber", &self.subscriber.id())
            .field("result", &self.result)
            .finish()
    }
}

/// Every outcome of a single publish.
pub struct PublishReport<M> {
    topic: TopicName,
    outcomes: Vec<DeliveryOutcome<M>>,
}

impl<M: 'static> PublishReport<M> {
    pub(crate) fn new(topic: TopicName, outcomes: Vec<DeliveryOutcome<M>>) -> Self {
        Self { topic, outcomes }
    }

    pub fn topic(&self) -> &TopicName {
        &self.topic
    }

    /// Outcomes in no particular order.
    pub fn outcomes(&self) -> &[DeliveryOutcome<M>] {
        &self.outcomes
    }

    /// Number of subscribers the message was fanned out to.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeliveryOutcome<M>> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(DeliveryOutcome::is_success)
    }

    /// Collapses the report into `Ok(())`, or a [`PublishError`] listing
    /// every failed delivery.
    pub fn into_result(self) -> Result<(), PublishError> {
        let total = self.outcomes.len();
        let failures: Vec<_> = self
            .outcomes
            .into_iter()
            .filter_map(|o| match o.result {
                Ok(()) => None,
                Err(e) => Some((o.subscriber.id().to_string(), e)),
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublishError::new(self.topic, total, failures))
        }
    }
}

impl<M: 'static> fmt::Debug for PublishReport<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishReport")
            .field("topic", &self.topic)
            .field("outcomes", &self.outcomes)
            .finish()
    }
}

impl<M> IntoIterator for PublishReport<M> {
    type Item = DeliveryOutcome<M>;
    type IntoIter = std::vec::IntoIter<DeliveryOutcome<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}
