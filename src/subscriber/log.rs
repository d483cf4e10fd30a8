//! # LogSubscriber
//!
//! A minimal subscriber that logs every delivered message through `tracing`.
//! Use it for demos or to tap a topic while debugging.
//!
//! ## Example output
//! ```text
//! INFO delivered subscriber="log-orders" message=Object {"id": Number(1)}
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::subscriber::Subscriber;
use crate::utils::error::DeliveryError;

/// Message logging subscriber.
#[derive(Debug, Clone)]
pub struct LogSubscriber {
    id: String,
}

impl LogSubscriber {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl<M> Subscriber<M> for LogSubscriber
where
    M: Debug + Send + Sync + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, ctx: &CancellationToken, message: Arc<M>) -> Result<(), DeliveryError> {
        if ctx.is_cancelled() {
            return Err(DeliveryError::Cancelled);
        }
        info!(subscriber = %self.id, message = ?message, "delivered");
        Ok(())
    }
}
