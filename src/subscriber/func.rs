//! # Function-backed subscriber (`FnSubscriber`)
//!
//! [`FnSubscriber`] wraps a closure `F: Fn(CancellationToken, Arc<M>) -> Fut`,
//! producing a fresh future per delivery. Shared state, if any, goes into the
//! closure explicitly as `Arc<...>`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use popsub::subscriber::{FnSubscriber, Subscriber};
//! use popsub::utils::error::DeliveryError;
//!
//! let s = FnSubscriber::new("printer", |_ctx: CancellationToken, msg: Arc<String>| async move {
//!     println!("{msg}");
//!     Ok::<_, DeliveryError>(())
//! });
//! assert_eq!(Subscriber::<String>::id(&s), "printer");
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::subscriber::Subscriber;
use crate::utils::error::DeliveryError;

/// Closure-backed subscriber.
pub struct FnSubscriber<F> {
    id: String,
    f: F,
}

impl<F> FnSubscriber<F> {
    pub fn new(id: impl Into<String>, f: F) -> Self {
        Self { id: id.into(), f }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(id: impl Into<String>, f: F) -> Arc<Self> {
        Arc::new(Self::new(id, f))
    }
}

impl<F> fmt::Debug for FnSubscriber<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSubscriber").field("id", &self.id).finish()
    }
}

#[async_trait]
impl<M, F, Fut> Subscriber<M> for FnSubscriber<F>
where
    M: Send + Sync + 'static,
    F: Fn(CancellationToken, Arc<M>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DeliveryError>> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, ctx: &CancellationToken, message: Arc<M>) -> Result<(), DeliveryError> {
        (self.f)(ctx.clone(), message).await
    }
}
