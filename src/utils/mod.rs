//! The `utils` module provides shared definitions used across `popsub`.
//!
//! - `error`: error types for deliveries, publishes and the broker surface.
//! - `logging`: `tracing` subscriber setup.

pub mod error;
pub mod logging;

pub use error::{BrokerError, DeliveryError, PublishError};
