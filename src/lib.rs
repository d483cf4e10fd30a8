//! # PopSub
//!
//! `popsub` is a minimalist, in-process publish/subscribe broker built with Rust.
//! Producers publish messages to named topics; every subscriber attached to a
//! topic receives each message, delivered concurrently with per-subscriber
//! fault isolation.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `broker`: The broker contract, the in-memory engine, topics and delivery outcomes.
//! - `subscriber`: The subscriber contract and a few ready-made subscribers.
//! - `config`: Handles loading and managing configuration.
//! - `utils`: Shared utilities, such as error types and logging setup.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use popsub::broker::{Broker, MemoryBroker};
//! use popsub::subscriber::ChannelSubscriber;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ctx = CancellationToken::new();
//! let broker = MemoryBroker::<String>::new();
//! let (subscriber, mut rx) = ChannelSubscriber::<String>::channel();
//!
//! broker.subscribe(&ctx, "greetings".into(), Arc::new(subscriber)).await.unwrap();
//! broker.publish(&ctx, "greetings".into(), "hello".to_string()).await.unwrap();
//!
//! assert_eq!(rx.recv().await.unwrap().as_str(), "hello");
//! broker.shutdown(&ctx).await;
//! # }
//! ```

pub mod broker;
pub mod config;
pub mod subscriber;
pub mod utils;
