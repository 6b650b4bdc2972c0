// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Protocol Client Seam
//!
//! The sessions in this crate never talk to the wire themselves. Everything they need
//! from an AMQP client is listed here as three small traits:
//!
//! - `AmqpConnector`: dials a broker and hands out a connection
//! - `AmqpConnection`: opens channels and closes the transport
//! - `AmqpChannel`: declarations, publishing, consuming and the close notification
//!
//! The production implementation lives in [`crate::channel`] and is backed by lapin.

use crate::{
    arguments::Arguments,
    config::ConnectionConfig,
    errors::AmqpError,
    exchange::ExchangeOptions,
    queue::{ConsumeOptions, QueueOptions},
};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::{collections::BTreeMap, fmt, sync::Arc};
use tokio::sync::oneshot;

/// Lazy, unbounded sequence of deliveries. It ends when the channel closes and cannot
/// be restarted.
pub type Deliveries = BoxStream<'static, Result<InboundDelivery, AmqpError>>;

/// A message handed to the channel for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub routing_key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub message_id: String,
    /// Application headers, used to propagate the trace context
    pub headers: BTreeMap<String, String>,
}

/// A message received from the broker, together with the handle used to settle it.
pub struct InboundDelivery {
    pub delivery_tag: u64,
    pub redelivered: bool,
    pub data: Vec<u8>,
    /// String valued application headers, other header types are left out
    pub headers: BTreeMap<String, String>,
    pub acker: Box<dyn Acknowledger>,
}

impl fmt::Debug for InboundDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundDelivery")
            .field("delivery_tag", &self.delivery_tag)
            .field("redelivered", &self.redelivered)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Settles a single delivery. Each delivery is settled once; `multiple` is never used.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Acknowledger: Send + Sync {
    async fn ack(&self) -> Result<(), AmqpError>;

    async fn nack(&self, requeue: bool) -> Result<(), AmqpError>;
}

/// Entry point of the protocol client.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait AmqpConnector: Send + Sync {
    /// Opens a connection to the broker at `uri`, applying `config` when given.
    async fn dial(
        &self,
        uri: &str,
        config: Option<ConnectionConfig>,
    ) -> Result<Box<dyn AmqpConnection>, AmqpError>;
}

/// A live transport-level session to the broker.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait AmqpConnection: Send + Sync {
    async fn open_channel(&self) -> Result<Arc<dyn AmqpChannel>, AmqpError>;

    /// Releases the connection. Calling it more than once is harmless.
    async fn close(&self);
}

/// A logical channel multiplexed over a connection.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait AmqpChannel: Send + Sync {
    async fn declare_exchange(&self, name: &str, opts: &ExchangeOptions)
        -> Result<(), AmqpError>;

    /// Declares the queue, or only verifies it exists when `passive` is set.
    ///
    /// # Returns
    /// The queue name as known by the broker, which differs from `name` for server-named
    /// queues.
    async fn declare_queue(
        &self,
        name: &str,
        opts: &QueueOptions,
        passive: bool,
    ) -> Result<String, AmqpError>;

    async fn bind_queue(
        &self,
        queue: &str,
        routing_key: &str,
        exchange: &str,
        no_wait: bool,
        args: &Arguments,
    ) -> Result<(), AmqpError>;

    async fn set_qos(&self, prefetch_count: u16, global: bool) -> Result<(), AmqpError>;

    /// Publishes without waiting for a broker confirmation.
    async fn publish(&self, exchange: &str, message: &OutboundMessage) -> Result<(), AmqpError>;

    async fn consume(&self, queue: &str, opts: &ConsumeOptions) -> Result<Deliveries, AmqpError>;

    /// Signal fired at most once, when the channel or its connection terminates. It
    /// carries a description of the cause. Every call returns a new receiver.
    fn notify_close(&self) -> oneshot::Receiver<String>;

    /// Releases the channel. Calling it more than once is harmless.
    async fn close(&self);
}
