// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

mod consumer;
mod otel;

pub mod arguments;
pub mod channel;
pub mod client;
pub mod config;
pub mod errors;
pub mod exchange;
pub mod publisher;
pub mod queue;
pub mod subscriber;

pub use consumer::{FailurePolicy, MessageHandler};
pub use publisher::Sender;
pub use subscriber::Subscriber;

#[cfg(feature = "mocks")]
pub use client::{MockAcknowledger, MockAmqpChannel, MockAmqpConnection, MockAmqpConnector};
