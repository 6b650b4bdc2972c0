// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Queue and Consumer Options
//!
//! This module provides the options a `Subscriber` forwards to the client when it
//! declares its queue and when it registers itself as a consumer of that queue.

use crate::arguments::Arguments;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options of a queue declaration.
///
/// By default the queue is durable, shared and kept when unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueOptions {
    pub durable: bool,
    pub auto_delete: bool,
    pub exclusive: bool,
    pub no_wait: bool,
    pub args: Arguments,
}

impl Default for QueueOptions {
    fn default() -> Self {
        QueueOptions {
            durable: true,
            auto_delete: false,
            exclusive: false,
            no_wait: false,
            args: Arguments::default(),
        }
    }
}

impl QueueOptions {
    /// Sets whether the queue survives a broker restart.
    pub fn durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    /// Sets the queue to auto-delete when its last consumer is gone.
    pub fn auto_delete(mut self) -> Self {
        self.auto_delete = true;
        self
    }

    /// Makes the queue exclusive to the connection.
    ///
    /// Exclusive queues are deleted when the connection closes.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn no_wait(mut self) -> Self {
        self.no_wait = true;
        self
    }

    /// Adds a single extension argument, e.g. `x-message-ttl`.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key, value);
        self
    }
}

/// Options of a consumer registration.
///
/// An empty tag lets the broker generate one. `auto_ack` is off, so every delivery is
/// settled explicitly once its handler returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumeOptions {
    pub consumer_tag: String,
    pub auto_ack: bool,
    pub exclusive: bool,
    pub no_local: bool,
    pub no_wait: bool,
    pub args: Arguments,
}

impl ConsumeOptions {
    pub fn consumer_tag(mut self, tag: impl Into<String>) -> Self {
        self.consumer_tag = tag.into();
        self
    }

    /// Lets the broker consider deliveries settled as soon as they are sent.
    pub fn auto_ack(mut self) -> Self {
        self.auto_ack = true;
        self
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn no_local(mut self) -> Self {
        self.no_local = true;
        self
    }

    pub fn no_wait(mut self) -> Self {
        self.no_wait = true;
        self
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key, value);
        self
    }
}
