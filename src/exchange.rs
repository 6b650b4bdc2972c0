// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Exchange Options
//!
//! This module provides the exchange kinds and the options used when a sender (or a
//! subscriber binding to an exchange) declares one. Exchanges are the routing mechanism
//! in RabbitMQ that determine how messages are distributed to queues.

use crate::arguments::Arguments;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{convert::Infallible, fmt, str::FromStr};

/// Represents the types of exchanges available in RabbitMQ.
///
/// Each exchange type has specific routing behavior:
/// - Direct: Routes messages to queues based on an exact match of routing keys
/// - Fanout: Broadcasts messages to all bound queues regardless of routing keys
/// - Topic: Routes messages based on wildcard pattern matching of routing keys
/// - Headers: Routes based on message header values instead of routing keys
/// - Custom: Plugin-provided exchange types, e.g. `x-delayed-message`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExchangeKind {
    #[default]
    Direct,
    Fanout,
    Topic,
    Headers,
    Custom(String),
}

impl FromStr for ExchangeKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "direct" => ExchangeKind::Direct,
            "fanout" => ExchangeKind::Fanout,
            "topic" => ExchangeKind::Topic,
            "headers" => ExchangeKind::Headers,
            other => ExchangeKind::Custom(other.to_owned()),
        })
    }
}

impl TryFrom<String> for ExchangeKind {
    type Error = Infallible;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExchangeKind> for String {
    fn from(kind: ExchangeKind) -> String {
        kind.to_string()
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeKind::Direct => f.write_str("direct"),
            ExchangeKind::Fanout => f.write_str("fanout"),
            ExchangeKind::Topic => f.write_str("topic"),
            ExchangeKind::Headers => f.write_str("headers"),
            ExchangeKind::Custom(kind) => f.write_str(kind),
        }
    }
}

impl From<&ExchangeKind> for lapin::ExchangeKind {
    fn from(kind: &ExchangeKind) -> lapin::ExchangeKind {
        match kind {
            ExchangeKind::Direct => lapin::ExchangeKind::Direct,
            ExchangeKind::Fanout => lapin::ExchangeKind::Fanout,
            ExchangeKind::Headers => lapin::ExchangeKind::Headers,
            ExchangeKind::Topic => lapin::ExchangeKind::Topic,
            ExchangeKind::Custom(kind) => lapin::ExchangeKind::Custom(kind.clone()),
        }
    }
}

/// Options of an exchange declaration.
///
/// The defaults describe a durable direct exchange, which is what a `Sender` declares
/// unless told otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeOptions {
    pub kind: ExchangeKind,
    pub durable: bool,
    pub auto_delete: bool,
    pub internal: bool,
    pub no_wait: bool,
    pub passive: bool,
    pub args: Arguments,
}

impl Default for ExchangeOptions {
    fn default() -> Self {
        ExchangeOptions {
            kind: ExchangeKind::Direct,
            durable: true,
            auto_delete: false,
            internal: false,
            no_wait: false,
            passive: false,
            args: Arguments::default(),
        }
    }
}

impl ExchangeOptions {
    /// Durable exchange of the given kind.
    pub fn new(kind: ExchangeKind) -> Self {
        ExchangeOptions {
            kind,
            ..Default::default()
        }
    }

    /// Durable direct exchange.
    pub fn direct() -> Self {
        Self::new(ExchangeKind::Direct)
    }

    /// Durable fanout exchange.
    pub fn fanout() -> Self {
        Self::new(ExchangeKind::Fanout)
    }

    /// Sets the exchange type.
    pub fn kind(mut self, kind: ExchangeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets whether the exchange survives a broker restart.
    pub fn durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    /// Sets the exchange to auto-delete when no longer used.
    pub fn auto_delete(mut self) -> Self {
        self.auto_delete = true;
        self
    }

    /// Makes the exchange internal, preventing direct publishing.
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Sets no_wait flag, the broker will not answer the declaration.
    pub fn no_wait(mut self) -> Self {
        self.no_wait = true;
        self
    }

    /// Makes the declaration passive, checking for existence without creating it.
    pub fn passive(mut self) -> Self {
        self.passive = true;
        self
    }

    /// Adds a single extension argument.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key, value);
        self
    }
}
