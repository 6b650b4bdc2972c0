// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Error Types for the AMQP Sessions
//!
//! This module provides the single error type shared by the sender and the subscriber.
//! Every failure of the underlying client is logged where it happens and mapped to one
//! of the variants below, keeping the failing resource name and the cause as text.

use std::error::Error as StdError;
use thiserror::Error;

/// Error returned by a message handler. It is logged and recorded on the consumer span,
/// but never surfaced to the caller of `Subscriber::process`.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

/// Represents errors that can occur during AMQP/RabbitMQ operations.
///
/// Setup failures (`ConnectionError` to `ConsumerDeclarationError`) are returned
/// synchronously from `Sender::connect` and `Subscriber::process`. Runtime failures
/// (`PublishingError`, `ChannelClosed`) are terminal for the session and reach the caller
/// through the error listeners or the return value of `process`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmqpError {
    /// The connection string could not be parsed
    #[error("invalid connection string: {0}")]
    InvalidUri(String),

    /// Error establishing a connection to the RabbitMQ server
    #[error("failed to connect to RabbitMQ: {0}")]
    ConnectionError(String),

    /// Error creating a channel from an established connection
    #[error("failed to open a channel: {0}")]
    ChannelError(String),

    /// Error declaring an exchange with the given name
    #[error("failed to declare an exchange `{0}`: {1}")]
    DeclareExchangeError(String, String),

    /// Error declaring (or passively verifying) a queue with the given name
    #[error("failed to declare a queue `{0}`: {1}")]
    DeclareQueueError(String, String),

    /// Error binding a queue to an exchange
    #[error("failed to bind queue `{0}` to exchange `{1}`: {2}")]
    BindingExchangeToQueueError(String, String, String),

    /// Error configuring Quality of Service parameters
    #[error("qos error: {0}")]
    QoSDeclarationError(String),

    /// Error registering a consumer on a queue
    #[error("failed to register a consumer on `{0}`: {1}")]
    ConsumerDeclarationError(String, String),

    /// Error publishing a message
    #[error("failed to publish: {0}")]
    PublishingError(String),

    /// Error acknowledging a message
    #[error("failed to ack message: {0}")]
    AckMessageError(String),

    /// Error negative-acknowledging a message
    #[error("failed to nack message: {0}")]
    NackMessageError(String),

    /// The broker or the client closed the channel or the connection
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// The sender has no live session
    #[error("not connected")]
    NotConnected,

    /// `connect` was called on a sender that is already connected
    #[error("already connected")]
    AlreadyConnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_closed_keeps_the_cause() {
        let err = AmqpError::ChannelClosed("CONNECTION_FORCED - connection forced".to_owned());

        assert!(err.to_string().contains("connection forced"));
    }

    #[test]
    fn binding_error_names_both_sides() {
        let err = AmqpError::BindingExchangeToQueueError(
            "orders.q".to_owned(),
            "orders".to_owned(),
            "NOT_FOUND".to_owned(),
        );

        assert_eq!(
            err.to_string(),
            "failed to bind queue `orders.q` to exchange `orders`: NOT_FOUND"
        );
    }
}
