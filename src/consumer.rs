// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Message Consumption
//!
//! This module provides the processing of a single delivery: it opens a consumer span
//! parented by the context found in the delivery headers, runs the user handler and
//! settles the delivery according to the subscriber's [`FailurePolicy`].

use crate::{
    client::InboundDelivery,
    errors::{AmqpError, HandlerError},
    otel,
};
use async_trait::async_trait;
use opentelemetry::{
    global::BoxedTracer,
    trace::{Span, Status},
};
use serde::{Deserialize, Serialize};
use futures_util::FutureExt;
use std::{any::Any, borrow::Cow, future::Future, panic::AssertUnwindSafe};
use tracing::{debug, error, warn};

/// Processes the payload of one delivery.
///
/// Implemented for any `Fn(Vec<u8>) -> impl Future<Output = Result<(), HandlerError>>`,
/// so plain async closures can be passed to `Subscriber::process`.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: Vec<u8>) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(Vec<u8>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    async fn handle(&self, payload: Vec<u8>) -> Result<(), HandlerError> {
        (self)(payload).await
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    let reason = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_owned());

    format!("handler panicked: {reason}")
}

/// What happens to a delivery whose handler failed.
///
/// Successful deliveries are always acknowledged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Acknowledge anyway, the message is dropped from the queue
    #[default]
    Ack,
    /// Negative-acknowledge, optionally asking the broker to requeue the message
    Nack { requeue: bool },
}

/// How deliveries of one subscription are settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settlement {
    pub(crate) policy: FailurePolicy,
    /// `false` when consuming with auto-ack, the broker already settled the delivery
    pub(crate) manual: bool,
}

/// Consumes and processes a delivery.
///
/// 1. Creates a trace span for distributed tracing
/// 2. Runs the handler with the payload
/// 3. Acknowledges on success, applies the failure policy otherwise
///
/// Handler errors never leave this function.
///
/// # Parameters
/// * `tracer` - OpenTelemetry tracer for creating spans
/// * `delivery` - The delivery to process
/// * `handler` - User handler
/// * `queue` - Queue the delivery came from, used as span name
/// * `settlement` - Failure policy and acknowledgement mode
///
/// # Returns
/// Ok(()) once the delivery is settled, AmqpError when settling it failed
pub(crate) async fn consume(
    tracer: &BoxedTracer,
    delivery: InboundDelivery,
    handler: &dyn MessageHandler,
    queue: &str,
    settlement: Settlement,
) -> Result<(), AmqpError> {
    let (_ctx, mut span) = otel::new_span(&delivery.headers, tracer, queue);

    let InboundDelivery {
        delivery_tag,
        redelivered,
        data,
        acker,
        ..
    } = delivery;

    debug!(
        delivery_tag = delivery_tag,
        redelivered = redelivered,
        "received message from queue: {}",
        queue
    );

    // a panicking handler counts as a failed one, its delivery is still settled
    let result = match AssertUnwindSafe(handler.handle(data)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(panic_message(panic).into()),
    };

    if let Err(err) = &result {
        warn!(
            error = err.to_string(),
            delivery_tag = delivery_tag,
            "handler failed to process message"
        );
        span.record_error(&**err);
        span.set_status(Status::Error {
            description: Cow::from("handler failure"),
        });
    }

    if !settlement.manual {
        return Ok(());
    }

    let settled = match (result.is_ok(), settlement.policy) {
        (true, _) | (false, FailurePolicy::Ack) => acker.ack().await,
        (false, FailurePolicy::Nack { requeue }) => acker.nack(requeue).await,
    };

    match settled {
        Err(err) => {
            error!(error = err.to_string(), "error while settling msg");
            span.record_error(&err);
            span.set_status(Status::Error {
                description: Cow::from("error to settle msg"),
            });
            Err(err)
        }
        Ok(()) => {
            if result.is_ok() {
                debug!("message successfully processed");
                span.set_status(Status::Ok);
            }
            Ok(())
        }
    }
}
