// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

mod common;

use amqptool::{errors::AmqpError, publisher::TEXT_CONTENT_TYPE, Sender};
use common::{eventually, within, FakeBroker, URI};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;

#[tokio::test]
async fn publishes_to_the_exchange_with_the_routing_key() {
    let broker = FakeBroker::new();
    let sender = Sender::with_connector(broker.connector(), URI, "orders");

    sender.connect().await.unwrap();
    assert!(broker.exchanges().contains("orders"));

    sender.send(b"hello".to_vec(), "order.created").await.unwrap();

    eventually(|| broker.published().len() == 1).await;
    let published = broker.published().remove(0);
    assert_eq!(published.exchange, "orders");
    assert_eq!(published.message.routing_key, "order.created");
    assert_eq!(published.message.body, b"hello");
    assert_eq!(published.message.content_type, TEXT_CONTENT_TYPE);
    assert!(!published.message.message_id.is_empty());

    sender.close().await;
}

#[tokio::test]
async fn messages_are_published_in_send_order() {
    let broker = FakeBroker::new().slow_publish(Duration::from_millis(5));
    let sender = Sender::with_connector(broker.connector(), URI, "orders");
    sender.connect().await.unwrap();

    for i in 0..10 {
        sender.send(format!("m{i}").into_bytes(), "k").await.unwrap();
    }
    sender.close().await;

    let bodies: Vec<Vec<u8>> = broker
        .published()
        .into_iter()
        .map(|p| p.message.body)
        .collect();
    let expected: Vec<Vec<u8>> = (0..10).map(|i| format!("m{i}").into_bytes()).collect();
    assert_eq!(bodies, expected);
}

#[tokio::test]
async fn close_publishes_handed_over_messages_and_releases_the_session() {
    let broker = FakeBroker::new().slow_publish(Duration::from_millis(20));
    let sender = Sender::with_connector(broker.connector(), URI, "orders");
    let (errors_tx, mut errors_rx) = mpsc::channel(1);
    sender.notify_error(errors_tx);
    sender.connect().await.unwrap();

    sender.send(b"first".to_vec(), "k").await.unwrap();
    sender.send(b"second".to_vec(), "k").await.unwrap();
    within(sender.close()).await;

    assert_eq!(broker.published().len(), 2);
    assert!(broker.all_released());
    assert!(!sender.is_connected());
    assert_eq!(
        sender.send(b"late".to_vec(), "k").await,
        Err(AmqpError::NotConnected)
    );
    assert!(errors_rx.try_recv().is_err());
}

#[tokio::test]
async fn failed_exchange_declaration_leaves_nothing_open() {
    let broker = FakeBroker::new().failing_exchange_declare();
    let sender = Sender::with_connector(broker.connector(), URI, "orders");

    let result = sender.connect().await;

    assert!(matches!(result, Err(AmqpError::DeclareExchangeError(name, _)) if name == "orders"));
    assert!(broker.all_released());
    assert_eq!(
        sender.send(b"hello".to_vec(), "order.created").await,
        Err(AmqpError::NotConnected)
    );
}

#[tokio::test]
async fn listeners_hear_nothing_while_the_session_is_healthy() {
    let broker = FakeBroker::new();
    let sender = Sender::with_connector(broker.connector(), URI, "orders");
    let (errors_tx, mut errors_rx) = mpsc::channel(1);
    sender.notify_error(errors_tx);
    sender.connect().await.unwrap();

    sender.send(b"hello".to_vec(), "order.created").await.unwrap();
    eventually(|| broker.published().len() == 1).await;

    assert!(errors_rx.try_recv().is_err());
    sender.close().await;
}

#[tokio::test]
async fn broker_close_is_broadcast_to_every_listener() {
    let broker = FakeBroker::new();
    let sender = Sender::with_connector(broker.connector(), URI, "orders");
    let (first_tx, mut first_rx) = mpsc::channel(1);
    let (second_tx, mut second_rx) = mpsc::channel(1);
    sender.notify_error(first_tx);
    sender.notify_error(second_tx);
    sender.connect().await.unwrap();

    broker.close_channel("CONNECTION_FORCED - connection forced");

    let expected = AmqpError::ChannelClosed("CONNECTION_FORCED - connection forced".to_owned());
    assert_eq!(within(first_rx.recv()).await, Some(expected.clone()));
    assert_eq!(within(second_rx.recv()).await, Some(expected));
    eventually(|| broker.all_released()).await;
    assert!(!sender.is_connected());
}

#[tokio::test]
async fn publish_failure_terminates_and_allows_reconnecting() {
    let broker = FakeBroker::new().failing_publish();
    let sender = Sender::with_connector(broker.connector(), URI, "orders");
    let (errors_tx, mut errors_rx) = mpsc::channel(1);
    sender.notify_error(errors_tx);
    sender.connect().await.unwrap();

    sender.send(b"hello".to_vec(), "order.created").await.unwrap();

    assert_eq!(
        within(errors_rx.recv()).await,
        Some(AmqpError::PublishingError("connection reset".to_owned()))
    );
    eventually(|| !sender.is_connected()).await;

    sender.connect().await.unwrap();
    assert_eq!(broker.opened_connections(), 2);
    sender.close().await;
    assert!(broker.all_released());
}

#[tokio::test]
async fn broker_close_during_a_stalled_publish_ends_the_session() {
    let broker = FakeBroker::new().slow_publish(Duration::from_secs(3600));
    let sender = Sender::with_connector(broker.connector(), URI, "orders");
    let (errors_tx, mut errors_rx) = mpsc::channel(1);
    sender.notify_error(errors_tx);
    sender.connect().await.unwrap();

    sender.send(b"stuck".to_vec(), "k").await.unwrap();
    broker.close_channel("CONNECTION_FORCED - connection forced");

    assert_eq!(
        within(errors_rx.recv()).await,
        Some(AmqpError::ChannelClosed(
            "CONNECTION_FORCED - connection forced".to_owned()
        ))
    );
    eventually(|| broker.all_released()).await;
    assert!(!sender.is_connected());
    assert!(broker.published().is_empty());
}

#[tokio::test]
async fn send_waits_until_the_run_loop_takes_the_message() {
    let broker = FakeBroker::new().slow_publish(Duration::from_millis(200));
    let sender = Arc::new(Sender::with_connector(broker.connector(), URI, "orders"));
    sender.connect().await.unwrap();

    sender.send(b"m1".to_vec(), "k").await.unwrap();
    let second = tokio::spawn({
        let sender = sender.clone();
        async move { sender.send(b"m2".to_vec(), "k").await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!second.is_finished());
    assert!(broker.published().is_empty());

    assert_eq!(within(second).await.unwrap(), Ok(()));
    assert_eq!(broker.published().len(), 1);
    sender.close().await;
    assert_eq!(broker.published().len(), 2);
}

#[tokio::test]
async fn waiting_sends_fail_when_the_broker_closes_the_channel() {
    let broker = FakeBroker::new().slow_publish(Duration::from_millis(200));
    let sender = Arc::new(Sender::with_connector(broker.connector(), URI, "orders"));
    sender.connect().await.unwrap();

    sender.send(b"m1".to_vec(), "k").await.unwrap();
    let waiting: Vec<_> = ["m2", "m3"]
        .into_iter()
        .map(|body| {
            let sender = sender.clone();
            tokio::spawn(async move { sender.send(body.as_bytes().to_vec(), "k").await })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(20)).await;

    broker.close_channel("CONNECTION_FORCED - connection forced");

    for send in waiting {
        assert_eq!(within(send).await.unwrap(), Err(AmqpError::NotConnected));
    }
    eventually(|| broker.all_released()).await;
    assert!(broker.published().is_empty());
}
