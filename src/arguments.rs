// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Extension Arguments
//!
//! RabbitMQ accepts free-form `x-*` arguments on exchange, queue, binding and consumer
//! declarations. They are kept here as JSON values, so they can be written inline in
//! code or loaded from configuration, and converted to an AMQP field table right before
//! the call reaches the broker.

use lapin::types::{
    AMQPValue, FieldArray, FieldTable, LongInt, LongLongInt, LongString, ShortString,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered set of extension arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(BTreeMap<String, Value>);

impl Arguments {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) one argument.
    ///
    /// # Parameters
    /// * `key` - The argument name, e.g. `x-max-length`
    /// * `value` - Anything convertible to a JSON value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder flavour of [`Arguments::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merges `other` into `self`, `other` wins on duplicated keys.
    pub fn extend(&mut self, other: Arguments) {
        self.0.extend(other.0);
    }
}

impl From<BTreeMap<String, Value>> for Arguments {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Arguments(map)
    }
}

impl From<&Arguments> for FieldTable {
    fn from(args: &Arguments) -> FieldTable {
        let mut btree = BTreeMap::<ShortString, AMQPValue>::default();
        for (key, value) in &args.0 {
            btree.insert(ShortString::from(key.clone()), amqp_value(value));
        }

        FieldTable::from(btree)
    }
}

/// Maps a JSON value to the closest AMQP field type.
///
/// Integers that fit 32 bits become `LongInt`, which is what RabbitMQ expects for
/// arguments such as `x-message-ttl`.
fn amqp_value(value: &Value) -> AMQPValue {
    match value {
        Value::Null => AMQPValue::Void,
        Value::Bool(v) => AMQPValue::Boolean(*v),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                match i32::try_from(v) {
                    Ok(v) => AMQPValue::LongInt(LongInt::from(v)),
                    Err(_) => AMQPValue::LongLongInt(LongLongInt::from(v)),
                }
            } else if let Some(v) = n.as_u64() {
                // above i64::MAX, only representable as a double
                AMQPValue::Double(v as f64)
            } else {
                AMQPValue::Double(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(v) => AMQPValue::LongString(LongString::from(v.clone())),
        Value::Array(values) => AMQPValue::FieldArray(FieldArray::from(
            values.iter().map(amqp_value).collect::<Vec<_>>(),
        )),
        Value::Object(map) => {
            let nested: Arguments = map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>()
                .into();
            AMQPValue::FieldTable(FieldTable::from(&nested))
        }
    }
}
