// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Connection Configuration
//!
//! Protocol level overrides applied on top of the connection string: tuning values
//! negotiated during the handshake, the virtual host and the client properties the
//! broker shows in its management UI.

use crate::arguments::Arguments;
use lapin::{
    types::{FieldTable, LongString},
    uri::AMQPUri,
    ConnectionProperties,
};
use serde::{Deserialize, Serialize};

/// Overrides for a connection. Unset fields keep what the URI says.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Heartbeat interval in seconds, `0` disables heartbeats
    pub heartbeat: Option<u16>,
    pub channel_max: Option<u16>,
    pub frame_max: Option<u32>,
    pub vhost: Option<String>,
    pub locale: Option<String>,
    /// Name shown for the connection by the broker
    pub connection_name: Option<String>,
    pub client_properties: Arguments,
}

impl ConnectionConfig {
    pub fn heartbeat(mut self, seconds: u16) -> Self {
        self.heartbeat = Some(seconds);
        self
    }

    pub fn channel_max(mut self, channel_max: u16) -> Self {
        self.channel_max = Some(channel_max);
        self
    }

    pub fn frame_max(mut self, frame_max: u32) -> Self {
        self.frame_max = Some(frame_max);
        self
    }

    pub fn vhost(mut self, vhost: impl Into<String>) -> Self {
        self.vhost = Some(vhost.into());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn connection_name(mut self, name: impl Into<String>) -> Self {
        self.connection_name = Some(name.into());
        self
    }

    pub fn client_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.client_properties.insert(key, value);
        self
    }

    /// Writes the tuning and vhost overrides into a parsed URI.
    pub(crate) fn apply_to_uri(&self, uri: &mut AMQPUri) {
        if let Some(heartbeat) = self.heartbeat {
            uri.query.heartbeat = Some(heartbeat);
        }
        if let Some(channel_max) = self.channel_max {
            uri.query.channel_max = Some(channel_max);
        }
        if let Some(frame_max) = self.frame_max {
            uri.query.frame_max = Some(frame_max);
        }
        if let Some(vhost) = &self.vhost {
            uri.vhost = vhost.clone();
        }
    }

    /// Builds the client side properties sent during the handshake.
    pub(crate) fn properties(&self) -> ConnectionProperties {
        let mut props = ConnectionProperties::default();

        if let Some(name) = &self.connection_name {
            props = props.with_connection_name(LongString::from(name.clone()));
        }
        if let Some(locale) = &self.locale {
            props.locale = locale.clone();
        }

        let extra = FieldTable::from(&self.client_properties);
        for (key, value) in extra.inner() {
            props.client_properties.insert(key.clone(), value.clone());
        }

        props
    }
}
