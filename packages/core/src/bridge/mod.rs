//! Companion Device Bridge
//!
//! Message types and channel plumbing for a paired watch app. The watch
//! sends logged workouts; the phone pushes hierarchy snapshots back as
//! key/value application context. Both directions run over tokio broadcast
//! channels so any number of listeners can attach without coupling to the
//! transport that actually talks to the device.
//!
//! An unpaired or unreachable device is a normal condition: sends without a
//! live subscriber simply report zero receivers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::models::WorkoutLog;

/// Broadcast capacity per direction. Messages are small and consumers drain
/// quickly; lagged receivers miss old messages rather than blocking senders.
const CHANNEL_CAPACITY: usize = 128;

/// Messages arriving from the companion device.
///
/// Wire shape is adjacently tagged: `{"type": "workoutLog", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum WatchMessage {
    /// A workout logged on the device.
    WorkoutLog(WorkoutLog),
}

/// A key/value application-context push toward the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchPush {
    pub key: String,
    pub payload: Value,
}

/// Bidirectional channel pair between the app core and the device transport.
#[derive(Debug)]
pub struct WatchBridge {
    inbound: broadcast::Sender<WatchMessage>,
    outbound: broadcast::Sender<WatchPush>,
}

impl Default for WatchBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchBridge {
    pub fn new() -> Self {
        let (inbound, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (outbound, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { inbound, outbound }
    }

    /// Subscribe to messages arriving from the device.
    pub fn subscribe_inbound(&self) -> broadcast::Receiver<WatchMessage> {
        self.inbound.subscribe()
    }

    /// Subscribe to pushes heading toward the device (transport side).
    pub fn subscribe_outbound(&self) -> broadcast::Receiver<WatchPush> {
        self.outbound.subscribe()
    }

    /// Deliver a device message into the app. Returns the number of live
    /// subscribers that received it; zero means nobody is listening, which
    /// is fine during startup and shutdown.
    pub fn deliver(&self, message: WatchMessage) -> usize {
        self.inbound.send(message).unwrap_or(0)
    }

    /// Push application context toward the device.
    pub fn push_context(&self, key: impl Into<String>, payload: Value) -> usize {
        self.outbound
            .send(WatchPush {
                key: key.into(),
                payload,
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_log() -> WorkoutLog {
        WorkoutLog::new(
            "what-hspu",
            "HSPU",
            10.0,
            None,
            Utc.with_ymd_and_hms(2025, 12, 23, 10, 0, 0).unwrap(),
        )
    }

    /// Contract test: the device firmware expects exactly this wire shape.
    #[test]
    fn workout_log_message_wire_format() {
        let message = WatchMessage::WorkoutLog(sample_log());
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["type"], "workoutLog");
        assert_eq!(json["data"]["nodeId"], "what-hspu");
        assert!(json["data"]["date"].is_string());

        let parsed: WatchMessage = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, message);
    }

    #[tokio::test]
    async fn deliver_reaches_inbound_subscribers() {
        let bridge = WatchBridge::new();
        let mut rx = bridge.subscribe_inbound();

        let message = WatchMessage::WorkoutLog(sample_log());
        assert_eq!(bridge.deliver(message.clone()), 1);
        assert_eq!(rx.recv().await.unwrap(), message);
    }

    #[tokio::test]
    async fn sends_without_subscribers_are_silent() {
        let bridge = WatchBridge::new();
        assert_eq!(bridge.deliver(WatchMessage::WorkoutLog(sample_log())), 0);
        assert_eq!(bridge.push_context("trainingData", Value::Null), 0);
    }

    #[tokio::test]
    async fn context_pushes_reach_the_transport() {
        let bridge = WatchBridge::new();
        let mut rx = bridge.subscribe_outbound();

        bridge.push_context("trainingData", serde_json::json!({"v": 1}));
        let push = rx.recv().await.unwrap();
        assert_eq!(push.key, "trainingData");
        assert_eq!(push.payload["v"], 1);
    }
}
