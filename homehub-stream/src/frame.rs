//! Typed frames and events as the hub serves them.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::Value;

use homehub_command::ResultFrame;
use homehub_state::Context;

/// A classified inbound frame.
///
/// Frames are internally tagged by `type`; anything unrecognized decodes
/// to [`HubMessage::Unknown`] so a newer hub never breaks dispatch.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum HubMessage {
    /// Hub requests credentials; answered by the connection layer
    #[serde(rename = "auth_required")]
    AuthRequired {
        #[serde(default)]
        ha_version: Option<String>,
    },
    /// Handshake completed
    #[serde(rename = "auth_ok")]
    AuthOk {
        #[serde(default)]
        ha_version: Option<String>,
    },
    /// Credentials rejected
    #[serde(rename = "auth_invalid")]
    AuthInvalid {
        #[serde(default)]
        message: Option<String>,
    },
    /// Response to a correlated command
    #[serde(rename = "result")]
    Result(ResultFrame),
    /// Pushed event
    #[serde(rename = "event")]
    Event(EventFrame),
    #[serde(other)]
    Unknown,
}

/// Envelope of a pushed `event` frame.
#[derive(Debug, Deserialize)]
pub struct EventFrame {
    #[serde(default)]
    pub id: Option<u64>,
    pub event: HubEvent,
}

/// A hub event, tagged by `event_type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "event_type")]
pub enum HubEvent {
    #[serde(rename = "state_changed")]
    StateChanged(StateChangedEvent),
    #[serde(rename = "area_registry_updated")]
    AreaRegistryUpdated(RegistryUpdatedEvent),
    #[serde(rename = "device_registry_updated")]
    DeviceRegistryUpdated(RegistryUpdatedEvent),
    #[serde(rename = "entity_registry_updated")]
    EntityRegistryUpdated(RegistryUpdatedEvent),
    #[serde(other)]
    Unknown,
}

/// A single entity's state transition.
#[derive(Debug, Deserialize)]
pub struct StateChangedEvent {
    pub data: StateChangedData,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub time_fired: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub context: Option<Context>,
}

/// State bodies stay untyped here; the router parses `new_state` with the
/// domain selected by the entity id.
#[derive(Debug, Deserialize)]
pub struct StateChangedData {
    pub entity_id: String,
    #[serde(default)]
    pub old_state: Value,
    #[serde(default)]
    pub new_state: Value,
}

/// A registry mutation notice.
///
/// The payload names the changed id, but refreshes are always full; the
/// router never diffs it.
#[derive(Debug, Deserialize)]
pub struct RegistryUpdatedEvent {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub time_fired: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub context: Option<Context>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_frame_classifies() {
        let msg: HubMessage = serde_json::from_str(
            r#"{"id": 12, "type": "result", "success": true, "result": [1, 2]}"#,
        )
        .unwrap();
        match msg {
            HubMessage::Result(frame) => {
                assert_eq!(frame.id, 12);
                assert_eq!(frame.result, serde_json::json!([1, 2]));
            }
            other => panic!("expected result, got {other:?}"),
        }
    }

    #[test]
    fn state_changed_event_classifies() {
        let msg: HubMessage = serde_json::from_str(
            r#"{
                "id": 2,
                "type": "event",
                "event": {
                    "event_type": "state_changed",
                    "data": {
                        "entity_id": "light.desk",
                        "old_state": {"state": "off"},
                        "new_state": {"state": "on"}
                    },
                    "origin": "LOCAL",
                    "time_fired": "2023-07-06T19:11:00.309279+00:00",
                    "context": {"id": "01H4P9", "parent_id": null, "user_id": null}
                }
            }"#,
        )
        .unwrap();
        match msg {
            HubMessage::Event(frame) => match frame.event {
                HubEvent::StateChanged(ev) => {
                    assert_eq!(ev.data.entity_id, "light.desk");
                    assert!(ev.time_fired.is_some());
                }
                other => panic!("expected state_changed, got {other:?}"),
            },
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn registry_update_event_classifies() {
        let msg: HubMessage = serde_json::from_str(
            r#"{
                "id": 2,
                "type": "event",
                "event": {
                    "event_type": "device_registry_updated",
                    "data": {"action": "update", "device_id": "abc", "changes": {"area_id": "hall"}},
                    "origin": "LOCAL",
                    "time_fired": "2023-12-16T23:56:04.564285+00:00",
                    "context": {"id": "01HHTG", "parent_id": null, "user_id": null}
                }
            }"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            HubMessage::Event(EventFrame {
                event: HubEvent::DeviceRegistryUpdated(_),
                ..
            })
        ));
    }

    #[test]
    fn unknown_types_fall_through() {
        let msg: HubMessage = serde_json::from_str(r#"{"type": "pong", "id": 3}"#).unwrap();
        assert!(matches!(msg, HubMessage::Unknown));

        let msg: HubMessage = serde_json::from_str(
            r#"{"type": "event", "event": {"event_type": "call_service", "data": {}}}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            HubMessage::Event(EventFrame {
                event: HubEvent::Unknown,
                ..
            })
        ));
    }
}
