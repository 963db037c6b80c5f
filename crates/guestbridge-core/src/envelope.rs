//! The request envelope exchanged between host and guest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single message unit: a stable type tag, the payload shape version,
/// and an optional untyped payload.
///
/// `version` identifies the shape of `payload`, not the behaviour of the
/// receiving handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Stable wire identifier used to route the request.
    #[serde(rename = "type")]
    pub request_type: String,
    /// Payload shape version.
    pub version: u32,
    /// Untyped payload, cast by the receiving handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl RequestEnvelope {
    /// Creates an envelope without a payload.
    #[must_use]
    pub fn new(request_type: impl Into<String>, version: u32) -> Self {
        Self {
            request_type: request_type.into(),
            version,
            payload: None,
        }
    }

    /// Attaches a payload to the envelope.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_uses_type_as_wire_key() {
        // Arrange
        let envelope = RequestEnvelope::new("SET_AUTHORING", 1)
            .with_payload(json!({ "isAuthoring": true }));

        // Act
        let value = serde_json::to_value(&envelope).unwrap();

        // Assert
        assert_eq!(value["type"], "SET_AUTHORING");
        assert_eq!(value["version"], 1);
        assert_eq!(value["payload"]["isAuthoring"], true);
    }

    #[test]
    fn test_envelope_without_payload_deserializes() {
        let envelope: RequestEnvelope =
            serde_json::from_value(json!({ "type": "GO_TO_NEXT_STATE", "version": 1 })).unwrap();

        assert_eq!(envelope.request_type, "GO_TO_NEXT_STATE");
        assert!(envelope.payload.is_none());
    }
}
