//! Requests a guest sends to its host.

use std::collections::BTreeMap;

use guestbridge_core::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::codec::{VersionedPayload, cast, unsupported};
use crate::dispatcher::{OutboundRequest, VersionPolicy};

/// Wire type of [`SubmitResults`].
pub const SUBMIT_RESULTS: &str = "SUBMIT_RESULTS";
/// Wire type of [`GoToNextState`].
pub const GO_TO_NEXT_STATE: &str = "GO_TO_NEXT_STATE";
/// Wire type of [`GoToPreviousState`].
pub const GO_TO_PREVIOUS_STATE: &str = "GO_TO_PREVIOUS_STATE";
/// Wire type of [`SetStateData`].
pub const SET_STATE_DATA: &str = "SET_STATE_DATA";
/// Wire type of [`SetValidationMessage`].
pub const SET_VALIDATION_MESSAGE: &str = "SET_VALIDATION_MESSAGE";
/// Wire type of [`AnnounceVersions`].
pub const ANNOUNCE_VERSIONS: &str = "ANNOUNCE_VERSIONS";

/// Result type assumed for version 1 submissions, which carry none.
pub const GENERIC_RESULT_TYPE: &str = "GENERIC";

/// The guest reports a result for the current activity.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResults {
    /// Result type tag, e.g. `HIT_V1`.
    pub result_type: String,
    /// Opaque result body.
    pub result: Value,
    /// Optional human-readable description.
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResultsV1 {
    result: Value,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResultsV2 {
    result_type: String,
    result: Value,
    #[serde(default)]
    description: Option<String>,
}

impl VersionedPayload for SubmitResults {
    const REQUEST_TYPE: &'static str = SUBMIT_RESULTS;
    const SUPPORTED_VERSIONS: &'static [u32] = &[1, 2];

    fn decode(version: u32, payload: Option<&Value>) -> Result<Self, ProtocolError> {
        match version {
            1 => {
                let dto: SubmitResultsV1 = cast(SUBMIT_RESULTS, version, payload)?;
                Ok(Self {
                    result_type: GENERIC_RESULT_TYPE.to_owned(),
                    result: dto.result,
                    description: dto.description,
                })
            }
            2 => {
                let dto: SubmitResultsV2 = cast(SUBMIT_RESULTS, version, payload)?;
                Ok(Self {
                    result_type: dto.result_type,
                    result: dto.result,
                    description: dto.description,
                })
            }
            _ => Err(unsupported(SUBMIT_RESULTS, version)),
        }
    }
}

impl OutboundRequest for SubmitResults {
    const REQUEST_TYPE: &'static str = SUBMIT_RESULTS;
    const VERSION_POLICY: VersionPolicy = VersionPolicy::with_alternates(2, &[1]);

    fn encode(&self, version: u32) -> Option<Value> {
        let mut payload = json!({ "result": self.result });
        if version >= 2 {
            payload["resultType"] = json!(self.result_type);
        }
        if let Some(description) = &self.description {
            payload["description"] = json!(description);
        }
        Some(payload)
    }
}

/// The guest asks the host to advance to the next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoToNextState;

impl VersionedPayload for GoToNextState {
    const REQUEST_TYPE: &'static str = GO_TO_NEXT_STATE;
    const SUPPORTED_VERSIONS: &'static [u32] = &[1];

    fn decode(version: u32, _payload: Option<&Value>) -> Result<Self, ProtocolError> {
        match version {
            1 => Ok(Self),
            _ => Err(unsupported(GO_TO_NEXT_STATE, version)),
        }
    }
}

impl OutboundRequest for GoToNextState {
    const REQUEST_TYPE: &'static str = GO_TO_NEXT_STATE;
    const VERSION_POLICY: VersionPolicy = VersionPolicy::fixed(1);

    fn encode(&self, _version: u32) -> Option<Value> {
        None
    }
}

/// The guest asks the host to go back to the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoToPreviousState;

impl VersionedPayload for GoToPreviousState {
    const REQUEST_TYPE: &'static str = GO_TO_PREVIOUS_STATE;
    const SUPPORTED_VERSIONS: &'static [u32] = &[1];

    fn decode(version: u32, _payload: Option<&Value>) -> Result<Self, ProtocolError> {
        match version {
            1 => Ok(Self),
            _ => Err(unsupported(GO_TO_PREVIOUS_STATE, version)),
        }
    }
}

impl OutboundRequest for GoToPreviousState {
    const REQUEST_TYPE: &'static str = GO_TO_PREVIOUS_STATE;
    const VERSION_POLICY: VersionPolicy = VersionPolicy::fixed(1);

    fn encode(&self, _version: u32) -> Option<Value> {
        None
    }
}

/// The guest replaces the content of the state being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct SetStateData {
    /// New opaque content blob.
    pub data: Value,
    /// New asset references; `None` keeps the current ones.
    pub asset_refs: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SetStateDataV1 {
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetStateDataV2 {
    data: Value,
    #[serde(default)]
    asset_refs: Option<Vec<String>>,
}

impl VersionedPayload for SetStateData {
    const REQUEST_TYPE: &'static str = SET_STATE_DATA;
    const SUPPORTED_VERSIONS: &'static [u32] = &[1, 2];

    fn decode(version: u32, payload: Option<&Value>) -> Result<Self, ProtocolError> {
        match version {
            1 => {
                let dto: SetStateDataV1 = cast(SET_STATE_DATA, version, payload)?;
                Ok(Self {
                    data: dto.data,
                    asset_refs: None,
                })
            }
            2 => {
                let dto: SetStateDataV2 = cast(SET_STATE_DATA, version, payload)?;
                Ok(Self {
                    data: dto.data,
                    asset_refs: dto.asset_refs,
                })
            }
            _ => Err(unsupported(SET_STATE_DATA, version)),
        }
    }
}

impl OutboundRequest for SetStateData {
    const REQUEST_TYPE: &'static str = SET_STATE_DATA;
    const VERSION_POLICY: VersionPolicy = VersionPolicy::with_alternates(2, &[1]);

    fn encode(&self, version: u32) -> Option<Value> {
        let mut payload = json!({ "data": self.data });
        if version >= 2 {
            if let Some(asset_refs) = &self.asset_refs {
                payload["assetRefs"] = json!(asset_refs);
            }
        }
        Some(payload)
    }
}

/// The guest reports whether the state being edited is valid. A message
/// blocks finishing the edit; `None` clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValidationMessage {
    /// The blocking message, if any.
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetValidationMessageV1 {
    #[serde(default)]
    message: Option<String>,
}

impl VersionedPayload for SetValidationMessage {
    const REQUEST_TYPE: &'static str = SET_VALIDATION_MESSAGE;
    const SUPPORTED_VERSIONS: &'static [u32] = &[1];

    fn decode(version: u32, payload: Option<&Value>) -> Result<Self, ProtocolError> {
        match version {
            1 => {
                let dto: SetValidationMessageV1 = cast(SET_VALIDATION_MESSAGE, version, payload)?;
                Ok(Self {
                    message: dto.message.filter(|message| !message.is_empty()),
                })
            }
            _ => Err(unsupported(SET_VALIDATION_MESSAGE, version)),
        }
    }
}

impl OutboundRequest for SetValidationMessage {
    const REQUEST_TYPE: &'static str = SET_VALIDATION_MESSAGE;
    const VERSION_POLICY: VersionPolicy = VersionPolicy::fixed(1);

    fn encode(&self, _version: u32) -> Option<Value> {
        Some(json!({ "message": self.message }))
    }
}

/// The guest declares which payload version it expects for each host
/// command type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnounceVersions {
    /// Requested version per request type.
    pub versions: BTreeMap<String, u32>,
}

impl VersionedPayload for AnnounceVersions {
    const REQUEST_TYPE: &'static str = ANNOUNCE_VERSIONS;
    const SUPPORTED_VERSIONS: &'static [u32] = &[1];

    fn decode(version: u32, payload: Option<&Value>) -> Result<Self, ProtocolError> {
        match version {
            1 => cast(ANNOUNCE_VERSIONS, version, payload),
            _ => Err(unsupported(ANNOUNCE_VERSIONS, version)),
        }
    }
}

impl OutboundRequest for AnnounceVersions {
    const REQUEST_TYPE: &'static str = ANNOUNCE_VERSIONS;
    const VERSION_POLICY: VersionPolicy = VersionPolicy::fixed(1);

    fn encode(&self, _version: u32) -> Option<Value> {
        Some(json!({ "versions": self.versions }))
    }
}
