//! Commands a host sends to its guest.

use guestbridge_core::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::codec::{VersionedPayload, cast, unsupported};
use crate::dispatcher::{OutboundRequest, VersionPolicy};

/// Wire type of [`SetState`].
pub const SET_STATE: &str = "SET_STATE";
/// Wire type of [`SetAuthoring`].
pub const SET_AUTHORING: &str = "SET_AUTHORING";

/// The content of one state as the guest sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePayload {
    /// State identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Opaque content blob.
    pub data: Value,
    /// Ordered opaque asset references.
    #[serde(default)]
    pub asset_refs: Vec<String>,
}

/// Navigation chrome hints sent alongside a state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationHints {
    /// A following state exists.
    pub has_next_slide: bool,
    /// A preceding state exists.
    pub has_previous_slide: bool,
    /// The guest should not render its own navigation.
    pub hide_navigation: bool,
}

/// Pushes a state's content to the guest.
#[derive(Debug, Clone, PartialEq)]
pub struct SetState {
    /// The state to render.
    pub state: StatePayload,
    /// Navigation hints; version 2 payloads carry none.
    pub navigation: Option<NavigationHints>,
}

#[derive(Debug, Deserialize)]
struct SetStateV2 {
    state: StatePayload,
}

#[derive(Debug, Deserialize)]
struct SetStateV3 {
    state: StatePayload,
    #[serde(flatten)]
    navigation: NavigationHints,
}

impl VersionedPayload for SetState {
    const REQUEST_TYPE: &'static str = SET_STATE;
    const SUPPORTED_VERSIONS: &'static [u32] = &[2, 3];

    fn decode(version: u32, payload: Option<&Value>) -> Result<Self, ProtocolError> {
        match version {
            2 => {
                let dto: SetStateV2 = cast(SET_STATE, version, payload)?;
                Ok(Self {
                    state: dto.state,
                    navigation: None,
                })
            }
            3 => {
                let dto: SetStateV3 = cast(SET_STATE, version, payload)?;
                Ok(Self {
                    state: dto.state,
                    navigation: Some(dto.navigation),
                })
            }
            _ => Err(unsupported(SET_STATE, version)),
        }
    }
}

impl OutboundRequest for SetState {
    const REQUEST_TYPE: &'static str = SET_STATE;
    const VERSION_POLICY: VersionPolicy = VersionPolicy::with_alternates(3, &[2]);

    fn encode(&self, version: u32) -> Option<Value> {
        if version == 2 {
            return Some(json!({ "state": self.state }));
        }
        let navigation = self.navigation.unwrap_or_default();
        Some(json!({
            "state": self.state,
            "hasNextSlide": navigation.has_next_slide,
            "hasPreviousSlide": navigation.has_previous_slide,
            "hideNavigation": navigation.hide_navigation,
        }))
    }
}

/// Switches the guest in or out of its authoring chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetAuthoring {
    /// Whether the guest should show edit chrome.
    pub is_authoring: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetAuthoringV1 {
    is_authoring: bool,
}

impl VersionedPayload for SetAuthoring {
    const REQUEST_TYPE: &'static str = SET_AUTHORING;
    const SUPPORTED_VERSIONS: &'static [u32] = &[1];

    fn decode(version: u32, payload: Option<&Value>) -> Result<Self, ProtocolError> {
        match version {
            1 => {
                let dto: SetAuthoringV1 = cast(SET_AUTHORING, version, payload)?;
                Ok(Self {
                    is_authoring: dto.is_authoring,
                })
            }
            _ => Err(unsupported(SET_AUTHORING, version)),
        }
    }
}

impl OutboundRequest for SetAuthoring {
    const REQUEST_TYPE: &'static str = SET_AUTHORING;
    const VERSION_POLICY: VersionPolicy = VersionPolicy::fixed(1);

    fn encode(&self, _version: u32) -> Option<Value> {
        Some(json!({ "isAuthoring": self.is_authoring }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> StatePayload {
        StatePayload {
            id: "s1".to_owned(),
            name: "Intro".to_owned(),
            data: json!({ "text": "hello" }),
            asset_refs: vec!["asset-1".to_owned()],
        }
    }

    #[test]
    fn test_set_state_v3_carries_navigation_hints() {
        let command = SetState {
            state: sample_state(),
            navigation: Some(NavigationHints {
                has_next_slide: true,
                has_previous_slide: true,
                hide_navigation: false,
            }),
        };

        let decoded = SetState::decode(3, command.encode(3).as_ref()).unwrap();

        assert_eq!(decoded, command);
    }

    #[test]
    fn test_set_state_v2_omits_navigation_hints() {
        let command = SetState {
            state: sample_state(),
            navigation: Some(NavigationHints::default()),
        };

        let payload = command.encode(2).unwrap();
        let decoded = SetState::decode(2, Some(&payload)).unwrap();

        assert_eq!(payload.as_object().unwrap().len(), 1);
        assert_eq!(decoded.state, sample_state());
        assert!(decoded.navigation.is_none());
    }

    #[test]
    fn test_set_state_v3_requires_navigation_fields() {
        let payload = json!({ "state": sample_state() });

        let result = SetState::decode(3, Some(&payload));

        assert!(matches!(
            result.unwrap_err(),
            ProtocolError::UnableToParsePayload { version: 3, .. }
        ));
    }

    #[test]
    fn test_set_authoring_uses_camel_case_flag() {
        let payload = SetAuthoring { is_authoring: true }.encode(1).unwrap();

        assert_eq!(payload, json!({ "isAuthoring": true }));
        assert!(SetAuthoring::decode(1, Some(&payload)).unwrap().is_authoring);
    }
}
