//! State persistence abstraction.
//!
//! Storage itself lives outside this workspace. The content crate only
//! bulk-loads and bulk-exports the ordered state sequence through this port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Serializable representation of one authored state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    /// Unique state identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Opaque content blob owned by the guest.
    pub data: serde_json::Value,
    /// Ordered opaque asset references.
    #[serde(default)]
    pub asset_refs: Vec<String>,
    /// The guest application that owns this state.
    pub owner_app_id: String,
}

/// Repository trait for loading and saving a scope's ordered state list.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Load the full ordered state list for a guest scope.
    async fn load_states(&self, scope_id: &str) -> Result<Vec<StoredState>, DomainError>;

    /// Replace the persisted state list for a guest scope.
    async fn save_states(&self, scope_id: &str, states: &[StoredState]) -> Result<(), DomainError>;
}
