//! Main slice: application-level flags.

use serde::{Deserialize, Serialize};

/// Cross-cutting application state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct MainSlice {
    /// Whether a persisted snapshot has been applied this run. Transient:
    /// never written into snapshots.
    #[serde(skip)]
    pub has_hydrated: bool,
}
