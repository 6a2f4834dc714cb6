use serde::{Deserialize, Serialize};

/// `godep.toml` schema v1.
///
/// Every field is optional; unknown keys are ignored so older binaries can
/// read newer files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GodepConfigV1 {
    /// Optional schema string for tooling (`godep.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Spool root directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spool: Option<String>,

    /// Dependencies restored in parallel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Remote name for the ambient workspace's local clone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_remote: Option<String>,

    /// Remote name for the canonical upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_remote: Option<String>,

    /// Allow `go-import` meta tag probes over the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery: Option<bool>,
}
