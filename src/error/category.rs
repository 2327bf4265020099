//! Broad error classification.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Broad error category, mirroring the failure classes callers react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing or invalid configuration; never fixed by retrying.
    Configuration,
    /// Connection or send failure at the network layer.
    Transport,
    /// Undecodable inbound message.
    ProtocolParse,
    /// Operation not available for this provider or model kind.
    Unsupported,
    /// Operation attempted in the wrong lifecycle state.
    State,
    Authentication,
    Api,
    Unknown,
}
