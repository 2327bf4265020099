//! Typed access to tool call arguments.

use crate::error::VoxError;

/// JSON object of arguments passed to a settings tool.
#[derive(Debug, Clone, Default)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Arguments for a tool that takes none.
    pub fn empty() -> Self {
        Self::new(serde_json::json!({}))
    }

    /// String argument `key`; absent or non-string values are rejected.
    pub fn get_str(&self, key: &str) -> Result<&str, VoxError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| VoxError::InvalidArgument(format!("Missing string argument: {key}")))
    }
}
