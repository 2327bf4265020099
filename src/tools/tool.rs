//! Named settings operations a host can register and invoke by name.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::{json, Map, Value};

use super::arguments::ToolArguments;
use crate::error::{Result, VoxError};

/// A string argument a tool requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Accepted values, compared ignoring ASCII case; empty means any string.
    pub choices: &'static [&'static str],
}

impl ArgumentSpec {
    pub const fn text(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            choices: &[],
        }
    }

    pub const fn one_of(
        name: &'static str,
        description: &'static str,
        choices: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            description,
            choices,
        }
    }

    fn check(&self, args: &ToolArguments) -> Result<()> {
        let value = args.get_str(self.name)?;
        if !self.choices.is_empty() && !self.choices.iter().any(|c| c.eq_ignore_ascii_case(value)) {
            return Err(VoxError::InvalidArgument(format!("Unknown {}: {value}", self.name)));
        }
        Ok(())
    }

    fn schema(&self) -> Value {
        let mut property = json!({"type": "string", "description": self.description});
        if !self.choices.is_empty() {
            property["enum"] = json!(self.choices);
        }
        property
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn arguments(&self) -> &[ArgumentSpec];

    async fn execute(&self, args: &ToolArguments) -> Result<Value>;

    /// Name, description and an object schema of the arguments, the shape
    /// a host registers the tool under.
    fn descriptor(&self) -> Value {
        let properties: Map<String, Value> = self
            .arguments()
            .iter()
            .map(|arg| (arg.name.to_string(), arg.schema()))
            .collect();
        let required: Vec<&str> = self.arguments().iter().map(|arg| arg.name).collect();
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            },
        })
    }
}

type ToolBody = dyn Fn(ToolArguments) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// A tool whose body is an async closure over the settings it edits.
/// Declared arguments are checked before the body runs.
pub(crate) struct SettingsTool {
    name: &'static str,
    description: &'static str,
    arguments: Vec<ArgumentSpec>,
    body: Arc<ToolBody>,
}

impl SettingsTool {
    pub(crate) fn new<F, Fut>(
        name: &'static str,
        description: &'static str,
        arguments: Vec<ArgumentSpec>,
        body: F,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            name,
            description,
            arguments,
            body: Arc::new(move |args| body(args).boxed()),
        }
    }
}

#[async_trait]
impl Tool for SettingsTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    async fn execute(&self, args: &ToolArguments) -> Result<Value> {
        for spec in &self.arguments {
            spec.check(args)?;
        }
        (self.body)(args.clone()).await
    }
}
