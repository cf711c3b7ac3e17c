//! Tool System
//!
//! Named, schema-described functions the model may ask to have invoked
//! mid-conversation, and the registry that owns them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{json, Map, Value};

use crate::error::{LlmError, Result};

/// Executor signature: tool arguments in, raw output text out.
///
/// Executors run synchronously; whatever side effects they perform (calling
/// a weather API, reading a file) are their own business.
pub type ToolExecutor = Box<dyn Fn(&Map<String, Value>) -> anyhow::Result<String> + Send + Sync>;

/// A callable tool: unique name, human-readable description, JSON-schema
/// parameter descriptor and the executor itself.
pub struct Tool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    executor: ToolExecutor,
}

impl Tool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        executor: F,
    ) -> Self
    where
        F: Fn(&Map<String, Value>) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            executor: Box::new(executor),
        }
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Registry of tools available to one conversation.
///
/// Registration, description and execution may race from different threads;
/// the internal map is guarded by a mutex. Name collisions resolve
/// last-write-wins.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Mutex<HashMap<String, Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Tool>> {
        self.tools.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite a tool by name. Always succeeds.
    pub fn register(&self, tool: Tool) {
        self.lock().insert(tool.name.clone(), tool);
    }

    /// Serialize all registered tools into the provider-agnostic descriptor
    /// shape used verbatim in outgoing requests. Iteration order follows the
    /// map and is unspecified; callers must not depend on it.
    pub fn describe(&self) -> Vec<Value> {
        self.lock()
            .values()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    },
                })
            })
            .collect()
    }

    /// Look up a tool by name and invoke its executor synchronously.
    ///
    /// Fails with `ToolNotFound` for unknown names; executor failures are
    /// wrapped in `ToolExecution` with the cause preserved.
    pub fn execute(&self, name: &str, args: &Map<String, Value>) -> Result<String> {
        let tools = self.lock();
        let tool = tools
            .get(name)
            .ok_or_else(|| LlmError::ToolNotFound(name.to_string()))?;

        tracing::debug!(tool = %name, "executing tool");
        (tool.executor)(args).map_err(|cause| LlmError::ToolExecution {
            tool: name.to_string(),
            cause,
        })
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
