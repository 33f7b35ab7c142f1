use crate::types::{Message, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<String>;
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Definitions sorted by name, so prompts are stable between runs
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Answer one invocation. Always yields a tool-result message carrying the
    /// invocation's id: unknown names, tool errors and panics become error text.
    pub async fn dispatch(&self, call: &ToolCall) -> Message {
        let Some(tool) = self.tools.get(&call.name) else {
            tracing::warn!(tool = %call.name, "Model requested an unknown tool");
            return Message::tool(
                &call.id,
                &call.name,
                format!("Error: Tool '{}' not found", call.name),
            );
        };

        tracing::debug!(tool = %call.name, id = %call.id, "Executing tool");

        let outcome = AssertUnwindSafe(tool.execute(call.arguments.clone()))
            .catch_unwind()
            .await;

        let content = match outcome {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool execution failed");
                format!("Error executing tool '{}': {}", call.name, e)
            }
            Err(_) => {
                tracing::warn!(tool = %call.name, "Tool panicked");
                format!("Error executing tool '{}': tool panicked", call.name)
            }
        };

        Message::tool(&call.id, &call.name, content)
    }

    /// Run a batch concurrently; results come back in invocation order.
    pub async fn execute_batch(&self, calls: &[ToolCall]) -> Vec<Message> {
        join_all(calls.iter().map(|call| self.dispatch(call))).await
    }
}
