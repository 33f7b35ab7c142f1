use crate::research::researcher::THINK_TOOL;
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Deliberate pause for reflection; records nothing beyond its acknowledgement.
pub struct ThinkTool;

impl ThinkTool {
    pub fn reflect(reflection: &str) -> String {
        format!("Reflection recorded: {}", reflection)
    }
}

#[async_trait]
impl Tool for ThinkTool {
    fn name(&self) -> &str {
        THINK_TOOL
    }

    fn description(&self) -> &str {
        "Record a reflection on progress so far and plan the next step"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reflection": {
                    "type": "string",
                    "description": "What was found, what is missing, and what to do next"
                }
            },
            "required": ["reflection"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let reflection = args
            .get("reflection")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::InvalidInput("Missing 'reflection' parameter".to_string()))?;

        Ok(Self::reflect(reflection))
    }
}
