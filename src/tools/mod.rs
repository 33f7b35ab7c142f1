//! Built-in Tools for Research Agents
//!
//! This module provides the capabilities a researcher model can invoke while it
//! works on a sub-topic.
//!
//! # Module Structure
//!
//! - [`registry`](crate::tools::registry) - Tool trait, registration and total dispatch
//! - [`search`](crate::tools::search) - `web_search`: search, dedupe, summarize, format
//! - [`think`](crate::tools::think) - `think_tool`: explicit reflection pause
//!
//! # Tool Registry
//!
//! Every invocation the model makes gets exactly one answer, even when the tool
//! is unknown, fails or panics:
//! ```ignore
//! let results = registry.execute_batch(&response.tool_calls).await;
//! assert_eq!(results.len(), response.tool_calls.len());
//! ```

/// Tool registry for managing available tools.
pub mod registry;
/// Web search tool over the configured search backend.
pub mod search;
/// Reflection tool.
pub mod think;

pub use registry::{Tool, ToolRegistry};
