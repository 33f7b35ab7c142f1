//! Research worker loop
//!
//! A researcher owns one delegated sub-topic and a private history nobody else
//! sees. It alternates between asking the model what to do and running the tools
//! the model asked for, until the model answers without tool calls. Its findings
//! are then compressed into a single report for the supervisor.
//!
//! ```text
//! THINKING -> ACTING -> THINKING -> ... -> SUMMARIZING -> DONE
//! ```
//!
//! There is no iteration cap here; the supervisor's cap bounds the overall phase.

use crate::llm::{LLMClient, RoleClients};
use crate::research::notes::collect_raw_notes;
use crate::research::prompts;
use crate::search::{SearchClient, SearchOptions};
use crate::tools::search::WebSearchTool;
use crate::tools::think::ThinkTool;
use crate::tools::ToolRegistry;
use crate::types::{Message, Result, ToolCall};
use async_trait::async_trait;
use std::sync::Arc;

pub const WEB_SEARCH_TOOL: &str = "web_search";
pub const THINK_TOOL: &str = "think_tool";

/// Anything that can research one topic in isolation
#[async_trait]
pub trait ResearchWorker: Send + Sync {
    async fn research(&self, topic: &str) -> Result<ResearchOutcome>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResearchOutcome {
    pub compressed_research: String,
    pub raw_notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Thinking,
    Acting,
    Summarizing,
    Done,
}

/// State of one delegated sub-topic
#[derive(Debug, Clone)]
pub struct WorkerTask {
    topic: String,
    messages: Vec<Message>,
    tool_call_iterations: usize,
    outcome: Option<ResearchOutcome>,
}

impl WorkerTask {
    /// Fresh task whose history holds only the topic
    pub fn new(topic: impl Into<String>) -> Self {
        let topic = topic.into();
        Self {
            messages: vec![Message::human(topic.clone())],
            topic,
            tool_call_iterations: 0,
            outcome: None,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn tool_call_iterations(&self) -> usize {
        self.tool_call_iterations
    }

    pub fn outcome(&self) -> Option<&ResearchOutcome> {
        self.outcome.as_ref()
    }

    fn pending_tool_calls(&self) -> &[ToolCall] {
        self.messages
            .last()
            .map(|m| m.tool_calls())
            .unwrap_or_default()
    }
}

pub struct Researcher {
    research_model: Arc<dyn LLMClient>,
    compression_model: Arc<dyn LLMClient>,
    tools: Arc<ToolRegistry>,
    compression_max_tokens: u32,
}

impl Researcher {
    pub fn new(
        research_model: Arc<dyn LLMClient>,
        compression_model: Arc<dyn LLMClient>,
        tools: Arc<ToolRegistry>,
        compression_max_tokens: u32,
    ) -> Self {
        Self {
            research_model,
            compression_model,
            tools,
            compression_max_tokens,
        }
    }

    /// Researcher bound to `web_search` and `think_tool`
    pub fn with_default_tools(
        clients: &RoleClients,
        search: Arc<dyn SearchClient>,
        search_options: SearchOptions,
        summarization_max_chars: usize,
        compression_max_tokens: u32,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(WebSearchTool::new(
            search,
            clients.summarization.clone(),
            search_options,
            summarization_max_chars,
        )));
        tools.register(Arc::new(ThinkTool));

        Self::new(
            clients.research.clone(),
            clients.compression.clone(),
            Arc::new(tools),
            compression_max_tokens,
        )
    }

    /// Advance `task` by one state and return the next state
    pub async fn step(&self, task: &mut WorkerTask, state: WorkerState) -> Result<WorkerState> {
        match state {
            WorkerState::Thinking => {
                let mut request = Vec::with_capacity(task.messages.len() + 1);
                request.push(Message::system(prompts::research_system_prompt(
                    &prompts::today(),
                )));
                request.extend(task.messages.iter().cloned());

                let response = self
                    .research_model
                    .generate_with_tools_and_history(&request, &self.tools.get_tool_definitions())
                    .await?;

                let next = if response.tool_calls.is_empty() {
                    WorkerState::Summarizing
                } else {
                    WorkerState::Acting
                };
                task.messages.push(response.into_message());
                Ok(next)
            }
            WorkerState::Acting => {
                let calls = task.pending_tool_calls().to_vec();
                tracing::debug!(count = calls.len(), "Executing researcher tool calls");

                let results = self.tools.execute_batch(&calls).await;
                task.messages.extend(results);
                task.tool_call_iterations += 1;
                Ok(WorkerState::Thinking)
            }
            WorkerState::Summarizing => {
                let mut request = Vec::with_capacity(task.messages.len() + 2);
                request.push(Message::system(prompts::compress_research_system_prompt(
                    &prompts::today(),
                )));
                request.extend(task.messages.iter().cloned());
                request.push(Message::human(prompts::compress_research_human_message(
                    &task.topic,
                )));

                let compressed = self
                    .compression_model
                    .generate_with_history(&request, Some(self.compression_max_tokens))
                    .await?;

                task.outcome = Some(ResearchOutcome {
                    compressed_research: compressed,
                    raw_notes: vec![collect_raw_notes(&task.messages)],
                });
                Ok(WorkerState::Done)
            }
            WorkerState::Done => Ok(WorkerState::Done),
        }
    }

    /// Run a task from THINKING to DONE
    pub async fn run(&self, task: &mut WorkerTask) -> Result<ResearchOutcome> {
        let mut state = WorkerState::Thinking;
        while state != WorkerState::Done {
            state = self.step(task, state).await?;
        }

        tracing::info!(
            tool_rounds = task.tool_call_iterations,
            "Researcher finished"
        );

        task.outcome.clone().ok_or_else(|| {
            crate::types::AppError::Internal("Researcher finished without an outcome".to_string())
        })
    }
}

#[async_trait]
impl ResearchWorker for Researcher {
    async fn research(&self, topic: &str) -> Result<ResearchOutcome> {
        let mut task = WorkerTask::new(topic);
        self.run(&mut task).await
    }
}
