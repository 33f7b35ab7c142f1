//! Research supervisor loop
//!
//! The supervisor reads the research brief and decides, one turn at a time, what
//! to delegate. Every `conduct_research` call in a turn spawns a researcher; all of
//! them run concurrently and the supervisor waits for the whole batch before it
//! looks at any result.
//!
//! ```text
//! DECIDING -> EXECUTING -> DECIDING ... -> DONE
//! ```
//!
//! The phase ends when the iteration cap is reached, when the model stops calling
//! tools, when it calls `research_complete`, or when executing a batch fails.
//! Invocations still pending in the turn that ends the phase are left unanswered.

use crate::llm::LLMClient;
use crate::research::notes::extract_notes;
use crate::research::prompts;
use crate::research::researcher::{ResearchOutcome, ResearchWorker, THINK_TOOL};
use crate::tools::think::ThinkTool;
use crate::types::{AppError, Message, Result, ToolCall, ToolDefinition};
use futures::future::join_all;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::Instrument;

pub const CONDUCT_RESEARCH_TOOL: &str = "conduct_research";
pub const RESEARCH_COMPLETE_TOOL: &str = "research_complete";

/// Tool result for a delegation whose researcher failed
pub const DELEGATION_ERROR_MESSAGE: &str = "Error synthesizing research report";

/// Delegate one topic to a researcher
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConductResearch {
    /// The topic to research. Must be a single, self-contained topic described in detail.
    pub research_topic: String,
}

/// Signal that research is finished
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ResearchComplete {}

/// Reflect on progress and plan
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ThinkArgs {
    /// What was found, what is missing, and what to do next
    pub reflection: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub max_iterations: usize,
    /// Only communicated to the model; not enforced
    pub max_concurrent_research_units: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            max_concurrent_research_units: 3,
        }
    }
}

/// Why a research phase ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseEnd {
    IterationLimit,
    NoToolCalls,
    ResearchComplete,
    Fault(String),
}

/// The supervisor's private conversation
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorExchange {
    pub messages: Vec<Message>,
    pub research_iterations: usize,
}

impl SupervisorExchange {
    pub fn new(brief: &str) -> Self {
        Self {
            messages: vec![Message::human(brief)],
            research_iterations: 0,
        }
    }

    fn latest_tool_calls(&self) -> &[ToolCall] {
        self.messages
            .last()
            .map(|m| m.tool_calls())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorOutcome {
    /// Tool-result payloads harvested from the supervisor history
    pub notes: Vec<String>,
    /// One joined string per successful researcher
    pub raw_notes: Vec<String>,
    pub research_brief: String,
    pub iterations: usize,
    pub end: PhaseEnd,
    pub exchange: SupervisorExchange,
}

pub struct Supervisor {
    model: Arc<dyn LLMClient>,
    worker: Arc<dyn ResearchWorker>,
    config: SupervisorConfig,
}

fn tool_definition<T: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(T);
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters: serde_json::to_value(&schema)
            .unwrap_or_else(|_| serde_json::json!({"type": "object"})),
    }
}

fn parse_args<T: DeserializeOwned>(call: &ToolCall) -> Result<T> {
    serde_json::from_value(call.arguments.clone()).map_err(|e| {
        AppError::Tool(format!(
            "Invalid arguments for '{}' ({}): {}",
            call.name, call.id, e
        ))
    })
}

/// What a batch item resolves to before results are assembled
enum Planned {
    Answer(Message),
    Delegate { call: ToolCall, topic: String },
}

impl Supervisor {
    pub fn new(
        model: Arc<dyn LLMClient>,
        worker: Arc<dyn ResearchWorker>,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            model,
            worker,
            config,
        }
    }

    pub fn tool_definitions() -> Vec<ToolDefinition> {
        vec![
            tool_definition::<ConductResearch>(
                CONDUCT_RESEARCH_TOOL,
                "Delegate a research task to a specialized sub-agent",
            ),
            tool_definition::<ResearchComplete>(
                RESEARCH_COMPLETE_TOOL,
                "Call this when the gathered research is sufficient",
            ),
            tool_definition::<ThinkArgs>(
                THINK_TOOL,
                "Reflect on research progress and plan next steps",
            ),
        ]
    }

    /// Run one research phase over `brief`
    pub async fn run(&self, brief: &str) -> SupervisorOutcome {
        let span = tracing::info_span!("supervisor", max_iterations = self.config.max_iterations);
        self.run_exchange(SupervisorExchange::new(brief), brief)
            .instrument(span)
            .await
    }

    /// Continue a phase from an existing exchange
    pub async fn run_exchange(
        &self,
        mut exchange: SupervisorExchange,
        brief: &str,
    ) -> SupervisorOutcome {
        let mut raw_notes = Vec::new();

        let end = loop {
            if let Err(e) = self.decide(&mut exchange).await {
                tracing::error!(error = %e, "Supervisor decision failed, ending phase");
                break PhaseEnd::Fault(e.to_string());
            }

            if let Some(end) = self.termination(&exchange) {
                break end;
            }

            match self.execute(&mut exchange).await {
                Ok(batch) => raw_notes.extend(batch),
                Err(e) => {
                    tracing::error!(error = %e, "Supervisor batch failed, ending phase");
                    break PhaseEnd::Fault(e.to_string());
                }
            }
        };

        tracing::info!(
            iterations = exchange.research_iterations,
            end = ?end,
            "Research phase finished"
        );

        SupervisorOutcome {
            notes: extract_notes(&exchange.messages),
            raw_notes,
            research_brief: brief.to_string(),
            iterations: exchange.research_iterations,
            end,
            exchange,
        }
    }

    /// DECIDING: one model turn with the supervisor tools bound
    pub async fn decide(&self, exchange: &mut SupervisorExchange) -> Result<()> {
        let mut request = Vec::with_capacity(exchange.messages.len() + 1);
        request.push(Message::system(prompts::lead_researcher_prompt(
            &prompts::today(),
            self.config.max_concurrent_research_units,
            self.config.max_iterations,
        )));
        request.extend(exchange.messages.iter().cloned());

        let response = self
            .model
            .generate_with_tools_and_history(&request, &Self::tool_definitions())
            .await?;

        exchange.messages.push(response.into_message());
        exchange.research_iterations += 1;
        tracing::info!(
            iteration = exchange.research_iterations,
            "Supervisor decision"
        );
        Ok(())
    }

    /// Checked against the latest turn before anything in it runs
    pub fn termination(&self, exchange: &SupervisorExchange) -> Option<PhaseEnd> {
        let calls = exchange.latest_tool_calls();
        if exchange.research_iterations >= self.config.max_iterations {
            Some(PhaseEnd::IterationLimit)
        } else if calls.is_empty() {
            Some(PhaseEnd::NoToolCalls)
        } else if calls.iter().any(|c| c.name == RESEARCH_COMPLETE_TOOL) {
            Some(PhaseEnd::ResearchComplete)
        } else {
            None
        }
    }

    /// EXECUTING: answer reflections, fan out delegations, wait for all of them.
    ///
    /// Returns the batch's raw notes. Results are appended in invocation order.
    pub async fn execute(&self, exchange: &mut SupervisorExchange) -> Result<Vec<String>> {
        let calls = exchange.latest_tool_calls().to_vec();

        let mut planned = Vec::with_capacity(calls.len());
        for call in calls {
            let item = match call.name.as_str() {
                CONDUCT_RESEARCH_TOOL => {
                    let args: ConductResearch = parse_args(&call)?;
                    Planned::Delegate {
                        topic: args.research_topic,
                        call,
                    }
                }
                THINK_TOOL => {
                    let args: ThinkArgs = parse_args(&call)?;
                    Planned::Answer(Message::tool(
                        &call.id,
                        THINK_TOOL,
                        ThinkTool::reflect(&args.reflection),
                    ))
                }
                other => {
                    tracing::warn!(tool = other, "Supervisor requested an unknown tool");
                    Planned::Answer(Message::tool(
                        &call.id,
                        other,
                        format!("Error: Tool '{}' not found", other),
                    ))
                }
            };
            planned.push(item);
        }

        let handles: Vec<_> = planned
            .iter()
            .filter_map(|item| match item {
                Planned::Delegate { topic, .. } => Some(topic.clone()),
                Planned::Answer(_) => None,
            })
            .map(|topic| {
                let worker = self.worker.clone();
                let span = tracing::info_span!("researcher", topic = %topic);
                tokio::spawn(async move { worker.research(&topic).await }.instrument(span))
            })
            .collect();

        if !handles.is_empty() {
            tracing::info!(count = handles.len(), "Delegating research");
        }

        // Fan-in: nothing is folded in until every researcher has returned.
        let mut outcomes = join_all(handles).await.into_iter();

        let mut results = Vec::with_capacity(planned.len());
        let mut raw_notes = Vec::new();
        for item in planned {
            match item {
                Planned::Answer(message) => results.push(message),
                Planned::Delegate { call, topic } => {
                    let outcome = outcomes.next().ok_or_else(|| {
                        AppError::Internal("Missing researcher outcome".to_string())
                    })?;
                    let content = match flatten_outcome(outcome) {
                        Ok(outcome) => {
                            raw_notes.push(outcome.raw_notes.join("\n"));
                            outcome.compressed_research
                        }
                        Err(e) => {
                            tracing::warn!(topic = %topic, error = %e, "Delegated research failed");
                            DELEGATION_ERROR_MESSAGE.to_string()
                        }
                    };
                    results.push(Message::tool(&call.id, CONDUCT_RESEARCH_TOOL, content));
                }
            }
        }

        exchange.messages.extend(results);
        Ok(raw_notes)
    }
}

fn flatten_outcome(
    outcome: std::result::Result<Result<ResearchOutcome>, tokio::task::JoinError>,
) -> Result<ResearchOutcome> {
    outcome.map_err(|e| AppError::Internal(format!("Researcher task failed: {}", e)))?
}
