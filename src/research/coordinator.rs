use crate::{
    llm::{generate_typed, RoleClients},
    research::{
        prompts,
        researcher::{ResearchWorker, Researcher},
        session::ResearchSession,
        supervisor::{PhaseEnd, Supervisor, SupervisorConfig},
    },
    search::{SearchClient, SearchOptions},
    types::{transcript, Message, Result},
    utils::toml_config::ResearchConfig,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whether to ask the user a question before researching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClarifyWithUser {
    /// Whether the user needs to be asked a clarifying question
    pub need_clarification: bool,
    /// A question to ask the user to clarify the report scope
    pub question: String,
    /// Message confirming research will start once the user has given enough detail
    pub verification: String,
}

/// The research brief distilled from the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchQuestion {
    /// A research question that will guide the research
    pub research_brief: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The session stopped to ask the user something
    NeedsClarification { question: String },
    Completed {
        report: String,
        end: PhaseEnd,
        iterations: usize,
    },
}

pub struct ResearchCoordinator {
    clients: RoleClients,
    supervisor: Supervisor,
    allow_clarification: bool,
}

impl ResearchCoordinator {
    pub fn new(clients: RoleClients, supervisor: Supervisor, allow_clarification: bool) -> Self {
        Self {
            clients,
            supervisor,
            allow_clarification,
        }
    }

    /// Wire up researchers and the supervisor from configuration
    pub fn from_config(
        config: &ResearchConfig,
        clients: RoleClients,
        search: Arc<dyn SearchClient>,
    ) -> Self {
        let settings = &config.research;
        let options = SearchOptions {
            max_results: config.search.max_results,
            topic: config.search.topic,
            include_raw_content: true,
        };

        let researcher: Arc<dyn ResearchWorker> = Arc::new(Researcher::with_default_tools(
            &clients,
            search,
            options,
            settings.summarization_max_chars,
            settings.compression_max_tokens,
        ));

        let supervisor = Supervisor::new(
            clients.research.clone(),
            researcher,
            SupervisorConfig {
                max_iterations: settings.max_researcher_iterations,
                max_concurrent_research_units: settings.max_concurrent_research_units,
            },
        );

        Self::new(clients, supervisor, settings.allow_clarification)
    }

    /// Execute deep research on a query
    pub async fn research(&self, query: &str) -> Result<(ResearchSession, SessionOutcome)> {
        let mut session = ResearchSession::new(query);
        let outcome = self.run(&mut session).await?;
        Ok((session, outcome))
    }

    /// Clarify, write the brief, research, then write the report
    pub async fn run(&self, session: &mut ResearchSession) -> Result<SessionOutcome> {
        if self.allow_clarification {
            let decision = self.clarify(session).await?;
            if decision.need_clarification {
                tracing::info!("Asking the user for clarification");
                session.push_message(Message::ai(decision.question.clone(), vec![]));
                return Ok(SessionOutcome::NeedsClarification {
                    question: decision.question,
                });
            }
            session.push_message(Message::ai(decision.verification, vec![]));
        }

        let brief = self.write_brief(session).await?;
        session.set_research_brief(brief.clone())?;
        tracing::info!(brief = %brief, "Research brief ready");

        let phase = self.supervisor.run(&brief).await;
        session.append_notes(phase.notes);
        session.append_raw_notes(phase.raw_notes);

        let report = self.write_report(session, &brief).await?;
        session.set_final_report(report.clone())?;
        session.push_message(Message::ai(report.clone(), vec![]));

        Ok(SessionOutcome::Completed {
            report,
            end: phase.end,
            iterations: phase.iterations,
        })
    }

    async fn clarify(&self, session: &ResearchSession) -> Result<ClarifyWithUser> {
        let prompt =
            prompts::clarify_with_user_instructions(&transcript(session.messages()), &prompts::today());
        generate_typed(self.clients.research.as_ref(), &[Message::human(prompt)]).await
    }

    async fn write_brief(&self, session: &ResearchSession) -> Result<String> {
        let prompt = prompts::research_brief_prompt(&transcript(session.messages()), &prompts::today());
        let question: ResearchQuestion =
            generate_typed(self.clients.research.as_ref(), &[Message::human(prompt)]).await?;
        Ok(question.research_brief)
    }

    async fn write_report(&self, session: &ResearchSession, brief: &str) -> Result<String> {
        let findings = session.notes().join("\n");
        let prompt = prompts::final_report_prompt(
            brief,
            &transcript(session.messages()),
            &findings,
            &prompts::today(),
        );
        self.clients
            .final_report
            .generate_with_history(&[Message::human(prompt)], None)
            .await
    }
}
