use crate::types::{AppError, Message, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One end-to-end research request and everything it accumulates.
///
/// The brief and the final report are written once. Notes only ever grow.
#[derive(Debug, Clone)]
pub struct ResearchSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    messages: Vec<Message>,
    research_brief: Option<String>,
    notes: Vec<String>,
    raw_notes: Vec<String>,
    final_report: Option<String>,
}

impl ResearchSession {
    pub fn new(query: impl Into<String>) -> Self {
        Self::with_messages(vec![Message::human(query)])
    }

    /// Resume a conversation, e.g. after answering a clarifying question
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            messages,
            research_brief: None,
            notes: Vec::new(),
            raw_notes: Vec::new(),
            final_report: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn research_brief(&self) -> Option<&str> {
        self.research_brief.as_deref()
    }

    pub fn set_research_brief(&mut self, brief: impl Into<String>) -> Result<()> {
        if self.research_brief.is_some() {
            return Err(AppError::InvalidInput(
                "Research brief is already set".to_string(),
            ));
        }
        self.research_brief = Some(brief.into());
        Ok(())
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn append_notes(&mut self, notes: impl IntoIterator<Item = String>) {
        self.notes.extend(notes);
    }

    pub fn raw_notes(&self) -> &[String] {
        &self.raw_notes
    }

    pub fn append_raw_notes(&mut self, raw_notes: impl IntoIterator<Item = String>) {
        self.raw_notes.extend(raw_notes);
    }

    pub fn final_report(&self) -> Option<&str> {
        self.final_report.as_deref()
    }

    pub fn set_final_report(&mut self, report: impl Into<String>) -> Result<()> {
        if self.final_report.is_some() {
            return Err(AppError::InvalidInput(
                "Final report is already set".to_string(),
            ));
        }
        self.final_report = Some(report.into());
        Ok(())
    }
}
