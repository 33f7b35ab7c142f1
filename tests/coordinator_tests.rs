//! End-to-end session tests with scripted models and fake researchers

mod common;

use ares_research::research::supervisor::{PhaseEnd, Supervisor, SupervisorConfig};
use ares_research::research::{ResearchCoordinator, ResearchSession, SessionOutcome};
use ares_research::types::Message;
use ares_research::RoleClients;
use common::mocks::*;
use serde_json::json;
use std::sync::Arc;

const QUERY: &str = "Compare solar vs wind efficiency";
const BRIEF: &str = "Compare the conversion efficiency and capacity factors of utility-scale solar PV and onshore wind.";

struct Session {
    research: Arc<ScriptedLLMClient>,
    supervisor_model: Arc<ScriptedLLMClient>,
    writer: Arc<ScriptedLLMClient>,
    worker: Arc<FakeWorker>,
    coordinator: ResearchCoordinator,
}

fn session(
    research: Vec<Reply>,
    supervisor: Vec<Reply>,
    report: Vec<Reply>,
    allow_clarification: bool,
) -> Session {
    let research = Arc::new(ScriptedLLMClient::new(research));
    let supervisor_model = Arc::new(ScriptedLLMClient::new(supervisor));
    let writer = Arc::new(ScriptedLLMClient::new(report));
    let worker = Arc::new(FakeWorker::new(EventLog::default()));

    let clients = RoleClients {
        research: research.clone(),
        summarization: Arc::new(ScriptedLLMClient::new(vec![])),
        compression: Arc::new(ScriptedLLMClient::new(vec![])),
        final_report: writer.clone(),
    };
    let supervisor = Supervisor::new(
        supervisor_model.clone(),
        worker.clone(),
        SupervisorConfig::default(),
    );

    Session {
        research,
        supervisor_model,
        writer,
        worker,
        coordinator: ResearchCoordinator::new(clients, supervisor, allow_clarification),
    }
}

fn no_clarification() -> Reply {
    Reply::Structured(json!({
        "need_clarification": false,
        "question": "",
        "verification": "Starting research on solar and wind efficiency."
    }))
}

fn brief() -> Reply {
    Reply::Structured(json!({ "research_brief": BRIEF }))
}

#[tokio::test]
async fn test_clarification_stops_session() {
    let s = session(
        vec![Reply::Structured(json!({
            "need_clarification": true,
            "question": "Do you mean residential or utility-scale installations?",
            "verification": ""
        }))],
        vec![],
        vec![],
        true,
    );

    let (session, outcome) = s.coordinator.research(QUERY).await.unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::NeedsClarification {
            question: "Do you mean residential or utility-scale installations?".to_string()
        }
    );
    assert_eq!(
        session.messages(),
        &[
            Message::human(QUERY),
            Message::ai("Do you mean residential or utility-scale installations?", vec![]),
        ]
    );
    assert!(session.research_brief().is_none());
    assert!(session.final_report().is_none());
    assert!(s.supervisor_model.requests().is_empty());
    assert_eq!(s.worker.calls(), 0);
}

#[tokio::test]
async fn test_full_session_produces_report() {
    let s = session(
        vec![no_clarification(), brief()],
        vec![
            Reply::tools(vec![
                conduct("c1", "solar efficiency"),
                think("t1", "compare like for like"),
                conduct("c2", "wind efficiency"),
            ]),
            Reply::tools(vec![complete("done")]),
        ],
        vec![Reply::Text("# Solar vs Wind\n\nWind wins on capacity factor.".to_string())],
        true,
    );

    let (session, outcome) = s.coordinator.research(QUERY).await.unwrap();

    match &outcome {
        SessionOutcome::Completed {
            report,
            end,
            iterations,
        } => {
            assert_eq!(report, "# Solar vs Wind\n\nWind wins on capacity factor.");
            assert_eq!(*end, PhaseEnd::ResearchComplete);
            assert_eq!(*iterations, 2);
        }
        other => panic!("expected a report, got {:?}", other),
    }

    assert_eq!(session.research_brief(), Some(BRIEF));
    assert_eq!(
        session.notes(),
        &[
            "findings for solar efficiency".to_string(),
            "Reflection recorded: compare like for like".to_string(),
            "findings for wind efficiency".to_string(),
        ]
    );
    assert_eq!(
        session.raw_notes(),
        &[
            "raw for solar efficiency".to_string(),
            "raw for wind efficiency".to_string()
        ]
    );
    assert_eq!(
        session.final_report(),
        Some("# Solar vs Wind\n\nWind wins on capacity factor.")
    );

    let messages = session.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(
        messages[1],
        Message::ai("Starting research on solar and wind efficiency.", vec![])
    );
    assert_eq!(
        messages[2],
        Message::ai("# Solar vs Wind\n\nWind wins on capacity factor.", vec![])
    );

    // The supervisor starts from the brief alone.
    let first = &s.supervisor_model.requests()[0];
    assert_eq!(first.messages[1], Message::human(BRIEF));

    // The writer sees the brief and every note.
    let report_request = &s.writer.requests()[0];
    let prompt = report_request.messages[0].content();
    assert!(prompt.contains(BRIEF));
    assert!(prompt.contains("findings for solar efficiency"));
    assert!(prompt.contains("Reflection recorded: compare like for like"));
    assert!(prompt.contains("findings for wind efficiency"));

    assert_eq!(s.research.remaining(), 0);
}

#[tokio::test]
async fn test_clarification_can_be_disabled() {
    let s = session(
        vec![brief()],
        vec![Reply::final_turn("nothing to delegate")],
        vec![Reply::Text("short report".to_string())],
        false,
    );

    let (session, outcome) = s.coordinator.research(QUERY).await.unwrap();

    assert!(matches!(
        outcome,
        SessionOutcome::Completed {
            end: PhaseEnd::NoToolCalls,
            iterations: 1,
            ..
        }
    ));
    assert_eq!(s.research.requests().len(), 1);
    assert!(session.notes().is_empty());
    assert_eq!(session.final_report(), Some("short report"));
}

#[tokio::test]
async fn test_resumed_session_sees_earlier_answer() {
    let s = session(
        vec![no_clarification(), brief()],
        vec![Reply::final_turn("done")],
        vec![Reply::Text("report".to_string())],
        true,
    );

    let mut session = ResearchSession::with_messages(vec![
        Message::human(QUERY),
        Message::ai("Residential or utility-scale?", vec![]),
        Message::human("Utility-scale, onshore wind only."),
    ]);
    s.coordinator.run(&mut session).await.unwrap();

    let clarify_prompt = s.research.requests()[0].messages[0].content().to_string();
    assert!(clarify_prompt.contains("Utility-scale, onshore wind only."));
    assert!(clarify_prompt.contains("Residential or utility-scale?"));
}

#[tokio::test]
async fn test_report_written_after_phase_fault() {
    let s = session(
        vec![brief()],
        vec![
            Reply::tools(vec![conduct("c1", "solar efficiency")]),
            Reply::Fail("supervisor model timed out".to_string()),
        ],
        vec![Reply::Text("partial report".to_string())],
        false,
    );

    let (session, outcome) = s.coordinator.research(QUERY).await.unwrap();

    match outcome {
        SessionOutcome::Completed { end, report, .. } => {
            assert!(matches!(end, PhaseEnd::Fault(ref msg) if msg.contains("timed out")));
            assert_eq!(report, "partial report");
        }
        other => panic!("expected a report, got {:?}", other),
    }
    assert_eq!(session.notes(), &["findings for solar efficiency".to_string()]);
}

#[tokio::test]
async fn test_brief_failure_fails_session() {
    let s = session(
        vec![Reply::Fail("structured output rejected".to_string())],
        vec![],
        vec![],
        false,
    );

    let err = s.coordinator.research(QUERY).await.unwrap_err();
    assert!(err.to_string().contains("structured output rejected"));
    assert!(s.supervisor_model.requests().is_empty());
}

#[tokio::test]
async fn test_report_failure_fails_session() {
    let s = session(
        vec![brief()],
        vec![Reply::final_turn("done")],
        vec![Reply::Fail("writer offline".to_string())],
        false,
    );

    let err = s.coordinator.research(QUERY).await.unwrap_err();
    assert!(err.to_string().contains("writer offline"));
}
