//! Multi-Agent Deep Research
//!
//! This module coordinates a research task by splitting it into independent
//! sub-topics, researching each one in isolation, and merging what comes back into
//! one set of notes for the final report.
//!
//! # Architecture
//!
//! - [`coordinator::ResearchCoordinator`] - Clarify, write the brief, research, report
//! - [`supervisor::Supervisor`] - Decides what to delegate; fans out and waits for all
//! - [`researcher::Researcher`] - One sub-topic: search, reflect, compress
//! - [`notes`] - Dedupe, summarize and format search results; harvest tool results
//!
//! # Usage
//!
//! ```ignore
//! use ares_research::research::coordinator::{ResearchCoordinator, SessionOutcome};
//!
//! let coordinator = ResearchCoordinator::from_config(&config, clients, search);
//! let (session, outcome) = coordinator
//!     .research("What are the latest developments in quantum computing?")
//!     .await?;
//!
//! if let SessionOutcome::Completed { report, .. } = outcome {
//!     println!("{}", report);
//! }
//! ```

/// Session orchestration.
pub mod coordinator;
/// Search result processing and note harvesting.
pub mod notes;
/// Instruction text.
pub mod prompts;
/// Worker loop.
pub mod researcher;
/// Session state.
pub mod session;
/// Supervisor loop.
pub mod supervisor;

pub use coordinator::{ResearchCoordinator, SessionOutcome};
pub use researcher::{ResearchOutcome, ResearchWorker, Researcher, WorkerTask};
pub use session::ResearchSession;
pub use supervisor::{PhaseEnd, Supervisor, SupervisorConfig, SupervisorOutcome};
