//! Terminal presentation for the research CLI
//!
//! Everything except the report itself is decorated; `--no-color` swaps the
//! glyphs for bracketed tags so logs and CI output stay greppable.

use crate::research::supervisor::PhaseEnd;
use owo_colors::OwoColorize;

/// Status marker in front of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Done,
    Note,
    Caution,
    Failure,
    Wrote,
    Kept,
}

impl Mark {
    fn tag(self) -> &'static str {
        match self {
            Mark::Done => "[OK]",
            Mark::Note => "[INFO]",
            Mark::Caution => "[WARN]",
            Mark::Failure => "[ERROR]",
            Mark::Wrote => "[CREATED]",
            Mark::Kept => "[SKIPPED]",
        }
    }

    fn glyph(self) -> String {
        match self {
            Mark::Done | Mark::Wrote => "✓".green().bold().to_string(),
            Mark::Note => "•".blue().to_string(),
            Mark::Caution => "⚠".yellow().bold().to_string(),
            Mark::Failure => "✗".red().bold().to_string(),
            Mark::Kept => "○".yellow().to_string(),
        }
    }
}

/// One-line description of how the supervisor phase ended
pub fn phase_summary(end: &PhaseEnd) -> String {
    match end {
        PhaseEnd::ResearchComplete => "supervisor marked the research complete".to_string(),
        PhaseEnd::NoToolCalls => "supervisor stopped delegating".to_string(),
        PhaseEnd::IterationLimit => "iteration limit reached before completion".to_string(),
        PhaseEnd::Fault(reason) => format!("research ended early: {}", reason),
    }
}

/// Terminal writer for the research CLI
pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    fn status_line(&self, mark: Mark, text: &str) -> String {
        if !self.colored {
            return format!("  {} {}", mark.tag(), text);
        }
        let text = match mark {
            Mark::Done => text.green().to_string(),
            Mark::Caution => text.yellow().to_string(),
            Mark::Failure => text.red().to_string(),
            Mark::Wrote => text.bright_white().to_string(),
            Mark::Kept => text.dimmed().to_string(),
            Mark::Note => text.to_string(),
        };
        format!("  {} {}", mark.glyph(), text)
    }

    fn section_line(&self, title: &str) -> String {
        if self.colored {
            format!("\n  {}", title.bright_white().bold().underline())
        } else {
            format!("\n  === {} ===", title)
        }
    }

    fn group_line(&self, title: &str) -> String {
        if self.colored {
            format!("\n  {}", title.cyan().bold())
        } else {
            format!("\n  --- {} ---", title)
        }
    }

    fn field_line(&self, key: &str, value: &str) -> String {
        if self.colored {
            format!("    {}: {}", key.dimmed(), value.bright_white())
        } else {
            format!("    {}: {}", key, value)
        }
    }

    /// Tool name and version, shown by `init`
    pub fn title(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n  {} {}",
                "A.R.E.S Deep Research".bright_cyan().bold(),
                version.dimmed()
            );
        } else {
            println!("\n  A.R.E.S Deep Research {}", version);
        }
    }

    pub fn section(&self, title: &str) {
        println!("{}", self.section_line(title));
    }

    pub fn group(&self, title: &str) {
        println!("{}", self.group_line(title));
    }

    pub fn field(&self, key: &str, value: &str) {
        println!("{}", self.field_line(key, value));
    }

    pub fn entry(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    pub fn done(&self, message: &str) {
        println!("{}", self.status_line(Mark::Done, message));
    }

    pub fn note(&self, message: &str) {
        println!("{}", self.status_line(Mark::Note, message));
    }

    pub fn caution(&self, message: &str) {
        println!("{}", self.status_line(Mark::Caution, message));
    }

    /// Errors go to stderr so a piped report stays clean
    pub fn failure(&self, message: &str) {
        eprintln!("{}", self.status_line(Mark::Failure, message));
    }

    pub fn wrote(&self, kind: &str, path: &str) {
        println!("{}", self.status_line(Mark::Wrote, &format!("{} {}", kind, path)));
    }

    pub fn kept(&self, path: &str, reason: &str) {
        println!(
            "{}",
            self.status_line(Mark::Kept, &format!("{} ({})", path, reason))
        );
    }

    /// Shell command the user is expected to run next
    pub fn shell(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    pub fn tip(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// The model wants more detail before researching
    pub fn clarification(&self, question: &str) {
        self.section("Clarification needed");
        if self.colored {
            println!("\n  {} {}", "?".bright_yellow().bold(), question.bright_white());
        } else {
            println!("\n  [?] {}", question);
        }
        self.tip("Re-run with a more detailed question, or pass --no-clarify");
    }

    /// The finished report, undecorated so it can be piped
    pub fn report(&self, markdown: &str) {
        println!("\n{}\n", markdown.trim_end());
    }

    /// Closing lines after a report: how the phase ended and what it produced
    pub fn run_summary(&self, end: &PhaseEnd, iterations: usize, notes: usize, session: &str) {
        let summary = phase_summary(end);
        match end {
            PhaseEnd::ResearchComplete | PhaseEnd::NoToolCalls => self.done(&summary),
            PhaseEnd::IterationLimit | PhaseEnd::Fault(_) => self.caution(&summary),
        }
        self.field("session", session);
        self.field("supervisor iterations", &iterations.to_string());
        self.field("notes", &notes.to_string());
    }
}
