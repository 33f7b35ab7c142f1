//! Init command implementation
//!
//! Scaffolds `research.toml`, `.env.example` and `.gitignore` for a new project.

use super::output::Output;
use std::fs;
use std::path::Path;

/// Result of the init operation
#[derive(Debug, PartialEq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (research.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: std::path::PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// LLM provider to configure (ollama, openai, or both)
    pub provider: String,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.title();
    output.section("Initializing A.R.E.S Deep Research");

    let base_path = &config.path;

    let config_path = base_path.join("research.toml");
    if config_path.exists() && !config.force {
        output.caution("research.toml already exists!");
        output.tip("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.failure(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    output.group("Creating configuration files");

    let toml_content = generate_research_toml(&config);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.failure(&format!("Failed to create research.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.wrote("config", "research.toml");

    let env_example_path = base_path.join(".env.example");
    if env_example_path.exists() && !config.force {
        output.kept(".env.example", "already exists");
    } else {
        let env_content = generate_env_example();
        if let Err(e) = write_file(&env_example_path, &env_content, config.force) {
            output.failure(&format!("Failed to create .env.example: {}", e));
            return InitResult::Error(e.to_string());
        }
        output.wrote("env", ".env.example");
    }

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        if let Err(e) = write_file(&gitignore_path, &generate_gitignore(), false) {
            output.caution(&format!("Failed to create .gitignore: {}", e));
        } else {
            output.wrote("file", ".gitignore");
        }
    }

    output.done("Project initialized");

    output.section("Next Steps");
    output.note("1. Set up environment variables:");
    output.shell("cp .env.example .env");
    if config.provider != "ollama" {
        output.shell("# Edit .env and set OPENAI_API_KEY");
    }

    if config.provider != "openai" {
        output.note("2. Start Ollama (if not running):");
        output.shell("ollama serve");
        output.shell("ollama pull qwen2.5  # any model with tool calling");
    }

    output.note("3. Run a research task:");
    output.shell("ares-research run \"What changed in EU battery regulation in 2025?\"");

    output.tip("Switch to Tavily search by setting [search] backend = \"tavily\"");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(()); // Skip existing files unless force is true
    }
    fs::write(path, content)
}

fn generate_research_toml(config: &InitConfig) -> String {
    let ollama_section = r#"# Ollama - Local inference (no API key required)
[providers.ollama-local]
type = "ollama"
base_url = "http://localhost:11434"
default_model = "qwen2.5"
"#;
    let openai_section = r#"# OpenAI API (set OPENAI_API_KEY in .env)
[providers.openai]
type = "openai"
api_key_env = "OPENAI_API_KEY"
api_base = "https://api.openai.com/v1"
default_model = "gpt-4o-mini"
"#;

    let provider_section = match config.provider.as_str() {
        "openai" => openai_section.to_string(),
        "both" => format!("{}\n{}", ollama_section, openai_section),
        _ => ollama_section.to_string(),
    };

    // gpt-4o-mini caps replies at 16384 tokens; the compression ceiling must fit under it
    let (model_provider, model_name, model_limit, writer_name) = if config.provider == "openai" {
        ("openai", "gpt-4o-mini", "max_tokens = 16384\n", "gpt-4o")
    } else {
        ("ollama-local", "qwen2.5", "", "qwen2.5")
    };

    format!(
        r#"# A.R.E.S Deep Research Configuration
# ====================================
# Generated by: ares-research init

[logging]
level = "info"
format = "pretty"

# =============================================================================
# LLM Providers
# =============================================================================
{provider_section}
# =============================================================================
# Models
# =============================================================================
[models.default]
provider = "{model_provider}"
model = "{model_name}"
temperature = 0.0
{model_limit}
[models.writer]
provider = "{model_provider}"
model = "{writer_name}"
temperature = 0.2
max_tokens = 8192

# =============================================================================
# Web Search
# =============================================================================
[search]
backend = "duckduckgo"          # or "tavily" (set api_key_env)
# api_key_env = "TAVILY_API_KEY"
max_results = 3
topic = "general"               # general | news | finance

# =============================================================================
# Research
# =============================================================================
[research]
max_concurrent_research_units = 3
max_researcher_iterations = 6
allow_clarification = true
compression_max_tokens = 8192
summarization_max_chars = 1000
research_model = "default"
summarization_model = "default"
compression_model = "default"
final_report_model = "writer"
"#
    )
}

fn generate_env_example() -> String {
    r#"# A.R.E.S Deep Research Environment Variables
# ============================================
# Copy this file to .env and fill in the values.

# Optional: Logging level (trace, debug, info, warn, error)
RUST_LOG=info,ares_research=debug

# Optional: OpenAI API key (if using the OpenAI provider)
# OPENAI_API_KEY=sk-...

# Optional: Tavily API key (if using the Tavily search backend)
# TAVILY_API_KEY=tvly-...
"#
    .to_string()
}

fn generate_gitignore() -> String {
    r#"# Environment
.env
.env.local
.env.*.local

# Reports
*.report.md

# OS
.DS_Store
Thumbs.db
"#
    .to_string()
}
