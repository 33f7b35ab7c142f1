use anyhow::Context;
use ares_research::{
    cli::{
        init::{self, InitConfig, InitResult},
        output::Output,
        Cli, Commands,
    },
    create_search_client,
    utils::toml_config::{LogFormat, ProviderConfig, ResearchConfig},
    ProviderRegistry, ResearchCoordinator, SessionOutcome,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(cli, &output).await {
        output.failure(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init {
            path,
            force,
            provider,
        } => match init::run(
            InitConfig {
                path,
                force,
                provider,
            },
            output,
        ) {
            InitResult::Success => Ok(()),
            InitResult::AlreadyExists => anyhow::bail!("research.toml already exists"),
            InitResult::Error(e) => anyhow::bail!("init failed: {}", e),
        },

        Commands::Config { validate } => show_config(&cli.config, validate, output),

        Commands::Run {
            query,
            no_clarify,
            output: report_path,
            max_iterations,
            max_concurrent,
        } => {
            let mut config = ResearchConfig::read(&cli.config)
                .with_context(|| format!("failed to load {}", cli.config.display()))?;

            if no_clarify {
                config.research.allow_clarification = false;
            }
            if let Some(n) = max_iterations {
                config.research.max_researcher_iterations = n as usize;
            }
            if let Some(n) = max_concurrent {
                config.research.max_concurrent_research_units = n as usize;
            }
            config.validate().context("invalid configuration")?;

            init_tracing(
                &config.logging.level,
                cli.log_format.unwrap_or(config.logging.format),
                cli.verbose,
            );

            run_research(&config, &query, report_path, output).await
        }
    }
}

fn init_tracing(level: &str, format: LogFormat, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    // Logs go to stderr; stdout carries the report.
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run_research(
    config: &ResearchConfig,
    query: &str,
    report_path: Option<PathBuf>,
    output: &Output,
) -> anyhow::Result<()> {
    let registry = ProviderRegistry::from_config(config);
    let clients = registry.role_clients(config)?;
    let search = create_search_client(&config.search)?;

    tracing::info!(
        research_model = clients.research.model_name(),
        search = search.name(),
        "Starting research session"
    );

    let coordinator = ResearchCoordinator::from_config(config, clients, search);
    let (session, outcome) = coordinator.research(query).await?;

    match outcome {
        SessionOutcome::NeedsClarification { question } => output.clarification(&question),
        SessionOutcome::Completed {
            report,
            end,
            iterations,
        } => {
            output.report(&report);

            if let Some(path) = report_path {
                std::fs::write(&path, &report)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                output.wrote("report", &path.display().to_string());
            }

            output.run_summary(
                &end,
                iterations,
                session.notes().len(),
                &session.id.to_string(),
            );
        }
    }

    Ok(())
}

fn show_config(path: &Path, validate: bool, output: &Output) -> anyhow::Result<()> {
    let config = ResearchConfig::read(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    output.section("Configuration");
    output.field("file", &path.display().to_string());
    output.field("log level", &config.logging.level);

    output.group("Providers");
    let mut providers: Vec<_> = config.providers.iter().collect();
    providers.sort_by(|a, b| a.0.cmp(b.0));
    for (name, provider) in providers {
        let description = match provider {
            ProviderConfig::Ollama { base_url, .. } => format!("{} (ollama, {})", name, base_url),
            ProviderConfig::OpenAI {
                api_base,
                api_key_env,
                ..
            } => format!("{} (openai, {}, key from ${})", name, api_base, api_key_env),
        };
        output.entry(&description);
    }

    output.group("Models");
    let mut models: Vec<_> = config.models.iter().collect();
    models.sort_by(|a, b| a.0.cmp(b.0));
    for (name, model) in models {
        output.entry(&format!("{} -> {}/{}", name, model.provider, model.model));
    }

    output.group("Research");
    for (role, model) in config.research.model_roles() {
        output.field(role, model);
    }
    output.field(
        "max_researcher_iterations",
        &config.research.max_researcher_iterations.to_string(),
    );
    output.field(
        "max_concurrent_research_units",
        &config.research.max_concurrent_research_units.to_string(),
    );
    output.field(
        "allow_clarification",
        &config.research.allow_clarification.to_string(),
    );

    output.group("Search");
    output.field("backend", &format!("{:?}", config.search.backend).to_lowercase());
    output.field("max_results", &config.search.max_results.to_string());
    output.field("topic", config.search.topic.as_str());

    if validate {
        config.validate().context("configuration is invalid")?;
        output.done("Configuration is valid");
    }

    Ok(())
}
