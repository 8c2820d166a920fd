//! tododesk - task list with LLM-assisted task parsing
//!
//! CLI entry point: serve the HTTP API or run the parser from the shell.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use taskstore::TaskStore;
use tracing::{debug, info};

use tododesk::cli::{Cli, Command, generate_after_help};
use tododesk::config::Config;
use tododesk::llm::create_client;
use tododesk::parser::TaskParser;
use tododesk::prompts::PromptLoader;
use tododesk::server::{self, AppState, CookieSettings};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tododesk")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("tododesk.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "tododesk loaded config");

    let parser = build_parser(&config)?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Serve { bind, port } => cmd_serve(config, parser, bind, port).await,
        Command::Parse { text } => cmd_parse(&parser, &text.join(" ")).await,
        Command::TestAi => cmd_test_ai(&parser).await,
    }
}

fn build_parser(config: &Config) -> Result<Arc<TaskParser>> {
    debug!("build_parser: called");
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let prompts = PromptLoader::new(config.prompts.dir.as_deref());
    Ok(Arc::new(TaskParser::new(llm, prompts, &config.llm)))
}

async fn cmd_serve(config: Config, parser: Arc<TaskParser>, bind: Option<String>, port: Option<u16>) -> Result<()> {
    debug!(?bind, ?port, "cmd_serve: called");
    let mut server_config = config.server.clone();
    if let Some(bind) = bind {
        server_config.bind = bind;
    }
    if let Some(port) = port {
        server_config.port = port;
    }
    let addr = server_config.socket_addr()?;

    let store = TaskStore::open(&config.storage.db_path).context("Failed to open task store")?;
    let state = AppState {
        store,
        parser,
        provider: config.llm.provider.clone(),
        cookies: Arc::new(CookieSettings::from_config(&server_config)),
    };

    println!("tododesk listening on http://{}", addr);
    server::run(addr, state).await
}

async fn cmd_parse(parser: &TaskParser, text: &str) -> Result<()> {
    debug!(%text, "cmd_parse: called");
    let text = text.trim();
    if text.is_empty() {
        eyre::bail!("Input is required");
    }
    let task = parser.parse_task(text).await;
    println!("{}", serde_json::to_string_pretty(&task)?);
    Ok(())
}

async fn cmd_test_ai(parser: &TaskParser) -> Result<()> {
    debug!("cmd_test_ai: called");
    let (ok, message) = parser.test_connection().await;
    if ok {
        println!("{} {}", "✓".green(), message);
        Ok(())
    } else {
        println!("{} {}", "✗".red(), message);
        std::process::exit(1);
    }
}
