//! DebateCast CLI - scripted moderator debate tool
//!
//! Runs one moderator + two debater episode against the configured providers
//! and saves the transcript to disk.

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use debatecast_core::config::{Config, default_config};
use debatecast_core::sink::{FileSink, TranscriptSink};
use debatecast_core::{
    DebateConfig, DebateEvent, DebateOrchestrator, ProviderSettings, ScriptedSchedule,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Role files picked up from the working directory when `--roles` is absent.
const DEFAULT_ROLE_FILES: [&str; 2] = ["roles.toml", "roles.json"];

#[derive(Parser, Debug)]
#[command(
    name = "debatecast",
    version,
    about = "Generate a moderated two-sided debate transcript",
    long_about = "Runs a scripted debate (moderator opening, two opening statements, \
question/answer rounds and a moderator closing) using OpenAI and Gemini, \
then writes transcript.json and transcript.md."
)]
struct Cli {
    /// The topic to debate
    #[arg(value_name = "TOPIC")]
    topic: String,

    /// Number of question/answer rounds
    #[arg(short, long, default_value_t = 1, value_name = "ROUNDS")]
    rounds: u32,

    /// Directory the transcript files are written to
    #[arg(short, long, default_value = "episodes/latest", value_name = "DIR")]
    out: PathBuf,

    /// Model used for roles bound to OpenAI
    #[arg(long, default_value = "gpt-4.1-mini", value_name = "MODEL")]
    openai_model: String,

    /// Model used for roles bound to Gemini
    #[arg(long, default_value = "gemini-2.5-flash", value_name = "MODEL")]
    gemini_model: String,

    /// Role definitions (TOML or JSON)
    #[arg(long, value_name = "FILE")]
    roles: Option<PathBuf>,

    /// Language every speaker must answer in (overrides the role file)
    #[arg(long, value_name = "LANGUAGE")]
    language: Option<String>,

    /// Extra rule applied to every turn
    #[arg(long, value_name = "TEXT")]
    extra_directive: Option<String>,

    /// Per-call provider timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Explicit `--roles` wins; otherwise the first default file that exists; otherwise
/// the embedded roles.
fn load_roles(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path)
            .with_context(|| format!("Failed to load roles from {}", path.display()));
    }

    match DEFAULT_ROLE_FILES.iter().map(Path::new).find(|p| p.is_file()) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading roles");
            Ok(Config::load(path)?)
        }
        None => {
            tracing::info!("no role file found, using built-in roles");
            Ok(default_config())
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = ProviderSettings::from_env()?;
    settings.openai_model = cli.openai_model.clone();
    settings.gemini_model = cli.gemini_model.clone();
    if let Some(secs) = cli.timeout_secs {
        settings.timeout = Duration::from_secs(secs);
    }
    let providers = settings.build_registry()?;

    let file_config = load_roles(cli.roles.as_deref())?;
    let roles = file_config.role_registry();
    let language = cli
        .language
        .clone()
        .unwrap_or_else(|| file_config.prompt.language.clone());

    let mut config = DebateConfig::new(&cli.topic, cli.rounds).with_language(language);
    if let Some(extra) = &cli.extra_directive {
        config = config.with_extra_directive(extra);
    }

    let schedule = ScriptedSchedule::new(&config, &roles)?;
    let display_names: HashMap<String, String> = roles
        .iter()
        .map(|role| (role.id.clone(), role.display_name.clone()))
        .collect();

    // Print header
    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!("{}", "  DebateCast - Moderated Debate".bright_blue().bold());
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    println!("{} {}", "Topic:".bold(), cli.topic.bright_white());
    println!("{} {}", "Rounds:".bold(), cli.rounds);
    println!(
        "{} {} / {}",
        "Models:".bold(),
        settings.openai_model.dimmed(),
        settings.gemini_model.dimmed()
    );
    println!("{}", "─".repeat(70).dimmed());

    let mut orchestrator = DebateOrchestrator::new(config, Box::new(schedule), &providers)?
        .with_callback(create_console_callback(display_names));

    let transcript = orchestrator.run().await?;

    let sink = FileSink::new(&cli.out);
    sink.write(&transcript)?;

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!("  Transcript saved → {}", sink.markdown_path().display())
            .bright_green()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();

    Ok(())
}

/// Panel title for a turn, e.g. "MOD – Opening (Moderator)". The display name
/// is left out when it just repeats the role id.
fn panel_title(label: &str, speaker: &str, display_names: &HashMap<String, String>) -> String {
    match display_names.get(speaker) {
        Some(display) if display != speaker => format!("{} ({})", label, display),
        _ => label.to_string(),
    }
}

/// Create a callback that prints debate events to the console.
fn create_console_callback(
    display_names: HashMap<String, String>,
) -> Box<dyn Fn(DebateEvent) + Send + Sync> {
    Box::new(move |event| match event {
        DebateEvent::TurnStart { label, speaker } => {
            let title = panel_title(&label, &speaker, &display_names);
            println!();
            println!("{} {}", "▶".bright_cyan(), title.bright_cyan().bold());
        }
        DebateEvent::TurnComplete { text, .. } => {
            if text.is_empty() {
                println!("  {}", "(no text)".dimmed());
            }
            for line in textwrap(&text, 66).lines() {
                println!("  {}", line);
            }
        }
        DebateEvent::DebateEnd => {
            // Handled in run
        }
    })
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_line_len + word_len + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word_len;
    }

    result
}
