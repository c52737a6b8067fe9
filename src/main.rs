//! MemoryThing - personalized memorial object suggester
//!
//! Collects a short memory of someone, asks a Gemini model for small symbolic
//! objects that could be 3D printed, and matches the chosen idea against a
//! tagged library of STL files. Ideas without a suitable model can be logged
//! for custom creation.
//!
//! # Files
//! - `suggestion_to_stl.json`: asset file name to `{"tags": [...]}`
//! - `stl/`: the downloadable models
//! - `custom_suggestions.txt`: append-only request log
//!
//! # Environment
//! `GEMINI_API_KEY` for idea generation, `MEMORYTHING_*` for paths and model,
//! `RUST_LOG` for diagnostics on stderr.

mod assets;
mod config;
mod error;
mod form;
mod ideas;
mod matching;
mod session;
mod suggest;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::assets::AssetStore;
use crate::config::Settings;
use crate::error::{MemoryError, Result};
use crate::form::Form;
use crate::ideas::extract_ideas;
use crate::matching::{match_assets, TagIndex};
use crate::session::{Disposition, RequestLog, SessionContext};
use crate::suggest::{build_prompt, GeminiClient, SuggestionSource};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "memorything", version, about = "Create a small, symbolic object in memory of someone special")]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Overrides for the `MEMORYTHING_*` settings
#[derive(Args, Debug, Default)]
struct PathArgs {
    /// Tag index JSON file
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Folder holding the STL files
    #[arg(long, global = true)]
    stl_dir: Option<PathBuf>,

    /// Custom request log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Gemini model name
    #[arg(long, global = true)]
    model: Option<String>,
}

/// The memory form fields
#[derive(Args, Debug)]
struct FormArgs {
    /// Your name
    #[arg(long, default_value = "")]
    name: String,

    /// Who you are remembering
    #[arg(long)]
    relationship: String,

    /// What made them special
    #[arg(long)]
    memory: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through the form interactively (default)
    Session,

    /// Generate ideas for a memory and print them
    Suggest {
        #[command(flatten)]
        form: FormArgs,

        #[arg(long)]
        json: bool,
    },

    /// Extract ideas from text on stdin
    Ideas {
        #[arg(long)]
        json: bool,
    },

    /// List library models matching an idea
    Match {
        idea: String,

        #[arg(long)]
        json: bool,
    },

    /// Copy a library model to the download folder
    Download {
        asset: String,

        /// Destination folder (defaults to your Downloads folder)
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// Log an idea for custom STL creation
    Request {
        #[command(flatten)]
        form: FormArgs,

        #[arg(long)]
        idea: String,

        #[arg(long, value_enum)]
        disposition: Disposition,
    },
}

// ============================================================================
// Output Types
// ============================================================================

#[derive(Debug, Serialize)]
struct IdeasOutput<'a> {
    ideas: &'a [String],
}

#[derive(Debug, Serialize)]
struct MatchOutput<'a> {
    idea: &'a str,
    matches: &'a [String],
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    config::load_dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = resolve_settings(cli.paths);
    debug!("Settings: {:?}", redact(&settings));

    match cli.command.unwrap_or(Command::Session) {
        Command::Session => run_session(&settings),
        Command::Suggest { form, json } => run_suggest(&settings, &form, json),
        Command::Ideas { json } => run_ideas(json),
        Command::Match { idea, json } => run_match(&settings, &idea, json),
        Command::Download { asset, dest } => run_download(&settings, &asset, dest),
        Command::Request {
            form,
            idea,
            disposition,
        } => run_request(&settings, &form, &idea, disposition),
    }
}

fn resolve_settings(paths: PathArgs) -> Settings {
    let mut settings = Settings::from_env();
    if let Some(index) = paths.index {
        settings.index_path = index;
    }
    if let Some(stl_dir) = paths.stl_dir {
        settings.stl_dir = stl_dir;
    }
    if let Some(log_file) = paths.log_file {
        settings.request_log = log_file;
    }
    if let Some(model) = paths.model {
        settings.model = model;
    }
    settings
}

fn redact(settings: &Settings) -> Settings {
    let mut shown = settings.clone();
    shown.api_key = shown.api_key.map(|_| "***".to_string());
    shown
}

// ============================================================================
// Commands
// ============================================================================

fn run_session(settings: &Settings) -> Result<()> {
    let client = GeminiClient::from_settings(settings)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut form = Form::new(stdin.lock(), stdout.lock(), settings, &client);
    let outcome = form.run()?;

    info!(
        "Session finished: {} match(es), {} download(s), logged: {:?}",
        outcome.matches.len(),
        outcome.downloaded.len(),
        outcome.logged.map(|d| d.as_str())
    );
    Ok(())
}

fn run_suggest(settings: &Settings, form: &FormArgs, json: bool) -> Result<()> {
    let mut context = SessionContext::default();
    context.record_memory(&form.name, &form.relationship, &form.memory)?;

    let client = GeminiClient::from_settings(settings)?;
    let raw = client.generate(&build_prompt(&context.relationship, &context.memory))?;
    context.record_suggestions(&raw);
    debug!("Raw suggestions: {}", context.suggestions);

    print_ideas(&context.ideas, json)
}

fn run_ideas(json: bool) -> Result<()> {
    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;
    print_ideas(&extract_ideas(&raw), json)
}

fn print_ideas(ideas: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&IdeasOutput { ideas })?);
        return Ok(());
    }

    println!("{}", "✨ Suggestions:".bold());
    for (i, idea) in ideas.iter().enumerate() {
        println!("  {}. {}", i + 1, idea);
    }
    Ok(())
}

fn run_match(settings: &Settings, idea: &str, json: bool) -> Result<()> {
    let index = TagIndex::load(&settings.index_path)?;
    if index.is_empty() {
        warn!("Tag index {:?} has no assets", settings.index_path);
    }
    let matches = match_assets(idea, &index);
    info!("{} match(es) for {:?}", matches.len(), idea);

    if json {
        println!(
            "{}",
            serde_json::to_string(&MatchOutput {
                idea,
                matches: &matches
            })?
        );
        return Ok(());
    }

    if matches.is_empty() {
        println!("{}", "No matching STL files found for this idea.".yellow());
    } else {
        println!("{}", "Matching 3D model(s) found:".green());
        for asset in &matches {
            println!("  • {}", asset);
        }
    }
    Ok(())
}

fn run_download(settings: &Settings, asset: &str, dest: Option<PathBuf>) -> Result<()> {
    let index = TagIndex::load(&settings.index_path)?;
    let dest = dest.unwrap_or_else(|| settings.download_dir.clone());
    let target = AssetStore::new(&settings.stl_dir).download(&index, asset, &dest)?;
    println!("{} {}", "Saved".green(), target.display());
    Ok(())
}

fn run_request(
    settings: &Settings,
    form: &FormArgs,
    idea: &str,
    disposition: Disposition,
) -> Result<()> {
    let mut context = SessionContext::default();
    context.record_memory(&form.name, &form.relationship, &form.memory)?;

    let log = RequestLog::new(&settings.request_log);
    log.append(&context, idea, disposition)?;
    println!(
        "{} {}",
        "Submitted. Thank you!".green(),
        format!("({})", log.path().display()).dimmed()
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
