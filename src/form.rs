//! Interactive memory form
//!
//! Walks one person through the whole flow on a line-based terminal: collect
//! the memory, generate ideas, pick one (or write one), download any matching
//! models, and optionally log a request for a custom model.

use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::assets::AssetStore;
use crate::config::Settings;
use crate::error::{MemoryError, Result};
use crate::matching::{match_assets, TagIndex};
use crate::session::{Disposition, RequestLog, SessionContext};
use crate::suggest::{build_prompt, SuggestionSource};

/// Label of the extra choice for writing an idea by hand
pub const OWN_IDEA_OPTION: &str = "🔧 None of these – I'll suggest my own";

/// What happened during one pass through the form
#[derive(Debug, Default)]
pub struct SessionOutcome {
    pub context: SessionContext,
    pub matches: Vec<String>,
    pub downloaded: Vec<PathBuf>,
    pub logged: Option<Disposition>,
}

pub struct Form<'a, R, W> {
    input: R,
    output: W,
    settings: &'a Settings,
    source: &'a dyn SuggestionSource,
}

impl<'a, R: BufRead, W: Write> Form<'a, R, W> {
    pub fn new(input: R, output: W, settings: &'a Settings, source: &'a dyn SuggestionSource) -> Self {
        Self {
            input,
            output,
            settings,
            source,
        }
    }

    pub fn run(&mut self) -> Result<SessionOutcome> {
        let mut outcome = SessionOutcome::default();

        writeln!(self.output, "{}", "🕊️ MemoryThing – Personalized Memorial Object".bold())?;
        writeln!(self.output, "Create a small, symbolic object in memory of someone special.\n")?;

        let name = self.ask("Your name")?.unwrap_or_default();
        let relationship = self.ask_required("Who are you remembering? (e.g., My Grandmother)", "relationship")?;
        let memory = self.ask_required(
            "What made them special? (e.g., She loved sunflowers and baking pies)",
            "memory",
        )?;
        outcome.context.record_memory(&name, &relationship, &memory)?;

        writeln!(self.output, "{}", "Generating suggestions...".dimmed())?;
        let prompt = build_prompt(&outcome.context.relationship, &outcome.context.memory);
        let raw = self.source.generate(&prompt)?;
        outcome.context.record_suggestions(&raw);

        let choice = self.choose_idea(&outcome.context.ideas)?;
        let log = RequestLog::new(&self.settings.request_log);

        let Some(idea) = choice else {
            let custom = self.ask_custom_idea()?;
            log.append(&outcome.context, &custom, Disposition::Custom)?;
            writeln!(self.output, "{}", "Your idea has been saved. Thank you!".green())?;
            outcome.logged = Some(Disposition::Custom);
            return Ok(outcome);
        };

        outcome.context.select(&idea);
        let index = TagIndex::load(&self.settings.index_path)?;
        outcome.matches = match_assets(&idea, &index);

        let disposition = if outcome.matches.is_empty() {
            writeln!(self.output, "{}", "No matching STL files found for this idea.".yellow())?;
            Disposition::NoMatch
        } else {
            writeln!(self.output, "{}", "Matching 3D model(s) found:".green())?;
            for asset in &outcome.matches {
                writeln!(self.output, "  • {}", asset)?;
            }
            outcome.downloaded = self.offer_downloads(&index, &outcome.matches)?;
            writeln!(self.output, "Would you like a custom version of this idea?")?;
            Disposition::ExistingMatch
        };

        if self.confirm("Submit this idea for custom STL creation?")? {
            log.append(&outcome.context, &idea, disposition)?;
            let thanks = match disposition {
                Disposition::ExistingMatch => "Submitted for custom version. Thank you!",
                _ => "Submitted for STL creation. Thank you!",
            };
            writeln!(self.output, "{}", thanks.green())?;
            outcome.logged = Some(disposition);
        }

        Ok(outcome)
    }

    /// `Some(idea)` for a generated idea, `None` for the write-your-own choice
    fn choose_idea(&mut self, ideas: &[String]) -> Result<Option<String>> {
        writeln!(self.output, "\n{}", "✨ Suggestions:".bold())?;
        for (i, idea) in ideas.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, idea)?;
        }
        writeln!(self.output, "  {}. {}", ideas.len() + 1, OWN_IDEA_OPTION)?;

        loop {
            let Some(answer) = self.ask("Choose an idea")? else {
                return Err(MemoryError::NoChoice);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=ideas.len()).contains(&n) => return Ok(Some(ideas[n - 1].clone())),
                Ok(n) if n == ideas.len() + 1 => return Ok(None),
                _ => {
                    debug!("Rejected choice {:?}", answer);
                    writeln!(self.output, "{}", "Please enter one of the listed numbers.".red())?;
                }
            }
        }
    }

    fn ask_custom_idea(&mut self) -> Result<String> {
        loop {
            match self.ask("Describe your custom idea")? {
                Some(text) if !text.is_empty() => return Ok(text),
                Some(_) => {
                    writeln!(self.output, "{}", MemoryError::BlankIdea.to_string().red())?;
                }
                None => return Err(MemoryError::BlankIdea),
            }
        }
    }

    fn offer_downloads(&mut self, index: &TagIndex, matches: &[String]) -> Result<Vec<PathBuf>> {
        let dest = self.settings.download_dir.clone();
        let question = format!("Download {} model(s) to {}?", matches.len(), dest.display());
        if !self.confirm(&question)? {
            return Ok(Vec::new());
        }

        let store = AssetStore::new(&self.settings.stl_dir);
        let mut downloaded = Vec::new();
        for asset in matches {
            match store.download(index, asset, &dest) {
                Ok(path) => {
                    writeln!(self.output, "  Saved {}", path.display())?;
                    downloaded.push(path);
                }
                Err(e) => {
                    warn!("Download of {} failed: {}", asset, e);
                    writeln!(self.output, "  {} {}: {}", "Failed".red(), asset, e)?;
                }
            }
        }
        Ok(downloaded)
    }

    fn ask_required(&mut self, label: &str, field: &'static str) -> Result<String> {
        loop {
            match self.ask(label)? {
                Some(text) if !text.is_empty() => return Ok(text),
                Some(_) => writeln!(self.output, "{}", "This field is required.".red())?,
                None => return Err(MemoryError::MissingField(field)),
            }
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/N]", question))?.unwrap_or_default();
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    /// Print a label and read one trimmed line; `None` at end of input
    fn ask(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}: ", label.cyan())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
