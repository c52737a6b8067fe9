//! Per-session form state and the custom request log

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{MemoryError, Result};
use crate::ideas::extract_ideas;

const RECORD_SEPARATOR_WIDTH: usize = 50;

// ============================================================================
// Session Context
// ============================================================================

/// Everything the user has entered or been shown so far
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub name: String,
    pub relationship: String,
    pub memory: String,
    /// Raw model output
    pub suggestions: String,
    pub ideas: Vec<String>,
    pub selected_idea: Option<String>,
}

impl SessionContext {
    /// Store the form fields; relationship and memory are required
    pub fn record_memory(&mut self, name: &str, relationship: &str, memory: &str) -> Result<()> {
        if relationship.trim().is_empty() {
            return Err(MemoryError::MissingField("relationship"));
        }
        if memory.trim().is_empty() {
            return Err(MemoryError::MissingField("memory"));
        }
        self.name = name.trim().to_string();
        self.relationship = relationship.trim().to_string();
        self.memory = memory.trim().to_string();
        Ok(())
    }

    pub fn record_suggestions(&mut self, raw: &str) {
        self.suggestions = raw.trim().to_string();
        self.ideas = extract_ideas(&self.suggestions);
        self.selected_idea = None;
    }

    pub fn select(&mut self, idea: &str) {
        self.selected_idea = Some(idea.to_string());
    }
}

// ============================================================================
// Request Log
// ============================================================================

/// Why an idea is being sent for manual fulfilment
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Disposition {
    /// The user wrote their own idea
    Custom,
    /// A model matched, but the user wants a custom version
    ExistingMatch,
    /// Nothing in the library matched
    NoMatch,
}

impl Disposition {
    fn record_lines(&self, idea: &str) -> Vec<String> {
        match self {
            Disposition::Custom => vec![format!("User Custom Idea: {}", idea)],
            Disposition::ExistingMatch => vec![
                format!("Selected AI Idea (STL exists): {}", idea),
                "Note: STL exists but verify before processing".to_string(),
            ],
            Disposition::NoMatch => vec![format!("Selected AI Idea (no STL match): {}", idea)],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Custom => "custom",
            Disposition::ExistingMatch => "existing-match",
            Disposition::NoMatch => "no-match",
        }
    }
}

/// Render one plain-text log record
pub fn render_record(
    context: &SessionContext,
    idea: &str,
    disposition: Disposition,
    submitted_at: DateTime<Utc>,
) -> String {
    let mut record = String::new();
    record.push_str(&format!("Name: {}\n", context.name));
    record.push_str(&format!("Relationship: {}\n", context.relationship));
    record.push_str(&format!("Memory: {}\n", context.memory));
    for line in disposition.record_lines(idea) {
        record.push_str(&line);
        record.push('\n');
    }
    record.push_str(&format!("Submitted: {}\n", submitted_at.to_rfc3339()));
    record.push_str(&"=".repeat(RECORD_SEPARATOR_WIDTH));
    record.push('\n');
    record
}

pub struct RequestLog {
    path: PathBuf,
}

impl RequestLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record for `idea`; blank ideas are refused
    pub fn append(
        &self,
        context: &SessionContext,
        idea: &str,
        disposition: Disposition,
    ) -> Result<()> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(MemoryError::BlankIdea);
        }

        let record = render_record(context, idea, disposition, Utc::now());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())?;

        info!(
            "Logged {} request to {:?}",
            disposition.as_str(),
            self.path
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    fn create_test_context() -> SessionContext {
        let mut context = SessionContext::default();
        context
            .record_memory("Ana", "My Grandmother", "She loved sunflowers and baking pies")
            .unwrap();
        context
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_record_memory_requires_fields() {
        let mut context = SessionContext::default();
        assert!(matches!(
            context.record_memory("Ana", "  ", "pies"),
            Err(MemoryError::MissingField("relationship"))
        ));
        assert!(matches!(
            context.record_memory("Ana", "Grandmother", ""),
            Err(MemoryError::MissingField("memory"))
        ));
        assert!(context.record_memory("", "Grandmother", "pies").is_ok());
        assert_eq!(context.name, "");
    }

    #[test]
    fn test_record_suggestions_extracts_ideas() {
        let mut context = create_test_context();
        context.select("old idea");
        context.record_suggestions("  - Sunflower keychain\n- Pie charm\n");
        assert_eq!(context.ideas, vec!["Sunflower keychain", "Pie charm"]);
        assert!(context.selected_idea.is_none());
    }

    #[test]
    fn test_render_custom_record() {
        let record = render_record(
            &create_test_context(),
            "A tiny garden stone",
            Disposition::Custom,
            fixed_time(),
        );
        let expected = format!(
            "Name: Ana\nRelationship: My Grandmother\nMemory: She loved sunflowers and baking pies\n\
             User Custom Idea: A tiny garden stone\nSubmitted: 2026-05-01T12:00:00+00:00\n{}\n",
            "=".repeat(50)
        );
        assert_eq!(record, expected);
    }

    #[test]
    fn test_render_existing_match_record() {
        let record = render_record(
            &create_test_context(),
            "Sunflower keychain",
            Disposition::ExistingMatch,
            fixed_time(),
        );
        assert!(record.contains(
            "Selected AI Idea (STL exists): Sunflower keychain\nNote: STL exists but verify before processing\n"
        ));
    }

    #[test]
    fn test_render_no_match_record() {
        let record = render_record(
            &create_test_context(),
            "Memory stone",
            Disposition::NoMatch,
            fixed_time(),
        );
        assert!(record.contains("Selected AI Idea (no STL match): Memory stone\n"));
        assert!(!record.contains("Note:"));
    }

    #[test]
    fn test_append_accumulates_records() {
        let dir = tempfile::tempdir().unwrap();
        let log = RequestLog::new(dir.path().join("custom_suggestions.txt"));
        let context = create_test_context();

        log.append(&context, "Pie charm", Disposition::NoMatch).unwrap();
        log.append(&context, "  Garden stone  ", Disposition::Custom).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches(&"=".repeat(50)).count(), 2);
        assert!(content.contains("Selected AI Idea (no STL match): Pie charm\n"));
        assert!(content.contains("User Custom Idea: Garden stone\n"));
    }

    #[test]
    fn test_append_refuses_blank_idea() {
        let dir = tempfile::tempdir().unwrap();
        let log = RequestLog::new(dir.path().join("log.txt"));
        let result = log.append(&create_test_context(), "   ", Disposition::Custom);
        assert!(matches!(result, Err(MemoryError::BlankIdea)));
        assert!(!log.path().exists());
    }
}
