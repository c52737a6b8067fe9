//! Suggestion-to-asset matching
//!
//! Both the idea phrase and every asset's tags are reduced to word sets, the
//! generic object words are removed from each side, and an asset matches when
//! at least one word survives on both sides. There is no scoring: results come
//! back in tag index order.
//!
//! Suggestion words have trailing `.` and `,` stripped; tags are only
//! lowercased. Tag data is expected to be clean already, so a tag written as
//! `"sunflower."` will never match.

use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{MemoryError, Result};

// ============================================================================
// Stopwords
// ============================================================================

/// Words that describe the kind of object rather than what it depicts
pub const GENERIC_WORDS: [&str; 7] = [
    "keychain", "charm", "pendant", "token", "object", "mini", "symbol",
];

lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = GENERIC_WORDS.iter().copied().collect();
}

/// A deduplicated set of lowercase words
pub type WordSet = HashSet<String>;

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Return a copy of `words` without the generic words
pub fn filter_stopwords(words: &WordSet) -> WordSet {
    words
        .iter()
        .filter(|word| !is_stopword(word))
        .cloned()
        .collect()
}

// ============================================================================
// Normalization
// ============================================================================

/// Split on whitespace, lowercase, and strip trailing `.`/`,` from each word.
///
/// Punctuation anywhere else in a word is kept. A word made only of dots and
/// commas becomes the empty string and stays in the set.
pub fn normalize(text: &str) -> WordSet {
    text.split_whitespace()
        .map(|word| word.to_lowercase().trim_end_matches(['.', ',']).to_string())
        .collect()
}

fn tag_words(tags: &[String]) -> WordSet {
    tags.iter().map(|tag| tag.to_lowercase()).collect()
}

// ============================================================================
// Tag Index
// ============================================================================

/// One downloadable model and its descriptive tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// File name of the model inside the STL folder
    pub id: String,
    pub tags: Vec<String>,
}

impl AssetEntry {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            id: id.into(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        }
    }
}

/// Asset id to tags, in the order the source document lists them
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    entries: Vec<AssetEntry>,
}

impl TagIndex {
    #[cfg(test)]
    pub fn from_entries(entries: Vec<AssetEntry>) -> Self {
        Self { entries }
    }

    /// Parse a `{ "<asset>": { "tags": [...] } }` document.
    ///
    /// Only `tags` is read. An entry without it, or with something other than
    /// an array there, gets an empty tag list; non-string tags are skipped.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let document: serde_json::Map<String, Value> =
            serde_json::from_str(raw).map_err(|e| MemoryError::IndexParse(e.to_string()))?;

        let entries = document
            .into_iter()
            .map(|(id, data)| {
                let tags = data
                    .get("tags")
                    .and_then(Value::as_array)
                    .map(|tags| {
                        tags.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_else(|| {
                        debug!("Asset {} has no tags", id);
                        Vec::new()
                    });
                AssetEntry { id, tags }
            })
            .collect();

        Ok(Self { entries })
    }

    /// Load and parse the tag index file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MemoryError::IndexNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| MemoryError::IndexRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let index = Self::from_json_str(&content)?;
        info!("Loaded {} assets from {:?}", index.len(), path);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetEntry> {
        self.entries.iter()
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == asset_id)
    }
}

// ============================================================================
// Matcher
// ============================================================================

/// Find every asset sharing at least one non-generic word with `phrase`
pub fn match_assets(phrase: &str, index: &TagIndex) -> Vec<String> {
    let query = filter_stopwords(&normalize(phrase));
    debug!("Query words for {:?}: {:?}", phrase, query);

    if query.is_empty() {
        return Vec::new();
    }

    let matched: Vec<String> = index
        .iter()
        .filter(|entry| {
            let tags = filter_stopwords(&tag_words(&entry.tags));
            !query.is_disjoint(&tags)
        })
        .map(|entry| entry.id.clone())
        .collect();

    debug!("{} of {} assets matched", matched.len(), index.len());
    matched
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_index() -> TagIndex {
        TagIndex::from_entries(vec![
            AssetEntry::new("sun.stl", &["sunflower", "garden"]),
            AssetEntry::new("pie.stl", &["pie", "kitchen"]),
        ])
    }

    fn words(items: &[&str]) -> WordSet {
        items.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_normalize_lowercases_and_strips_trailing_punctuation() {
        let normalized = normalize("A Sunflower, for her.");
        assert_eq!(normalized, words(&["a", "sunflower", "for", "her"]));
    }

    #[test]
    fn test_normalize_keeps_inner_and_leading_punctuation() {
        let normalized = normalize("sun,flower .pie mother's");
        assert_eq!(normalized, words(&["sun,flower", ".pie", "mother's"]));
    }

    #[test]
    fn test_normalize_keeps_other_trailing_punctuation() {
        assert_eq!(normalize("pie! pie;"), words(&["pie!", "pie;"]));
        assert_eq!(normalize("Stone?."), words(&["stone?"]));
    }

    #[test]
    fn test_normalize_keeps_empty_word() {
        let normalized = normalize("pie ...");
        assert_eq!(normalized, words(&["pie", ""]));
    }

    #[test]
    fn test_normalize_empty_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("  \t\n ").is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("The Old Garden, bench.");
        let joined = once.iter().cloned().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&joined), once);
    }

    #[test]
    fn test_filter_stopwords_does_not_touch_input() {
        let input = words(&["sunflower", "keychain", "charm"]);
        let filtered = filter_stopwords(&input);
        assert_eq!(filtered, words(&["sunflower"]));
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_match_sunflower_pendant() {
        let index = create_test_index();
        assert_eq!(
            match_assets("A sunflower pendant for her.", &index),
            vec!["sun.stl".to_string()]
        );
    }

    #[test]
    fn test_match_no_shared_words() {
        let index = TagIndex::from_entries(vec![AssetEntry::new("plate.stl", &["metal", "small"])]);
        assert!(match_assets("A simple keychain", &index).is_empty());
    }

    #[test]
    fn test_stopwords_never_match() {
        let index = TagIndex::from_entries(vec![AssetEntry::new(
            "generic.stl",
            &["keychain", "charm", "token", "mini"],
        )]);
        assert!(match_assets("keychain charm token", &index).is_empty());
        assert!(match_assets("a mini symbol object", &index).is_empty());
    }

    #[test]
    fn test_empty_tags_never_match() {
        let index = TagIndex::from_entries(vec![AssetEntry::new("blank.stl", &[])]);
        assert!(match_assets("sunflower garden pie", &index).is_empty());
    }

    #[test]
    fn test_blank_phrase_matches_nothing() {
        let index = create_test_index();
        assert!(match_assets("", &index).is_empty());
        assert!(match_assets("   ", &index).is_empty());
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        let index = TagIndex::from_entries(vec![AssetEntry::new("sun.stl", &["Sunflower"])]);
        assert_eq!(match_assets("SUNFLOWER stone", &index), vec!["sun.stl".to_string()]);
    }

    #[test]
    fn test_tags_keep_trailing_punctuation() {
        let index = TagIndex::from_entries(vec![AssetEntry::new("sun.stl", &["sunflower."])]);
        assert!(match_assets("sunflower.", &index).is_empty());
    }

    #[test]
    fn test_results_follow_index_order() {
        let index = TagIndex::from_entries(vec![
            AssetEntry::new("z.stl", &["garden"]),
            AssetEntry::new("a.stl", &["garden", "bench"]),
            AssetEntry::new("m.stl", &["kitchen"]),
        ]);
        assert_eq!(
            match_assets("garden bench", &index),
            vec!["z.stl".to_string(), "a.stl".to_string()]
        );
    }

    #[test]
    fn test_every_match_shares_a_word() {
        let index = TagIndex::from_entries(vec![
            AssetEntry::new("sun.stl", &["sunflower", "garden", "charm"]),
            AssetEntry::new("pie.stl", &["pie", "kitchen"]),
            AssetEntry::new("bird.stl", &["bird", "garden"]),
            AssetEntry::new("key.stl", &["keychain"]),
        ]);
        let phrase = "A garden charm, with a tiny bird.";
        let query = filter_stopwords(&normalize(phrase));
        let matched = match_assets(phrase, &index);

        assert_eq!(matched, vec!["sun.stl".to_string(), "bird.stl".to_string()]);
        for id in &matched {
            let entry = index.iter().find(|e| &e.id == id).unwrap();
            let tags = filter_stopwords(&tag_words(&entry.tags));
            assert!(!query.is_disjoint(&tags));
        }
    }

    #[test]
    fn test_index_from_json_preserves_order_and_ignores_extra_fields() {
        let raw = r#"{
            "pie.stl": {"tags": ["pie", "kitchen"], "author": "anon"},
            "sun.stl": {"tags": ["sunflower"], "size_mm": 40}
        }"#;
        let index = TagIndex::from_json_str(raw).unwrap();
        let ids: Vec<&str> = index.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["pie.stl", "sun.stl"]);
        assert_eq!(index.iter().next().unwrap().tags, vec!["pie", "kitchen"]);
    }

    #[test]
    fn test_index_missing_tags_is_empty() {
        let raw = r#"{"odd.stl": {"description": "no tags"}, "bad.stl": {"tags": "pie"}}"#;
        let index = TagIndex::from_json_str(raw).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.iter().all(|e| e.tags.is_empty()));
        assert!(match_assets("pie", &index).is_empty());
    }

    #[test]
    fn test_index_rejects_non_object_document() {
        assert!(matches!(
            TagIndex::from_json_str("[1, 2, 3]"),
            Err(MemoryError::IndexParse(_))
        ));
    }

    #[test]
    fn test_load_missing_index() {
        let result = TagIndex::load(Path::new("/nonexistent/suggestion_to_stl.json"));
        assert!(matches!(result, Err(MemoryError::IndexNotFound(_))));
    }
}
