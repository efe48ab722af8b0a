//! Deck files: discovery, loading and parsing
//!
//! A deck file is plain text made of section markers and bare card ids:
//!
//! ```text
//! #created by player
//! #main
//! 89631139
//! 89631139
//! #extra
//! 44508094
//! !side
//! 14558127
//! ```

mod classifier;
mod parser;

pub use classifier::{classify_line, LineKind, SECTION_MARKER, SIDE_MARKER};
pub use parser::YdkParser;

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::{CardId, DeckGraphError, DeckSection};

/// File extension of deck lists
pub const DECK_EXTENSION: &str = "ydk";

/// One deck: card ids per section, duplicates preserved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDeck {
    main: Vec<CardId>,
    extra: Vec<CardId>,
    side: Vec<CardId>,
}

impl ParsedDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a card to a section
    pub fn push(&mut self, section: DeckSection, id: CardId) {
        self.section_mut(section).push(id);
    }

    /// Cards of one section in file order
    pub fn section(&self, section: DeckSection) -> &[CardId] {
        match section {
            DeckSection::Main => &self.main,
            DeckSection::Extra => &self.extra,
            DeckSection::Side => &self.side,
        }
    }

    fn section_mut(&mut self, section: DeckSection) -> &mut Vec<CardId> {
        match section {
            DeckSection::Main => &mut self.main,
            DeckSection::Extra => &mut self.extra,
            DeckSection::Side => &mut self.side,
        }
    }

    /// Iterate sections in file order together with their cards
    pub fn sections(&self) -> impl Iterator<Item = (DeckSection, &[CardId])> {
        DeckSection::ALL
            .into_iter()
            .map(move |section| (section, self.section(section)))
    }

    /// Distinct cards across all sections, sorted
    pub fn unique_cards(&self) -> BTreeSet<&CardId> {
        self.main
            .iter()
            .chain(self.extra.iter())
            .chain(self.side.iter())
            .collect()
    }

    /// Number of card entries, duplicates included
    pub fn card_count(&self) -> usize {
        self.main.len() + self.extra.len() + self.side.len()
    }

    pub fn is_empty(&self) -> bool {
        self.card_count() == 0
    }
}

/// List deck files under `dir`, sorted by path
///
/// Only regular files with a `.ydk` extension (any case) are returned. Entries
/// that cannot be read while walking are logged and skipped.
pub fn discover_deck_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, DeckGraphError> {
    if !dir.is_dir() {
        return Err(DeckGraphError::IoError {
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("deck directory not found: {}", dir.display()),
            ),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    let mut walk_errors = 0usize;

    for entry in WalkDir::new(dir).follow_links(true).max_depth(max_depth) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_deck_extension(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                walk_errors += 1;
                warn!(error = %e, "Skipping unreadable directory entry");
            }
        }
    }

    files.sort();
    debug!(
        dir = %dir.display(),
        file_count = files.len(),
        walk_errors,
        "Discovered deck files"
    );
    Ok(files)
}

fn has_deck_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DECK_EXTENSION))
}

/// Read and parse one deck file
///
/// Returns `None` when the file cannot be read; the failure is logged and
/// the caller treats the file as contributing nothing. Invalid UTF-8 is
/// replaced rather than rejected, so a stray byte in a comment line does
/// not discard the whole deck.
pub fn load_deck(parser: &YdkParser, path: &Path) -> Option<ParsedDeck> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            Some(parser.parse_str(&text))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read deck file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_unique_cards_collapses_duplicates_across_sections() {
        let deck = YdkParser::new().parse_str("#main\n1\n1\n2\n#extra\n3\n!side\n4\n1\n");
        let unique: Vec<&str> = deck.unique_cards().into_iter().map(|c| c.as_str()).collect();
        assert_eq!(unique, vec!["1", "2", "3", "4"]);
        assert_eq!(deck.card_count(), 6);
    }

    #[test]
    fn test_sections_iterates_in_file_order() {
        let deck = ParsedDeck::new();
        let order: Vec<DeckSection> = deck.sections().map(|(s, _)| s).collect();
        assert_eq!(order, DeckSection::ALL.to_vec());
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.ydk"), "#main\n1\n").unwrap();
        fs::write(dir.path().join("a.YDK"), "#main\n2\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "#main\n3\n").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.ydk"), "#main\n4\n").unwrap();

        let flat = discover_deck_files(dir.path(), false).unwrap();
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.YDK", "b.ydk"]);

        let deep = discover_deck_files(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = tempdir().unwrap();
        assert!(discover_deck_files(dir.path(), false).unwrap().is_empty());
    }

    #[test]
    fn test_discover_missing_dir_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(discover_deck_files(&missing, false).is_err());
    }

    #[test]
    fn test_load_deck_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert!(load_deck(&YdkParser::new(), &dir.path().join("gone.ydk")).is_none());
    }

    #[test]
    fn test_load_deck_tolerates_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("odd.ydk");
        fs::write(&path, b"#created by \xff\xfe\n#main\n77\n").unwrap();
        let deck = load_deck(&YdkParser::new(), &path).unwrap();
        assert_eq!(deck.section(DeckSection::Main).len(), 1);
    }
}
