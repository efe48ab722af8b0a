//! Line classifier for YDK deck files
//!
//! Every trimmed line of a deck file falls into exactly one [`LineKind`].
//! The parser only has to fold these tags into its active-section state.

use crate::core::{CardId, DeckSection};

/// Marker that introduces a named section (`#main`, `#extra`, `#created by`)
pub const SECTION_MARKER: char = '#';

/// Marker that always selects the side deck (`!side`)
pub const SIDE_MARKER: char = '!';

/// Classification of a single deck-file line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A marker line; `None` clears the active section
    Section(Option<DeckSection>),
    /// A bare card id
    Card(CardId),
    /// Blank lines, comments and anything else
    Ignored,
}

/// Classify one raw line
pub fn classify_line(raw: &str) -> LineKind {
    let line = raw.trim_start_matches('\u{feff}').trim();

    if line.starts_with(SECTION_MARKER) {
        LineKind::Section(DeckSection::from_marker_text(line))
    } else if line.starts_with(SIDE_MARKER) {
        LineKind::Section(Some(DeckSection::Side))
    } else if is_card_id(line) {
        LineKind::Card(CardId::new(line))
    } else {
        LineKind::Ignored
    }
}

fn is_card_id(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}
