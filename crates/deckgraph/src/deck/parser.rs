//! YDK deck parser implementation
//!
//! Folds classified lines into a [`ParsedDeck`]. Card lines are appended to
//! whichever section is active; card lines seen while no section is active
//! are dropped.

use anyhow::Result;
use tracing::{span, trace, Level};

use super::classifier::{classify_line, LineKind};
use super::ParsedDeck;
use crate::core::{DeckSection, Parser};

/// Parser for YDK-style deck lists
#[derive(Debug, Clone, Copy, Default)]
pub struct YdkParser;

impl YdkParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a whole document into a fresh deck
    pub fn parse_str(&self, input: &str) -> ParsedDeck {
        let mut deck = ParsedDeck::new();
        self.fill(input, &mut deck);
        deck
    }

    fn fill(&self, input: &str, deck: &mut ParsedDeck) {
        let mut active: Option<DeckSection> = None;
        let mut ignored = 0usize;

        for line in input.lines() {
            match classify_line(line) {
                LineKind::Section(section) => active = section,
                LineKind::Card(id) => match active {
                    Some(section) => deck.push(section, id),
                    None => ignored += 1,
                },
                LineKind::Ignored => {}
            }
        }

        trace!(
            main = deck.section(DeckSection::Main).len(),
            extra = deck.section(DeckSection::Extra).len(),
            side = deck.section(DeckSection::Side).len(),
            orphan_cards = ignored,
            "Parsed deck"
        );
    }
}

impl Parser<ParsedDeck> for YdkParser {
    fn parse(&self, input: &str, target: &mut ParsedDeck) -> Result<()> {
        let parse_span = span!(Level::TRACE, "parse_ydk", input_len = input.len());
        let _enter = parse_span.enter();

        self.fill(input, target);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ydk"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        input
            .lines()
            .any(|line| matches!(classify_line(line), LineKind::Section(Some(_))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(cards: &[crate::core::CardId]) -> Vec<&str> {
        cards.iter().map(|c| c.as_str()).collect()
    }

    #[test]
    fn test_parse_reference_deck() {
        let deck = YdkParser::new().parse_str("#main\n1\n1\n2\n#extra\n3\n!side\n4\n");
        assert_eq!(ids(deck.section(DeckSection::Main)), vec!["1", "1", "2"]);
        assert_eq!(ids(deck.section(DeckSection::Extra)), vec!["3"]);
        assert_eq!(ids(deck.section(DeckSection::Side)), vec!["4"]);
        assert_eq!(deck.card_count(), 5);
    }

    #[test]
    fn test_cards_before_any_marker_are_dropped() {
        let deck = YdkParser::new().parse_str("10\n11\n#main\n12\n");
        assert_eq!(ids(deck.section(DeckSection::Main)), vec!["12"]);
        assert_eq!(deck.card_count(), 1);
    }

    #[test]
    fn test_unrecognized_marker_suspends_collection() {
        let input = "#main\n1\n#created by player\n2\n3\n#extra\n4\n";
        let deck = YdkParser::new().parse_str(input);
        assert_eq!(ids(deck.section(DeckSection::Main)), vec!["1"]);
        assert_eq!(ids(deck.section(DeckSection::Extra)), vec!["4"]);
    }

    #[test]
    fn test_sections_can_repeat() {
        let deck = YdkParser::new().parse_str("#main\n1\n#extra\n2\n#main\n3\n");
        assert_eq!(ids(deck.section(DeckSection::Main)), vec!["1", "3"]);
    }

    #[test]
    fn test_windows_line_endings_and_noise() {
        let input = "#created by ygopro\r\n#main\r\n89631139\r\nnot a card\r\n\r\n!side\r\n14558127\r\n";
        let deck = YdkParser::new().parse_str(input);
        assert_eq!(ids(deck.section(DeckSection::Main)), vec!["89631139"]);
        assert_eq!(ids(deck.section(DeckSection::Side)), vec!["14558127"]);
    }

    #[test]
    fn test_parser_trait_appends_into_target() {
        let parser = YdkParser::new();
        let mut deck = ParsedDeck::new();
        parser.parse("#main\n1\n", &mut deck).unwrap();
        parser.parse("#side\n2\n", &mut deck).unwrap();
        assert_eq!(deck.card_count(), 2);
        assert_eq!(parser.name(), "ydk");
        assert_eq!(parser.version(), "0.1.0");
    }

    #[test]
    fn test_can_parse() {
        let parser = YdkParser::new();
        assert!(parser.can_parse("#main\n1\n"));
        assert!(parser.can_parse("!side\n"));
        assert!(!parser.can_parse("1\n2\n3\n"));
        assert!(!parser.can_parse("#created by someone\n"));
    }

    #[test]
    fn test_empty_input() {
        let deck = YdkParser::new().parse_str("");
        assert!(deck.is_empty());
    }
}
