use serde::{Deserialize, Serialize};
use std::fmt;

use super::{error::GrammarError, Result};

/// How a command phrase is matched against an input line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRule {
    /// The input line must equal the phrase, token for token.
    #[default]
    Exact,
    /// The phrase must be a token-aligned leading part of the input line.
    Prefix,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Prefix => write!(f, "prefix"),
        }
    }
}

/// A single command a plugin contributes to the CLI grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    phrase: String,
    rule: MatchRule,
}

impl CommandSpec {
    /// Create a new spec. The phrase is normalized to single spaces between
    /// tokens; a phrase with no tokens is rejected.
    pub fn new(phrase: &str, rule: MatchRule) -> Result<Self> {
        let tokens: Vec<&str> = phrase.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(GrammarError::EmptyPhrase);
        }
        Ok(Self {
            phrase: tokens.join(" "),
            rule,
        })
    }

    /// The normalized command phrase.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// How the phrase matches input.
    pub fn rule(&self) -> MatchRule {
        self.rule
    }

    pub(crate) fn tokens(&self) -> impl Iterator<Item = &str> {
        self.phrase.split(' ')
    }

    /// Number of tokens in the phrase.
    pub fn token_count(&self) -> usize {
        self.tokens().count()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.phrase, self.rule)
    }
}

/// The set of commands one plugin contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    specs: Vec<CommandSpec>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command that matches the whole input line.
    pub fn is(mut self, phrase: &str) -> Result<Self> {
        self.specs.push(CommandSpec::new(phrase, MatchRule::Exact)?);
        Ok(self)
    }

    /// Add a command that matches the leading tokens of the input line.
    pub fn starts_with(mut self, phrase: &str) -> Result<Self> {
        self.specs.push(CommandSpec::new(phrase, MatchRule::Prefix)?);
        Ok(self)
    }

    pub fn push(&mut self, spec: CommandSpec) {
        self.specs.push(spec);
    }

    pub fn specs(&self) -> &[CommandSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl IntoIterator for CommandSet {
    type Item = CommandSpec;
    type IntoIter = std::vec::IntoIter<CommandSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_normalizes_whitespace() {
        let spec = CommandSpec::new("  foo   bar ", MatchRule::Exact).unwrap();
        assert_eq!(spec.phrase(), "foo bar");
        assert_eq!(spec.token_count(), 2);
    }

    #[test]
    fn test_empty_phrase_rejected() {
        let result = CommandSpec::new("   ", MatchRule::Prefix);
        assert!(matches!(result, Err(GrammarError::EmptyPhrase)));
    }

    #[test]
    fn test_command_set_builders() {
        let set = CommandSet::new()
            .is("foo bar")
            .unwrap()
            .starts_with("baz")
            .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.specs()[0].rule(), MatchRule::Exact);
        assert_eq!(set.specs()[1].rule(), MatchRule::Prefix);
    }

    #[test]
    fn test_match_rule_serialization() {
        let serialized = serde_json::to_string(&MatchRule::Prefix).unwrap();
        assert_eq!(serialized, "\"prefix\"");

        let deserialized: MatchRule = serde_json::from_str("\"exact\"").unwrap();
        assert_eq!(deserialized, MatchRule::Exact);
    }
}
