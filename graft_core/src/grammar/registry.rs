use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use super::{
    command::{CommandSet, CommandSpec, MatchRule},
    error::GrammarError,
    Result,
};

/// One merged grammar entry: a spec tagged with its owning plugin.
#[derive(Debug, Clone)]
pub struct GrammarEntry {
    pub plugin_id: Uuid,
    pub spec: CommandSpec,
}

/// The merged command grammar of every contributing plugin.
///
/// Entries keep merge order, which makes resolution deterministic: ties
/// between equal-length prefix matches go to the earliest-merged spec.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    entries: Vec<GrammarEntry>,
    exact_phrases: HashSet<String>,
}

/// The result of resolving an input line against the grammar.
#[derive(Debug, Clone)]
pub struct CommandMatch {
    /// The plugin that owns the matched command.
    pub plugin_id: Uuid,
    /// The spec that matched.
    pub spec: CommandSpec,
    /// Input tokens remaining after the matched phrase.
    pub args: Vec<String>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one plugin's command set into the grammar. No entry is ever
    /// dropped; a duplicate exact phrase is a conflict.
    pub fn merge(&mut self, plugin_id: Uuid, set: CommandSet) -> Result<()> {
        for spec in set {
            if spec.rule() == MatchRule::Exact
                && !self.exact_phrases.insert(spec.phrase().to_string())
            {
                return Err(GrammarError::Conflict(spec.phrase().to_string()));
            }
            debug!(
                "Merging command '{}' ({}) from plugin {}",
                spec.phrase(),
                spec.rule(),
                plugin_id
            );
            self.entries.push(GrammarEntry { plugin_id, spec });
        }
        Ok(())
    }

    /// All merged entries, in merge order.
    pub fn entries(&self) -> &[GrammarEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an input line to its owning command.
    ///
    /// An exact match always wins. Among prefix matches, the longest phrase
    /// wins; equal lengths resolve to the earliest-merged entry.
    pub fn resolve(&self, line: &str) -> Result<CommandMatch> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(GrammarError::EmptyLine);
        }

        let mut best_prefix: Option<&GrammarEntry> = None;

        for entry in &self.entries {
            match entry.spec.rule() {
                MatchRule::Exact => {
                    if entry.spec.tokens().eq(tokens.iter().copied()) {
                        debug!("Resolved '{}' to exact command '{}'", line, entry.spec.phrase());
                        return Ok(CommandMatch {
                            plugin_id: entry.plugin_id,
                            spec: entry.spec.clone(),
                            args: Vec::new(),
                        });
                    }
                }
                MatchRule::Prefix => {
                    let count = entry.spec.token_count();
                    if count > tokens.len() {
                        continue;
                    }
                    if !entry.spec.tokens().eq(tokens[..count].iter().copied()) {
                        continue;
                    }
                    let better = match best_prefix {
                        Some(best) => count > best.spec.token_count(),
                        None => true,
                    };
                    if better {
                        best_prefix = Some(entry);
                    }
                }
            }
        }

        match best_prefix {
            Some(entry) => {
                debug!("Resolved '{}' to prefix command '{}'", line, entry.spec.phrase());
                let count = entry.spec.token_count();
                Ok(CommandMatch {
                    plugin_id: entry.plugin_id,
                    spec: entry.spec.clone(),
                    args: tokens[count..].iter().map(|t| t.to_string()).collect(),
                })
            }
            None => Err(GrammarError::NoMatch(line.to_string())),
        }
    }
}
