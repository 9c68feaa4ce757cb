use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grammar::{self, CommandSet, CommandSpec, MatchRule};
use crate::plugin::Capability;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// The name of the plugin
    pub name: String,

    /// The version of the plugin
    pub version: String,

    /// A description of what the plugin does
    pub description: String,

    /// Hooks the plugin subscribes to
    #[serde(default)]
    pub capabilities: Vec<Capability>,

    /// Commands declared directly in the manifest
    #[serde(default)]
    pub commands: Vec<CommandDecl>,

    /// Optional configuration for the plugin
    #[serde(default)]
    pub config: Value,
}

/// A command declared in a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDecl {
    /// The command phrase
    pub phrase: String,

    /// How the phrase matches input
    #[serde(default)]
    pub rule: MatchRule,
}

impl PluginManifest {
    /// Create a new plugin manifest
    pub fn new(name: String, version: String, description: String) -> Self {
        Self {
            name,
            version,
            description,
            capabilities: Vec::new(),
            commands: Vec::new(),
            config: Value::Null,
        }
    }

    /// Set the capability hooks.
    pub fn with_capabilities(mut self, capabilities: &[Capability]) -> Self {
        self.capabilities = capabilities.to_vec();
        self
    }

    /// Whether the plugin subscribes to the given hook.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Plugin name cannot be empty".to_string());
        }
        if self.version.is_empty() {
            return Err("Plugin version cannot be empty".to_string());
        }
        if self.description.is_empty() {
            return Err("Plugin description cannot be empty".to_string());
        }
        for decl in &self.commands {
            if decl.phrase.split_whitespace().next().is_none() {
                return Err("Declared command phrase cannot be empty".to_string());
            }
        }
        if !self.commands.is_empty() {
            if !self.has_capability(Capability::Grammar) {
                return Err(
                    "Declared commands require the 'grammar' capability".to_string(),
                );
            }
            if !self.has_capability(Capability::Command) {
                return Err(
                    "Declared commands require the 'command' capability".to_string(),
                );
            }
        }
        Ok(())
    }

    /// Build a command set from the manifest's declared commands.
    pub fn declared_commands(&self) -> grammar::Result<CommandSet> {
        let mut set = CommandSet::new();
        for decl in &self.commands {
            set.push(CommandSpec::new(&decl.phrase, decl.rule)?);
        }
        Ok(set)
    }
}
