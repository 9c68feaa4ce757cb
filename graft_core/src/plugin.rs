use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grammar::{CommandOutcome, CommandSet, Invocation};
use crate::plugin_manager::{PluginManifest, Result};

/// Lifecycle hooks a plugin subscribes to in its manifest. The host only
/// calls hooks the plugin declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Contributes commands to the merged CLI grammar.
    Grammar,
    /// Announces itself during the init pass.
    Init,
    /// Receives dispatched commands.
    Command,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grammar => write!(f, "grammar"),
            Self::Init => write!(f, "init"),
            Self::Command => write!(f, "command"),
        }
    }
}

/// Core plugin interface that all plugins must implement
#[async_trait]
pub trait Plugin: Send + Sync {
    /// The plugin's manifest.
    fn manifest(&self) -> &PluginManifest;

    /// Commands this plugin contributes to the merged grammar.
    fn commands(&self) -> CommandSet {
        CommandSet::new()
    }

    /// Init hook. Returns an optional announcement line.
    async fn on_init(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Handle a command dispatched to this plugin.
    async fn handle(&self, invocation: Invocation) -> Result<CommandOutcome>;
}
