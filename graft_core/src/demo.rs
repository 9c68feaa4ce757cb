use async_trait::async_trait;
use tracing::debug;

use crate::grammar::{CommandOutcome, CommandSet, Invocation};
use crate::plugin::{Capability, Plugin};
use crate::plugin_manager::{PluginManifest, Result};

/// The demonstration plugin: it contributes no commands, announces itself
/// during the init pass, and reports success for anything dispatched to it.
pub struct DemoPlugin {
    manifest: PluginManifest,
}

impl DemoPlugin {
    pub fn new() -> Self {
        let manifest = PluginManifest::new(
            "demo".to_string(),
            "1.0.0".to_string(),
            "Demonstrates how to write a plugin".to_string(),
        )
        .with_capabilities(&[Capability::Grammar, Capability::Init, Capability::Command]);

        Self { manifest }
    }
}

impl Default for DemoPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for DemoPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn commands(&self) -> CommandSet {
        // Add commands here to extend the CLI grammar:
        //
        //   CommandSet::new()
        //       .is("demo version").unwrap()
        //       .starts_with("demo").unwrap()
        //
        CommandSet::new()
    }

    async fn on_init(&self) -> Result<Option<String>> {
        Ok(Some(format!(
            "{} {} loaded.",
            self.manifest.name, self.manifest.version
        )))
    }

    async fn handle(&self, invocation: Invocation) -> Result<CommandOutcome> {
        debug!("Demo plugin handling command: {}", invocation.line);
        Ok(CommandOutcome::success())
    }
}
