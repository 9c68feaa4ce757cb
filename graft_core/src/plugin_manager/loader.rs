use super::{
    error::PluginError,
    manifest::PluginManifest,
    registry::{PluginRegistry, PluginState},
    Result,
};
use crate::grammar::{CommandOutcome, CommandSet, Invocation};
use crate::plugin::Plugin;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Loads manifest-declared plugins into the registry.
#[derive(Clone)]
pub struct PluginLoader {
    registry: PluginRegistry,
}

impl PluginLoader {
    /// Create a new plugin loader
    pub fn new(registry: PluginRegistry) -> Self {
        Self { registry }
    }

    /// Load a plugin from a manifest file
    pub async fn load_from_file<P: AsRef<Path>>(&self, manifest_path: P) -> Result<Uuid> {
        let manifest_path = manifest_path.as_ref();
        debug!("Loading plugin from manifest: {:?}", manifest_path);

        let manifest_content = fs::read_to_string(manifest_path)
            .await
            .map_err(|e| PluginError::LoadError(format!("Failed to read manifest: {}", e)))?;

        self.load_from_str(&manifest_content)
    }

    /// Load a plugin from a manifest string
    pub fn load_from_str(&self, manifest: &str) -> Result<Uuid> {
        let manifest: PluginManifest = toml::from_str(manifest)
            .map_err(|e| PluginError::LoadError(format!("Failed to parse manifest: {}", e)))?;

        self.load(manifest)
    }

    /// Load a plugin from a manifest
    pub fn load(&self, manifest: PluginManifest) -> Result<Uuid> {
        debug!("Loading plugin: {}", manifest.name);

        manifest.validate().map_err(PluginError::InvalidManifest)?;

        // Surface bad declared phrases before the plugin is registered.
        manifest.declared_commands()?;

        let instance = Arc::new(DeclaredPlugin::new(manifest.clone()));
        let plugin_id = self.registry.register(manifest, instance)?;
        self.registry.update_state(plugin_id, PluginState::Ready)?;

        Ok(plugin_id)
    }

    /// Get the plugin registry
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }
}

/// Backs a plugin that exists only as a manifest: its grammar comes from the
/// manifest's declared commands, it announces itself on init, and it reports
/// success for anything dispatched to it.
pub struct DeclaredPlugin {
    manifest: PluginManifest,
}

impl DeclaredPlugin {
    pub fn new(manifest: PluginManifest) -> Self {
        Self { manifest }
    }
}

#[async_trait]
impl Plugin for DeclaredPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn commands(&self) -> CommandSet {
        // Phrases were validated when the manifest was loaded.
        self.manifest.declared_commands().unwrap_or_default()
    }

    async fn on_init(&self) -> Result<Option<String>> {
        Ok(Some(format!(
            "{} {} loaded.",
            self.manifest.name, self.manifest.version
        )))
    }

    async fn handle(&self, invocation: Invocation) -> Result<CommandOutcome> {
        debug!(
            "Plugin {} handling command: {}",
            self.manifest.name, invocation.line
        );
        Ok(CommandOutcome::success().with_data(serde_json::json!({
            "plugin": self.manifest.name,
            "phrase": invocation.phrase,
            "args": invocation.args,
        })))
    }
}
