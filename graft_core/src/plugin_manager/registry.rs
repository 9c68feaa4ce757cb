use super::{error::PluginError, manifest::PluginManifest, Result};
use crate::plugin::Plugin;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Registry for managing plugin metadata, state, and instances
#[derive(Clone, Default)]
pub struct PluginRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    plugins: HashMap<Uuid, PluginEntry>,
    // Registration order; grammar merging and the init pass depend on it.
    order: Vec<Uuid>,
}

/// One registered plugin.
#[derive(Clone)]
pub struct PluginEntry {
    pub id: Uuid,
    pub manifest: PluginManifest,
    pub state: PluginState,
    pub registered_at: DateTime<Utc>,
    pub instance: Arc<dyn Plugin>,
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("id", &self.id)
            .field("name", &self.manifest.name)
            .field("version", &self.manifest.version)
            .field("state", &self.state)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginState {
    Loading,
    Ready,
    Failed(String),
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

impl PluginRegistry {
    /// Create a new plugin registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new plugin
    pub fn register(&self, manifest: PluginManifest, instance: Arc<dyn Plugin>) -> Result<Uuid> {
        manifest.validate().map_err(PluginError::InvalidManifest)?;

        let plugin_id = Uuid::new_v4();
        let entry = PluginEntry {
            id: plugin_id,
            manifest,
            state: PluginState::Loading,
            registered_at: Utc::now(),
            instance,
        };

        let mut inner = self
            .inner
            .write()
            .map_err(|_| PluginError::LoadError("Failed to acquire registry lock".into()))?;
        debug!("Registered plugin {} ({})", entry.manifest.name, plugin_id);
        inner.plugins.insert(plugin_id, entry);
        inner.order.push(plugin_id);

        Ok(plugin_id)
    }

    /// Get plugin entry by ID
    pub fn get(&self, plugin_id: Uuid) -> Result<PluginEntry> {
        let inner = self
            .inner
            .read()
            .map_err(|_| PluginError::LoadError("Failed to acquire registry lock".into()))?;
        inner
            .plugins
            .get(&plugin_id)
            .cloned()
            .ok_or(PluginError::NotFound(plugin_id))
    }

    /// List all registered plugins, in registration order
    pub fn list(&self) -> Vec<PluginEntry> {
        match self.inner.read() {
            Ok(inner) => inner
                .order
                .iter()
                .filter_map(|id| inner.plugins.get(id).cloned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Update plugin state
    pub fn update_state(&self, plugin_id: Uuid, state: PluginState) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| PluginError::LoadError("Failed to acquire registry lock".into()))?;
        match inner.plugins.get_mut(&plugin_id) {
            Some(entry) => {
                debug!("Plugin {} state: {}", plugin_id, state);
                entry.state = state;
                Ok(())
            }
            None => Err(PluginError::NotFound(plugin_id)),
        }
    }

    /// Remove a plugin from the registry
    pub fn remove(&self, plugin_id: Uuid) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| PluginError::LoadError("Failed to acquire registry lock".into()))?;
        if inner.plugins.remove(&plugin_id).is_none() {
            return Err(PluginError::NotFound(plugin_id));
        }
        inner.order.retain(|id| *id != plugin_id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.plugins.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{CommandOutcome, Invocation};
    use async_trait::async_trait;

    struct StubPlugin {
        manifest: PluginManifest,
    }

    impl StubPlugin {
        fn new(name: &str) -> Self {
            Self {
                manifest: PluginManifest::new(
                    name.to_string(),
                    "1.0.0".to_string(),
                    "A test plugin".to_string(),
                ),
            }
        }
    }

    #[async_trait]
    impl Plugin for StubPlugin {
        fn manifest(&self) -> &PluginManifest {
            &self.manifest
        }

        async fn handle(&self, _invocation: Invocation) -> Result<CommandOutcome> {
            Ok(CommandOutcome::success())
        }
    }

    #[test]
    fn test_plugin_registry() {
        let registry = PluginRegistry::new();

        // Register plugin
        let plugin = StubPlugin::new("test-plugin");
        let manifest = plugin.manifest.clone();
        let plugin_id = registry.register(manifest, Arc::new(plugin)).unwrap();

        // Get plugin
        let entry = registry.get(plugin_id).unwrap();
        assert_eq!(entry.manifest.name, "test-plugin");
        assert_eq!(entry.state, PluginState::Loading);

        // List plugins
        let plugins = registry.list();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].id, plugin_id);

        // Update state
        registry.update_state(plugin_id, PluginState::Ready).unwrap();
        let entry = registry.get(plugin_id).unwrap();
        assert_eq!(entry.state, PluginState::Ready);

        // Remove plugin
        registry.remove(plugin_id).unwrap();
        assert!(registry.get(plugin_id).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_rejects_invalid_manifest() {
        let registry = PluginRegistry::new();
        let invalid = PluginManifest::new(
            "".to_string(),
            "1.0.0".to_string(),
            "A test plugin".to_string(),
        );
        let result = registry.register(invalid, Arc::new(StubPlugin::new("x")));
        assert!(matches!(result, Err(PluginError::InvalidManifest(_))));
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let registry = PluginRegistry::new();
        let mut ids = Vec::new();
        for name in ["alpha", "beta", "gamma"] {
            let plugin = StubPlugin::new(name);
            let manifest = plugin.manifest.clone();
            ids.push(registry.register(manifest, Arc::new(plugin)).unwrap());
        }

        let listed: Vec<Uuid> = registry.list().iter().map(|e| e.id).collect();
        assert_eq!(listed, ids);
    }
}
