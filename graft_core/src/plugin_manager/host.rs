use super::{
    error::PluginError,
    loader::PluginLoader,
    registry::{PluginEntry, PluginRegistry, PluginState},
    Result,
};
use crate::grammar::{CommandOutcome, Grammar, Invocation};
use crate::plugin::{Capability, Plugin};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Main plugin management interface that coordinates registration, grammar
/// merging, init announcements, and command dispatch
#[derive(Clone, Default)]
pub struct PluginHost {
    registry: PluginRegistry,
}

impl PluginHost {
    /// Create a new plugin host
    pub fn new() -> Self {
        Self::default()
    }

    fn loader(&self) -> PluginLoader {
        PluginLoader::new(self.registry.clone())
    }

    /// Register a native plugin implementation.
    pub fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> Result<Uuid> {
        let manifest = plugin.manifest().clone();
        info!("Registering plugin: {} {}", manifest.name, manifest.version);

        let plugin_id = self.registry.register(manifest, plugin)?;
        self.registry.update_state(plugin_id, PluginState::Ready)?;
        Ok(plugin_id)
    }

    /// Load a plugin from a manifest file
    pub async fn load_plugin<P: AsRef<Path>>(&self, manifest_path: P) -> Result<Uuid> {
        info!("Loading plugin from manifest: {:?}", manifest_path.as_ref());
        self.loader().load_from_file(manifest_path).await
    }

    /// Load a plugin from a manifest string
    pub fn load_plugin_from_str(&self, manifest: &str) -> Result<Uuid> {
        self.loader().load_from_str(manifest)
    }

    /// Get plugin entry by ID
    pub fn get_plugin(&self, plugin_id: Uuid) -> Result<PluginEntry> {
        self.registry.get(plugin_id)
    }

    /// List all loaded plugins
    pub fn list_plugins(&self) -> Vec<PluginEntry> {
        self.registry.list()
    }

    /// Merge the command sets of every ready plugin that contributes grammar.
    pub fn grammar(&self) -> Result<Grammar> {
        let mut grammar = Grammar::new();
        for entry in self.registry.list() {
            if entry.state != PluginState::Ready {
                continue;
            }
            if !entry.manifest.has_capability(Capability::Grammar) {
                continue;
            }
            grammar.merge(entry.id, entry.instance.commands())?;
        }
        debug!("Merged grammar has {} entries", grammar.len());
        Ok(grammar)
    }

    /// Run the init hook of every ready plugin that declares it, collecting
    /// announcement lines. A failing hook marks its plugin failed; the pass
    /// continues.
    pub async fn announce(&self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for entry in self.registry.list() {
            if entry.state != PluginState::Ready {
                continue;
            }
            if !entry.manifest.has_capability(Capability::Init) {
                continue;
            }
            match entry.instance.on_init().await {
                Ok(Some(line)) => {
                    info!("{}", line);
                    lines.push(line);
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Init hook failed for {}: {}", entry.manifest.name, e);
                    self.registry
                        .update_state(entry.id, PluginState::Failed(e.to_string()))?;
                }
            }
        }
        Ok(lines)
    }

    /// Resolve a command line against the merged grammar and dispatch it to
    /// the owning plugin.
    pub async fn dispatch(&self, line: &str) -> Result<CommandOutcome> {
        debug!("Dispatching command line: {}", line);

        let grammar = self.grammar()?;
        let matched = grammar.resolve(line)?;
        let entry = self.registry.get(matched.plugin_id)?;

        match entry.state {
            PluginState::Ready => (),
            PluginState::Loading => {
                return Err(PluginError::DispatchError(
                    "Plugin is still loading".to_string(),
                ))
            }
            PluginState::Failed(ref reason) => {
                return Err(PluginError::DispatchError(format!(
                    "Plugin failed to load: {}",
                    reason
                )))
            }
        }

        if !entry.manifest.has_capability(Capability::Command) {
            return Err(PluginError::DispatchError(format!(
                "Plugin {} does not accept commands",
                entry.manifest.name
            )));
        }

        let invocation = Invocation::new(line, matched.spec.phrase(), matched.args);
        entry.instance.handle(invocation).await
    }

    /// Remove a plugin
    pub fn remove_plugin(&self, plugin_id: Uuid) -> Result<()> {
        info!("Removing plugin {}", plugin_id);

        if let Ok(entry) = self.get_plugin(plugin_id) {
            debug!("Removing plugin: {}", entry.manifest.name);
        }

        self.registry.remove(plugin_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::CommandSet;
    use crate::plugin_manager::PluginManifest;
    use async_trait::async_trait;

    struct EchoPlugin {
        manifest: PluginManifest,
    }

    impl EchoPlugin {
        fn new() -> Self {
            Self {
                manifest: PluginManifest::new(
                    "echo".to_string(),
                    "1.0.0".to_string(),
                    "Echoes dispatched commands".to_string(),
                )
                .with_capabilities(&[Capability::Grammar, Capability::Init, Capability::Command]),
            }
        }
    }

    #[async_trait]
    impl Plugin for EchoPlugin {
        fn manifest(&self) -> &PluginManifest {
            &self.manifest
        }

        fn commands(&self) -> CommandSet {
            CommandSet::new()
                .is("echo version")
                .unwrap()
                .starts_with("echo")
                .unwrap()
        }

        async fn on_init(&self) -> Result<Option<String>> {
            Ok(Some("echo 1.0.0 loaded.".to_string()))
        }

        async fn handle(&self, invocation: Invocation) -> Result<CommandOutcome> {
            if invocation.phrase == "echo version" {
                return Ok(CommandOutcome::success_with("1.0.0"));
            }
            Ok(CommandOutcome::success_with(invocation.args.join(" ")))
        }
    }

    // Declares grammar but not the command hook.
    struct SilentPlugin {
        manifest: PluginManifest,
    }

    impl SilentPlugin {
        fn new() -> Self {
            Self {
                manifest: PluginManifest::new(
                    "silent".to_string(),
                    "1.0.0".to_string(),
                    "Contributes grammar it never handles".to_string(),
                )
                .with_capabilities(&[Capability::Grammar]),
            }
        }
    }

    #[async_trait]
    impl Plugin for SilentPlugin {
        fn manifest(&self) -> &PluginManifest {
            &self.manifest
        }

        fn commands(&self) -> CommandSet {
            CommandSet::new().is("silent run").unwrap()
        }

        async fn handle(&self, _invocation: Invocation) -> Result<CommandOutcome> {
            Ok(CommandOutcome::success())
        }
    }

    struct FailingInitPlugin {
        manifest: PluginManifest,
    }

    impl FailingInitPlugin {
        fn new() -> Self {
            Self {
                manifest: PluginManifest::new(
                    "broken".to_string(),
                    "1.0.0".to_string(),
                    "Fails its init hook".to_string(),
                )
                .with_capabilities(&[Capability::Init]),
            }
        }
    }

    #[async_trait]
    impl Plugin for FailingInitPlugin {
        fn manifest(&self) -> &PluginManifest {
            &self.manifest
        }

        async fn on_init(&self) -> Result<Option<String>> {
            Err(PluginError::HookError("init exploded".to_string()))
        }

        async fn handle(&self, _invocation: Invocation) -> Result<CommandOutcome> {
            Ok(CommandOutcome::success())
        }
    }

    #[tokio::test]
    async fn test_register_and_list() {
        let host = PluginHost::new();
        let plugin_id = host.register_plugin(Arc::new(EchoPlugin::new())).unwrap();

        let entry = host.get_plugin(plugin_id).unwrap();
        assert_eq!(entry.manifest.name, "echo");
        assert_eq!(entry.state, PluginState::Ready);

        let plugins = host.list_plugins();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].id, plugin_id);
    }

    #[tokio::test]
    async fn test_grammar_merges_contributions() {
        let host = PluginHost::new();
        host.register_plugin(Arc::new(EchoPlugin::new())).unwrap();
        host.register_plugin(Arc::new(SilentPlugin::new())).unwrap();

        let grammar = host.grammar().unwrap();
        assert_eq!(grammar.len(), 3);
    }

    #[tokio::test]
    async fn test_announce_collects_lines() {
        let host = PluginHost::new();
        host.register_plugin(Arc::new(EchoPlugin::new())).unwrap();
        host.register_plugin(Arc::new(SilentPlugin::new())).unwrap();

        let lines = host.announce().await.unwrap();
        assert_eq!(lines, vec!["echo 1.0.0 loaded.".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_init_marks_plugin_failed() {
        let host = PluginHost::new();
        let broken = host
            .register_plugin(Arc::new(FailingInitPlugin::new()))
            .unwrap();
        host.register_plugin(Arc::new(EchoPlugin::new())).unwrap();

        let lines = host.announce().await.unwrap();
        assert_eq!(lines, vec!["echo 1.0.0 loaded.".to_string()]);

        let entry = host.get_plugin(broken).unwrap();
        assert!(matches!(entry.state, PluginState::Failed(_)));
    }

    #[tokio::test]
    async fn test_dispatch_exact_command() {
        let host = PluginHost::new();
        host.register_plugin(Arc::new(EchoPlugin::new())).unwrap();

        let outcome = host.dispatch("echo version").await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("1.0.0"));
    }

    #[tokio::test]
    async fn test_dispatch_prefix_command_passes_args() {
        let host = PluginHost::new();
        host.register_plugin(Arc::new(EchoPlugin::new())).unwrap();

        let outcome = host.dispatch("echo hello world").await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("hello world"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_command() {
        let host = PluginHost::new();
        host.register_plugin(Arc::new(EchoPlugin::new())).unwrap();

        let result = host.dispatch("unknown words").await;
        assert!(matches!(
            result,
            Err(PluginError::Grammar(crate::grammar::GrammarError::NoMatch(_)))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_refuses_plugin_without_command_hook() {
        let host = PluginHost::new();
        host.register_plugin(Arc::new(SilentPlugin::new())).unwrap();

        let result = host.dispatch("silent run").await;
        assert!(matches!(result, Err(PluginError::DispatchError(_))));
    }

    #[tokio::test]
    async fn test_remove_plugin_drops_its_grammar() {
        let host = PluginHost::new();
        let plugin_id = host.register_plugin(Arc::new(EchoPlugin::new())).unwrap();
        assert!(!host.grammar().unwrap().is_empty());

        host.remove_plugin(plugin_id).unwrap();
        assert!(host.grammar().unwrap().is_empty());
        assert!(host.get_plugin(plugin_id).is_err());
    }

    #[tokio::test]
    async fn test_load_declared_plugin_and_dispatch() {
        let host = PluginHost::new();
        host.load_plugin_from_str(
            r#"
            name = "hello"
            version = "0.1.0"
            description = "Says hello"
            capabilities = ["grammar", "init", "command"]

            [[commands]]
            phrase = "hello say"
            rule = "prefix"
            "#,
        )
        .unwrap();

        let lines = host.announce().await.unwrap();
        assert_eq!(lines, vec!["hello 0.1.0 loaded.".to_string()]);

        let outcome = host.dispatch("hello say world").await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.data["plugin"], "hello");
        assert_eq!(outcome.data["args"][0], "world");
    }
}
