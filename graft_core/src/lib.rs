pub mod demo;
pub mod grammar;
pub mod plugin;
pub mod plugin_manager;

pub use demo::DemoPlugin;
pub use grammar::{CommandOutcome, CommandSet, CommandSpec, Grammar, Invocation, MatchRule};
pub use plugin::{Capability, Plugin};
pub use plugin_manager::{PluginError, PluginHost, PluginManifest};
