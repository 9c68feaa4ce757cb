mod error;
mod host;
mod loader;
mod manifest;
mod registry;

pub use error::PluginError;
pub use host::PluginHost;
pub use loader::{DeclaredPlugin, PluginLoader};
pub use manifest::{CommandDecl, PluginManifest};
pub use registry::{PluginEntry, PluginRegistry, PluginState};

// Re-export common types that consumers will need
pub type Result<T> = std::result::Result<T, PluginError>;
