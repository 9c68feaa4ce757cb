use thiserror::Error;
use uuid::Uuid;

use crate::grammar::GrammarError;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Plugin not found: {0}")]
    NotFound(Uuid),

    #[error("Failed to load plugin: {0}")]
    LoadError(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Failed to dispatch command: {0}")]
    DispatchError(String),

    #[error("Plugin hook error: {0}")]
    HookError(String),

    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}
