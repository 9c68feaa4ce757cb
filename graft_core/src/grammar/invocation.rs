use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a plugin's command handler receives for one dispatched line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invocation {
    /// The raw input line as given to the dispatcher.
    pub line: String,

    /// The grammar phrase that matched.
    pub phrase: String,

    /// Tokens remaining after the matched phrase.
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(
        line: impl Into<String>,
        phrase: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            line: line.into(),
            phrase: phrase.into(),
            args,
        }
    }
}

/// What a command handler returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Whether the command succeeded.
    pub success: bool,

    /// Optional human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl CommandOutcome {
    /// A bare success outcome.
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
            data: Value::Null,
        }
    }

    /// A success outcome carrying a message.
    pub fn success_with(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Value::Null,
        }
    }

    /// A failure outcome carrying a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Value::Null,
        }
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}
