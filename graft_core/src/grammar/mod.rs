mod command;
mod error;
mod invocation;
mod registry;

pub use command::{CommandSet, CommandSpec, MatchRule};
pub use error::GrammarError;
pub use invocation::{CommandOutcome, Invocation};
pub use registry::{CommandMatch, Grammar, GrammarEntry};

// Re-export common types that consumers will need
pub type Result<T> = std::result::Result<T, GrammarError>;
