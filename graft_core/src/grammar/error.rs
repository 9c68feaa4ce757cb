use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("Command phrase cannot be empty")]
    EmptyPhrase,

    #[error("Cannot resolve an empty command line")]
    EmptyLine,

    #[error("No command matches: {0}")]
    NoMatch(String),

    #[error("Conflicting command phrase: {0}")]
    Conflict(String),
}
