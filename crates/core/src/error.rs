use std::io;

/// Errors that can occur while configuring aspects, matching pointcuts or weaving
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error in pointcut `{expression}` at offset {position}: {message} (near `{}`)", near(.expression, .position))]
    ParseError {
        expression: String,
        position: usize,
        message: String,
    },

    #[error("Pointcut construction error: {0}")]
    ConstructionError(String),

    #[error("Match error: {0}")]
    MatchError(String),

    #[error("Advisor `{0}` is already registered")]
    DuplicateAdvisor(String),

    #[error("Unknown advisor `{0}`")]
    UnknownAdvisor(String),

    #[error("Unknown pointcut `{0}`")]
    UnknownPointcut(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// Build a parse error pointing at `position` inside `expression`
    pub fn parse(expression: &str, position: usize, message: impl Into<String>) -> Self {
        Error::ParseError {
            expression: expression.to_string(),
            position,
            message: message.into(),
        }
    }
}

fn near<'a>(expression: &'a str, position: &usize) -> &'a str {
    expression
        .get(*position..)
        .filter(|rest| !rest.is_empty())
        .unwrap_or("<end of expression>")
}

/// Result type alias for weaver operations
pub type Result<T> = std::result::Result<T, Error>;
