use thiserror::Error;

/// A convenience `Result` alias using [`RolecastError`].
pub type RolecastResult<T> = Result<T, RolecastError>;

/// Top-level error type for Rolecast.
///
/// Generation-layer variants ([`Http`](Self::Http), [`Generation`](Self::Generation),
/// [`Serialization`](Self::Serialization)) are recovered with fallback content
/// by the agent crate. [`Input`](Self::Input) and [`Config`](Self::Config) reach
/// the end user.
#[derive(Error, Debug)]
pub enum RolecastError {
    /// The model call went through but produced nothing usable.
    #[error("Generation error: {0}")]
    Generation(String),

    /// An outbound HTTP request to the model API failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Source text could not be read.
    #[error("Input error: {0}")]
    Input(String),

    /// Missing credential or invalid configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// A persisted session could not be written or parsed.
    #[error("Session error: {0}")]
    Session(String),

    /// The dialogue loop itself failed outside a single turn.
    #[error("Dialogue error: {0}")]
    Dialogue(String),

    /// A JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RolecastError {
    /// Whether this error comes from the generation layer and should be
    /// masked with fallback content instead of reaching the user.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::Generation(_) | Self::Http(_) | Self::Serialization(_)
        )
    }
}
