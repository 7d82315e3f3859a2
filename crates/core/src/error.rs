#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Malformed content at '{path}'")]
    MalformedContent { path: String },

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("No draft loaded")]
    NoDraft,

    #[error("Description is empty")]
    EmptyDescription,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn malformed(path: impl Into<String>) -> Self {
        Error::MalformedContent { path: path.into() }
    }

    /// True for failures scoped to a single network or storage call, where
    /// the user can simply try again with the same draft.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::GenerationFailed(_) | Error::MalformedContent { .. } | Error::PersistenceFailed(_)
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
