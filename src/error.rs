use thiserror::Error;

#[derive(Debug, Error)]
pub enum QcError {
    #[error("failed to load DWI volume: {0}")]
    Load(String),

    #[error("invalid diffusion metadata: {0}")]
    Metadata(String),

    #[error("{stage} collaborator failed: {message}")]
    Collaborator {
        stage: &'static str,
        message: String,
    },

    #[error("invalid protocol: {0}")]
    Configuration(String),
}

impl QcError {
    pub fn collaborator(stage: &'static str, err: anyhow::Error) -> Self {
        Self::Collaborator {
            stage,
            message: format!("{err:#}"),
        }
    }

    /// Load and metadata failures happen before any check could run.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Load(_) | Self::Metadata(_))
    }
}
