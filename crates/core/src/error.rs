use thiserror::Error;

/// Failures of the external collaborators: the transcript source or the text generator.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Missing API key: {env_var} environment variable is not set for {provider_name}")]
    MissingApiKey {
        provider_name: String,
        env_var: String,
    },

    #[error("No transcript available for video {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("Transcript tool failed for video {video_id}: {reason}")]
    TranscriptTool { video_id: String, reason: String },

    #[error("Invalid API response: {reason}")]
    InvalidResponse { reason: String },

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum KaabilError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl KaabilError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KaabilError>;
