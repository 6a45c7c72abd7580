//! Kaabil Core Library
//!
//! Asks a question about the last few minutes of a YouTube video and gives
//! AI feedback on the learner's answer.

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod generation;
pub mod provider;
pub mod session;
pub mod transcript;
pub mod tutor;
pub mod types;

// Re-export commonly used items at crate root
pub use config::TutorConfig;
pub use error::{KaabilError, ProviderError, Result};
pub use format::{format_timestamp, format_window};
pub use generation::{ChatCompletions, TextGenerator};
pub use provider::{Provider, ProviderConfig};
pub use session::SessionState;
pub use transcript::{TranscriptSource, YtDlpTranscripts, transcript_window, window_text};
pub use tutor::Tutor;
pub use types::{TranscriptSegment, VideoReference, derive_video_id, embed_url};
