use serde::{Deserialize, Serialize};

use crate::error::{KaabilError, Result};

pub const YOUTUBE_EMBED_BASE_URL: &str = "https://www.youtube.com/embed";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            text: text.into(),
        }
    }
}

/// Best-effort video id: everything after the last `=`, or the whole input when there is none.
pub fn derive_video_id(url: &str) -> &str {
    url.rsplit('=').next().unwrap_or(url)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoReference {
    id: String,
}

impl VideoReference {
    /// Only a blank URL is rejected. Anything else yields an id and is left to the
    /// transcript source to validate.
    pub fn from_url(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(KaabilError::invalid_input("video URL is empty"));
        }
        Ok(Self {
            id: derive_video_id(url).to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn embed_url(&self, start_seconds: u64) -> String {
        embed_url(YOUTUBE_EMBED_BASE_URL, &self.id, start_seconds)
    }
}

pub fn embed_url(base_url: &str, video_id: &str, start_seconds: u64) -> String {
    format!(
        "{}/{}?start={}",
        base_url.trim_end_matches('/'),
        video_id,
        start_seconds
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_id_after_last_equals() {
        assert_eq!(derive_video_id("https://x/watch?v=ABC123"), "ABC123");
        assert_eq!(
            derive_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn id_without_equals_is_returned_unchanged() {
        assert_eq!(derive_video_id("noequalsatall"), "noequalsatall");
        assert_eq!(derive_video_id(""), "");
    }

    #[test]
    fn trailing_equals_gives_empty_id() {
        assert_eq!(derive_video_id("https://x/watch?v="), "");
    }

    #[test]
    fn blank_url_is_invalid_input() {
        assert!(matches!(
            VideoReference::from_url("   "),
            Err(KaabilError::InvalidInput { .. })
        ));
    }

    #[test]
    fn builds_embed_url_with_start() {
        let video = VideoReference::from_url(" https://youtube.com/watch?v=VID1 ").unwrap();
        assert_eq!(video.id(), "VID1");
        assert_eq!(
            video.embed_url(300),
            "https://www.youtube.com/embed/VID1?start=300"
        );
        assert_eq!(
            embed_url("https://player.example/", "abc", 0),
            "https://player.example/abc?start=0"
        );
    }
}
