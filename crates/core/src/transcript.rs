//! Transcript retrieval and the trailing playback window.
//!
//! Captions come from `yt-dlp` in its `json3` subtitle format and are cached per video.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::{fs, process::Command};
use tracing::{debug, info};

use crate::{
    cache::{CAPTION_FORMAT, CAPTION_STEM, find_captions_in_cache, get_cache_dir},
    error::ProviderError,
    format::join_segment_text,
    types::TranscriptSegment,
};

/// Source of full, ordered transcripts.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript of `video_id`, taking the first track available from `languages`.
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, ProviderError>;
}

/// Segments with `current_time - window_secs <= start <= current_time`, lower bound clamped to 0.
pub fn transcript_window(
    segments: &[TranscriptSegment],
    current_time: f64,
    window_secs: f64,
) -> impl Iterator<Item = &TranscriptSegment> {
    let window_start = (current_time - window_secs).max(0.0);
    segments
        .iter()
        .filter(move |seg| window_start <= seg.start && seg.start <= current_time)
}

/// Window text joined in transcript order.
pub fn window_text(segments: &[TranscriptSegment], current_time: f64, window_secs: f64) -> String {
    join_segment_text(transcript_window(segments, current_time, window_secs))
}

#[derive(Debug, Deserialize)]
struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a yt-dlp `json3` caption track into ordered segments.
pub fn parse_json3(content: &str) -> Result<Vec<TranscriptSegment>, ProviderError> {
    let captions: Json3Captions = serde_json::from_str(content)?;

    let segments = captions
        .events
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            (!text.is_empty()).then(|| TranscriptSegment::new(event.t_start_ms as f64 / 1000.0, text))
        })
        .collect();

    Ok(segments)
}

/// Transcript source backed by the `yt-dlp` executable.
#[derive(Clone, Debug)]
pub struct YtDlpTranscripts {
    program: PathBuf,
    cache_root: Option<PathBuf>,
}

impl Default for YtDlpTranscripts {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            cache_root: None,
        }
    }
}

impl YtDlpTranscripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Keep caption files under `root` instead of the platform cache directory.
    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(root.into());
        self
    }

    fn cache_dir(&self, video_id: &str) -> PathBuf {
        let dir = get_cache_dir(video_id);
        match (&self.cache_root, dir.file_name()) {
            (Some(root), Some(name)) => root.join(name),
            _ => dir,
        }
    }

    /// Download caption tracks for `languages` into `cache_dir` using yt-dlp
    async fn download_captions(
        &self,
        video_id: &str,
        languages: &[String],
        cache_dir: &Path,
    ) -> Result<(), ProviderError> {
        let url = format!("https://www.youtube.com/watch?v={video_id}");
        let output_template = cache_dir.join(CAPTION_STEM);

        info!(video_id, languages = %languages.join(","), "Downloading captions with yt-dlp");

        let output = Command::new(&self.program)
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs")
            .arg(languages.join(","))
            .arg("--sub-format")
            .arg(CAPTION_FORMAT)
            .arg("-o")
            .arg(&output_template)
            .arg(&url)
            .output()
            .await
            .map_err(|e| ProviderError::TranscriptTool {
                video_id: video_id.to_string(),
                reason: format!("failed to run {}: {e}", self.program.display()),
            })?;

        if !output.status.success() {
            return Err(ProviderError::TranscriptTool {
                video_id: video_id.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    /// Create `cache_dir`, download into it and pick the preferred track
    async fn download_into_cache(
        &self,
        video_id: &str,
        languages: &[String],
        cache_dir: &Path,
    ) -> Result<(String, PathBuf), ProviderError> {
        fs::create_dir_all(cache_dir).await?;
        self.download_captions(video_id, languages, cache_dir)
            .await?;
        find_captions_in_cache(cache_dir, languages).ok_or_else(|| {
            ProviderError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: format!("no captions in any of [{}]", languages.join(", ")),
            }
        })
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscripts {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, ProviderError> {
        if video_id.trim().is_empty() {
            return Err(ProviderError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: "video id is empty".to_string(),
            });
        }

        let cache_dir = self.cache_dir(video_id);

        let (lang, path) = match find_captions_in_cache(&cache_dir, languages) {
            Some(cached) => {
                debug!(video_id, lang = %cached.0, "Using cached captions");
                cached
            }
            None => {
                let downloaded = self
                    .download_into_cache(video_id, languages, &cache_dir)
                    .await;
                if downloaded.is_err() {
                    // Nothing usable was written; don't leave an empty dir behind.
                    let _ = fs::remove_dir_all(&cache_dir).await;
                }
                downloaded?
            }
        };

        let content = fs::read_to_string(&path).await?;
        let segments = parse_json3(&content)?;
        info!(video_id, %lang, segments = segments.len(), "Transcript loaded");

        Ok(segments)
    }
}
