//! Session orchestration: transcript window -> question -> answer -> feedback.
//!
//! The tutor holds no per-user state. Every operation that touches a session takes the
//! caller's [`SessionState`] and only mutates it after the provider call succeeded.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    config::TutorConfig,
    error::{KaabilError, ProviderError, Result},
    generation::{ChatCompletions, TextGenerator},
    session::SessionState,
    transcript::{TranscriptSource, YtDlpTranscripts, window_text},
    types::VideoReference,
};

static QUESTION_PROMPT: &str = "You are a helpful assistant. Create a question based on the provided video transcript text.";

fn feedback_prompt(excerpt: &str, question: &str) -> String {
    format!(
        "You are a helpful UPSC teacher. Provide feedback to the user based on the following knowledge: {excerpt}. The user was asked: {question}."
    )
}

#[derive(Clone)]
pub struct Tutor {
    transcripts: Arc<dyn TranscriptSource>,
    generator: Arc<dyn TextGenerator>,
    languages: Vec<String>,
    window_secs: f64,
}

impl Tutor {
    pub fn new(
        transcripts: Arc<dyn TranscriptSource>,
        generator: Arc<dyn TextGenerator>,
        config: &TutorConfig,
    ) -> Self {
        Self {
            transcripts,
            generator,
            languages: config.languages.clone(),
            window_secs: config.window_secs,
        }
    }

    /// Tutor backed by yt-dlp captions and the configured chat completions provider.
    pub fn from_config(config: &TutorConfig) -> std::result::Result<Self, ProviderError> {
        let mut generator = ChatCompletions::new(config.provider, config.request_timeout)?;
        if let Some(model) = &config.model {
            generator = generator.with_model(model.clone());
        }
        if let Some(api_url) = &config.api_url {
            generator = generator.with_api_url(api_url.clone());
        }
        info!(
            provider = config.provider.name(),
            model = generator.model(),
            languages = %config.languages.join(","),
            "Tutor ready"
        );

        Ok(Self::new(
            Arc::new(YtDlpTranscripts::new()),
            Arc::new(generator),
            config,
        ))
    }

    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    pub fn provider_name(&self) -> &str {
        self.generator.provider_name()
    }

    /// Text of the transcript entries in the trailing window ending at `current_time`.
    pub async fn fetch_transcript_window(&self, video_id: &str, current_time: f64) -> Result<String> {
        if !current_time.is_finite() || current_time < 0.0 {
            return Err(KaabilError::invalid_input(format!(
                "playback time must be a non-negative number of seconds, got {current_time}"
            )));
        }

        let segments = self
            .transcripts
            .fetch(video_id, &self.languages)
            .await
            .inspect_err(|e| warn!(video_id, error = %e, "Transcript fetch failed"))?;

        Ok(window_text(&segments, current_time, self.window_secs))
    }

    /// Ask for a question about `excerpt` and make it the session's pending question.
    pub async fn generate_question(
        &self,
        session: &mut SessionState,
        excerpt: String,
    ) -> Result<String> {
        let question = self
            .generator
            .complete(QUESTION_PROMPT, &excerpt)
            .await
            .inspect_err(|e| warn!(error = %e, "Question generation failed"))?
            .trim()
            .to_string();

        info!(excerpt_chars = excerpt.len(), "Question generated");
        session.set_question(question.clone(), excerpt);

        Ok(question)
    }

    /// Fetch the window for `video` at `current_time` and generate a question from it.
    pub async fn question_for(
        &self,
        session: &mut SessionState,
        video: &VideoReference,
        current_time: f64,
    ) -> Result<String> {
        let excerpt = self
            .fetch_transcript_window(video.id(), current_time)
            .await?;
        self.generate_question(session, excerpt).await
    }

    /// Store the user's answer. Returns `false` when there is no question to answer.
    pub fn submit_answer(&self, session: &mut SessionState, answer: impl Into<String>) -> bool {
        let stored = session.submit_answer(answer);
        if !stored {
            warn!("Answer submitted without a pending question, ignoring");
        }
        stored
    }

    /// Evaluate the stored answer.
    ///
    /// `Ok(None)` when the session has no answered question. On success the session goes
    /// back to idle; on failure it is left as is so the call can be repeated.
    pub async fn request_feedback(&self, session: &mut SessionState) -> Result<Option<String>> {
        let SessionState::AwaitingFeedback {
            question,
            excerpt,
            answer,
        } = &*session
        else {
            return Ok(None);
        };

        let feedback = self
            .generator
            .complete(
                &feedback_prompt(excerpt, question),
                &format!("Answer: {answer}"),
            )
            .await
            .inspect_err(|e| warn!(error = %e, "Feedback generation failed"))?
            .trim()
            .to_string();

        info!("Feedback generated");
        session.clear();

        Ok(Some(feedback))
    }
}
