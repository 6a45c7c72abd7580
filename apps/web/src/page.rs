//! The single HTML page and the data it is rendered from.

use handlebars::Handlebars;
use kaabil_core::{SessionState, VideoReference};
use serde::Serialize;

use crate::error::WebResult;

const INDEX: &str = "index";

pub fn registry() -> WebResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_template_string(INDEX, include_str!("../templates/index.hbs"))?;
    Ok(handlebars)
}

#[derive(Debug, Default, Serialize)]
pub struct Page {
    pub url: String,
    pub current_time: u64,
    pub embed_url: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub feedback: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl Page {
    /// Page for `url` at `current_time`, showing whatever the session currently holds.
    pub fn new(url: &str, current_time: f64, session: &SessionState) -> Self {
        let current_time = if current_time.is_finite() {
            current_time.max(0.0) as u64
        } else {
            0
        };
        let embed_url = VideoReference::from_url(url)
            .ok()
            .map(|video| video.embed_url(current_time));

        Self {
            url: url.trim().to_string(),
            current_time,
            embed_url,
            question: session.question().map(str::to_string),
            answer: session.answer().map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_feedback(mut self, feedback: String) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    pub fn with_error(mut self, error: impl std::fmt::Display) -> Self {
        self.error = Some(format!("An error occurred: {error}"));
        self
    }

    pub fn render(&self, pages: &Handlebars<'_>) -> WebResult<String> {
        Ok(pages.render(INDEX, self)?)
    }
}
