//! Single-slot question/answer state of one user session.

/// Where a session is in its question/answer cycle.
///
/// ```text
/// Idle --question--> AwaitingAnswer --answer--> AwaitingFeedback --feedback--> Idle
/// ```
///
/// A new question may replace the current one from any state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingAnswer {
        question: String,
        excerpt: String,
    },
    AwaitingFeedback {
        question: String,
        excerpt: String,
        answer: String,
    },
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn question(&self) -> Option<&str> {
        match self {
            SessionState::Idle => None,
            SessionState::AwaitingAnswer { question, .. }
            | SessionState::AwaitingFeedback { question, .. } => Some(question),
        }
    }

    pub fn excerpt(&self) -> Option<&str> {
        match self {
            SessionState::Idle => None,
            SessionState::AwaitingAnswer { excerpt, .. }
            | SessionState::AwaitingFeedback { excerpt, .. } => Some(excerpt),
        }
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            SessionState::AwaitingFeedback { answer, .. } => Some(answer),
            _ => None,
        }
    }

    /// Replace whatever the session holds with a fresh question; any stored answer is dropped.
    pub fn set_question(&mut self, question: String, excerpt: String) {
        *self = SessionState::AwaitingAnswer { question, excerpt };
    }

    /// Store an answer for the pending question. Ignored when there is no question.
    ///
    /// Returns whether the answer was stored.
    pub fn submit_answer(&mut self, answer: impl Into<String>) -> bool {
        match std::mem::take(self) {
            SessionState::Idle => false,
            SessionState::AwaitingAnswer { question, excerpt }
            | SessionState::AwaitingFeedback {
                question, excerpt, ..
            } => {
                *self = SessionState::AwaitingFeedback {
                    question,
                    excerpt,
                    answer: answer.into(),
                };
                true
            }
        }
    }

    /// End the cycle once feedback has been produced.
    pub fn clear(&mut self) {
        *self = SessionState::Idle;
    }
}
