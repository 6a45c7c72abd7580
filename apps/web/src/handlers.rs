//! Page handlers. Each action works on the caller's own session copy and commits it back.

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use kaabil_core::{KaabilError, VideoReference};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::WebResult;
use crate::page::Page;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "kaabil_session";

type PageResponse = WebResult<(StatusCode, CookieJar, Html<String>)>;

/// `t` stays raw text so a blank or mistyped playback time is reported on the page.
#[derive(Debug, Default, Deserialize)]
pub struct VideoParams {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub t: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub t: String,
    #[serde(default)]
    pub answer: String,
}

/// Playback time in seconds; blank means the start of the video.
fn playback_time(raw: &str) -> Result<f64, KaabilError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| KaabilError::invalid_input(format!("playback time `{raw}` is not a number")))
}

/// Session id from the cookie, issuing a new one when missing or unreadable.
fn session_id(jar: CookieJar) -> (Uuid, CookieJar) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    {
        return (id, jar);
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (id, jar.add(cookie))
}

fn status_for(error: &KaabilError) -> StatusCode {
    match error {
        KaabilError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        KaabilError::Provider(_) => StatusCode::OK,
    }
}

fn respond(state: &AppState, status: StatusCode, jar: CookieJar, page: Page) -> PageResponse {
    Ok((status, jar, Html(page.render(&state.pages)?)))
}

pub async fn health() -> &'static str {
    "ok"
}

/// Show the form, the video and whatever question the session is holding.
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<VideoParams>,
) -> PageResponse {
    let (id, jar) = session_id(jar);
    let session = state.sessions.checkout(id);
    match playback_time(&params.t) {
        Ok(t) => respond(&state, StatusCode::OK, jar, Page::new(&params.url, t, &session)),
        Err(e) => {
            let page = Page::new(&params.url, 0.0, &session);
            respond(&state, status_for(&e), jar, page.with_error(e))
        }
    }
}

/// "Generate Question": fetch the trailing transcript window and ask for a question about it.
pub async fn generate_question(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(params): Form<VideoParams>,
) -> PageResponse {
    let (id, jar) = session_id(jar);
    let mut session = state.sessions.checkout(id);

    let time = playback_time(&params.t);
    let shown_time = time.as_ref().map_or(0.0, |t| *t);

    let outcome = match (VideoReference::from_url(&params.url), time) {
        (Ok(video), Ok(t)) => {
            info!(session = %id, video_id = video.id(), t, "Generating question");
            state.tutor.question_for(&mut session, &video, t).await
        }
        (Err(e), _) | (Ok(_), Err(e)) => Err(e),
    };

    state.sessions.commit(id, session.clone());
    let page = Page::new(&params.url, shown_time, &session);

    match outcome {
        Ok(_) => respond(&state, StatusCode::OK, jar, page),
        Err(e) => {
            warn!(session = %id, error = %e, "Question action failed");
            respond(&state, status_for(&e), jar, page.with_error(e))
        }
    }
}

/// "Submit Answer": store the answer and ask for feedback on it.
pub async fn submit_answer(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AnswerForm>,
) -> PageResponse {
    let (id, jar) = session_id(jar);
    let mut session = state.sessions.checkout(id);

    let t = match playback_time(&form.t) {
        Ok(t) => t,
        Err(e) => {
            let page = Page::new(&form.url, 0.0, &session);
            return respond(&state, status_for(&e), jar, page.with_error(e));
        }
    };

    if form.answer.trim().is_empty() {
        let page = Page::new(&form.url, t, &session);
        let error = KaabilError::invalid_input("answer is empty");
        return respond(&state, status_for(&error), jar, page.with_error(error));
    }

    if !state.tutor.submit_answer(&mut session, form.answer.trim()) {
        let page = Page::new(&form.url, t, &session);
        return respond(
            &state,
            StatusCode::OK,
            jar,
            page.with_notice("Generate a question before submitting an answer."),
        );
    }

    let outcome = state.tutor.request_feedback(&mut session).await;
    state.sessions.commit(id, session.clone());
    let page = Page::new(&form.url, t, &session);

    match outcome {
        Ok(Some(feedback)) => {
            info!(session = %id, "Feedback delivered");
            respond(&state, StatusCode::OK, jar, page.with_feedback(feedback))
        }
        Ok(None) => respond(&state, StatusCode::OK, jar, page),
        Err(e) => {
            warn!(session = %id, error = %e, "Feedback action failed");
            respond(&state, status_for(&e), jar, page.with_error(e))
        }
    }
}
