use crate::types::TranscriptSegment;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format a `[start, end]` window as `MM:SS–MM:SS`
pub fn format_window(start: f64, end: f64) -> String {
    format!("{}–{}", format_timestamp(start), format_timestamp(end))
}

/// Join segment texts in order, single-space separated.
pub fn join_segment_text<'a>(segments: impl IntoIterator<Item = &'a TranscriptSegment>) -> String {
    segments
        .into_iter()
        .map(|seg| seg.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
