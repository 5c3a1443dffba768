//! Answer extraction from free-text model replies
//!
//! Models tend to reply with something like `答案：B\n解析：……`. The answer
//! section is whatever precedes the first analysis marker, minus a leading
//! "answer" label.

/// Markers introducing a trailing analysis section, in priority order
pub const ANALYSIS_MARKERS: &[&str] = &[
    "解析：", "解析:", "理由：", "理由:", "原因：", "原因:", "说明：", "说明:", "推理：", "推理:",
];

/// Labels stripped from the front of the answer section, in priority order
pub const ANSWER_PREFIXES: &[&str] = &["正确答案：", "正确答案:", "答案：", "答案:"];

/// A reply split into its answer and analysis parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedAnswer {
    pub answer: String,
    /// Text after the analysis marker. Never returned to clients.
    pub analysis: Option<String>,
}

/// Split a raw reply into answer and analysis
pub fn parse_answer(raw: &str) -> FormattedAnswer {
    let normalized = raw.replace("\r\n", "\n");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return FormattedAnswer::default();
    }

    let (section, analysis) = match find_analysis_marker(normalized) {
        Some((idx, marker)) => (
            normalized[..idx].trim(),
            Some(normalized[idx + marker.len()..].trim().to_string()),
        ),
        None => (normalized, None),
    };

    let stripped = ANSWER_PREFIXES
        .iter()
        .find_map(|prefix| section.strip_prefix(prefix))
        .map(str::trim)
        .unwrap_or(section);

    let answer = if stripped.is_empty() { section } else { stripped };

    FormattedAnswer {
        answer: answer.to_string(),
        analysis,
    }
}

/// Return only the cleaned answer section of a raw reply
pub fn format_answer(raw: &str) -> String {
    parse_answer(raw).answer
}

/// Leftmost marker occurrence; ties go to the earlier marker in the list
fn find_analysis_marker(text: &str) -> Option<(usize, &'static str)> {
    ANALYSIS_MARKERS
        .iter()
        .filter_map(|marker| text.find(marker).map(|idx| (idx, *marker)))
        .min_by_key(|(idx, _)| *idx)
}
