//! Markdown code-fence stripping for model output

const FENCE: &str = "```";

/// Remove a markdown code fence wrapped around a model response
///
/// When the trimmed text opens with a fence, the opening line (including any
/// language tag such as `json`) is dropped, and so is the last line when it is
/// a bare closing fence. Text without an opening fence is returned unchanged.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix(FENCE) else {
        return raw;
    };

    let body = after_open.split_once('\n').map(|(_, rest)| rest).unwrap_or("");

    match body.rsplit_once('\n') {
        Some((head, last)) if last.trim() == FENCE => head,
        None if body.trim() == FENCE => "",
        _ => body,
    }
}
