/// Sanitizes question text before it is stored.
///
/// Teachers and the language model may write markup such as `<b>` or `<sub>`
/// into question content. Safe tags are kept; scripts, event handlers and
/// similar dangerous constructs are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitizes an optional field, dropping it when nothing is left.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(clean_html)
        .filter(|cleaned| !cleaned.trim().is_empty())
}
