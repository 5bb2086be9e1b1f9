/// Replace every character outside `[A-Za-z0-9]` with `replacement`.
///
/// One replacement per character; runs are not collapsed, so with a
/// single-character replacement the output has the same length in chars.
pub fn sanitize(value: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            out.push_str(replacement);
        }
    }
    out
}

/// Lowercase first, then sanitize. Used for parent type and title.
pub fn sanitize_lowercase(value: &str, replacement: &str) -> String {
    sanitize(&value.to_lowercase(), replacement)
}
