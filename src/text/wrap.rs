/// Greedy word-wrap of `text` into lines no wider than `max_width`.
///
/// Words are separated by whitespace. Each word is tentatively appended (with a trailing space)
/// to the current line; when the measured candidate exceeds `max_width` and the line already holds
/// a word, the line is emitted and the word starts a new one. A word that is wider than
/// `max_width` on its own is emitted as a single overflowing line, never split.
///
/// Empty or all-whitespace text yields exactly one empty line. Emitted lines carry no trailing
/// separator space.
pub fn wrap_words<F>(text: &str, max_width: f32, mut measure: F) -> Vec<String>
where
    F: FnMut(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = format!("{line}{word} ");
        if measure(&candidate) > max_width && !line.is_empty() {
            lines.push(line.trim_end().to_owned());
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    lines.push(line.trim_end().to_owned());

    lines
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
