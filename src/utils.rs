/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate(text: &str, max_chars: usize) -> String {
  if text.chars().count() <= max_chars {
    return text.to_string();
  }
  if max_chars == 0 {
    return String::new();
  }

  let mut out: String = text.chars().take(max_chars - 1).collect();
  out.push('…');
  out
}

/// Trimmed `text`, or `-` when blank.
pub fn or_dash(text: &str) -> &str {
  let text = text.trim();
  if text.is_empty() { "-" } else { text }
}
