//! Story text rendering.

/// Render story text as paragraph markup.
///
/// Runs of two or more newlines separate paragraphs; a single newline becomes
/// a line break. The text itself is not escaped.
pub fn to_html_paragraphs(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    split_paragraphs(text)
        .map(|p| format!("<p>{}</p>", p.replace('\n', "<br/>")))
        .collect()
}

/// Split on runs of two or more newlines.
pub fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find("\n\n") {
            Some(start) => {
                let end = start + current[start..].bytes().take_while(|b| *b == b'\n').count();
                rest = Some(&current[end..]);
                Some(&current[..start])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}
