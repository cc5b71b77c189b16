use core_types::DEFAULT_TITLE;

pub const MAX_TITLE_CHARS: usize = 120;

/// Title taken from the first non-empty line of `content`, without heading markup.
pub fn derive_title(content: &str) -> String {
    let first_line = content
        .lines()
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    let heading = first_line.trim_start().trim_start_matches('#').trim();
    if heading.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    truncate_chars(heading, MAX_TITLE_CHARS)
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_heading_marker() {
        assert_eq!(derive_title("# Hello\nWorld"), "Hello");
        assert_eq!(derive_title("### Deep heading"), "Deep heading");
    }

    #[test]
    fn uses_plain_first_line() {
        assert_eq!(derive_title("Just text"), "Just text");
        assert_eq!(derive_title("\n\r\n  Indented line  \nsecond"), "Indented line");
    }

    #[test]
    fn falls_back_to_default_title() {
        assert_eq!(derive_title(""), DEFAULT_TITLE);
        assert_eq!(derive_title("#   \nbody"), DEFAULT_TITLE);
    }

    #[test]
    fn truncates_long_titles_by_characters() {
        let long = "é".repeat(150);
        let title = derive_title(&long);
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS + 1);
        assert!(title.ends_with('…'));

        let exact = "a".repeat(MAX_TITLE_CHARS);
        assert_eq!(derive_title(&exact), exact);
    }
}
