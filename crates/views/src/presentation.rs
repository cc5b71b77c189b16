use std::borrow::Cow;
use std::fmt::Display;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Local, TimeZone};
use core_types::DEFAULT_TITLE;
use regex::Regex;

use crate::local_datetime;

pub const MAX_PREVIEW_CHARS: usize = 60;

const IMAGE_PATTERN: &str = r"!\[[^\]]*\]\([^)]*\)";
const LINK_PATTERN: &str = r"\[([^\]]+)\]\([^)]*\)";

/// Compiles `pattern` once. `None` leaves the text unchanged.
fn cached_regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn replace_markup<'t>(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
    text: &'t str,
    replacement: &str,
) -> Cow<'t, str> {
    match cached_regex(cell, pattern) {
        Some(regex) => regex.replace_all(text, replacement),
        None => Cow::Borrowed(text),
    }
}

/// Short label for a note's last-update time, using calendar days in the zone of `now`.
pub fn relative_date_label<Tz>(updated_at_ms: i64, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(updated) = local_datetime(now, updated_at_ms) else {
        return String::new();
    };
    let today = now.date_naive();
    let day = updated.date_naive();

    if day == today {
        return updated.format("%H:%M").to_string();
    }
    if today.pred_opt() == Some(day) {
        return "Yesterday".to_string();
    }
    if (today - day).num_days() < 7 {
        return updated.format("%a").to_string();
    }
    if day.year() == today.year() {
        return updated.format("%b %-d").to_string();
    }
    updated.format("%-m/%-d/%Y").to_string()
}

pub fn relative_date_label_now(updated_at_ms: i64) -> String {
    relative_date_label(updated_at_ms, &Local::now())
}

/// One-line plain-text preview of a markdown body.
///
/// A leading heading is skipped when there is a line after it.
pub fn preview_snippet(markdown: &str) -> String {
    static IMAGE: OnceLock<Option<Regex>> = OnceLock::new();
    static LINK: OnceLock<Option<Regex>> = OnceLock::new();

    let lines: Vec<&str> = markdown
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    let Some(first) = lines.first() else {
        return String::new();
    };
    let candidate = match lines.get(1) {
        Some(second) if first.starts_with('#') => second,
        _ => first,
    };

    let without_images = replace_markup(&IMAGE, IMAGE_PATTERN, candidate, "");
    let with_link_text = replace_markup(&LINK, LINK_PATTERN, &without_images, "$1");
    let stripped: String = with_link_text
        .chars()
        .filter(|ch| !matches!(ch, '*' | '_' | '`' | '>' | '#' | '-'))
        .collect();

    let trimmed = stripped.trim();
    match trimmed.char_indices().nth(MAX_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Title to commit after inline editing in the list: trimmed, never blank.
pub fn rename_title(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}
