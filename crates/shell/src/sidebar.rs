use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use core_types::{DEFAULT_TITLE, Note, NoteId, NotesSnapshot};
use serde::Serialize;
use views::{Bucket, group_notes, preview_snippet, relative_date_label};

#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct NoteListItem {
    pub id: NoteId,
    pub title: String,
    pub date_label: String,
    pub preview: String,
    pub active: bool,
    pub pinned: bool,
}

#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct SidebarSection {
    pub bucket: Bucket,
    pub label: &'static str,
    pub items: Vec<NoteListItem>,
}

fn list_item<Tz>(note: &Note, active_id: Option<&NoteId>, now: &DateTime<Tz>) -> NoteListItem
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let title = if note.title.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        note.title.clone()
    };
    NoteListItem {
        id: note.id.clone(),
        title,
        date_label: relative_date_label(note.updated_at, now),
        preview: preview_snippet(&note.content),
        active: active_id == Some(&note.id),
        pinned: note.pinned,
    }
}

/// Sidebar contents: non-empty sections in display order.
pub fn sidebar_sections<Tz>(snapshot: &NotesSnapshot, now: &DateTime<Tz>) -> Vec<SidebarSection>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    group_notes(&snapshot.notes, now)
        .into_iter()
        .map(|group| SidebarSection {
            bucket: group.bucket,
            label: group.label(),
            items: group
                .items
                .into_iter()
                .map(|note| list_item(note, snapshot.active_id.as_ref(), now))
                .collect(),
        })
        .collect()
}
