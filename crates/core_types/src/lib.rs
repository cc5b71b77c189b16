use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque note identifier. New ids are UUID v4 strings, but any string read
/// back from storage is accepted as is.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

pub const DEFAULT_TITLE: &str = "Untitled";
pub const PLACEHOLDER_CONTENT: &str = "# New Note\n\nStart writing your markdown...";

pub const MIN_SPLIT_PERCENT: f32 = 15.0;
pub const MAX_SPLIT_PERCENT: f32 = 85.0;
pub const DEFAULT_SPLIT_PERCENT: f32 = 55.0;

/// A single markdown document. Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub pinned: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    pub fn new(id: NoteId, now_ms: i64) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            content: PLACEHOLDER_CONTENT.to_string(),
            pinned: false,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Whether the title is still the placeholder and may be derived from content.
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE || self.title.trim().is_empty()
    }
}

/// Everything that gets persisted: the note list and the active note.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotesSnapshot {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub active_id: Option<NoteId>,
}

impl NotesSnapshot {
    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.find(id).is_some()
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active_id.as_ref().and_then(|id| self.find(id))
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Write,
    Read,
    #[default]
    Both,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Write, ViewMode::Read, ViewMode::Both];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Write => "write",
            ViewMode::Read => "read",
            ViewMode::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub fn shows_editor(self) -> bool {
        matches!(self, ViewMode::Write | ViewMode::Both)
    }

    pub fn shows_preview(self) -> bool {
        matches!(self, ViewMode::Read | ViewMode::Both)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EditorTheme {
    #[default]
    Light,
    Dark,
}

impl EditorTheme {
    /// Theme name understood by the editor widget.
    pub fn editor_name(self) -> &'static str {
        match self {
            EditorTheme::Light => "light",
            EditorTheme::Dark => "vs-dark",
        }
    }
}

/// Opaque named-blob store used as the flat save target.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
