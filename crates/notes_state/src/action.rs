use core_types::{Note, NoteId, NotesSnapshot};
use serde::{Deserialize, Serialize};

use crate::title::derive_title;

/// A state transition. Timestamps are supplied by the caller so `apply` stays pure.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoteAction {
    Create {
        note: Note,
    },
    Delete {
        id: NoteId,
    },
    SetActive {
        id: Option<NoteId>,
    },
    UpdateContent {
        id: NoteId,
        content: String,
        at: i64,
    },
    Rename {
        id: NoteId,
        title: String,
        at: i64,
    },
    TogglePin {
        id: NoteId,
    },
}

impl NoteAction {
    pub fn kind(&self) -> &'static str {
        match self {
            NoteAction::Create { .. } => "create",
            NoteAction::Delete { .. } => "delete",
            NoteAction::SetActive { .. } => "set_active",
            NoteAction::UpdateContent { .. } => "update_content",
            NoteAction::Rename { .. } => "rename",
            NoteAction::TogglePin { .. } => "toggle_pin",
        }
    }

    /// The note this action targets, if it targets one.
    pub fn target(&self) -> Option<NoteId> {
        match self {
            NoteAction::Create { note } => Some(note.id.clone()),
            NoteAction::Delete { id }
            | NoteAction::UpdateContent { id, .. }
            | NoteAction::Rename { id, .. }
            | NoteAction::TogglePin { id } => Some(id.clone()),
            NoteAction::SetActive { id } => id.clone(),
        }
    }
}

/// Returns the snapshot that results from applying `action` to `state`.
///
/// Actions naming an id that is not in the list leave the state unchanged.
pub fn apply(state: &NotesSnapshot, action: NoteAction) -> NotesSnapshot {
    match action {
        NoteAction::Create { note } => {
            let active_id = Some(note.id.clone());
            let mut notes = Vec::with_capacity(state.notes.len() + 1);
            notes.push(note);
            notes.extend(state.notes.iter().cloned());
            NotesSnapshot { notes, active_id }
        }
        NoteAction::Delete { id } => {
            let notes: Vec<Note> = state
                .notes
                .iter()
                .filter(|note| note.id != id)
                .cloned()
                .collect();
            let active_id = if state.active_id.as_ref() == Some(&id) {
                notes.first().map(|note| note.id.clone())
            } else {
                state.active_id.clone()
            };
            NotesSnapshot { notes, active_id }
        }
        NoteAction::SetActive { id } => {
            if id.as_ref().is_some_and(|id| !state.contains(id)) {
                return state.clone();
            }
            NotesSnapshot {
                notes: state.notes.clone(),
                active_id: id,
            }
        }
        NoteAction::UpdateContent { id, content, at } => map_note(state, &id, |note| {
            if note.has_default_title() {
                note.title = derive_title(&content);
            }
            note.content = content;
            note.updated_at = note.updated_at.max(at);
        }),
        NoteAction::Rename { id, title, at } => map_note(state, &id, |note| {
            note.title = title;
            note.updated_at = note.updated_at.max(at);
        }),
        NoteAction::TogglePin { id } => map_note(state, &id, |note| {
            note.pinned = !note.pinned;
        }),
    }
}

fn map_note(state: &NotesSnapshot, id: &NoteId, update: impl FnOnce(&mut Note)) -> NotesSnapshot {
    let mut next = state.clone();
    if let Some(note) = next.notes.iter_mut().find(|note| &note.id == id) {
        update(note);
    }
    next
}
