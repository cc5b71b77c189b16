use std::sync::Arc;

use core_types::{Clock, Note, NoteId, NotesSnapshot, SystemClock};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::action::{NoteAction, apply};

pub type SharedNotesStore = Arc<Mutex<NotesStore>>;

/// Owner of the note list and the active id.
///
/// Every mutation replaces the snapshot and publishes it on a watch channel;
/// persistence subscribes to that channel instead of being called directly.
pub struct NotesStore {
    state: NotesSnapshot,
    clock: Arc<dyn Clock>,
    publisher: watch::Sender<NotesSnapshot>,
}

impl NotesStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (publisher, _) = watch::channel(NotesSnapshot::default());
        Self {
            state: NotesSnapshot::default(),
            clock,
            publisher,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn into_shared(self) -> SharedNotesStore {
        Arc::new(Mutex::new(self))
    }

    /// Installs a previously persisted snapshot. Subscribers are not notified.
    pub fn hydrate(&mut self, mut snapshot: NotesSnapshot) {
        if let Some(stale) = snapshot.active_id.clone().filter(|id| !snapshot.contains(id)) {
            let repaired = snapshot.notes.first().map(|note| note.id.clone());
            debug!(%stale, repaired = ?repaired, "repairing dangling active id");
            snapshot.active_id = repaired;
        }

        info!(notes = snapshot.notes.len(), "notes state hydrated");
        self.publisher.send_if_modified(|current| {
            *current = snapshot.clone();
            false
        });
        self.state = snapshot;
    }

    pub fn snapshot(&self) -> &NotesSnapshot {
        &self.state
    }

    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    pub fn active_id(&self) -> Option<NoteId> {
        self.state.active_id.clone()
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.state.active_note()
    }

    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.state.find(id)
    }

    /// Receiver that observes every snapshot published after this call.
    pub fn subscribe(&self) -> watch::Receiver<NotesSnapshot> {
        self.publisher.subscribe()
    }

    pub fn create_note(&mut self) -> NoteId {
        let note = Note::new(NoteId::new_v4(), self.clock.now_ms());
        let id = note.id.clone();
        self.dispatch(NoteAction::Create { note });
        id
    }

    pub fn delete_note(&mut self, id: NoteId) {
        self.dispatch(NoteAction::Delete { id });
    }

    pub fn set_active(&mut self, id: Option<NoteId>) {
        self.dispatch(NoteAction::SetActive { id });
    }

    pub fn update_note_content(&mut self, id: NoteId, content: impl Into<String>) {
        let at = self.clock.now_ms();
        self.dispatch(NoteAction::UpdateContent {
            id,
            content: content.into(),
            at,
        });
    }

    pub fn rename_note(&mut self, id: NoteId, title: impl Into<String>) {
        let at = self.clock.now_ms();
        self.dispatch(NoteAction::Rename {
            id,
            title: title.into(),
            at,
        });
    }

    pub fn toggle_pin(&mut self, id: NoteId) {
        self.dispatch(NoteAction::TogglePin { id });
    }

    /// Guarantees there is something to edit: creates a note when the list is
    /// empty, otherwise activates the first note if none is active.
    pub fn ensure_active(&mut self) -> Option<NoteId> {
        if self.state.notes.is_empty() {
            return Some(self.create_note());
        }
        if self.state.active_id.is_none() {
            let first = self.state.notes.first().map(|note| note.id.clone());
            self.set_active(first);
        }
        self.state.active_id.clone()
    }

    fn dispatch(&mut self, action: NoteAction) {
        let kind = action.kind();
        let target = action.target();
        let creates = matches!(action, NoteAction::Create { .. });
        if let Some(id) = target.as_ref().filter(|id| !creates && !self.state.contains(id)) {
            debug!(action = kind, note_id = %id, "ignoring action for unknown note");
            return;
        }

        self.state = apply(&self.state, action);
        debug!(
            action = kind,
            note_id = ?target,
            notes = self.state.notes.len(),
            "notes state updated"
        );
        self.publisher.send_replace(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use core_types::DEFAULT_TITLE;

    use super::*;

    #[derive(Default)]
    struct StepClock {
        now: AtomicI64,
    }

    impl StepClock {
        fn set(&self, value: i64) {
            self.now.store(value, Ordering::SeqCst);
        }
    }

    impl Clock for StepClock {
        fn now_ms(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    fn store_with_clock() -> (NotesStore, Arc<StepClock>) {
        let clock = Arc::new(StepClock::default());
        (NotesStore::new(clock.clone()), clock)
    }

    fn assert_active_valid(store: &NotesStore) {
        if let Some(id) = store.active_id() {
            assert!(store.find(&id).is_some(), "dangling active id {id}");
        }
    }

    #[test]
    fn create_assigns_defaults_and_timestamps() {
        let (mut store, clock) = store_with_clock();
        clock.set(1_000);
        let id = store.create_note();

        let note = store.find(&id).expect("created note");
        assert_eq!(note.title, DEFAULT_TITLE);
        assert_eq!(note.created_at, 1_000);
        assert_eq!(note.updated_at, 1_000);
        assert_eq!(store.active_id(), Some(id));
    }

    #[test]
    fn active_id_stays_valid_across_create_delete_sequences() {
        let (mut store, _clock) = store_with_clock();
        let mut ids = Vec::new();
        for round in 0..6 {
            ids.push(store.create_note());
            assert_active_valid(&store);
            if round % 2 == 1 {
                let victim = ids.remove(round / 2 % ids.len());
                store.delete_note(victim);
                assert_active_valid(&store);
            }
        }
        for id in ids {
            store.delete_note(id);
            assert_active_valid(&store);
        }
        assert!(store.notes().is_empty());
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn create_then_delete_restores_prior_list() {
        let (mut store, _clock) = store_with_clock();
        let first = store.create_note();
        let second = store.create_note();
        store.set_active(Some(first));
        let before: Vec<NoteId> = store.notes().iter().map(|note| note.id.clone()).collect();

        let temp = store.create_note();
        store.delete_note(temp);

        let after: Vec<NoteId> = store.notes().iter().map(|note| note.id.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(store.active_id(), Some(second));
    }

    #[test]
    fn update_content_refreshes_updated_at_monotonically() {
        let (mut store, clock) = store_with_clock();
        clock.set(100);
        let id = store.create_note();

        clock.set(250);
        store.update_note_content(id.clone(), "# Hello\nWorld");
        let note = store.find(&id).expect("note");
        assert_eq!(note.updated_at, 250);
        assert_eq!(note.title, "Hello");

        clock.set(200);
        store.update_note_content(id.clone(), "later");
        assert!(store.find(&id).expect("note").updated_at >= 250);
    }

    #[test]
    fn hydrate_repairs_dangling_active_id() {
        let (mut store, _clock) = store_with_clock();
        let note = Note::new(NoteId::new_v4(), 5);
        let snapshot = NotesSnapshot {
            notes: vec![note.clone()],
            active_id: Some(NoteId::new_v4()),
        };
        store.hydrate(snapshot);
        assert_eq!(store.active_id(), Some(note.id));
    }

    #[test]
    fn ensure_active_creates_or_selects() {
        let (mut store, _clock) = store_with_clock();
        let created = store.ensure_active().expect("created note");
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.active_id(), Some(created.clone()));

        store.set_active(None);
        assert_eq!(store.ensure_active(), Some(created));
        assert_eq!(store.notes().len(), 1);
    }

    #[tokio::test]
    async fn mutations_are_published_to_subscribers() {
        let (mut store, _clock) = store_with_clock();
        let mut rx = store.subscribe();

        let id = store.create_note();
        rx.changed().await.expect("published");
        assert_eq!(rx.borrow_and_update().active_id, Some(id.clone()));

        store.toggle_pin(id);
        rx.changed().await.expect("published");
        assert!(rx.borrow_and_update().notes[0].pinned);
    }

    #[test]
    fn unknown_ids_do_not_publish() {
        let (mut store, _clock) = store_with_clock();
        store.create_note();
        let rx = store.subscribe();

        store.rename_note(NoteId::new_v4(), "ghost");
        store.set_active(Some(NoteId::new_v4()));
        assert!(!rx.has_changed().expect("sender alive"));
    }
}
