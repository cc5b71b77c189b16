use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use core_types::{DEFAULT_SPLIT_PERCENT, EditorTheme, NoteId, ViewMode};
use notes_state::SharedNotesStore;
use tracing::{debug, info};
use views::rename_title;

use crate::debounce::Debouncer;
use crate::layout::{PaneWidths, SplitLayout};
use crate::preview::{EditorProps, PreviewProps};
use crate::sidebar::{SidebarSection, sidebar_sections};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellOptions {
    pub debounce: Duration,
    pub view_mode: ViewMode,
    pub split_percent: f32,
    pub theme: EditorTheme,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            view_mode: ViewMode::Both,
            split_percent: DEFAULT_SPLIT_PERCENT,
            theme: EditorTheme::Light,
        }
    }
}

/// The main panel: editor and preview around the active note.
///
/// Editor keystrokes are debounced before they reach the store. The shell keeps
/// the latest draft so the editor never shows a value older than what was typed.
/// Must be used from within a tokio runtime.
pub struct EditorShell {
    store: SharedNotesStore,
    mode: ViewMode,
    layout: SplitLayout,
    theme: EditorTheme,
    draft: Option<(NoteId, String)>,
    debouncer: Debouncer<(NoteId, String)>,
}

impl EditorShell {
    pub fn new(store: SharedNotesStore, options: ShellOptions) -> Self {
        let target = store.clone();
        let debouncer = Debouncer::new(options.debounce, move |(id, content): (NoteId, String)| {
            debug!(note_id = %id, chars = content.chars().count(), "applying debounced edit");
            target.lock().update_note_content(id, content);
        });
        Self {
            store,
            mode: options.view_mode,
            layout: SplitLayout::new(options.split_percent),
            theme: options.theme,
            draft: None,
            debouncer,
        }
    }

    pub fn store(&self) -> &SharedNotesStore {
        &self.store
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            debug!(from = self.mode.as_str(), to = mode.as_str(), "view mode changed");
        }
        self.mode = mode;
    }

    pub fn theme(&self) -> EditorTheme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: EditorTheme) {
        self.theme = theme;
    }

    pub fn layout(&self) -> &SplitLayout {
        &self.layout
    }

    pub fn set_split_percent(&mut self, percent: f32) {
        self.layout.set_percent(percent);
    }

    pub fn begin_split_drag(&mut self) {
        self.layout.begin_drag();
    }

    pub fn drag_split(&mut self, pointer_x: f32, container_left: f32, container_width: f32) {
        self.layout.drag_to(pointer_x, container_left, container_width);
    }

    pub fn end_split_drag(&mut self) {
        self.layout.end_drag();
    }

    pub fn pane_widths(&self) -> PaneWidths {
        self.layout.pane_widths(self.mode)
    }

    pub fn active_id(&self) -> Option<NoteId> {
        self.store.lock().active_id()
    }

    fn active_content(&self) -> Option<(NoteId, String)> {
        let store = self.store.lock();
        let note = store.active_note()?;
        match &self.draft {
            Some((id, draft)) if *id == note.id => Some((note.id.clone(), draft.clone())),
            _ => Some((note.id.clone(), note.content.clone())),
        }
    }

    /// Props for the editor pane, or `None` when it is hidden or nothing is active.
    pub fn editor_props(&self) -> Option<EditorProps> {
        if !self.mode.shows_editor() {
            return None;
        }
        let (_, value) = self.active_content()?;
        Some(EditorProps::new(value, self.theme))
    }

    /// Props for the preview pane, or `None` when it is hidden or nothing is active.
    pub fn preview_props(&self) -> Option<PreviewProps> {
        if !self.mode.shows_preview() {
            return None;
        }
        let (_, markdown) = self.active_content()?;
        Some(PreviewProps { markdown })
    }

    /// Current text of the active note as the editor sees it, including an unapplied draft.
    pub fn active_text(&self) -> Option<String> {
        self.active_content().map(|(_, text)| text)
    }

    /// Editor change handler. The active id is captured now, not when the edit lands.
    pub fn on_editor_change(&mut self, content: impl Into<String>) {
        let Some(id) = self.active_id() else {
            debug!("editor change without an active note");
            return;
        };
        let content = content.into();
        self.draft = Some((id.clone(), content.clone()));
        self.debouncer.call((id, content));
    }

    pub fn has_pending_edit(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Applies a pending edit now. Returns whether there was one.
    pub fn flush_pending_edit(&mut self) -> bool {
        self.debouncer.flush()
    }

    pub fn new_note(&mut self) -> NoteId {
        self.flush_pending_edit();
        let mut store = self.store.lock();
        let id = store.create_note();
        store.set_active(Some(id.clone()));
        info!(note_id = %id, "note created");
        id
    }

    pub fn select(&mut self, id: NoteId) {
        self.flush_pending_edit();
        self.store.lock().set_active(Some(id));
    }

    pub fn delete(&mut self, id: NoteId) {
        if self.draft.as_ref().is_some_and(|(draft_id, _)| *draft_id == id) {
            self.debouncer.cancel();
            self.draft = None;
        }
        self.flush_pending_edit();
        info!(note_id = %id, "note deleted");
        self.store.lock().delete_note(id);
    }

    pub fn delete_active(&mut self) -> Option<NoteId> {
        let id = self.active_id()?;
        self.delete(id.clone());
        Some(id)
    }

    /// Top-bar rename: the title is stored as typed.
    pub fn rename_active(&mut self, title: &str) -> Option<NoteId> {
        let mut store = self.store.lock();
        let id = store.active_id()?;
        store.rename_note(id.clone(), title);
        Some(id)
    }

    /// Inline rename from the note list: trimmed, blank becomes the default title.
    pub fn commit_list_rename(&mut self, id: NoteId, input: &str) {
        self.store.lock().rename_note(id, rename_title(input));
    }

    pub fn toggle_pin(&mut self, id: NoteId) {
        self.store.lock().toggle_pin(id);
    }

    pub fn toggle_pin_active(&mut self) -> Option<NoteId> {
        let mut store = self.store.lock();
        let id = store.active_id()?;
        store.toggle_pin(id.clone());
        Some(id)
    }

    pub fn ensure_active(&mut self) -> Option<NoteId> {
        self.store.lock().ensure_active()
    }

    pub fn sidebar<Tz>(&self, now: &DateTime<Tz>) -> Vec<SidebarSection>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        sidebar_sections(self.store.lock().snapshot(), now)
    }

    pub fn sidebar_now(&self) -> Vec<SidebarSection> {
        self.sidebar(&Local::now())
    }
}

#[cfg(test)]
mod tests {
    use notes_state::NotesStore;

    use super::*;

    fn shell() -> EditorShell {
        let store = NotesStore::with_system_clock().into_shared();
        let mut shell = EditorShell::new(store, ShellOptions::default());
        shell.ensure_active();
        shell
    }

    async fn wait_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
    }

    fn stored_content(shell: &EditorShell, id: &NoteId) -> String {
        shell
            .store()
            .lock()
            .find(id)
            .map(|note| note.content.clone())
            .expect("note exists")
    }

    #[tokio::test(start_paused = true)]
    async fn edits_land_after_quiet_period() {
        let mut shell = shell();
        let id = shell.active_id().expect("active");

        shell.on_editor_change("# Dra");
        shell.on_editor_change("# Draft\nbody");
        assert_eq!(shell.editor_props().expect("editor").value, "# Draft\nbody");
        assert_ne!(stored_content(&shell, &id), "# Draft\nbody");

        wait_ms(250).await;
        assert_eq!(stored_content(&shell, &id), "# Draft\nbody");
        let title = shell.store().lock().find(&id).map(|note| note.title.clone());
        assert_eq!(title.as_deref(), Some("Draft"));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_edit_stays_with_the_note_it_was_typed_in() {
        let mut shell = shell();
        let first = shell.active_id().expect("active");

        shell.on_editor_change("first body");
        let second = shell.new_note();
        assert_eq!(stored_content(&shell, &first), "first body");

        shell.on_editor_change("second body");
        wait_ms(250).await;
        assert_eq!(stored_content(&shell, &second), "second body");
        assert_eq!(stored_content(&shell, &first), "first body");
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_another_note_applies_the_pending_edit_first() {
        let mut shell = shell();
        let second = shell.active_id().expect("active");
        let first = shell.new_note();

        shell.on_editor_change("typed in first");
        assert!(shell.has_pending_edit());
        shell.select(second.clone());

        assert!(!shell.has_pending_edit());
        assert_eq!(shell.active_id(), Some(second.clone()));
        assert_eq!(stored_content(&shell, &first), "typed in first");

        wait_ms(250).await;
        assert_eq!(stored_content(&shell, &first), "typed in first");
        assert_ne!(stored_content(&shell, &second), "typed in first");
    }

    #[tokio::test(start_paused = true)]
    async fn deleting_a_note_drops_its_pending_edit() {
        let mut shell = shell();
        let first = shell.active_id().expect("active");
        let second = shell.new_note();

        shell.on_editor_change("doomed");
        assert_eq!(shell.delete_active(), Some(second));
        assert!(!shell.has_pending_edit());
        assert_eq!(shell.active_id(), Some(first));
        wait_ms(250).await;
        assert_eq!(shell.store().lock().notes().len(), 1);
    }

    #[tokio::test]
    async fn mode_controls_visible_panes() {
        let mut shell = shell();
        assert!(shell.editor_props().is_some() && shell.preview_props().is_some());

        shell.set_mode(ViewMode::Read);
        assert!(shell.editor_props().is_none());
        assert_eq!(shell.pane_widths().preview, Some(100.0));

        shell.set_mode(ViewMode::Write);
        assert!(shell.preview_props().is_none());
        assert_eq!(shell.editor_props().expect("editor").theme, "light");
    }

    #[tokio::test]
    async fn renames_differ_between_top_bar_and_list() {
        let mut shell = shell();
        let id = shell.active_id().expect("active");
        let title = |shell: &EditorShell| {
            shell
                .store()
                .lock()
                .find(&id)
                .map(|note| note.title.clone())
                .expect("note")
        };

        shell.rename_active("  spaced  ");
        assert_eq!(title(&shell), "  spaced  ");

        shell.commit_list_rename(id.clone(), "  spaced  ");
        assert_eq!(title(&shell), "spaced");

        shell.commit_list_rename(id.clone(), "   ");
        assert_eq!(title(&shell), "Untitled");
    }

    #[tokio::test]
    async fn pinned_notes_move_to_pinned_section() {
        let mut shell = shell();
        shell.toggle_pin_active();
        let sections = shell.sidebar_now();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label, "Pinned");
        assert!(sections[0].items[0].active);
    }
}
