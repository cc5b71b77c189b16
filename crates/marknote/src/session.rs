use std::fmt::Write as _;

use core_types::NoteId;
use shell::{EditorShell, SidebarSection};
use tracing::debug;

use crate::commands::{Command, HELP};

/// Result of running one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Output(String),
    Quit,
}

impl Outcome {
    fn text(text: impl Into<String>) -> Self {
        Outcome::Output(text.into())
    }
}

/// Terminal front end over the editor shell. Keeps the numbering of the last
/// `list` so `open <n>` refers to what the user saw.
pub struct Session {
    shell: EditorShell,
    listed: Vec<NoteId>,
}

impl Session {
    pub fn new(shell: EditorShell) -> Self {
        Self {
            shell,
            listed: Vec::new(),
        }
    }

    pub fn shell(&self) -> &EditorShell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut EditorShell {
        &mut self.shell
    }

    pub fn execute(&mut self, command: Command) -> Outcome {
        debug!(?command, "executing command");
        match command {
            Command::New => {
                self.shell.new_note();
                Outcome::text("created a new note")
            }
            Command::List => Outcome::Output(self.render_list()),
            Command::Open(index) => self.open(index),
            Command::Write(text) => self.edit(text),
            Command::Append(text) => {
                let Some(current) = self.shell.active_text() else {
                    return Outcome::text("no note is open");
                };
                let joined = if current.is_empty() {
                    text
                } else {
                    format!("{current}\n{text}")
                };
                self.edit(joined)
            }
            Command::Rename(title) => match self.shell.rename_active(&title) {
                Some(_) => Outcome::text(format!("renamed to `{title}`")),
                None => Outcome::text("no note is open"),
            },
            Command::Pin => {
                let Some(id) = self.shell.toggle_pin_active() else {
                    return Outcome::text("no note is open");
                };
                let pinned = self
                    .shell
                    .store()
                    .lock()
                    .find(&id)
                    .is_some_and(|note| note.pinned);
                Outcome::text(if pinned { "pinned" } else { "unpinned" })
            }
            Command::Delete => match self.shell.delete_active() {
                Some(_) => Outcome::text("deleted"),
                None => Outcome::text("no note is open"),
            },
            Command::Mode(mode) => {
                self.shell.set_mode(mode);
                Outcome::text(format!("mode: {}", mode.as_str()))
            }
            Command::Split(percent) => {
                self.shell.set_split_percent(percent);
                Outcome::text(format!("split: {:.0}%", self.shell.layout().percent()))
            }
            Command::Show => Outcome::Output(self.render_panes()),
            Command::Preview => match self.shell.preview_props() {
                Some(props) => Outcome::Output(props.render_html()),
                None => Outcome::text("preview is hidden in write mode"),
            },
            Command::Help => Outcome::text(HELP),
            Command::Quit => Outcome::Quit,
        }
    }

    fn edit(&mut self, text: String) -> Outcome {
        if self.shell.active_id().is_none() {
            return Outcome::text("no note is open");
        }
        let chars = text.chars().count();
        self.shell.on_editor_change(text);
        Outcome::text(format!("{chars} characters"))
    }

    fn open(&mut self, index: usize) -> Outcome {
        if self.listed.is_empty() {
            self.listed = flatten(&self.shell.sidebar_now());
        }
        let Some(id) = index.checked_sub(1).and_then(|i| self.listed.get(i)).cloned() else {
            return Outcome::text(format!("no note #{index}, run `list`"));
        };
        self.shell.select(id.clone());
        if self.shell.active_id() == Some(id) {
            Outcome::Output(self.render_panes())
        } else {
            Outcome::text(format!("note #{index} no longer exists"))
        }
    }

    fn render_list(&mut self) -> String {
        let sections = self.shell.sidebar_now();
        self.listed = flatten(&sections);
        if sections.is_empty() {
            return "no notes".to_string();
        }

        let mut out = String::new();
        let mut number = 0;
        for section in &sections {
            let _ = writeln!(out, "{}", section.label);
            for item in &section.items {
                number += 1;
                let marker = if item.active { '>' } else { ' ' };
                let _ = writeln!(
                    out,
                    "{marker}{number:>3}. {}  [{}]",
                    item.title, item.date_label
                );
                if !item.preview.is_empty() {
                    let _ = writeln!(out, "       {}", item.preview);
                }
            }
        }
        out.trim_end().to_string()
    }

    fn render_panes(&self) -> String {
        let title = {
            let store = self.shell.store().lock();
            match store.active_note() {
                Some(note) => note.title.clone(),
                None => return "no note is open".to_string(),
            }
        };

        let widths = self.shell.pane_widths();
        let mut out = format!("== {title} ({}) ==", self.shell.mode().as_str());
        if let (Some(props), Some(width)) = (self.shell.editor_props(), widths.editor) {
            let _ = write!(out, "\n-- editor {width:.0}% --\n{}", props.value);
        }
        if let (Some(props), Some(width)) = (self.shell.preview_props(), widths.preview) {
            let _ = write!(out, "\n-- preview {width:.0}% --\n{}", props.render_text());
        }
        out
    }
}

fn flatten(sections: &[SidebarSection]) -> Vec<NoteId> {
    sections
        .iter()
        .flat_map(|section| section.items.iter().map(|item| item.id.clone()))
        .collect()
}
