pub mod debounce;
pub mod layout;
pub mod preview;
pub mod shell;
pub mod sidebar;

pub use debounce::Debouncer;
pub use layout::{PaneWidths, SplitLayout};
pub use preview::{EMPTY_PREVIEW, EditorProps, PreviewProps, render_markdown};
pub use shell::{EditorShell, ShellOptions};
pub use sidebar::{NoteListItem, SidebarSection, sidebar_sections};
