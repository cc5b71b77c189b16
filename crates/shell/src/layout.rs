use core_types::{DEFAULT_SPLIT_PERCENT, MAX_SPLIT_PERCENT, MIN_SPLIT_PERCENT, ViewMode};
use serde::Serialize;
use tracing::debug;

/// Widths of the visible panes in percent of the container. A hidden pane is `None`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PaneWidths {
    pub editor: Option<f32>,
    pub preview: Option<f32>,
}

/// Position of the draggable divider between editor and preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitLayout {
    percent: f32,
    dragging: bool,
}

impl Default for SplitLayout {
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_PERCENT)
    }
}

impl SplitLayout {
    pub fn new(percent: f32) -> Self {
        Self {
            percent: clamp_percent(percent),
            dragging: false,
        }
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn set_percent(&mut self, percent: f32) {
        self.percent = clamp_percent(percent);
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Moves the divider to the pointer. Ignored unless a drag is in progress.
    pub fn drag_to(&mut self, pointer_x: f32, container_left: f32, container_width: f32) {
        if !self.dragging || !(container_width > 0.0) {
            return;
        }
        let percent = (pointer_x - container_left) / container_width * 100.0;
        self.set_percent(percent);
        debug!(percent = self.percent, "split dragged");
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pane_widths(&self, mode: ViewMode) -> PaneWidths {
        match mode {
            ViewMode::Write => PaneWidths {
                editor: Some(100.0),
                preview: None,
            },
            ViewMode::Read => PaneWidths {
                editor: None,
                preview: Some(100.0),
            },
            ViewMode::Both => PaneWidths {
                editor: Some(self.percent),
                preview: Some(100.0 - self.percent),
            },
        }
    }
}

fn clamp_percent(percent: f32) -> f32 {
    if percent.is_finite() {
        percent.clamp(MIN_SPLIT_PERCENT, MAX_SPLIT_PERCENT)
    } else {
        DEFAULT_SPLIT_PERCENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_allowed_range() {
        assert_eq!(SplitLayout::new(5.0).percent(), MIN_SPLIT_PERCENT);
        assert_eq!(SplitLayout::new(99.0).percent(), MAX_SPLIT_PERCENT);
        assert_eq!(SplitLayout::new(f32::NAN).percent(), DEFAULT_SPLIT_PERCENT);
        assert_eq!(SplitLayout::default().percent(), 55.0);
    }

    #[test]
    fn drag_follows_pointer_only_while_dragging() {
        let mut layout = SplitLayout::default();
        layout.drag_to(300.0, 100.0, 400.0);
        assert_eq!(layout.percent(), 55.0);

        layout.begin_drag();
        layout.drag_to(300.0, 100.0, 400.0);
        assert_eq!(layout.percent(), 50.0);

        layout.drag_to(110.0, 100.0, 400.0);
        assert_eq!(layout.percent(), MIN_SPLIT_PERCENT);

        layout.drag_to(200.0, 100.0, 0.0);
        assert_eq!(layout.percent(), MIN_SPLIT_PERCENT);

        layout.end_drag();
        assert!(!layout.is_dragging());
        layout.drag_to(400.0, 100.0, 400.0);
        assert_eq!(layout.percent(), MIN_SPLIT_PERCENT);
    }

    #[test]
    fn pane_widths_follow_mode() {
        let layout = SplitLayout::new(60.0);
        assert_eq!(
            layout.pane_widths(ViewMode::Write),
            PaneWidths {
                editor: Some(100.0),
                preview: None
            }
        );
        assert_eq!(
            layout.pane_widths(ViewMode::Read),
            PaneWidths {
                editor: None,
                preview: Some(100.0)
            }
        );
        assert_eq!(
            layout.pane_widths(ViewMode::Both),
            PaneWidths {
                editor: Some(60.0),
                preview: Some(40.0)
            }
        );
    }
}
