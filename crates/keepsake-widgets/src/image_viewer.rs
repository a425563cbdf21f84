#![forbid(unsafe_code)]

//! Full-size image viewer over a gallery.
//!
//! `show` replaces whatever is shown; there is no stack. Whether an id
//! belongs to the current gallery is the caller's business.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState<Id> {
    Hidden,
    Showing(Id),
}

/// Viewer state plus a keyboard selection cursor over the gallery.
#[derive(Debug, Clone)]
pub struct ImageViewer<Id> {
    state: ViewerState<Id>,
    selected: usize,
}

impl<Id> Default for ImageViewer<Id> {
    fn default() -> Self {
        Self {
            state: ViewerState::Hidden,
            selected: 0,
        }
    }
}

impl<Id> ImageViewer<Id> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &ViewerState<Id> {
        &self.state
    }

    /// Show `id`, replacing any shown item.
    pub fn show(&mut self, id: Id) {
        self.state = ViewerState::Showing(id);
    }

    /// Hide the viewer. Idempotent.
    pub fn hide(&mut self) {
        self.state = ViewerState::Hidden;
    }

    /// The shown item.
    #[must_use]
    pub fn shown(&self) -> Option<&Id> {
        match &self.state {
            ViewerState::Showing(id) => Some(id),
            ViewerState::Hidden => None,
        }
    }

    #[must_use]
    pub fn is_showing(&self) -> bool {
        matches!(self.state, ViewerState::Showing(_))
    }

    /// Index of the highlighted gallery entry.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Move the cursor forward, wrapping over `len` entries.
    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected.min(len - 1) + 1) % len;
        }
    }

    /// Move the cursor back, wrapping over `len` entries.
    pub fn select_prev(&mut self, len: usize) {
        if len > 0 {
            let cur = self.selected.min(len - 1);
            self.selected = if cur == 0 { len - 1 } else { cur - 1 };
        }
    }
}

impl<Id: Clone> ImageViewer<Id> {
    /// Show the highlighted entry of `items`. No-op on an empty gallery.
    pub fn show_selected(&mut self, items: &[Id]) -> bool {
        let Some(last) = items.len().checked_sub(1) else {
            return false;
        };
        let id = items[self.selected.min(last)].clone();
        self.show(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_replaces_instead_of_stacking() {
        let mut viewer = ImageViewer::new();
        viewer.show("a");
        viewer.show("b");
        assert_eq!(viewer.state(), &ViewerState::Showing("b"));
        viewer.hide();
        assert_eq!(viewer.state(), &ViewerState::Hidden);
    }

    #[test]
    fn hide_is_idempotent() {
        let mut viewer: ImageViewer<&str> = ImageViewer::new();
        viewer.hide();
        viewer.hide();
        assert!(!viewer.is_showing());
        assert_eq!(viewer.shown(), None);
    }

    #[test]
    fn cursor_wraps() {
        let mut viewer: ImageViewer<u8> = ImageViewer::new();
        viewer.select_prev(3);
        assert_eq!(viewer.selected(), 2);
        viewer.select_next(3);
        assert_eq!(viewer.selected(), 0);
        viewer.select_next(0);
        assert_eq!(viewer.selected(), 0);
    }

    #[test]
    fn show_selected_uses_cursor() {
        let items = ["x", "y", "z"];
        let mut viewer = ImageViewer::new();
        viewer.select_next(items.len());
        assert!(viewer.show_selected(&items));
        assert_eq!(viewer.shown(), Some(&"y"));
        assert!(!viewer.show_selected(&[]));
        assert_eq!(viewer.shown(), Some(&"y"));
    }
}
