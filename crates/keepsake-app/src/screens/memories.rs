#![forbid(unsafe_code)]

//! Photo gallery with a full-size viewer.
//!
//! The viewer is only ever fed ids from the list this mount fetched, through
//! the selection cursor.

use keepsake_core::event::{Event, KeyCode};
use keepsake_runtime::{Cmd, Frame};
use keepsake_widgets::ImageViewer;

use super::{
    Content, ContentResult, HelpEntry, MountContext, Screen, ViewContext, content_status,
    fetch_photos, go, key, return_line,
};
use crate::app::AppMsg;
use crate::navigation::{ReturnContext, ScreenId};

pub struct Memories {
    content: Content,
    viewer: ImageViewer<String>,
    return_to: Option<ReturnContext>,
}

impl Memories {
    #[must_use]
    pub fn new() -> Self {
        Self {
            content: Content::Loading,
            viewer: ImageViewer::new(),
            return_to: None,
        }
    }

    #[must_use]
    pub fn viewer(&self) -> &ImageViewer<String> {
        &self.viewer
    }

    #[must_use]
    pub fn return_context(&self) -> Option<ReturnContext> {
        self.return_to
    }

    fn ids(&self) -> Vec<String> {
        self.content.items().iter().map(|i| i.id.clone()).collect()
    }
}

impl Default for Memories {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for Memories {
    fn on_enter(&mut self, ctx: &MountContext<'_>) -> Cmd<AppMsg> {
        self.return_to = ctx.nav.return_context;
        fetch_photos(ctx)
    }

    fn update(&mut self, event: &Event) -> Cmd<AppMsg> {
        let Some(code) = key(event) else {
            return Cmd::none();
        };
        let len = self.content.items().len();
        match code {
            KeyCode::Right | KeyCode::Down => self.viewer.select_next(len),
            KeyCode::Left | KeyCode::Up => self.viewer.select_prev(len),
            KeyCode::Enter => {
                let ids = self.ids();
                self.viewer.show_selected(&ids);
            }
            KeyCode::Escape => self.viewer.hide(),
            KeyCode::Char('n') => return go(ScreenId::Final),
            KeyCode::Char('r') => {
                if let Some(ctx) = self.return_to {
                    return go(ctx.screen());
                }
            }
            _ => {}
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame, _ctx: &ViewContext<'_>) {
        frame.line("Take a walk down memory lane");
        frame.line("A few moments we've shared...");
        frame.blank();
        if let Some(url) = self.viewer.shown() {
            frame.line(format!("[ {url} ]"));
            frame.line("  [Esc] Close");
            return;
        }
        content_status(frame, &self.content, "Loading memories...");
        for (i, item) in self.content.items().iter().enumerate() {
            let cursor = if i == self.viewer.selected() { '>' } else { ' ' };
            frame.line(format!("{cursor} {}", item.url().unwrap_or(item.id.as_str())));
        }
        frame.blank();
        frame.line("  [n] The Story of Us");
        return_line(frame, self.return_to);
    }

    fn on_content(&mut self, result: ContentResult) {
        self.content.apply(result);
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        let mut keys = vec![
            HelpEntry::new("←/→", "Select a photo"),
            HelpEntry::new("Enter", "View full size"),
            HelpEntry::new("Esc", "Close the viewer"),
            HelpEntry::new("n", "Continue"),
        ];
        if self.return_to.is_some() {
            keys.push(HelpEntry::new("r", "Return to Dashboard"));
        }
        keys
    }

    fn title(&self) -> &'static str {
        "Memories"
    }
}
