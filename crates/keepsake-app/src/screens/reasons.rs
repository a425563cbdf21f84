#![forbid(unsafe_code)]

use keepsake_core::event::{Event, KeyCode};
use keepsake_runtime::{Cmd, Frame};

use super::{
    Content, ContentResult, HelpEntry, MountContext, Screen, ViewContext, content_status,
    fetch_reasons, go, is_continue, key,
};
use crate::app::AppMsg;
use crate::navigation::ScreenId;

/// Capped list of reasons.
pub struct Reasons {
    limit: usize,
    content: Content,
}

impl Reasons {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            content: Content::Loading,
        }
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }
}

impl Screen for Reasons {
    fn on_enter(&mut self, ctx: &MountContext<'_>) -> Cmd<AppMsg> {
        fetch_reasons(ctx, Some(self.limit))
    }

    fn update(&mut self, event: &Event) -> Cmd<AppMsg> {
        match key(event) {
            Some(KeyCode::Char('d')) => go(ScreenId::Dashboard),
            Some(code) if is_continue(code) => go(ScreenId::Memories),
            _ => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame, _ctx: &ViewContext<'_>) {
        frame.line("Reasons I'm Obsessed");
        frame.line(format!(
            "An Incomplete List Starting with these {}...",
            self.limit
        ));
        frame.blank();
        content_status(frame, &self.content, "Loading reasons...");
        for (i, item) in self.content.items().iter().enumerate() {
            frame.line(format!(
                "{:>2}. {} {}",
                i + 1,
                item.icon().unwrap_or_default(),
                item.text().unwrap_or_default()
            ));
        }
        frame.blank();
        frame.line("  [Enter] Continue    [d] Go to Dashboard");
    }

    fn on_content(&mut self, result: ContentResult) {
        self.content.apply(result);
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![
            HelpEntry::new("Enter/n", "Continue"),
            HelpEntry::new("d", "Go to Dashboard"),
        ]
    }

    fn title(&self) -> &'static str {
        "Reasons"
    }
}
