#![forbid(unsafe_code)]

use keepsake_core::event::{Event, KeyCode};
use keepsake_runtime::{Cmd, Frame};

use super::{HelpEntry, Screen, ViewContext, go, key};
use crate::app::AppMsg;
use crate::navigation::ScreenId;

/// End of the story. Loops back to the dashboard on request.
pub struct Final;

impl Screen for Final {
    fn update(&mut self, event: &Event) -> Cmd<AppMsg> {
        match key(event) {
            Some(KeyCode::Enter | KeyCode::Char('d')) => go(ScreenId::Dashboard),
            _ => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame, _ctx: &ViewContext<'_>) {
        frame.line("The Story of Us");
        frame.blank();
        frame.line("...is still being written. Happy birthday, my love.");
        frame.blank();
        frame.line("  [Enter] See Your Keepsakes");
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![HelpEntry::new("Enter/d", "See Your Keepsakes")]
    }

    fn title(&self) -> &'static str {
        "Final"
    }
}
