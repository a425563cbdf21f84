#![forbid(unsafe_code)]

use keepsake_core::event::Event;
use keepsake_runtime::{Cmd, Frame};

use super::{HelpEntry, Screen, ViewContext, go, is_continue, key};
use crate::app::AppMsg;
use crate::navigation::ScreenId;

pub struct Welcome;

impl Screen for Welcome {
    fn update(&mut self, event: &Event) -> Cmd<AppMsg> {
        match key(event) {
            Some(code) if is_continue(code) => go(ScreenId::Cake),
            _ => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame, _ctx: &ViewContext<'_>) {
        frame.line("Happy Birthday!");
        frame.blank();
        frame.line("The surprise is just beginning...");
        frame.blank();
        frame.line("  [Enter] Click to continue");
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![HelpEntry::new("Enter/n", "Continue")]
    }

    fn title(&self) -> &'static str {
        "Welcome"
    }
}
