#![forbid(unsafe_code)]

//! Card screen: the sealed letter.

use keepsake_core::event::{Event, KeyCode};
use keepsake_runtime::{Cmd, Frame};
use keepsake_widgets::{Envelope, LetterPresentation};

use super::{HelpEntry, MountContext, Screen, ViewContext, go, is_continue, key, return_line};
use crate::app::AppMsg;
use crate::navigation::{ReturnContext, ScreenId};

pub const LETTER: &[&str] = &[
    "My love,",
    "",
    "Another year of you, and somehow I'm still finding new",
    "things to adore. Thank you for every laugh, every late",
    "night, every quiet morning.",
    "",
    "Happy birthday. Here's to all the chapters still to come.",
];

pub struct Card {
    envelope: Envelope,
    return_to: Option<ReturnContext>,
}

impl Card {
    #[must_use]
    pub fn new(presentation: LetterPresentation) -> Self {
        Self {
            envelope: Envelope::new(presentation),
            return_to: None,
        }
    }

    #[must_use]
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl Screen for Card {
    fn on_enter(&mut self, ctx: &MountContext<'_>) -> Cmd<AppMsg> {
        self.return_to = ctx.nav.return_context;
        Cmd::none()
    }

    fn update(&mut self, event: &Event) -> Cmd<AppMsg> {
        let Some(code) = key(event) else {
            return Cmd::none();
        };
        match code {
            KeyCode::Char('o' | ' ') => self.envelope.toggle(),
            KeyCode::Char('v') => {
                self.envelope.view_letter();
            }
            KeyCode::Char('c') | KeyCode::Escape => {
                self.envelope.close();
            }
            KeyCode::Char('d') => return go(ScreenId::Dashboard),
            KeyCode::Char('r') => {
                if let Some(ctx) = self.return_to {
                    return go(ctx.screen());
                }
            }
            code if is_continue(code) => return go(ScreenId::Reasons),
            _ => {}
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame, _ctx: &ViewContext<'_>) {
        frame.line("A Special Letter for You");
        frame.blank();
        if self.envelope.overlay_visible() {
            frame.line("┌─ Your Letter ─────────────────────────────");
            for line in LETTER {
                frame.line(format!("│ {line}"));
            }
            frame.line("└───────────────────────────────────────────");
        } else if self.envelope.slide_visible() {
            for line in LETTER {
                frame.line(format!("  {line}"));
            }
        } else {
            frame.line("  ✉  (sealed)");
        }
        frame.blank();
        match (self.envelope.presentation(), self.envelope.is_open()) {
            (LetterPresentation::Overlay, false) => frame.line("  [v] Open the Letter 💌"),
            (_, true) => frame.line("  [c] Close the letter"),
            (LetterPresentation::Slide, false) => frame.line("  [o] Open the envelope"),
        }
        frame.line("  [Enter] Continue");
        frame.line("  [d] Go to Dashboard");
        return_line(frame, self.return_to);
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        let mut keys = vec![
            HelpEntry::new("o/Space", "Open or close the envelope"),
            HelpEntry::new("c/Esc", "Close the letter"),
            HelpEntry::new("Enter/n", "Continue"),
            HelpEntry::new("d", "Go to Dashboard"),
        ];
        if self.envelope.presentation() == LetterPresentation::Overlay {
            keys.insert(1, HelpEntry::new("v", "View the full letter"));
        }
        if self.return_to.is_some() {
            keys.push(HelpEntry::new("r", "Return to Dashboard"));
        }
        keys
    }

    fn title(&self) -> &'static str {
        "Card"
    }
}
