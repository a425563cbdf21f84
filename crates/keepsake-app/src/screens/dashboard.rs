#![forbid(unsafe_code)]

//! Keepsake dashboard.
//!
//! Hosts the non-gating widgets: a random reason over the full list, the
//! free-toggling candle and an envelope. The letter and memories tiles cross
//! back into the story with [`ReturnContext::Dashboard`].

use keepsake_core::event::{Event, KeyCode};
use keepsake_runtime::{Cmd, Frame};
use keepsake_store::ContentItem;
use keepsake_widgets::{Candle, Envelope, PickControl, RandomPicker};

use super::{
    Content, ContentResult, HelpEntry, MountContext, Screen, ViewContext, content_status,
    fetch_reasons, go_from, key,
};
use crate::app::AppMsg;
use crate::navigation::{ReturnContext, ScreenId};

pub struct Dashboard {
    reasons: Content,
    picker: RandomPicker,
    shown: Option<ContentItem>,
    candle: Candle,
    envelope: Envelope,
}

impl Dashboard {
    /// `seed` makes the reason sequence reproducible.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            reasons: Content::Loading,
            picker: seed.map_or_else(RandomPicker::from_entropy, RandomPicker::seeded),
            shown: None,
            candle: Candle::toggle_widget(),
            envelope: Envelope::default(),
        }
    }

    #[must_use]
    pub fn pick_control(&self) -> PickControl {
        PickControl::for_items(self.reasons.is_loading(), self.reasons.items().len())
    }

    #[must_use]
    pub fn shown_reason(&self) -> Option<&ContentItem> {
        self.shown.as_ref()
    }

    #[must_use]
    pub fn candle(&self) -> &Candle {
        &self.candle
    }

    #[must_use]
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn show_reason(&mut self) {
        if !self.pick_control().is_enabled() {
            tracing::debug!("reason control disabled");
            return;
        }
        self.shown = self.picker.pick(self.reasons.items()).cloned();
    }
}

impl Screen for Dashboard {
    fn on_enter(&mut self, ctx: &MountContext<'_>) -> Cmd<AppMsg> {
        fetch_reasons(ctx, None)
    }

    fn update(&mut self, event: &Event) -> Cmd<AppMsg> {
        let Some(code) = key(event) else {
            return Cmd::none();
        };
        match code {
            KeyCode::Char('s') | KeyCode::Enter => self.show_reason(),
            KeyCode::Char('c') => {
                let _ = self.candle.toggle();
            }
            KeyCode::Char('e') => self.envelope.toggle(),
            KeyCode::Char('l') => return go_from(ScreenId::Card, ReturnContext::Dashboard),
            KeyCode::Char('m') => return go_from(ScreenId::Memories, ReturnContext::Dashboard),
            _ => {}
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame, _ctx: &ViewContext<'_>) {
        frame.line("A Collection for My Love ❤️");
        frame.blank();

        match &self.shown {
            Some(item) => frame.line(format!(
                "{} {}",
                item.icon().unwrap_or_default(),
                item.text().unwrap_or_default()
            )),
            None => frame.line("Click the button to see a reason!"),
        }
        content_status(frame, &self.reasons, "Loading reasons...");
        if self.pick_control().is_enabled() {
            frame.line("  [s] Show me a reason");
        } else {
            frame.line("  [-] Show me a reason (unavailable)");
        }
        frame.blank();

        if self.candle.is_lit() {
            frame.line("  🕯  [c] Blow out candle 🎂");
        } else {
            frame.line("  ~  Make Another Wish  [c] Relight Candle ✨");
        }
        frame.blank();

        frame.line(if self.envelope.is_open() {
            "  ✉  (open)  [e] Seal it again"
        } else {
            "  ✉  [e] Open the envelope"
        });
        frame.line("  Want to re-read your letter darling?  [l] Your Letter");
        frame.line("  [m] Our memories");
    }

    fn on_content(&mut self, result: ContentResult) {
        self.reasons.apply(result);
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![
            HelpEntry::new("s", "Show me a reason"),
            HelpEntry::new("c", "Blow out or relight the candle"),
            HelpEntry::new("e", "Open or close the envelope"),
            HelpEntry::new("l", "Re-read the letter"),
            HelpEntry::new("m", "Memories"),
        ]
    }

    fn title(&self) -> &'static str {
        "Dashboard"
    }
}
