#![forbid(unsafe_code)]

//! Cake screen: the gating candle.
//!
//! Blowing the candle out arms a one-shot [`After`] bound to the candle's
//! pending token. The timer is declared only while the hand-off is pending
//! and its id includes the mount, so a remount never inherits an old timer.
//! When it elapses the screen consumes the hand-off with [`Candle::fire`]
//! and asks for `Cake -> Card` with [`Trigger::Timer`].

use keepsake_core::event::{Event, KeyCode};
use keepsake_runtime::{After, Cmd, Frame, SubId, Subscription};
use keepsake_widgets::{Candle, CandleEffect};

use super::{HelpEntry, MountId, Screen, ViewContext, key};
use crate::app::AppMsg;
use crate::navigation::{NavParams, ScreenId, Trigger};

/// Base of the hand-off timer ids; the mount id is added.
pub const CANDLE_TIMER_BASE: SubId = 0xCA4D_0000_0000;

pub struct Cake {
    candle: Candle,
}

impl Cake {
    #[must_use]
    pub fn new() -> Self {
        Self {
            candle: Candle::gating(),
        }
    }

    #[must_use]
    pub fn candle(&self) -> &Candle {
        &self.candle
    }
}

impl Default for Cake {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for Cake {
    fn update(&mut self, event: &Event) -> Cmd<AppMsg> {
        match key(event) {
            Some(KeyCode::Char('b' | ' ') | KeyCode::Enter) => {
                if let CandleEffect::Scheduled(delay) = self.candle.blow_out() {
                    return Cmd::log(format!("candle out, card in {}ms", delay.as_millis()));
                }
                Cmd::none()
            }
            _ => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame, _ctx: &ViewContext<'_>) {
        frame.line("Make a wish!");
        frame.blank();
        if self.candle.is_lit() {
            frame.line("        )");
            frame.line("       (.)");
            frame.line("       |~|");
            frame.blank();
            frame.line("  [b] Click to blow out the candle 🎂");
        } else {
            frame.line("        ~");
            frame.line("       |_|");
            frame.blank();
            frame.line("Your wish is on its way...");
        }
    }

    fn timer_elapsed(&mut self) -> Cmd<AppMsg> {
        if self.candle.fire() {
            Cmd::msg(AppMsg::Navigate {
                to: ScreenId::Card,
                params: NavParams::default(),
                trigger: Trigger::Timer,
            })
        } else {
            Cmd::none()
        }
    }

    fn subscriptions(&self, mount: MountId) -> Vec<Box<dyn Subscription<AppMsg>>> {
        let (Some(token), Some(delay)) = (self.candle.pending(), self.candle.delay()) else {
            return vec![];
        };
        vec![Box::new(
            After::with_id(CANDLE_TIMER_BASE + mount, delay, move || AppMsg::ScreenTimer {
                mount,
            })
            .cancel_on(token.clone()),
        )]
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![HelpEntry::new("b/Space", "Blow out the candle")]
    }

    fn title(&self) -> &'static str {
        "Cake"
    }
}
