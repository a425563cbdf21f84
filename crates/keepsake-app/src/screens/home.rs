#![forbid(unsafe_code)]

//! Countdown screen. Has no controls: the only way out is the gate.

use keepsake_core::event::Event;
use keepsake_runtime::{Cmd, Frame};
use keepsake_widgets::GateState;

use super::{Screen, ViewContext};
use crate::app::AppMsg;

pub struct Home;

impl Screen for Home {
    fn update(&mut self, _event: &Event) -> Cmd<AppMsg> {
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame, ctx: &ViewContext<'_>) {
        frame.line("Something special is on its way");
        frame.blank();
        match ctx.gate.state() {
            GateState::Loading => frame.line("Connecting to surprise..."),
            GateState::Failed(error) => frame.line(error.user_message()),
            GateState::Counting(_) => {
                let cd = ctx.gate.countdown();
                frame.line(format!(
                    "{:>3} Days  {:02} Hours  {:02} Minutes  {:02} Seconds",
                    cd.days, cd.hours, cd.minutes, cd.seconds
                ));
            }
            GateState::Unlocked => frame.line("Unlocked"),
        }
    }

    fn title(&self) -> &'static str {
        "Home"
    }
}
