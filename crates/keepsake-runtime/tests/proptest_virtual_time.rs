#![forbid(unsafe_code)]

//! Property tests for virtual-time timer delivery.
//!
//! # Invariants
//!
//! 1. Splitting an advance into steps delivers the same number of ticks as
//!    one advance of the total.
//! 2. A repeating timer fires `floor(elapsed / interval)` times.
//! 3. A one-shot timer fires at most once, and only once its delay elapsed.

use std::time::Duration;

use keepsake_core::event::Event;
use keepsake_runtime::{After, Cmd, Every, Frame, Model, ProgramSimulator, Subscription};
use proptest::prelude::*;

struct Probe {
    interval: Duration,
    delay: Duration,
    ticks: u64,
    fired: u64,
}

#[derive(Debug)]
enum ProbeMsg {
    Tick,
    Fired,
    Ignore,
}

impl From<Event> for ProbeMsg {
    fn from(_: Event) -> Self {
        ProbeMsg::Ignore
    }
}

impl Model for Probe {
    type Message = ProbeMsg;

    fn update(&mut self, msg: ProbeMsg) -> Cmd<ProbeMsg> {
        match msg {
            ProbeMsg::Tick => self.ticks += 1,
            ProbeMsg::Fired => self.fired += 1,
            ProbeMsg::Ignore => {}
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame) {
        frame.line(format!("{} {}", self.ticks, self.fired));
    }

    fn subscriptions(&self) -> Vec<Box<dyn Subscription<ProbeMsg>>> {
        vec![
            Box::new(Every::with_id(1, self.interval, || ProbeMsg::Tick)),
            Box::new(After::with_id(2, self.delay, || ProbeMsg::Fired)),
        ]
    }
}

fn sim(interval_ms: u64, delay_ms: u64) -> ProgramSimulator<Probe> {
    let mut sim = ProgramSimulator::new(Probe {
        interval: Duration::from_millis(interval_ms),
        delay: Duration::from_millis(delay_ms),
        ticks: 0,
        fired: 0,
    });
    sim.init();
    sim
}

proptest! {
    #[test]
    fn stepping_matches_single_advance(
        interval_ms in 1u64..2_000,
        delay_ms in 0u64..10_000,
        steps in prop::collection::vec(0u64..3_000, 1..20),
    ) {
        let total: u64 = steps.iter().sum();

        let mut stepped = sim(interval_ms, delay_ms);
        for step in &steps {
            stepped.advance(Duration::from_millis(*step));
        }
        let mut single = sim(interval_ms, delay_ms);
        single.advance(Duration::from_millis(total));

        prop_assert_eq!(stepped.model().ticks, single.model().ticks);
        prop_assert_eq!(stepped.model().fired, single.model().fired);
        prop_assert_eq!(stepped.model().ticks, total / interval_ms);
    }

    #[test]
    fn oneshot_fires_at_most_once(delay_ms in 0u64..5_000, total_ms in 0u64..20_000) {
        let mut s = sim(1_000, delay_ms);
        s.advance(Duration::from_millis(total_ms));
        let expected = u64::from(total_ms >= delay_ms);
        prop_assert_eq!(s.model().fired, expected);
    }
}
