#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a terminal or threads:
//!
//! - tasks run synchronously (or are queued with [`defer_tasks`](ProgramSimulator::defer_tasks)),
//! - subscriptions are reconciled after every dispatch exactly as the real
//!   program does, and timers fire in virtual time when the test calls
//!   [`advance`](ProgramSimulator::advance),
//! - an attached [`ManualClock`] moves with virtual time, so models that read
//!   wall-clock time see it advance in step with their timers.
//!
//! ```ignore
//! let clock = ManualClock::new(start);
//! let mut sim = ProgramSimulator::new(model).with_clock(clock.clone());
//! sim.init();
//! sim.advance(Duration::from_secs(3));
//! assert!(sim.capture_frame(80, 24).contains("Unlocked"));
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use keepsake_core::ManualClock;
use keepsake_core::event::Event;

use crate::frame::Frame;
use crate::program::{Cmd, Model};
use crate::subscription::{Cadence, SubId, Subscription};

/// Record of a command executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    Msg,
    Batch(usize),
    Log(String),
    /// Background task, with its name if it had one.
    Task(Option<String>),
}

/// A timer subscription scheduled in virtual time.
struct VirtualTimer<M: Send + 'static> {
    sub: Box<dyn Subscription<M>>,
    cadence: Option<Cadence>,
    due: Duration,
    seq: u64,
    done: bool,
}

type PendingTask<M> = (Option<String>, Box<dyn FnOnce() -> M + Send>);

/// Deterministic simulator for [`Model`] testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    frames: Vec<Frame>,
    command_log: Vec<CmdRecord>,
    running: bool,
    logs: Vec<String>,
    clock: Option<ManualClock>,
    elapsed: Duration,
    timers: Vec<VirtualTimer<M::Message>>,
    next_seq: u64,
    defer_tasks: bool,
    pending_tasks: VecDeque<PendingTask<M::Message>>,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a simulator. The model is not initialized until [`init`](Self::init).
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
            logs: Vec::new(),
            clock: None,
            elapsed: Duration::ZERO,
            timers: Vec::new(),
            next_seq: 0,
            defer_tasks: false,
            pending_tasks: VecDeque::new(),
        }
    }

    /// Move `clock` together with virtual time.
    #[must_use]
    pub fn with_clock(mut self, clock: ManualClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Queue tasks instead of running them immediately.
    ///
    /// Queued tasks run on [`run_pending_tasks`](Self::run_pending_tasks),
    /// which lets tests observe loading states.
    pub fn defer_tasks(&mut self, defer: bool) {
        self.defer_tasks = defer;
    }

    /// Call `Model::init` and execute its commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        self.reconcile();
    }

    /// Convert each event to a message and dispatch it.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            self.dispatch(M::Message::from(event.clone()));
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Dispatch a message directly.
    pub fn send(&mut self, msg: M::Message) {
        if self.running {
            self.dispatch(msg);
        }
    }

    /// Run queued tasks in submission order. Returns how many ran.
    pub fn run_pending_tasks(&mut self) -> usize {
        let mut ran = 0;
        while let Some((name, f)) = self.pending_tasks.pop_front() {
            if !self.running {
                break;
            }
            crate::debug_trace!("sim: running deferred task {:?}", name);
            ran += 1;
            self.dispatch(f());
        }
        ran
    }

    /// Number of queued tasks.
    pub fn pending_task_count(&self) -> usize {
        self.pending_tasks.len()
    }

    /// Advance virtual time by `dt`, firing due timers in order.
    ///
    /// Timers due at the same instant fire in the order they were started.
    /// Subscriptions are reconciled after each firing, so a timer stopped by
    /// an earlier firing never fires.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.elapsed.saturating_add(dt);
        while self.running {
            let Some(idx) = self.next_due(target) else {
                break;
            };
            let due = self.timers[idx].due;
            self.move_time_to(due);

            let timer = &mut self.timers[idx];
            let msg = timer.sub.fire();
            match timer.cadence {
                Some(Cadence::Every(interval)) if msg.is_some() && !interval.is_zero() => {
                    timer.due = timer.due.saturating_add(interval);
                }
                _ => timer.done = true,
            }
            crate::debug_trace!("sim: timer fired id={} at {:?}", timer.sub.id(), due);

            if let Some(msg) = msg {
                self.dispatch(msg);
            }
        }
        self.move_time_to(target);
    }

    /// Virtual time since the simulator was created.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Ids of the subscriptions currently scheduled (including finished one-shots
    /// that are still declared).
    pub fn subscription_ids(&self) -> Vec<SubId> {
        self.timers.iter().map(|t| t.sub.id()).collect()
    }

    /// Render into a fresh frame and keep it.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Frame {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame);
        &self.frames[self.frames.len() - 1]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// `false` after a `Cmd::Quit`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Text emitted via `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.done && t.cadence.is_some() && t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(idx, _)| idx)
    }

    fn move_time_to(&mut self, to: Duration) {
        if to <= self.elapsed {
            return;
        }
        if let Some(clock) = &self.clock {
            clock.advance(to - self.elapsed);
        }
        self.elapsed = to;
    }

    fn dispatch(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
        self.reconcile();
    }

    /// Same diff as the real subscription manager, in virtual time.
    fn reconcile(&mut self) {
        let declared = self.model.subscriptions();
        let ids: Vec<SubId> = declared.iter().map(|s| s.id()).collect();
        self.timers.retain(|t| ids.contains(&t.sub.id()));
        for sub in declared {
            if self.timers.iter().any(|t| t.sub.id() == sub.id()) {
                continue;
            }
            let cadence = sub.cadence();
            let first = match cadence {
                Some(Cadence::Every(d) | Cadence::After(d)) => d,
                None => Duration::ZERO,
            };
            self.timers.push(VirtualTimer {
                sub,
                cadence,
                due: self.elapsed.saturating_add(first),
                seq: self.next_seq,
                done: false,
            });
            self.next_seq += 1;
        }
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                self.execute_all(cmds);
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
            Cmd::Task(spec, f) => {
                self.command_log.push(CmdRecord::Task(spec.name.clone()));
                if self.defer_tasks {
                    self.pending_tasks.push_back((spec.name, f));
                } else {
                    let cmd = self.model.update(f());
                    self.execute_cmd(cmd);
                }
            }
        }
    }

    fn execute_all(&mut self, cmds: Vec<Cmd<M::Message>>) {
        for c in cmds {
            self.execute_cmd(c);
            if !self.running {
                break;
            }
        }
    }
}
