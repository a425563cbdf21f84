#![forbid(unsafe_code)]

//! Model/update/view runtime.
//!
//! The runtime is single-threaded and cooperative: one loop delivers input,
//! timer and task messages to `Model::update` one at a time, so a model never
//! observes concurrent mutation. Blocking work (remote fetches) runs on
//! spawned threads via [`Cmd::Task`] and comes back as a message.
//!
//! ```text
//! ┌──────────┐  Event   ┌────────┐  Cmd   ┌──────────────┐
//! │ terminal │ ───────▶ │ update │ ─────▶ │ execute_cmd  │
//! └──────────┘          └────────┘        └──────────────┘
//!       ▲                   ▲   │ subscriptions()   │ Task
//!       │ view              │   ▼                   ▼
//!  ┌─────────┐      ┌───────────────────┐   ┌─────────────┐
//!  │ render  │      │ SubscriptionManager│  │ task thread │
//!  └─────────┘      └───────────────────┘   └─────────────┘
//! ```

use std::io::{self, Stdout, Write};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossterm::{cursor, event as cte, execute, queue, style, terminal};
use keepsake_core::event::Event;
use tracing::{debug_span, info_span};

use crate::frame::Frame;
use crate::subscription::{Subscription, SubscriptionManager};

/// Application state and behavior.
pub trait Model: Sized {
    /// Messages that update the model. Must be convertible from input events.
    type Message: From<Event> + Send + 'static;

    /// Startup commands (initial fetches).
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// The state transition function.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state.
    fn view(&self, frame: &mut Frame);

    /// Timers that should be running right now.
    ///
    /// Called after every update; anything not returned is stopped.
    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Self::Message>>> {
        vec![]
    }
}

/// Metadata for a background task.
#[derive(Debug, Clone, Default)]
pub struct TaskSpec {
    pub name: Option<String>,
}

/// Side effects requested by `init` and `update`.
#[derive(Default)]
pub enum Cmd<M> {
    #[default]
    None,
    Quit,
    /// Execute commands in order, stopping early on quit.
    Batch(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Record a line in the program log.
    Log(String),
    /// Run a blocking closure off the loop and deliver its result.
    Task(TaskSpec, Box<dyn FnOnce() -> M + Send>),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Task(spec, _) => f.debug_struct("Task").field("spec", spec).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Batch commands, collapsing empty and single-element batches.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Background task with a name for logs.
    pub fn task_named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(
            TaskSpec {
                name: Some(name.into()),
            },
            Box::new(f),
        )
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable name for tracing.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Log(_) => "Log",
            Self::Task(..) => "Task",
        }
    }

    /// Number of atomic commands.
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Batch(cmds) => cmds.iter().map(Self::count).sum(),
            _ => 1,
        }
    }
}

/// Terminal program settings.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Input poll timeout; bounds the latency of timer and task messages.
    pub poll_interval: Duration,
    /// Quit automatically after this long.
    pub exit_after: Option<Duration>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            exit_after: None,
        }
    }
}

/// Restores the terminal when dropped, including on panic unwind.
struct TerminalGuard {
    out: Stdout,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide
        )?;
        Ok(Self { out })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Runs a [`Model`] against the real terminal.
pub struct Program<M: Model> {
    model: M,
    config: ProgramConfig,
    subscriptions: SubscriptionManager<M::Message>,
    task_sender: mpsc::Sender<M::Message>,
    task_receiver: mpsc::Receiver<M::Message>,
    task_handles: Vec<JoinHandle<()>>,
    running: bool,
    dirty: bool,
    width: u16,
    height: u16,
}

impl<M: Model> Program<M> {
    pub fn new(model: M, config: ProgramConfig) -> Self {
        let (task_sender, task_receiver) = mpsc::channel();
        Self {
            model,
            config,
            subscriptions: SubscriptionManager::new(),
            task_sender,
            task_receiver,
            task_handles: Vec::new(),
            running: true,
            dirty: true,
            width: 80,
            height: 24,
        }
    }

    /// Enter the alternate screen, run until quit, restore the terminal.
    ///
    /// Returns the final model.
    pub fn run(mut self) -> io::Result<M> {
        let mut guard = TerminalGuard::enter()?;
        let (width, height) = terminal::size()?;
        self.width = width;
        self.height = height;
        let result = self.run_event_loop(&mut guard.out);
        self.subscriptions.stop_all();
        drop(guard);
        result.map(|()| self.model)
    }

    fn run_event_loop(&mut self, out: &mut Stdout) -> io::Result<()> {
        let started = Instant::now();
        let cmd = {
            let _span = info_span!("keepsake.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd);
        self.reconcile_subscriptions();
        self.render(out)?;

        let mut loop_count: u64 = 0;
        while self.running {
            loop_count += 1;
            if loop_count.is_multiple_of(200) {
                crate::debug_trace!("main loop heartbeat: iteration {}", loop_count);
            }

            if cte::poll(self.config.poll_interval)? {
                loop {
                    if let Some(event) = Event::from_crossterm(cte::read()?) {
                        self.handle_event(event);
                    }
                    if !self.running || !cte::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }

            let fired = self.subscriptions.drain_messages();
            self.dispatch_all("subscription", fired);
            let results: Vec<_> = self.task_receiver.try_iter().collect();
            self.dispatch_all("task", results);
            self.reap_finished_tasks();

            if let Some(limit) = self.config.exit_after
                && started.elapsed() >= limit
            {
                tracing::info!(after_ms = limit.as_millis() as u64, "exit-after elapsed");
                self.running = false;
            }

            if self.dirty && self.running {
                self.render(out)?;
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Resize { width, height } = event {
            self.width = width;
            self.height = height;
        }
        self.dispatch("input", M::Message::from(event));
        self.reconcile_subscriptions();
    }

    fn dispatch_all(&mut self, source: &'static str, messages: Vec<M::Message>) {
        if messages.is_empty() {
            return;
        }
        for msg in messages {
            self.dispatch(source, msg);
            if !self.running {
                break;
            }
        }
        self.reconcile_subscriptions();
    }

    fn dispatch(&mut self, source: &'static str, msg: M::Message) {
        let cmd = {
            let _span = debug_span!(
                "keepsake.program.update",
                msg_source = source,
                cmd_type = tracing::field::Empty
            )
            .entered();
            let cmd = self.model.update(msg);
            tracing::Span::current().record("cmd_type", cmd.type_name());
            cmd
        };
        self.dirty = true;
        self.execute_cmd(cmd);
    }

    fn reconcile_subscriptions(&mut self) {
        let subs = self.model.subscriptions();
        self.subscriptions.reconcile(subs);
        crate::debug_trace!(
            "subscriptions reconciled: active={}",
            self.subscriptions.active_count()
        );
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => self.dispatch("cmd", m),
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Log(text) => tracing::info!(target: "keepsake::log", "{text}"),
            Cmd::Task(spec, f) => {
                let sender = self.task_sender.clone();
                let name = spec.name.unwrap_or_else(|| "task".to_owned());
                tracing::debug!(task = %name, "spawning task");
                let handle = std::thread::spawn(move || {
                    let _ = sender.send(f());
                });
                self.task_handles.push(handle);
            }
        }
    }

    fn reap_finished_tasks(&mut self) {
        let mut remaining = Vec::with_capacity(self.task_handles.len());
        for handle in self.task_handles.drain(..) {
            if !handle.is_finished() {
                remaining.push(handle);
                continue;
            }
            if let Err(payload) = handle.join() {
                let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).to_owned()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic payload".to_owned()
                };
                tracing::error!("spawned task panicked: {msg}");
            }
        }
        self.task_handles = remaining;
    }

    fn render(&mut self, out: &mut Stdout) -> io::Result<()> {
        let mut frame = Frame::new(self.width, self.height);
        self.model.view(&mut frame);
        queue!(out, terminal::Clear(terminal::ClearType::All))?;
        for (row, line) in frame.lines().iter().enumerate() {
            queue!(out, cursor::MoveTo(0, row as u16), style::Print(line))?;
        }
        out.flush()?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_collapses() {
        assert!(Cmd::<()>::batch(vec![]).is_none());
        assert!(matches!(Cmd::<()>::batch(vec![Cmd::quit()]), Cmd::Quit));
        assert!(matches!(
            Cmd::<()>::batch(vec![Cmd::none(), Cmd::quit(), Cmd::none()]),
            Cmd::Quit
        ));
        assert_eq!(
            Cmd::<()>::batch(vec![Cmd::quit(), Cmd::log("x")]).count(),
            2
        );
    }

    #[test]
    fn type_names_are_stable() {
        assert_eq!(Cmd::<()>::task_named("t", || ()).type_name(), "Task");
        assert_eq!(Cmd::<()>::log("hi").type_name(), "Log");
        assert_eq!(Cmd::msg(()).type_name(), "Msg");
    }

    #[test]
    fn default_config_polls_often() {
        let config = ProgramConfig::default();
        assert!(config.poll_interval <= Duration::from_millis(100));
        assert!(config.exit_after.is_none());
    }
}
