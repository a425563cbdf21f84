#![forbid(unsafe_code)]

//! Narrative controller.
//!
//! [`AppModel`] composes the time gate, the navigation graph and the mounted
//! screen into one [`Model`]:
//!
//! ```text
//!  ConfigStore::get ──▶ ConfigLoaded ──▶ TimeGate::start/fail
//!                                          │
//!  Every(1s, cancel_on gate token) ──▶ GateTick ──▶ TimeGate::tick
//!                                          │ Unlocked (token already cancelled)
//!                                          ▼
//!                 NavigationGraph::traverse(Home, Welcome, Trigger::Unlock)
//!
//!  key ──▶ Screen::update ──▶ Navigate ──▶ traverse ──▶ drop old screen, mount new
//! ```
//!
//! The gate belongs to the app, not to the Home screen, so at most one gate
//! exists per run. Its config is fetched the first time Home is mounted.
//! Fetch results and timer messages carry the [`MountId`] they were issued
//! for; anything addressed to an earlier mount is dropped.

use std::sync::Arc;

use keepsake_core::Clock;
use keepsake_core::event::{Event, KeyCode};
use keepsake_runtime::{Cmd, Every, Frame, Model, SubId, Subscription};
use keepsake_store::{Backend, ConfigStore, ContentItem, FetchError, UnlockConfig};
use keepsake_widgets::{GateTransition, LetterPresentation, TICK_INTERVAL, TimeGate};

use crate::navigation::{NavParams, NavigationGraph, NavigationState, ScreenId, Trigger};
use crate::screens::{self, HelpEntry, MountContext, MountId, Screen, ViewContext};

/// Subscription id of the gate's tick timer.
pub const GATE_TICK_ID: SubId = 0x6A7E_0001;

/// Reasons shown on the Reasons screen unless configured otherwise.
pub const DEFAULT_REASONS_LIMIT: usize = 10;

/// Resolved startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where the flow starts. Normally Home.
    pub start: NavigationState,
    pub letter: LetterPresentation,
    pub reasons_limit: usize,
    /// Seed for the dashboard's reason picker.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            start: NavigationState::default(),
            letter: LetterPresentation::default(),
            reasons_limit: DEFAULT_REASONS_LIMIT,
            seed: None,
        }
    }
}

/// Top-level application message.
#[derive(Debug)]
pub enum AppMsg {
    /// Input forwarded to the mounted screen.
    ScreenEvent(Event),
    Quit,
    ToggleHelp,
    ConfigLoaded(Result<UnlockConfig, FetchError>),
    GateTick,
    ContentLoaded {
        mount: MountId,
        result: Result<Vec<ContentItem>, FetchError>,
    },
    ScreenTimer {
        mount: MountId,
    },
    Navigate {
        to: ScreenId,
        params: NavParams,
        trigger: Trigger,
    },
}

impl From<Event> for AppMsg {
    fn from(event: Event) -> Self {
        Self::ScreenEvent(event)
    }
}

const GLOBAL_KEYS: &[HelpEntry] = &[
    HelpEntry::new("?", "Toggle help"),
    HelpEntry::new("q/Ctrl+C", "Quit"),
];

pub struct AppModel {
    graph: NavigationGraph,
    nav: NavigationState,
    gate: TimeGate,
    gate_requested: bool,
    screen: Box<dyn Screen>,
    mount: MountId,
    help_visible: bool,
    backend: Arc<dyn Backend>,
    clock: Arc<dyn Clock>,
    config: AppConfig,
    history: Vec<(ScreenId, ScreenId)>,
}

impl AppModel {
    pub fn new(backend: Arc<dyn Backend>, clock: Arc<dyn Clock>, config: AppConfig) -> Self {
        let nav = config.start;
        let screen = screens::create(nav.current, &config);
        Self {
            graph: NavigationGraph::standard(),
            nav,
            gate: TimeGate::new(),
            gate_requested: false,
            screen,
            mount: 0,
            help_visible: false,
            backend,
            clock,
            config,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn nav(&self) -> NavigationState {
        self.nav
    }

    #[must_use]
    pub fn current(&self) -> ScreenId {
        self.nav.current
    }

    #[must_use]
    pub fn gate(&self) -> &TimeGate {
        &self.gate
    }

    #[must_use]
    pub fn mount(&self) -> MountId {
        self.mount
    }

    #[must_use]
    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    /// Every traversal taken so far, oldest first.
    #[must_use]
    pub fn navigation_log(&self) -> &[(ScreenId, ScreenId)] {
        &self.history
    }

    /// Replace the screen with a fresh instance of the current one.
    fn mount_screen(&mut self) -> Cmd<AppMsg> {
        self.mount += 1;
        self.screen = screens::create(self.nav.current, &self.config);
        tracing::debug!(screen = %self.nav.current, mount = self.mount, "screen mounted");
        let ctx = MountContext {
            nav: self.nav,
            mount: self.mount,
            backend: &self.backend,
            config: &self.config,
        };
        let enter = self.screen.on_enter(&ctx);
        Cmd::batch(vec![enter, self.request_gate()])
    }

    /// Fetch the unlock config once, the first time Home is shown.
    fn request_gate(&mut self) -> Cmd<AppMsg> {
        if self.nav.current != ScreenId::Home || self.gate_requested {
            return Cmd::none();
        }
        self.gate_requested = true;
        let backend = Arc::clone(&self.backend);
        tracing::info!(backend = backend.name(), "fetching unlock config");
        Cmd::task_named("fetch-unlock-config", move || {
            AppMsg::ConfigLoaded(backend.get())
        })
    }

    fn handle_event(&mut self, event: Event) -> Cmd<AppMsg> {
        if let Some(key) = event.pressed() {
            if key.code == KeyCode::Char('q') || (key.ctrl() && key.is_char('c')) {
                return Cmd::quit();
            }
            if key.is_char('?') {
                return Cmd::msg(AppMsg::ToggleHelp);
            }
            if self.help_visible {
                if key.code == KeyCode::Escape {
                    self.help_visible = false;
                }
                return Cmd::none();
            }
        }
        self.screen.update(&event)
    }

    fn config_loaded(&mut self, result: Result<UnlockConfig, FetchError>) -> Cmd<AppMsg> {
        let transition = match result {
            Ok(config) => self.gate.start(config.target, &*self.clock),
            Err(error) => self.gate.fail(error),
        };
        self.gate_transition(transition)
    }

    fn gate_transition(&mut self, transition: GateTransition) -> Cmd<AppMsg> {
        if transition != GateTransition::Unlocked || self.nav.current != ScreenId::Home {
            return Cmd::none();
        }
        self.navigate(ScreenId::Welcome, NavParams::default(), Trigger::Unlock)
    }

    fn navigate(&mut self, to: ScreenId, params: NavParams, trigger: Trigger) -> Cmd<AppMsg> {
        let from = self.nav.current;
        match self.graph.traverse(from, to, params, trigger) {
            Ok(next) => {
                tracing::info!(
                    from = %from,
                    to = %to,
                    return_context = ?next.return_context,
                    ?trigger,
                    route = %next.route(),
                    "navigate"
                );
                self.history.push((from, to));
                self.nav = next;
                self.help_visible = false;
                self.mount_screen()
            }
            Err(err) => {
                tracing::warn!(%err, "navigation rejected");
                Cmd::none()
            }
        }
    }

    fn view_help(&self, frame: &mut Frame) {
        frame.line("Keys");
        for entry in self.screen.keybindings().iter().chain(GLOBAL_KEYS) {
            frame.line(format!("  {:<10} {}", entry.key, entry.action));
        }
        frame.blank();
        frame.line("  [Esc] Close help");
    }
}

impl Model for AppModel {
    type Message = AppMsg;

    fn init(&mut self) -> Cmd<AppMsg> {
        tracing::info!(route = %self.nav.route(), "starting");
        self.mount_screen()
    }

    fn update(&mut self, msg: AppMsg) -> Cmd<AppMsg> {
        match msg {
            AppMsg::ScreenEvent(event) => self.handle_event(event),
            AppMsg::Quit => Cmd::quit(),
            AppMsg::ToggleHelp => {
                self.help_visible = !self.help_visible;
                Cmd::none()
            }
            AppMsg::ConfigLoaded(result) => self.config_loaded(result),
            AppMsg::GateTick => {
                let transition = self.gate.tick(&*self.clock);
                self.gate_transition(transition)
            }
            AppMsg::ContentLoaded { mount, result } => {
                if mount == self.mount {
                    self.screen.on_content(result);
                } else {
                    tracing::debug!(mount, current = self.mount, "stale content dropped");
                }
                Cmd::none()
            }
            AppMsg::ScreenTimer { mount } => {
                if mount == self.mount {
                    self.screen.timer_elapsed()
                } else {
                    tracing::debug!(mount, current = self.mount, "stale timer dropped");
                    Cmd::none()
                }
            }
            AppMsg::Navigate {
                to,
                params,
                trigger,
            } => self.navigate(to, params, trigger),
        }
    }

    fn view(&self, frame: &mut Frame) {
        frame.line(format!("keepsake · {}  {}", self.screen.title(), self.nav.route()));
        frame.blank();
        if self.help_visible {
            self.view_help(frame);
            return;
        }
        self.screen.view(
            frame,
            &ViewContext {
                nav: self.nav,
                gate: &self.gate,
            },
        );
    }

    fn subscriptions(&self) -> Vec<Box<dyn Subscription<AppMsg>>> {
        let mut subs: Vec<Box<dyn Subscription<AppMsg>>> = Vec::new();
        if self.nav.current == ScreenId::Home && self.gate.is_ticking() {
            subs.push(Box::new(
                Every::with_id(GATE_TICK_ID, TICK_INTERVAL, || AppMsg::GateTick)
                    .cancel_on(self.gate.token()),
            ));
        }
        subs.extend(self.screen.subscriptions(self.mount));
        subs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_core::SystemClock;
    use keepsake_core::event::KeyEvent;
    use keepsake_store::MemoryStore;

    fn model(start: ScreenId) -> AppModel {
        AppModel::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
            AppConfig {
                start: NavigationState::at(start),
                ..AppConfig::default()
            },
        )
    }

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.start, NavigationState::at(ScreenId::Home));
        assert_eq!(config.reasons_limit, 10);
        assert_eq!(config.letter, LetterPresentation::Slide);
    }

    #[test]
    fn rejected_navigation_keeps_screen() {
        let mut app = model(ScreenId::Welcome);
        let _ = app.init();
        let mount = app.mount();
        let _ = app.update(AppMsg::Navigate {
            to: ScreenId::Final,
            params: NavParams::default(),
            trigger: Trigger::User,
        });
        assert_eq!(app.current(), ScreenId::Welcome);
        assert_eq!(app.mount(), mount);
        assert!(app.navigation_log().is_empty());
    }

    #[test]
    fn stale_timer_is_dropped() {
        let mut app = model(ScreenId::Cake);
        let _ = app.init();
        let cmd = app.update(AppMsg::ScreenTimer {
            mount: app.mount() + 7,
        });
        assert!(cmd.is_none());
    }

    #[test]
    fn help_swallows_screen_keys() {
        let mut app = model(ScreenId::Welcome);
        let _ = app.init();
        let _ = app.update(AppMsg::ToggleHelp);
        let cmd = app.update(AppMsg::ScreenEvent(Event::Key(KeyEvent::new(KeyCode::Enter))));
        assert!(cmd.is_none());
        let _ = app.update(AppMsg::ScreenEvent(Event::Key(KeyEvent::new(KeyCode::Escape))));
        assert!(!app.help_visible());
    }
}
