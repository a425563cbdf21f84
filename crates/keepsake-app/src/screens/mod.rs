#![forbid(unsafe_code)]

//! Screen modules for the reveal flow.
//!
//! Each screen owns only its local state machine. It asks for navigation by
//! returning [`AppMsg::Navigate`] and never touches [`NavigationState`]
//! itself. A screen instance lives for exactly one mount: navigating away
//! drops it, which is what cancels anything it had scheduled.

pub mod cake;
pub mod card;
pub mod dashboard;
pub mod final_screen;
pub mod home;
pub mod memories;
pub mod reasons;
pub mod welcome;

use std::sync::Arc;

use keepsake_core::event::{Event, KeyCode};
use keepsake_runtime::{Cmd, Frame, Subscription};
use keepsake_store::{
    Backend, ContentItem, ContentKind, ContentStore, FetchError, MediaStore, PHOTOS_FOLDER,
    require_non_empty,
};
use keepsake_widgets::TimeGate;

use crate::app::{AppConfig, AppMsg};
use crate::navigation::{NavParams, NavigationState, ReturnContext, ScreenId, Trigger};

/// A single keybinding entry for the help overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpEntry {
    /// Key label (e.g. "Enter", "←/→").
    pub key: &'static str,
    /// Description of what the key does.
    pub action: &'static str,
}

impl HelpEntry {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

/// Identifies one mount of a screen. Results addressed to an older mount
/// are dropped.
pub type MountId = u64;

/// Result of a content fetch.
pub type ContentResult = Result<Vec<ContentItem>, FetchError>;

/// What a screen sees when it is mounted.
pub struct MountContext<'a> {
    pub nav: NavigationState,
    pub mount: MountId,
    pub backend: &'a Arc<dyn Backend>,
    pub config: &'a AppConfig,
}

/// Shared state a screen may render besides its own.
pub struct ViewContext<'a> {
    pub nav: NavigationState,
    pub gate: &'a TimeGate,
}

/// A screen of the reveal flow.
pub trait Screen {
    /// Called once after mounting. Typically starts a fetch.
    fn on_enter(&mut self, _ctx: &MountContext<'_>) -> Cmd<AppMsg> {
        Cmd::none()
    }

    /// Handle an input event.
    fn update(&mut self, event: &Event) -> Cmd<AppMsg>;

    fn view(&self, frame: &mut Frame, ctx: &ViewContext<'_>);

    /// A fetch started by this mount finished.
    fn on_content(&mut self, _result: ContentResult) {}

    /// A one-shot timer declared by this mount elapsed.
    fn timer_elapsed(&mut self) -> Cmd<AppMsg> {
        Cmd::none()
    }

    /// Timers this mount needs right now.
    fn subscriptions(&self, _mount: MountId) -> Vec<Box<dyn Subscription<AppMsg>>> {
        vec![]
    }

    /// Keybindings for the help overlay.
    fn keybindings(&self) -> Vec<HelpEntry> {
        vec![]
    }

    fn title(&self) -> &'static str;
}

/// Build a fresh instance of `id`.
pub fn create(id: ScreenId, config: &AppConfig) -> Box<dyn Screen> {
    match id {
        ScreenId::Home => Box::new(home::Home),
        ScreenId::Welcome => Box::new(welcome::Welcome),
        ScreenId::Cake => Box::new(cake::Cake::new()),
        ScreenId::Card => Box::new(card::Card::new(config.letter)),
        ScreenId::Reasons => Box::new(reasons::Reasons::new(config.reasons_limit)),
        ScreenId::Memories => Box::new(memories::Memories::new()),
        ScreenId::Final => Box::new(final_screen::Final),
        ScreenId::Dashboard => Box::new(dashboard::Dashboard::new(config.seed)),
    }
}

/// Loading/ready/unavailable state of a fetched list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Content {
    #[default]
    Loading,
    Ready(Vec<ContentItem>),
    Unavailable(FetchError),
}

impl Content {
    /// Classify a fetch result. An empty list becomes
    /// [`FetchError::EmptyContent`].
    pub fn apply(&mut self, result: ContentResult) {
        *self = match result.and_then(require_non_empty) {
            Ok(items) => Self::Ready(items),
            Err(error) => {
                tracing::warn!(kind = error.kind(), %error, "content unavailable");
                Self::Unavailable(error)
            }
        };
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Fetched items; empty unless ready.
    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        match self {
            Self::Ready(items) => items,
            _ => &[],
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Unavailable(error) => Some(error),
            _ => None,
        }
    }
}

pub(crate) fn fetch_reasons(ctx: &MountContext<'_>, limit: Option<usize>) -> Cmd<AppMsg> {
    let backend = Arc::clone(ctx.backend);
    let mount = ctx.mount;
    Cmd::task_named("fetch-reasons", move || AppMsg::ContentLoaded {
        mount,
        result: backend.list(ContentKind::Reasons, limit),
    })
}

pub(crate) fn fetch_photos(ctx: &MountContext<'_>) -> Cmd<AppMsg> {
    let backend = Arc::clone(ctx.backend);
    let mount = ctx.mount;
    Cmd::task_named("fetch-photos", move || AppMsg::ContentLoaded {
        mount,
        result: backend.list_media(PHOTOS_FOLDER),
    })
}

/// Request a user-triggered traversal.
pub(crate) fn go(to: ScreenId) -> Cmd<AppMsg> {
    Cmd::msg(AppMsg::Navigate {
        to,
        params: NavParams::default(),
        trigger: Trigger::User,
    })
}

/// Request a traversal that carries `context`.
pub(crate) fn go_from(to: ScreenId, context: ReturnContext) -> Cmd<AppMsg> {
    Cmd::msg(AppMsg::Navigate {
        to,
        params: NavParams::from(context),
        trigger: Trigger::User,
    })
}

/// The pressed key, if `event` is a key press.
pub(crate) fn key(event: &Event) -> Option<KeyCode> {
    event.pressed().map(|k| k.code)
}

/// "Continue" is Enter or `n` everywhere.
pub(crate) fn is_continue(code: KeyCode) -> bool {
    matches!(code, KeyCode::Enter | KeyCode::Char('n'))
}

/// Render the "return" control for a screen entered with a context.
pub(crate) fn return_line(frame: &mut Frame, context: Option<ReturnContext>) {
    if let Some(ctx) = context {
        frame.line(format!("  [r] Return to {}", ctx.screen().title()));
    }
}

pub(crate) fn content_status(frame: &mut Frame, content: &Content, loading: &str) {
    match content {
        Content::Loading => frame.line(loading),
        Content::Unavailable(error) => frame.line(error.user_message()),
        Content::Ready(_) => {}
    }
}
