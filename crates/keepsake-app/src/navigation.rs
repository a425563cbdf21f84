#![forbid(unsafe_code)]

//! Narrative navigation graph.
//!
//! ```text
//!          (unlock)
//!   Home ──────────▶ Welcome ─▶ Cake ─(timer)▶ Card ─▶ Reasons ─▶ Memories ─▶ Final
//!                                               ▲ │       │           ▲ │         │
//!                          from=dashboard ──────┘ │       │           │ │         │
//!                                                 ▼       ▼           │ ▼         ▼
//!                                               ┌───────────────────────────────────┐
//!                                               │             Dashboard             │
//!                                               └───────────────────────────────────┘
//! ```
//!
//! [`NavigationGraph::traverse`] is the only way to change screens. An edge's
//! [`ReturnContext`] is set on the destination's [`NavigationState`] and is
//! dropped on the next traversal unless that edge carries one itself, so the
//! context never propagates down linear edges.

use std::fmt;

/// Screens of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    /// Countdown, gated on the unlock instant.
    Home,
    Welcome,
    /// Candle to blow out.
    Cake,
    /// Sealed letter.
    Card,
    Reasons,
    /// Photo gallery.
    Memories,
    Final,
    /// Keepsake collection reachable after the story.
    Dashboard,
}

impl ScreenId {
    pub const ALL: &'static [ScreenId] = &[
        ScreenId::Home,
        ScreenId::Welcome,
        ScreenId::Cake,
        ScreenId::Card,
        ScreenId::Reasons,
        ScreenId::Memories,
        ScreenId::Final,
        ScreenId::Dashboard,
    ];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            ScreenId::Home => "Home",
            ScreenId::Welcome => "Welcome",
            ScreenId::Cake => "Cake",
            ScreenId::Card => "Card",
            ScreenId::Reasons => "Reasons",
            ScreenId::Memories => "Memories",
            ScreenId::Final => "Final",
            ScreenId::Dashboard => "Dashboard",
        }
    }

    /// Route path of the screen.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            ScreenId::Home => "/",
            ScreenId::Welcome => "/welcome",
            ScreenId::Cake => "/cake",
            ScreenId::Card => "/card",
            ScreenId::Reasons => "/reasons",
            ScreenId::Memories => "/memories",
            ScreenId::Final => "/final",
            ScreenId::Dashboard => "/dashboard",
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.iter().copied().find(|s| s.path() == path)
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Where a cross-edge traversal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnContext {
    Dashboard,
}

impl ReturnContext {
    /// Value of the `from` route parameter.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            ReturnContext::Dashboard => "dashboard",
        }
    }

    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "dashboard" => Some(ReturnContext::Dashboard),
            _ => None,
        }
    }

    /// The screen a "return" control leads back to.
    #[must_use]
    pub const fn screen(self) -> ScreenId {
        match self {
            ReturnContext::Dashboard => ScreenId::Dashboard,
        }
    }
}

/// What caused a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A user action on the current screen.
    User,
    /// The time gate unlocked.
    Unlock,
    /// A screen's scheduled hand-off elapsed.
    Timer,
}

/// Edge classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Only the time gate may traverse it.
    Gated,
    /// The default "next" of the story.
    Linear,
    /// Carries a return context to the destination.
    Cross(ReturnContext),
    /// An explicit jump that is not part of the story order.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: ScreenId,
    pub to: ScreenId,
    pub kind: EdgeKind,
}

impl Edge {
    const fn new(from: ScreenId, to: ScreenId, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }

    /// The return context this edge sets on its destination.
    #[must_use]
    pub const fn carries(&self) -> Option<ReturnContext> {
        match self.kind {
            EdgeKind::Cross(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// Gated edges accept only the unlock trigger; no other edge accepts it.
    #[must_use]
    pub fn allows(&self, trigger: Trigger) -> bool {
        match self.kind {
            EdgeKind::Gated => trigger == Trigger::Unlock,
            _ => trigger != Trigger::Unlock,
        }
    }
}

/// Parameters passed with a traversal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavParams {
    pub return_context: Option<ReturnContext>,
}

impl NavParams {
    #[must_use]
    pub const fn from(context: ReturnContext) -> Self {
        Self {
            return_context: Some(context),
        }
    }
}

/// The current screen and the context it was entered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub current: ScreenId,
    pub return_context: Option<ReturnContext>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::at(ScreenId::Home)
    }
}

impl NavigationState {
    #[must_use]
    pub const fn at(current: ScreenId) -> Self {
        Self {
            current,
            return_context: None,
        }
    }

    /// Route for this state, e.g. `/memories?from=dashboard`.
    #[must_use]
    pub fn route(&self) -> String {
        match self.return_context {
            Some(ctx) => format!("{}?from={}", self.current.path(), ctx.as_param()),
            None => self.current.path().to_string(),
        }
    }

    /// Parse a route. Unknown query parameters are ignored. A `from` value
    /// is an error unless some edge of the standard graph delivers that
    /// context to the screen.
    pub fn from_route(route: &str) -> Result<Self, NavError> {
        let unknown = || NavError::UnknownRoute(route.to_string());
        let (path, query) = route.split_once('?').unwrap_or((route, ""));
        let current = ScreenId::from_path(path).ok_or_else(unknown)?;
        let mut return_context = None;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            if let Some(value) = pair.strip_prefix("from=") {
                let ctx = ReturnContext::from_param(value).ok_or_else(unknown)?;
                if !NavigationGraph::standard().admits(current, ctx) {
                    return Err(unknown());
                }
                return_context = Some(ctx);
            }
        }
        Ok(Self {
            current,
            return_context,
        })
    }
}

/// Rejected traversal or route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    NoSuchEdge {
        from: ScreenId,
        to: ScreenId,
    },
    /// The caller asked for a context the edge does not carry.
    ContextNotCarried {
        from: ScreenId,
        to: ScreenId,
        context: ReturnContext,
    },
    TriggerNotAllowed {
        from: ScreenId,
        to: ScreenId,
        trigger: Trigger,
    },
    UnknownRoute(String),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::NoSuchEdge { from, to } => write!(f, "no edge {from} -> {to}"),
            NavError::ContextNotCarried { from, to, context } => {
                write!(f, "edge {from} -> {to} does not carry {context:?}")
            }
            NavError::TriggerNotAllowed { from, to, trigger } => {
                write!(f, "edge {from} -> {to} cannot be traversed by {trigger:?}")
            }
            NavError::UnknownRoute(route) => write!(f, "unknown route {route:?}"),
        }
    }
}

impl std::error::Error for NavError {}

/// Fixed set of screens and directed edges.
#[derive(Debug, Clone)]
pub struct NavigationGraph {
    edges: Vec<Edge>,
}

impl Default for NavigationGraph {
    fn default() -> Self {
        Self::standard()
    }
}

impl NavigationGraph {
    /// The reveal flow's graph.
    #[must_use]
    pub fn standard() -> Self {
        use EdgeKind::{Cross, Gated, Linear, Manual};
        use ScreenId::*;
        let dash = ReturnContext::Dashboard;
        Self {
            edges: vec![
                Edge::new(Home, Welcome, Gated),
                Edge::new(Welcome, Cake, Linear),
                Edge::new(Cake, Card, Linear),
                Edge::new(Card, Reasons, Linear),
                Edge::new(Reasons, Memories, Linear),
                Edge::new(Memories, Final, Linear),
                Edge::new(Dashboard, Card, Cross(dash)),
                Edge::new(Dashboard, Memories, Cross(dash)),
                Edge::new(Final, Dashboard, Manual),
                Edge::new(Card, Dashboard, Manual),
                Edge::new(Reasons, Dashboard, Manual),
                Edge::new(Memories, Dashboard, Manual),
            ],
        }
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn edge(&self, from: ScreenId, to: ScreenId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }

    /// Linear (or gated) successor of `screen` in story order.
    #[must_use]
    pub fn next(&self, screen: ScreenId) -> Option<ScreenId> {
        self.edges
            .iter()
            .find(|e| e.from == screen && matches!(e.kind, EdgeKind::Linear | EdgeKind::Gated))
            .map(|e| e.to)
    }

    /// Whether some edge delivers `context` to `screen`.
    #[must_use]
    pub fn admits(&self, screen: ScreenId, context: ReturnContext) -> bool {
        self.edges
            .iter()
            .any(|e| e.to == screen && e.carries() == Some(context))
    }

    /// Traverse `from -> to`.
    ///
    /// The resulting context is the edge's own; a context requested in
    /// `params` must match it.
    pub fn traverse(
        &self,
        from: ScreenId,
        to: ScreenId,
        params: NavParams,
        trigger: Trigger,
    ) -> Result<NavigationState, NavError> {
        let edge = self
            .edge(from, to)
            .ok_or(NavError::NoSuchEdge { from, to })?;
        if !edge.allows(trigger) {
            return Err(NavError::TriggerNotAllowed { from, to, trigger });
        }
        if let Some(context) = params.return_context
            && edge.carries() != Some(context)
        {
            return Err(NavError::ContextNotCarried { from, to, context });
        }
        Ok(NavigationState {
            current: to,
            return_context: edge.carries(),
        })
    }
}
