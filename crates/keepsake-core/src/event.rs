#![forbid(unsafe_code)]

//! Input as the screens see it.
//!
//! The runtime turns terminal input into an [`Event`] before any screen is
//! involved, dropping whatever the reveal flow has no key for.

use bitflags::bitflags;
use crossterm::event as cte;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// The terminal now has this many columns and rows.
    Resize { width: u16, height: u16 },
}

impl Event {
    /// Translate a terminal event; `None` for input the flow ignores.
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => {
                let code = KeyCode::from_crossterm(key.code)?;
                let mut modifiers = Modifiers::NONE;
                if key.modifiers.contains(cte::KeyModifiers::CONTROL) {
                    modifiers |= Modifiers::CTRL;
                }
                Some(Event::Key(KeyEvent {
                    code,
                    modifiers,
                    released: key.kind == cte::KeyEventKind::Release,
                }))
            }
            cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            _ => None,
        }
    }

    /// A plain press of character `c`.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Event::Key(KeyEvent::new(KeyCode::Char(c)))
    }

    /// The key behind a press or repeat; releases and resizes give `None`.
    #[must_use]
    pub fn pressed(&self) -> Option<&KeyEvent> {
        match self {
            Event::Key(key) if !key.released => Some(key),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub released: bool,
}

impl KeyEvent {
    /// Press of `code` with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            released: false,
        }
    }

    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

/// Keys some screen or the app shell binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    fn from_crossterm(code: cte::KeyCode) -> Option<Self> {
        Some(match code {
            cte::KeyCode::Char(c) => KeyCode::Char(c),
            cte::KeyCode::Enter => KeyCode::Enter,
            cte::KeyCode::Esc => KeyCode::Escape,
            cte::KeyCode::Up => KeyCode::Up,
            cte::KeyCode::Down => KeyCode::Down,
            cte::KeyCode::Left => KeyCode::Left,
            cte::KeyCode::Right => KeyCode::Right,
            _ => return None,
        })
    }
}

bitflags! {
    /// Held modifiers. Only Ctrl is bound (Ctrl+C quits).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const CTRL = 1 << 0;
    }
}
