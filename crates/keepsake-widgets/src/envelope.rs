#![forbid(unsafe_code)]

//! Sealed letter.
//!
//! Two states, no terminal one. The letter is presented either as a slide-out
//! or as a full overlay, fixed per envelope, and both read the same state so
//! the two can never disagree.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeState {
    #[default]
    Closed,
    Open,
}

/// How an open letter is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LetterPresentation {
    /// The letter slides out of the envelope.
    #[default]
    Slide,
    /// The full letter is shown in an overlay.
    Overlay,
}

#[derive(Debug, Clone, Default)]
pub struct Envelope {
    state: EnvelopeState,
    presentation: LetterPresentation,
}

impl Envelope {
    #[must_use]
    pub fn new(presentation: LetterPresentation) -> Self {
        Self {
            state: EnvelopeState::Closed,
            presentation,
        }
    }

    #[must_use]
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    #[must_use]
    pub fn presentation(&self) -> LetterPresentation {
        self.presentation
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == EnvelopeState::Open
    }

    /// Closed → Open. Returns whether the state changed.
    pub fn open(&mut self) -> bool {
        let changed = self.state == EnvelopeState::Closed;
        self.state = EnvelopeState::Open;
        changed
    }

    /// Open → Closed. Returns whether the state changed.
    pub fn close(&mut self) -> bool {
        let changed = self.state == EnvelopeState::Open;
        self.state = EnvelopeState::Closed;
        changed
    }

    pub fn toggle(&mut self) {
        if !self.open() {
            self.close();
        }
    }

    /// Open the full letter overlay.
    ///
    /// Same transition as [`open`](Self::open), but only meaningful for the
    /// overlay presentation; a slide envelope ignores it.
    pub fn view_letter(&mut self) -> bool {
        match self.presentation {
            LetterPresentation::Overlay => self.open(),
            LetterPresentation::Slide => false,
        }
    }

    #[must_use]
    pub fn slide_visible(&self) -> bool {
        self.presentation == LetterPresentation::Slide && self.is_open()
    }

    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.presentation == LetterPresentation::Overlay && self.is_open()
    }
}
