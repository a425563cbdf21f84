#![forbid(unsafe_code)]

//! Line-oriented render target.
//!
//! Screens describe what should be visible as lines of text. The terminal
//! program prints them; the simulator keeps them for assertions. Lines wider
//! than the frame are clipped by display width, rows past the height are
//! dropped.

use unicode_width::UnicodeWidthChar;

/// A frame of text lines bounded by a width and height in cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    lines: Vec<String>,
}

impl Frame {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            lines: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Append a line. Ignored once the frame is full.
    pub fn line(&mut self, text: impl AsRef<str>) {
        if self.lines.len() >= usize::from(self.height) {
            return;
        }
        self.lines.push(clip(text.as_ref(), usize::from(self.width)));
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.line("");
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    /// All lines joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

fn clip(text: &str, max_width: usize) -> String {
    let mut used = 0;
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}
