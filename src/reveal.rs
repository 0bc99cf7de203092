//! Typewriter reveal of the agent response.
//!
//! While revealing, the displayed text grows by one character per interval.
//! When reveal is off the full text is shown. Changing the source restarts
//! from an empty prefix.

use std::time::Duration;

/// Marker appended while the text is still growing
pub const CURSOR: char = '|';

#[derive(Debug, Clone)]
pub struct Typewriter {
    source: String,
    interval: Duration,
    revealing: bool,
    /// Number of characters revealed so far
    shown: usize,
    /// Byte offset of the end of the revealed prefix
    shown_bytes: usize,
    next_tick: Option<Duration>,
}

impl Typewriter {
    pub fn new(interval: Duration) -> Self {
        Self {
            source: String::new(),
            interval,
            revealing: false,
            shown: 0,
            shown_bytes: 0,
            next_tick: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_revealing(&self) -> bool {
        self.revealing
    }

    /// Replace the text. A different text restarts the reveal from zero.
    pub fn set_source(&mut self, text: &str, now: Duration) {
        if text == self.source {
            return;
        }
        self.source = text.to_string();
        self.shown = 0;
        self.shown_bytes = 0;
        self.next_tick = self.revealing.then(|| now + self.interval);
    }

    /// Drop the text entirely
    pub fn clear(&mut self) {
        self.source.clear();
        self.revealing = false;
        self.shown = 0;
        self.shown_bytes = 0;
        self.next_tick = None;
    }

    pub fn set_revealing(&mut self, revealing: bool, now: Duration) {
        if revealing == self.revealing {
            return;
        }
        self.revealing = revealing;
        self.next_tick = revealing.then(|| now + self.interval);
    }

    /// Apply every tick that has elapsed. Returns true if the text grew.
    pub fn poll(&mut self, now: Duration) -> bool {
        let mut grew = false;
        while let Some(due) = self.next_tick {
            if due > now || !self.step() {
                break;
            }
            grew = true;
            self.next_tick = Some(due + self.interval);
        }
        if self.is_complete() {
            self.next_tick = None;
        }
        grew
    }

    /// Reveal one more character
    fn step(&mut self) -> bool {
        match self.source[self.shown_bytes..].chars().next() {
            Some(c) => {
                self.shown += 1;
                self.shown_bytes += c.len_utf8();
                true
            }
            None => false,
        }
    }

    /// Whether the whole text has been revealed
    pub fn is_complete(&self) -> bool {
        self.shown_bytes >= self.source.len()
    }

    pub fn revealed_chars(&self) -> usize {
        self.shown
    }

    /// Text to display, without the cursor
    pub fn displayed(&self) -> &str {
        if self.revealing {
            &self.source[..self.shown_bytes]
        } else {
            &self.source
        }
    }

    /// Whether the cursor marker should be drawn after the text
    pub fn shows_cursor(&self) -> bool {
        self.revealing && !self.is_complete()
    }

    /// Displayed text with the cursor appended while still growing
    pub fn render(&self) -> String {
        let mut text = self.displayed().to_string();
        if self.shows_cursor() {
            text.push(CURSOR);
        }
        text
    }
}
