//! Digit keypad used for the safe, the drawer lock, the whiteboard and the
//! exit door.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use tracing::debug;

use crate::games::escape::actions::{KEYPAD_BACKSPACE, KEYPAD_DIGIT_BASE, KEYPAD_ENTER};
use crate::games::escape::session::SoundCue;
use crate::input::{ClickState, InputEvent};

use super::{
    Delay, Lifecycle, Minigame, MinigameEvent, MinigamePhase, Resolution, StartOutcome,
};

pub const ERROR_FLASH_MS: u32 = 600;
pub const UNLOCK_CLOSE_MS: u32 = 1500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeypadMode {
    /// Only `code` opens it; wrong entries flash and clear.
    Unlock { code: &'static str },
    /// Any non-empty entry is reported back; an empty one closes the pad.
    Submit,
}

pub struct KeypadGame {
    title: &'static str,
    prompt: &'static str,
    mode: KeypadMode,
    max_len: usize,
    lifecycle: Lifecycle,
    entry: String,
    error_flash: Delay,
    unlock_close: Delay,
}

impl KeypadGame {
    pub fn new(title: &'static str, prompt: &'static str, mode: KeypadMode, max_len: usize) -> Self {
        Self {
            title,
            prompt,
            mode,
            max_len,
            lifecycle: Lifecycle::new(),
            entry: String::new(),
            error_flash: Delay::default(),
            unlock_close: Delay::default(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn is_flashing_error(&self) -> bool {
        self.error_flash.is_armed()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlock_close.is_armed()
    }

    fn accepts_input(&self) -> bool {
        self.lifecycle.is_running() && !self.error_flash.is_armed()
    }

    fn push_digit(&mut self, digit: char) {
        if self.entry.len() < self.max_len {
            self.entry.push(digit);
        }
    }

    fn submit(&mut self) -> Vec<MinigameEvent> {
        match self.mode {
            KeypadMode::Unlock { code } => {
                if self.entry == code {
                    debug!(title = self.title, "keypad unlocked");
                    self.unlock_close.arm(UNLOCK_CLOSE_MS);
                    let mut events = vec![MinigameEvent::Sound(SoundCue::Unlock)];
                    events.extend(self.lifecycle.complete(Resolution::Solved));
                    events
                } else {
                    debug!(title = self.title, "keypad rejected entry");
                    self.error_flash.arm(ERROR_FLASH_MS);
                    vec![MinigameEvent::Sound(SoundCue::Error)]
                }
            }
            KeypadMode::Submit => {
                if self.entry.is_empty() {
                    self.close();
                    return vec![MinigameEvent::Closed];
                }
                let code = std::mem::take(&mut self.entry);
                let mut events = vec![MinigameEvent::Sound(SoundCue::Unlock)];
                events.extend(self.lifecycle.complete(Resolution::Submitted(code)));
                self.close();
                events.push(MinigameEvent::Closed);
                events
            }
        }
    }
}

impl Minigame for KeypadGame {
    fn initialize(&mut self) {
        self.entry.clear();
        self.error_flash.disarm();
        self.unlock_close.disarm();
        self.lifecycle.initialize();
    }

    fn start(&mut self) -> StartOutcome {
        let outcome = self.lifecycle.start();
        if outcome == StartOutcome::Started {
            self.entry.clear();
        }
        outcome
    }

    fn close(&mut self) {
        self.error_flash.disarm();
        self.unlock_close.disarm();
        self.lifecycle.close();
    }

    fn phase(&self) -> MinigamePhase {
        self.lifecycle.phase()
    }

    fn is_completed(&self) -> bool {
        self.lifecycle.is_completed()
    }

    fn handle_input(&mut self, event: &InputEvent) -> Vec<MinigameEvent> {
        if !self.accepts_input() {
            return Vec::new();
        }
        match event {
            InputEvent::Key(c) if c.is_ascii_digit() => {
                self.push_digit(*c);
                Vec::new()
            }
            InputEvent::Click(id) if (KEYPAD_DIGIT_BASE..KEYPAD_DIGIT_BASE + 10).contains(id) => {
                let digit = (b'0' + (id - KEYPAD_DIGIT_BASE) as u8) as char;
                self.push_digit(digit);
                Vec::new()
            }
            InputEvent::Backspace | InputEvent::Click(KEYPAD_BACKSPACE) => {
                self.entry.pop();
                Vec::new()
            }
            InputEvent::Enter | InputEvent::Click(KEYPAD_ENTER) => self.submit(),
            _ => Vec::new(),
        }
    }

    fn tick(&mut self, elapsed_ms: u32) -> Vec<MinigameEvent> {
        if !self.lifecycle.is_live() {
            return Vec::new();
        }
        if self.error_flash.advance(elapsed_ms) {
            self.entry.clear();
        }
        if self.unlock_close.advance(elapsed_ms) {
            self.close();
            return vec![MinigameEvent::Closed];
        }
        Vec::new()
    }

    fn render(&self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        super::render::render_keypad(self, f, area, cs);
    }
}
