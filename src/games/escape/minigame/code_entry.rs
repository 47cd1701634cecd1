//! Laptop terminal: read the script in one tab, run it from the other.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use tracing::debug;

use crate::games::escape::actions::{LAPTOP_TAB_SOURCE, LAPTOP_TAB_TERMINAL};
use crate::games::escape::session::SoundCue;
use crate::input::{ClickState, InputEvent};

use super::{
    Delay, Lifecycle, Minigame, MinigameEvent, MinigamePhase, Resolution, StartOutcome,
};

pub const SOLUTION: &str = "run hack.js";
pub const MAX_COMMAND_LEN: usize = 32;
pub const SUCCESS_CLOSE_MS: u32 = 1500;
const MAX_HISTORY: usize = 12;

pub const SCRIPT_SOURCE: &[&str] = &[
    "// hack.js",
    "const safe = require('./vault');",
    "",
    "function decode(bytes) {",
    "  return bytes.map(b => String.fromCharCode(b)).join('');",
    "}",
    "",
    "console.log(decode(safe.code));",
    "// usage: run hack.js",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaptopTab {
    Terminal,
    Source,
}

pub struct CodeEntryGame {
    lifecycle: Lifecycle,
    tab: LaptopTab,
    command: String,
    history: Vec<String>,
    success_close: Delay,
}

impl CodeEntryGame {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            tab: LaptopTab::Terminal,
            command: String::new(),
            history: Vec::new(),
            success_close: Delay::default(),
        }
    }

    pub fn tab(&self) -> LaptopTab {
        self.tab
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn log(&mut self, line: String) {
        self.history.push(line);
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }

    fn run(&mut self) -> Vec<MinigameEvent> {
        let command = std::mem::take(&mut self.command);
        let trimmed = command.trim();
        self.log(format!("$ {trimmed}"));
        if trimmed.is_empty() {
            return Vec::new();
        }
        if trimmed == SOLUTION {
            debug!("laptop script executed");
            self.log("decoding vault...".to_string());
            self.log("55 52 51 54 56 57".to_string());
            self.success_close.arm(SUCCESS_CLOSE_MS);
            let mut events = vec![MinigameEvent::Sound(SoundCue::Unlock)];
            events.extend(self.lifecycle.complete(Resolution::Solved));
            return events;
        }
        let name = trimmed.split_whitespace().next().unwrap_or(trimmed);
        self.log(format!("command not found: {name}"));
        vec![MinigameEvent::Sound(SoundCue::Error)]
    }
}

impl Default for CodeEntryGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Minigame for CodeEntryGame {
    fn initialize(&mut self) {
        self.tab = LaptopTab::Terminal;
        self.command.clear();
        self.history.clear();
        self.success_close.disarm();
        self.lifecycle.initialize();
    }

    fn start(&mut self) -> StartOutcome {
        self.lifecycle.start()
    }

    fn close(&mut self) {
        self.success_close.disarm();
        self.lifecycle.close();
    }

    fn phase(&self) -> MinigamePhase {
        self.lifecycle.phase()
    }

    fn is_completed(&self) -> bool {
        self.lifecycle.is_completed()
    }

    fn handle_input(&mut self, event: &InputEvent) -> Vec<MinigameEvent> {
        if !self.lifecycle.is_running() {
            return Vec::new();
        }
        match event {
            InputEvent::Click(LAPTOP_TAB_TERMINAL) => self.tab = LaptopTab::Terminal,
            InputEvent::Click(LAPTOP_TAB_SOURCE) => self.tab = LaptopTab::Source,
            _ if self.tab == LaptopTab::Source => {}
            InputEvent::Key(c) if !c.is_control() => {
                if self.command.chars().count() < MAX_COMMAND_LEN {
                    self.command.push(*c);
                }
            }
            InputEvent::Backspace => {
                self.command.pop();
            }
            InputEvent::Enter => return self.run(),
            _ => {}
        }
        Vec::new()
    }

    fn tick(&mut self, elapsed_ms: u32) -> Vec<MinigameEvent> {
        if !self.lifecycle.is_live() {
            return Vec::new();
        }
        if self.success_close.advance(elapsed_ms) {
            self.close();
            return vec![MinigameEvent::Closed];
        }
        Vec::new()
    }

    fn render(&self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        super::render::render_laptop(self, f, area, cs);
    }
}
