//! Minigame lifecycle contract and shared plumbing.
//!
//! A minigame never touches world state directly. It reports what happened
//! through [`MinigameEvent`]s returned from `handle_input`/`tick`, and the
//! owning room applies them. Timers are plain millisecond counters advanced
//! by `tick`, so `close()` cancels everything by resetting state.

pub mod code_entry;
pub mod keypad;
pub mod pixel_coverage;
pub mod render;
pub mod swap_puzzle;
pub mod timing_bar;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

use super::session::SoundCue;

/// Identifies a minigame instance within its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinigameKey {
    Mirror,
    Copier,
    Frame,
    Safe,
    Laptop,
    Drawer,
    Whiteboard,
    ExitDoor,
}

impl MinigameKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MinigameKey::Mirror => "mirror",
            MinigameKey::Copier => "copier",
            MinigameKey::Frame => "frame",
            MinigameKey::Safe => "safe",
            MinigameKey::Laptop => "laptop",
            MinigameKey::Drawer => "drawer",
            MinigameKey::Whiteboard => "whiteboard",
            MinigameKey::ExitDoor => "exit_door",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinigamePhase {
    Idle,
    Initialized,
    Running,
    Completed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyResolved,
}

/// What the player achieved. Most games just succeed; the exit keypad
/// reports whatever code was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Solved,
    Submitted(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MinigameEvent {
    /// Success. Emitted at most once per `start()`.
    Completed(Resolution),
    /// The game closed itself (auto-close after success, or player exit).
    Closed,
    Sound(SoundCue),
}

pub trait Minigame {
    /// Reset transient state. Does not clear the completed flag.
    fn initialize(&mut self);

    /// Begin a run, or report that the game was already beaten.
    fn start(&mut self) -> StartOutcome;

    /// Stop the game from any state. Afterwards `tick` and `handle_input`
    /// produce no events until the next `start()`.
    fn close(&mut self);

    fn phase(&self) -> MinigamePhase;

    fn is_completed(&self) -> bool;

    fn handle_input(&mut self, event: &InputEvent) -> Vec<MinigameEvent>;

    fn tick(&mut self, elapsed_ms: u32) -> Vec<MinigameEvent>;

    fn render(&self, f: &mut Frame, area: Rect, cs: &mut ClickState);
}

/// Guard for the once-per-playthrough success notification.
#[derive(Debug, Default)]
pub struct CompletionLatch {
    fired: bool,
}

impl CompletionLatch {
    /// True exactly once until [`reset`](CompletionLatch::reset).
    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }
}

/// Lifecycle bookkeeping shared by every minigame implementation.
#[derive(Debug)]
pub struct Lifecycle {
    phase: MinigamePhase,
    completed: bool,
    latch: CompletionLatch,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: MinigamePhase::Idle,
            completed: false,
            latch: CompletionLatch::default(),
        }
    }

    pub fn phase(&self) -> MinigamePhase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_running(&self) -> bool {
        self.phase == MinigamePhase::Running
    }

    /// Accepts ticks: running, or completed and waiting to auto-close.
    pub fn is_live(&self) -> bool {
        matches!(
            self.phase,
            MinigamePhase::Running | MinigamePhase::Completed
        )
    }

    pub fn initialize(&mut self) {
        self.phase = MinigamePhase::Initialized;
    }

    pub fn start(&mut self) -> StartOutcome {
        if self.completed {
            return StartOutcome::AlreadyResolved;
        }
        self.latch.reset();
        self.phase = MinigamePhase::Running;
        StartOutcome::Started
    }

    /// Mark success and build the completion event, unless it already fired
    /// during this run.
    pub fn complete(&mut self, resolution: Resolution) -> Option<MinigameEvent> {
        if !self.latch.fire() {
            return None;
        }
        self.completed = true;
        self.phase = MinigamePhase::Completed;
        Some(MinigameEvent::Completed(resolution))
    }

    pub fn close(&mut self) {
        self.phase = MinigamePhase::Closed;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Count-down timer in milliseconds. `None` when disarmed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    remaining: Option<u32>,
}

impl Delay {
    pub fn arm(&mut self, ms: u32) {
        self.remaining = Some(ms);
    }

    pub fn disarm(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance; returns true on the step the delay expires.
    pub fn advance(&mut self, ms: u32) -> bool {
        match self.remaining {
            Some(left) if left <= ms => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - ms);
                false
            }
            None => false,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_fires_once_until_reset() {
        let mut latch = CompletionLatch::default();
        assert!(latch.fire());
        assert!(!latch.fire());
        latch.reset();
        assert!(latch.fire());
    }

    #[test]
    fn lifecycle_completion_is_single_shot() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.phase(), MinigamePhase::Idle);
        lc.initialize();
        assert_eq!(lc.start(), StartOutcome::Started);
        assert!(lc.complete(Resolution::Solved).is_some());
        assert!(lc.complete(Resolution::Solved).is_none());
        assert!(lc.is_completed());
        assert_eq!(lc.phase(), MinigamePhase::Completed);
    }

    #[test]
    fn completed_flag_survives_initialize_and_close() {
        let mut lc = Lifecycle::new();
        lc.start();
        lc.complete(Resolution::Solved);
        lc.close();
        lc.initialize();
        assert!(lc.is_completed());
        assert_eq!(lc.start(), StartOutcome::AlreadyResolved);
    }

    #[test]
    fn delay_fires_on_expiry_step() {
        let mut d = Delay::default();
        assert!(!d.advance(100));
        d.arm(50);
        assert!(!d.advance(30));
        assert!(d.advance(20));
        assert!(!d.is_armed());
        assert!(!d.advance(20));
    }
}
