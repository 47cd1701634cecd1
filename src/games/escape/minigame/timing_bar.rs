//! Timing-bar hit judge and the copier repair game built on it.
//!
//! A marker sweeps between [`BAR_MIN`] and [`BAR_MAX`] in fixed steps. Each
//! hit is graded by distance from [`CENTER`]: Perfect and Good add repair
//! progress, Miss costs a life. Losing every life knocks progress back once
//! and pauses input for [`RETRY_DELAY_MS`] before play resumes.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use tracing::{debug, info};

use crate::games::escape::actions::COPIER_HIT;
use crate::games::escape::session::SoundCue;
use crate::input::{ClickState, InputEvent};

use super::{
    Delay, Lifecycle, Minigame, MinigameEvent, MinigamePhase, Resolution, StartOutcome,
};

pub const BAR_MIN: i32 = 5;
pub const BAR_MAX: i32 = 95;
pub const CENTER: i32 = 50;
/// Half-width of the Perfect band: 47..=53.
pub const PERFECT_RADIUS: i32 = 3;
/// Half-width of the Good band (outer edge): 42..=58.
pub const GOOD_RADIUS: i32 = 8;

pub const STEP_MS: u32 = 30;
pub const SPEED: i32 = 7;
pub const PERFECT_GAIN: u32 = 10;
pub const GOOD_GAIN: u32 = 5;
pub const MAX_PROGRESS: u32 = 100;
pub const LIVES: u8 = 3;
pub const LIFE_LOSS_PENALTY: u32 = 50;
pub const HIT_COOLDOWN_MS: u32 = 300;
pub const RETRY_DELAY_MS: u32 = 2000;
/// Time the finished copier stays on screen before closing.
pub const WIN_CLOSE_DELAY_MS: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitGrade {
    Perfect,
    Good,
    Miss,
}

impl HitGrade {
    pub fn label(self) -> &'static str {
        match self {
            HitGrade::Perfect => "PERFECT",
            HitGrade::Good => "GOOD",
            HitGrade::Miss => "MISS",
        }
    }
}

pub fn classify(position: i32) -> HitGrade {
    let distance = (position - CENTER).abs();
    if distance <= PERFECT_RADIUS {
        HitGrade::Perfect
    } else if distance <= GOOD_RADIUS {
        HitGrade::Good
    } else {
        HitGrade::Miss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarState {
    Idle,
    Running,
    LostRetry,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub grade: HitGrade,
    /// This hit brought progress to 100.
    pub won: bool,
    /// This hit used up the last life.
    pub lost_all: bool,
}

#[derive(Debug, Clone)]
pub struct TimingBarEngine {
    position: i32,
    direction: i32,
    progress: u32,
    lives: u8,
    state: BarState,
    step_acc: u32,
    cooldown_ms: u32,
    /// One scoring hit per sweep; cleared when the marker reverses.
    sweep_scored: bool,
    retry: Delay,
}

impl TimingBarEngine {
    pub fn new() -> Self {
        Self {
            position: CENTER,
            direction: 1,
            progress: 0,
            lives: LIVES,
            state: BarState::Idle,
            step_acc: 0,
            cooldown_ms: 0,
            sweep_scored: false,
            retry: Delay::default(),
        }
    }

    pub fn start(&mut self) {
        *self = Self {
            state: BarState::Running,
            ..Self::new()
        };
    }

    /// Stop all timers; the engine goes back to Idle.
    pub fn stop(&mut self) {
        self.state = BarState::Idle;
        self.retry.disarm();
        self.step_acc = 0;
        self.cooldown_ms = 0;
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn state(&self) -> BarState {
        self.state
    }

    /// Advance timers by `ms`. Returns true when a retry pause just ended.
    pub fn advance(&mut self, ms: u32) -> bool {
        self.cooldown_ms = self.cooldown_ms.saturating_sub(ms);
        match self.state {
            BarState::Running => {
                self.step_acc += ms;
                while self.step_acc >= STEP_MS {
                    self.step_acc -= STEP_MS;
                    self.step();
                }
                false
            }
            BarState::LostRetry => {
                if self.retry.advance(ms) {
                    self.lives = LIVES;
                    self.sweep_scored = false;
                    self.cooldown_ms = 0;
                    self.step_acc = 0;
                    self.state = BarState::Running;
                    true
                } else {
                    false
                }
            }
            BarState::Idle | BarState::Won => false,
        }
    }

    fn step(&mut self) {
        self.position += self.direction * SPEED;
        if self.position <= BAR_MIN {
            self.position = BAR_MIN;
            self.direction = 1;
            self.sweep_scored = false;
        } else if self.position >= BAR_MAX {
            self.position = BAR_MAX;
            self.direction = -1;
            self.sweep_scored = false;
        }
    }

    /// Judge a hit at the current marker position. `None` when the hit is
    /// ignored: not running, inside the cooldown, or the sweep already scored.
    pub fn hit(&mut self) -> Option<HitOutcome> {
        if self.state != BarState::Running || self.cooldown_ms > 0 {
            return None;
        }
        self.cooldown_ms = HIT_COOLDOWN_MS;
        if self.sweep_scored {
            return None;
        }

        let grade = classify(self.position);
        let mut outcome = HitOutcome {
            grade,
            won: false,
            lost_all: false,
        };
        match grade {
            HitGrade::Perfect | HitGrade::Good => {
                let gain = if grade == HitGrade::Perfect {
                    PERFECT_GAIN
                } else {
                    GOOD_GAIN
                };
                self.progress = (self.progress + gain).min(MAX_PROGRESS);
                self.sweep_scored = true;
                if self.progress >= MAX_PROGRESS {
                    self.state = BarState::Won;
                    outcome.won = true;
                }
            }
            HitGrade::Miss => {
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    self.progress = self.progress.saturating_sub(LIFE_LOSS_PENALTY);
                    self.state = BarState::LostRetry;
                    self.retry.arm(RETRY_DELAY_MS);
                    outcome.lost_all = true;
                }
            }
        }
        Some(outcome)
    }

    #[cfg(test)]
    pub(crate) fn place_marker(&mut self, position: i32, direction: i32) {
        self.position = position;
        self.direction = direction;
    }
}

impl Default for TimingBarEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ── Copier repair game ─────────────────────────────────────────

pub struct CopierGame {
    lifecycle: Lifecycle,
    engine: TimingBarEngine,
    last_grade: Option<HitGrade>,
    close_delay: Delay,
}

impl CopierGame {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            engine: TimingBarEngine::new(),
            last_grade: None,
            close_delay: Delay::default(),
        }
    }

    pub fn engine(&self) -> &TimingBarEngine {
        &self.engine
    }

    pub fn last_grade(&self) -> Option<HitGrade> {
        self.last_grade
    }

    fn press(&mut self) -> Vec<MinigameEvent> {
        let mut events = Vec::new();
        let Some(outcome) = self.engine.hit() else {
            return events;
        };
        debug!(
            grade = outcome.grade.label(),
            position = self.engine.position(),
            progress = self.engine.progress(),
            lives = self.engine.lives(),
            "copier hit"
        );
        self.last_grade = Some(outcome.grade);
        events.push(MinigameEvent::Sound(match outcome.grade {
            HitGrade::Perfect => SoundCue::PerfectHit,
            HitGrade::Good => SoundCue::GoodHit,
            HitGrade::Miss => SoundCue::Miss,
        }));
        if outcome.lost_all {
            info!(progress = self.engine.progress(), "copier: out of lives");
            events.push(MinigameEvent::Sound(SoundCue::RepairFailed));
        }
        if outcome.won {
            events.push(MinigameEvent::Sound(SoundCue::RepairComplete));
            events.extend(self.lifecycle.complete(Resolution::Solved));
            self.close_delay.arm(WIN_CLOSE_DELAY_MS);
        }
        events
    }
}

impl Default for CopierGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Minigame for CopierGame {
    fn initialize(&mut self) {
        self.engine.stop();
        self.last_grade = None;
        self.close_delay.disarm();
        self.lifecycle.initialize();
    }

    fn start(&mut self) -> StartOutcome {
        let outcome = self.lifecycle.start();
        if outcome == StartOutcome::Started {
            self.engine.start();
            self.last_grade = None;
        }
        outcome
    }

    fn close(&mut self) {
        self.engine.stop();
        self.close_delay.disarm();
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
            InputEvent::Key(' ') | InputEvent::Enter | InputEvent::Click(COPIER_HIT) => {
                self.press()
            }
            _ => Vec::new(),
        }
    }

    fn tick(&mut self, elapsed_ms: u32) -> Vec<MinigameEvent> {
        if !self.lifecycle.is_live() {
            return Vec::new();
        }
        if self.engine.advance(elapsed_ms) {
            self.last_grade = None;
        }
        if self.close_delay.advance(elapsed_ms) {
            self.close();
            return vec![MinigameEvent::Closed];
        }
        Vec::new()
    }

    fn render(&self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        super::render::render_copier(self, f, area, cs);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{completions, run_for};
    use super::*;
    use proptest::prelude::*;

    // ── classification ─────────────────────────────────────────

    #[test]
    fn center_is_always_perfect() {
        assert_eq!(classify(CENTER), HitGrade::Perfect);
    }

    #[test]
    fn band_edges() {
        assert_eq!(classify(47), HitGrade::Perfect);
        assert_eq!(classify(53), HitGrade::Perfect);
        assert_eq!(classify(46), HitGrade::Good);
        assert_eq!(classify(54), HitGrade::Good);
        assert_eq!(classify(42), HitGrade::Good);
        assert_eq!(classify(58), HitGrade::Good);
        assert_eq!(classify(41), HitGrade::Miss);
        assert_eq!(classify(59), HitGrade::Miss);
        assert_eq!(classify(BAR_MIN), HitGrade::Miss);
        assert_eq!(classify(BAR_MAX), HitGrade::Miss);
    }

    proptest! {
        #[test]
        fn classification_is_symmetric(offset in 0i32..=45) {
            prop_assert_eq!(classify(CENTER - offset), classify(CENTER + offset));
        }

        #[test]
        fn bands_widen_monotonically(a in 0i32..=45, b in 0i32..=45) {
            // Farther from center never grades better.
            let rank = |g: HitGrade| match g {
                HitGrade::Perfect => 0,
                HitGrade::Good => 1,
                HitGrade::Miss => 2,
            };
            if a <= b {
                prop_assert!(rank(classify(CENTER + a)) <= rank(classify(CENTER + b)));
            }
        }

        #[test]
        fn same_schedule_same_result(hits in proptest::collection::vec(0u32..400, 0..60)) {
            let play = |hits: &[u32]| {
                let mut e = TimingBarEngine::new();
                e.start();
                for wait in hits {
                    e.advance(*wait);
                    e.hit();
                }
                (e.position(), e.progress(), e.lives(), e.state())
            };
            prop_assert_eq!(play(&hits), play(&hits));
        }

        #[test]
        fn progress_and_lives_stay_in_range(hits in proptest::collection::vec(0u32..400, 0..200)) {
            let mut e = TimingBarEngine::new();
            e.start();
            for wait in hits {
                e.advance(wait);
                e.hit();
                prop_assert!(e.progress() <= MAX_PROGRESS);
                prop_assert!(e.lives() <= LIVES);
                prop_assert!((BAR_MIN..=BAR_MAX).contains(&e.position()));
                if e.state() == BarState::Running {
                    prop_assert!(e.lives() > 0);
                }
            }
        }
    }

    // ── engine ────────────────────────────────────────────────

    #[test]
    fn marker_moves_one_step_per_tick_and_reverses_at_bounds() {
        let mut e = TimingBarEngine::new();
        e.start();
        e.advance(STEP_MS - 1);
        assert_eq!(e.position(), CENTER);
        e.advance(1);
        assert_eq!(e.position(), CENTER + SPEED);
        // 57 → 64 → 71 → 78 → 85 → 92 → 95 (clamped, reverse) → 88
        e.advance(STEP_MS * 6);
        assert_eq!(e.position(), BAR_MAX);
        e.advance(STEP_MS);
        assert_eq!(e.position(), BAR_MAX - SPEED);
    }

    #[test]
    fn hit_at_center_is_perfect() {
        let mut e = TimingBarEngine::new();
        e.start();
        let out = e.hit().unwrap();
        assert_eq!(out.grade, HitGrade::Perfect);
        assert_eq!(e.progress(), PERFECT_GAIN);
        assert_eq!(e.lives(), LIVES);
    }

    #[test]
    fn cooldown_swallows_double_press() {
        let mut e = TimingBarEngine::new();
        e.start();
        e.place_marker(20, 1);
        assert!(e.hit().is_some());
        assert!(e.hit().is_none());
        e.advance(HIT_COOLDOWN_MS - 1);
        e.place_marker(20, 1);
        assert!(e.hit().is_none());
        e.advance(1);
        e.place_marker(20, 1);
        assert!(e.hit().is_some());
        assert_eq!(e.lives(), LIVES - 2);
    }

    #[test]
    fn one_scoring_hit_per_sweep() {
        let mut e = TimingBarEngine::new();
        e.start();
        assert_eq!(e.hit().unwrap().grade, HitGrade::Perfect);
        // Wait out the cooldown without touching a bound.
        e.place_marker(10, 1);
        e.advance(HIT_COOLDOWN_MS);
        e.place_marker(CENTER, 1);
        assert!(e.hit().is_none());
        assert_eq!(e.progress(), PERFECT_GAIN);

        // Reversal at the top re-arms scoring.
        e.place_marker(BAR_MAX - 1, 1);
        e.advance(STEP_MS);
        assert_eq!(e.position(), BAR_MAX);
        e.advance(HIT_COOLDOWN_MS);
        e.place_marker(CENTER + 5, -1);
        assert_eq!(e.hit().unwrap().grade, HitGrade::Good);
        assert_eq!(e.progress(), PERFECT_GAIN + GOOD_GAIN);
    }

    #[test]
    fn losing_all_lives_penalizes_once_then_resumes() {
        let mut e = TimingBarEngine::new();
        e.start();
        // Build progress to 60 with six perfect sweeps.
        for _ in 0..6 {
            e.place_marker(CENTER, 1);
            e.hit();
            e.advance(HIT_COOLDOWN_MS);
            e.place_marker(BAR_MAX, 1);
            e.advance(STEP_MS); // reversal clears the sweep lock
        }
        assert_eq!(e.progress(), 60);

        for i in 0..LIVES {
            e.place_marker(10, 1);
            let out = e.hit().unwrap();
            assert_eq!(out.grade, HitGrade::Miss);
            assert_eq!(out.lost_all, i == LIVES - 1);
            e.advance(HIT_COOLDOWN_MS);
        }
        assert_eq!(e.state(), BarState::LostRetry);
        assert_eq!(e.progress(), 10);

        // Input is paused during the retry delay.
        e.place_marker(CENTER, 1);
        assert!(e.hit().is_none());
        assert!(!e.advance(RETRY_DELAY_MS - HIT_COOLDOWN_MS - 1));
        assert!(e.advance(1));
        assert_eq!(e.state(), BarState::Running);
        assert_eq!(e.lives(), LIVES);
        assert_eq!(e.progress(), 10);
    }

    #[test]
    fn penalty_floors_at_zero() {
        let mut e = TimingBarEngine::new();
        e.start();
        for _ in 0..LIVES {
            e.place_marker(BAR_MIN, 1);
            e.hit();
            e.advance(HIT_COOLDOWN_MS);
        }
        assert_eq!(e.progress(), 0);
        assert_eq!(e.state(), BarState::LostRetry);
    }

    // ── copier lifecycle ──────────────────────────────────────

    fn win_copier(game: &mut CopierGame) -> Vec<MinigameEvent> {
        let mut events = Vec::new();
        for _ in 0..10 {
            game.engine.place_marker(CENTER, 1);
            events.extend(game.handle_input(&InputEvent::Key(' ')));
            events.extend(game.tick(HIT_COOLDOWN_MS));
            game.engine.place_marker(BAR_MAX, 1);
            events.extend(game.tick(STEP_MS));
        }
        events
    }

    #[test]
    fn copier_completes_once_then_auto_closes() {
        let mut game = CopierGame::new();
        game.initialize();
        assert_eq!(game.start(), StartOutcome::Started);
        let mut events = win_copier(&mut game);
        assert_eq!(completions(&events), 1);
        assert!(events.contains(&MinigameEvent::Sound(SoundCue::RepairComplete)));
        assert_eq!(game.phase(), MinigamePhase::Completed);

        // Extra presses after the win do nothing.
        events.extend(game.handle_input(&InputEvent::Key(' ')));
        assert_eq!(completions(&events), 1);

        let tail = run_for(&mut game, WIN_CLOSE_DELAY_MS, 10);
        assert!(tail.contains(&MinigameEvent::Closed));
        assert_eq!(game.phase(), MinigamePhase::Closed);
        assert!(game.is_completed());
        game.initialize();
        assert_eq!(game.start(), StartOutcome::AlreadyResolved);
    }

    #[test]
    fn close_is_safe_in_every_state() {
        // Idle
        let mut game = CopierGame::new();
        game.close();
        assert_eq!(game.phase(), MinigamePhase::Closed);

        // Running, mid-retry
        let mut game = CopierGame::new();
        game.initialize();
        game.start();
        for _ in 0..LIVES {
            game.engine.place_marker(BAR_MIN, 1);
            game.handle_input(&InputEvent::Key(' '));
            game.tick(HIT_COOLDOWN_MS);
        }
        assert_eq!(game.engine().state(), BarState::LostRetry);
        game.close();
        assert!(run_for(&mut game, 10_000, 30).is_empty());
        assert!(game.handle_input(&InputEvent::Key(' ')).is_empty());

        // Completed, before auto-close
        let mut game = CopierGame::new();
        game.initialize();
        game.start();
        win_copier(&mut game);
        game.close();
        assert!(run_for(&mut game, 10_000, 30).is_empty());
        assert!(game.is_completed());
    }

    #[test]
    fn marker_freezes_after_close() {
        let mut game = CopierGame::new();
        game.initialize();
        game.start();
        game.tick(STEP_MS * 3);
        game.close();
        let frozen = game.engine().position();
        game.tick(STEP_MS * 10);
        assert_eq!(game.engine().position(), frozen);
    }
}
