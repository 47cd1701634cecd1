//! 3×3 picture-frame puzzle: pick two tiles to swap them until every tile
//! is home.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use tracing::debug;

use crate::games::escape::actions::PUZZLE_TILE_BASE;
use crate::games::escape::session::SoundCue;
use crate::input::{ClickState, InputEvent};

use super::{
    Delay, Lifecycle, Minigame, MinigameEvent, MinigamePhase, Resolution, StartOutcome,
};

pub const SIDE: usize = 3;
pub const TILES: usize = SIDE * SIDE;
pub const SOLVED_CLOSE_MS: u32 = 1000;

/// xorshift64 step.
fn next_random(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

/// Fisher-Yates shuffle of the home layout that never returns it unchanged.
pub fn shuffled(seed: u64) -> [u8; TILES] {
    let mut state = seed | 1;
    let mut tiles: [u8; TILES] = std::array::from_fn(|i| i as u8);
    for i in (1..TILES).rev() {
        let j = (next_random(&mut state) % (i as u64 + 1)) as usize;
        tiles.swap(i, j);
    }
    if is_solved(&tiles) {
        tiles.swap(0, 1);
    }
    tiles
}

pub fn is_solved(tiles: &[u8; TILES]) -> bool {
    tiles.iter().enumerate().all(|(i, t)| *t as usize == i)
}

pub struct SwapPuzzleGame {
    lifecycle: Lifecycle,
    seed: u64,
    tiles: [u8; TILES],
    selected: Option<usize>,
    moves: u32,
    solved_close: Delay,
}

impl SwapPuzzleGame {
    pub fn new(seed: u64) -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            seed,
            tiles: shuffled(seed),
            selected: None,
            moves: 0,
            solved_close: Delay::default(),
        }
    }

    pub fn tiles(&self) -> &[u8; TILES] {
        &self.tiles
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    fn pick(&mut self, index: usize) -> Vec<MinigameEvent> {
        if index >= TILES {
            return Vec::new();
        }
        let Some(first) = self.selected.take() else {
            self.selected = Some(index);
            return Vec::new();
        };
        if first == index {
            return Vec::new();
        }
        self.tiles.swap(first, index);
        self.moves += 1;
        if !is_solved(&self.tiles) {
            return Vec::new();
        }
        debug!(moves = self.moves, "frame puzzle solved");
        self.solved_close.arm(SOLVED_CLOSE_MS);
        let mut events = vec![MinigameEvent::Sound(SoundCue::Unlock)];
        events.extend(self.lifecycle.complete(Resolution::Solved));
        events
    }
}

impl Minigame for SwapPuzzleGame {
    fn initialize(&mut self) {
        self.selected = None;
        self.solved_close.disarm();
        self.lifecycle.initialize();
    }

    fn start(&mut self) -> StartOutcome {
        let outcome = self.lifecycle.start();
        if outcome == StartOutcome::Started {
            self.seed = self.seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
            self.tiles = shuffled(self.seed);
            self.selected = None;
            self.moves = 0;
        }
        outcome
    }

    fn close(&mut self) {
        self.selected = None;
        self.solved_close.disarm();
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
            InputEvent::Click(id) if (PUZZLE_TILE_BASE..PUZZLE_TILE_BASE + TILES as u16).contains(id) => {
                self.pick((id - PUZZLE_TILE_BASE) as usize)
            }
            InputEvent::Key(c @ '1'..='9') => self.pick(*c as usize - '1' as usize),
            _ => Vec::new(),
        }
    }

    fn tick(&mut self, elapsed_ms: u32) -> Vec<MinigameEvent> {
        if !self.lifecycle.is_live() {
            return Vec::new();
        }
        if self.solved_close.advance(elapsed_ms) {
            self.close();
            return vec![MinigameEvent::Closed];
        }
        Vec::new()
    }

    fn render(&self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        super::render::render_swap_puzzle(self, f, area, cs);
    }
}
