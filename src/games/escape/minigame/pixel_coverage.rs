//! Erase-to-reveal coverage tracking and the bloody mirror game.
//!
//! The covering layer is an alpha raster. Drags erase a capsule of fixed
//! radius between consecutive samples. On stroke end the cleaned share is
//! measured against the opaque pixels captured when the layer was created.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use tracing::{debug, info};

use crate::games::escape::actions::MIRROR_CANVAS;
use crate::games::escape::session::SoundCue;
use crate::input::{ClickState, InputEvent, PointerEvent, PointerPhase};

use super::{
    Delay, Lifecycle, Minigame, MinigameEvent, MinigamePhase, Resolution, StartOutcome,
};

/// Pixels with alpha above this count as covered.
pub const ALPHA_THRESHOLD: u8 = 50;
pub const COMPLETE_PERCENT: u32 = 80;
pub const COMPLETE_DELAY_MS: u32 = 500;
pub const BRUSH_SOUND_COOLDOWN_MS: u32 = 200;

/// Canvas size in pixels. Each terminal cell shows two pixels stacked.
pub const CANVAS_W: usize = 40;
pub const CANVAS_H: usize = 32;
pub const BRUSH_RADIUS: f32 = 2.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaLayer {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl AlphaLayer {
    pub fn filled(width: usize, height: usize, alpha: u8) -> Self {
        Self {
            width,
            height,
            alpha: vec![alpha; width * height],
        }
    }

    /// Irregular stain blob centred in the canvas, fading at the rim.
    pub fn stain(width: usize, height: usize) -> Self {
        let mut layer = Self::filled(width, height, 0);
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        let (rx, ry) = (width as f32 * 0.38, height as f32 * 0.36);
        for y in 0..height {
            for x in 0..width {
                let dx = (x as f32 + 0.5 - cx) / rx;
                let dy = (y as f32 + 0.5 - cy) / ry;
                let angle = dy.atan2(dx);
                let wobble = 1.0 + 0.18 * (angle * 5.0).sin() + 0.07 * (angle * 11.0).cos();
                let d = (dx * dx + dy * dy).sqrt() / wobble;
                let a = if d <= 0.8 {
                    230.0
                } else if d <= 1.0 {
                    230.0 * (1.0 - d) / 0.2
                } else {
                    0.0
                };
                layer.set(x, y, a as u8);
            }
        }
        layer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn alpha(&self, x: usize, y: usize) -> u8 {
        self.alpha[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, alpha: u8) {
        self.alpha[y * self.width + x] = alpha;
    }

    #[cfg(test)]
    pub fn is_opaque(&self, x: usize, y: usize) -> bool {
        self.alpha(x, y) > ALPHA_THRESHOLD
    }
}

/// Distance from `p` to the segment `a..b`.
fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = vx * vx + vy * vy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * vx + (p.1 - a.1) * vy) / len_sq).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.0 + t * vx, a.1 + t * vy);
    ((p.0 - qx).powi(2) + (p.1 - qy).powi(2)).sqrt()
}

#[derive(Debug, Clone)]
pub struct PixelCoverage {
    original: AlphaLayer,
    cover: AlphaLayer,
    original_opaque: usize,
    brush_radius: f32,
    last: Option<(f32, f32)>,
}

impl PixelCoverage {
    /// Snapshot `cover` as the original coverage map.
    pub fn new(cover: AlphaLayer, brush_radius: f32) -> Self {
        let original_opaque = cover.alpha.iter().filter(|a| **a > ALPHA_THRESHOLD).count();
        Self {
            original: cover.clone(),
            cover,
            original_opaque,
            brush_radius,
            last: None,
        }
    }

    pub fn cover(&self) -> &AlphaLayer {
        &self.cover
    }

    /// Restore the untouched layer.
    pub fn reset(&mut self) {
        self.cover = self.original.clone();
        self.last = None;
    }

    pub fn is_stroking(&self) -> bool {
        self.last.is_some()
    }

    /// Clear every pixel within the brush radius of `a..b`.
    /// Returns how many pixels went from visible to clear.
    pub fn erase_segment(&mut self, a: (f32, f32), b: (f32, f32)) -> usize {
        if self.cover.width == 0 || self.cover.height == 0 {
            return 0;
        }
        let r = self.brush_radius;
        let x0 = (a.0.min(b.0) - r).floor().max(0.0) as usize;
        let y0 = (a.1.min(b.1) - r).floor().max(0.0) as usize;
        let x1 = ((a.0.max(b.0) + r).ceil().max(0.0) as usize).min(self.cover.width - 1);
        let y1 = ((a.1.max(b.1) + r).ceil().max(0.0) as usize).min(self.cover.height - 1);

        let mut cleared = 0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if self.cover.alpha(x, y) == 0 {
                    continue;
                }
                if distance_to_segment((x as f32, y as f32), a, b) <= r {
                    if self.cover.alpha(x, y) > ALPHA_THRESHOLD {
                        cleared += 1;
                    }
                    self.cover.set(x, y, 0);
                }
            }
        }
        cleared
    }

    pub fn begin_stroke(&mut self, p: (f32, f32)) -> usize {
        self.last = Some(p);
        self.erase_segment(p, p)
    }

    /// Extend the current stroke to `p`. No-op when no stroke is active.
    pub fn extend_stroke(&mut self, p: (f32, f32)) -> usize {
        match self.last.replace(p) {
            Some(prev) => self.erase_segment(prev, p),
            None => {
                self.last = None;
                0
            }
        }
    }

    /// Finish the stroke and measure coverage.
    pub fn end_stroke(&mut self) -> f32 {
        self.last = None;
        self.cleaned_percentage()
    }

    fn cleaned_count(&self) -> usize {
        self.original
            .alpha
            .iter()
            .zip(&self.cover.alpha)
            .filter(|(orig, now)| **orig > ALPHA_THRESHOLD && **now <= ALPHA_THRESHOLD)
            .count()
    }

    /// Share of originally opaque pixels now clear. An empty layer counts as clean.
    pub fn cleaned_percentage(&self) -> f32 {
        if self.original_opaque == 0 {
            return 100.0;
        }
        self.cleaned_count() as f32 * 100.0 / self.original_opaque as f32
    }

    /// Integer comparison so exactly `percent`% qualifies.
    pub fn meets(&self, percent: u32) -> bool {
        self.cleaned_count() * 100 >= self.original_opaque * percent as usize
    }
}

// ── Mirror game ────────────────────────────────────────────────

pub struct MirrorGame {
    lifecycle: Lifecycle,
    coverage: PixelCoverage,
    revealed: bool,
    complete_delay: Delay,
    since_brush_ms: u32,
    last_percent: f32,
}

impl MirrorGame {
    pub fn new() -> Self {
        Self::with_coverage(PixelCoverage::new(
            AlphaLayer::stain(CANVAS_W, CANVAS_H),
            BRUSH_RADIUS,
        ))
    }

    pub fn with_coverage(coverage: PixelCoverage) -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            coverage,
            revealed: false,
            complete_delay: Delay::default(),
            since_brush_ms: BRUSH_SOUND_COOLDOWN_MS,
            last_percent: 0.0,
        }
    }

    pub fn coverage(&self) -> &PixelCoverage {
        &self.coverage
    }

    pub fn last_percent(&self) -> f32 {
        self.last_percent
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    fn accepts_strokes(&self) -> bool {
        self.lifecycle.is_running() && !self.revealed
    }

    fn brush_feedback(&mut self, erased: usize) -> Vec<MinigameEvent> {
        if erased > 0 && self.since_brush_ms >= BRUSH_SOUND_COOLDOWN_MS {
            self.since_brush_ms = 0;
            vec![MinigameEvent::Sound(SoundCue::Brush)]
        } else {
            Vec::new()
        }
    }

    pub fn stroke_begin(&mut self, x: f32, y: f32) -> Vec<MinigameEvent> {
        if !self.accepts_strokes() {
            return Vec::new();
        }
        let erased = self.coverage.begin_stroke((x, y));
        self.brush_feedback(erased)
    }

    pub fn stroke_to(&mut self, x: f32, y: f32) -> Vec<MinigameEvent> {
        if !self.accepts_strokes() || !self.coverage.is_stroking() {
            return Vec::new();
        }
        let erased = self.coverage.extend_stroke((x, y));
        self.brush_feedback(erased)
    }

    pub fn stroke_end(&mut self) {
        if !self.accepts_strokes() || !self.coverage.is_stroking() {
            return;
        }
        self.last_percent = self.coverage.end_stroke();
        debug!(cleaned = self.last_percent, "mirror stroke");
        if self.coverage.meets(COMPLETE_PERCENT) {
            info!(cleaned = self.last_percent, "mirror clean");
            self.revealed = true;
            self.complete_delay.arm(COMPLETE_DELAY_MS);
        }
    }

    fn on_pointer(&mut self, pointer: &PointerEvent) -> Vec<MinigameEvent> {
        let on_canvas = match pointer.hit {
            Some((MIRROR_CANVAS, col, row)) => Some((col as f32, row as f32 * 2.0)),
            _ => None,
        };
        match (pointer.phase, on_canvas) {
            (PointerPhase::Down, Some((x, y))) => self.stroke_begin(x, y),
            (PointerPhase::Move, Some((x, y))) => self.stroke_to(x, y),
            // Leaving the canvas ends the stroke like a release.
            (PointerPhase::Move, None) | (PointerPhase::Up, _) => {
                self.stroke_end();
                Vec::new()
            }
            (PointerPhase::Down, None) => Vec::new(),
        }
    }
}

impl Default for MirrorGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Minigame for MirrorGame {
    fn initialize(&mut self) {
        self.complete_delay.disarm();
        self.lifecycle.initialize();
    }

    fn start(&mut self) -> StartOutcome {
        let outcome = self.lifecycle.start();
        if outcome == StartOutcome::Started {
            self.coverage.reset();
            self.revealed = false;
            self.last_percent = 0.0;
            self.since_brush_ms = BRUSH_SOUND_COOLDOWN_MS;
        }
        outcome
    }

    fn close(&mut self) {
        self.complete_delay.disarm();
        self.coverage.end_stroke();
        self.lifecycle.close();
    }

    fn phase(&self) -> MinigamePhase {
        self.lifecycle.phase()
    }

    fn is_completed(&self) -> bool {
        self.lifecycle.is_completed()
    }

    fn handle_input(&mut self, event: &InputEvent) -> Vec<MinigameEvent> {
        match event {
            InputEvent::Pointer(pointer) => self.on_pointer(pointer),
            _ => Vec::new(),
        }
    }

    fn tick(&mut self, elapsed_ms: u32) -> Vec<MinigameEvent> {
        if !self.lifecycle.is_running() {
            return Vec::new();
        }
        self.since_brush_ms = self.since_brush_ms.saturating_add(elapsed_ms);
        if !self.complete_delay.advance(elapsed_ms) {
            return Vec::new();
        }
        let mut events: Vec<MinigameEvent> =
            self.lifecycle.complete(Resolution::Solved).into_iter().collect();
        self.close();
        events.push(MinigameEvent::Closed);
        events
    }

    fn render(&self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        super::render::render_mirror(self, f, area, cs);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{completions, run_for};
    use super::*;
    use proptest::prelude::*;

    fn solid(w: usize, h: usize) -> PixelCoverage {
        PixelCoverage::new(AlphaLayer::filled(w, h, 255), 0.5)
    }

    /// Wipe whole rows `0..rows` plus `extra` pixels of the next row.
    fn wipe(game: &mut MirrorGame, rows: usize, extra: usize) {
        for y in 0..rows {
            game.stroke_begin(0.0, y as f32);
            game.stroke_to(9.0, y as f32);
            game.stroke_end();
        }
        if extra > 0 {
            game.stroke_begin(0.0, rows as f32);
            game.stroke_to(extra as f32 - 1.0, rows as f32);
            game.stroke_end();
        }
    }

    fn started(coverage: PixelCoverage) -> MirrorGame {
        let mut game = MirrorGame::with_coverage(coverage);
        game.initialize();
        assert_eq!(game.start(), StartOutcome::Started);
        game
    }

    #[test]
    fn segment_erases_capsule() {
        let mut cov = PixelCoverage::new(AlphaLayer::filled(20, 20, 255), 2.0);
        let cleared = cov.erase_segment((5.0, 10.0), (15.0, 10.0));
        assert!(cleared > 0);
        assert_eq!(cov.cover().alpha(10, 10), 0);
        assert_eq!(cov.cover().alpha(10, 12), 0);
        assert_eq!(cov.cover().alpha(3, 10), 0);
        assert_eq!(cov.cover().alpha(10, 13), 255);
        assert_eq!(cov.cover().alpha(18, 10), 255);
    }

    #[test]
    fn transparent_pixels_do_not_count() {
        let mut layer = AlphaLayer::filled(10, 1, 255);
        for x in 5..10 {
            layer.set(x, 0, 40); // below threshold from the start
        }
        let mut cov = PixelCoverage::new(layer, 0.5);
        cov.erase_segment((0.0, 0.0), (4.0, 0.0));
        assert_eq!(cov.cleaned_percentage(), 100.0);
    }

    #[test]
    fn empty_layer_counts_as_clean() {
        let cov = PixelCoverage::new(AlphaLayer::filled(4, 4, 0), 1.0);
        assert_eq!(cov.cleaned_percentage(), 100.0);
        assert!(cov.meets(COMPLETE_PERCENT));
    }

    #[test]
    fn stain_has_opaque_core_and_clear_corners() {
        let layer = AlphaLayer::stain(CANVAS_W, CANVAS_H);
        assert!(layer.is_opaque(CANVAS_W / 2, CANVAS_H / 2));
        assert!(!layer.is_opaque(0, 0));
        assert!(!layer.is_opaque(CANVAS_W - 1, CANVAS_H - 1));
    }

    #[test]
    fn eighty_percent_completes_exactly_once() {
        let mut game = started(solid(10, 10));
        wipe(&mut game, 8, 0);
        assert!(game.is_revealed());
        assert_eq!(game.last_percent(), 80.0);

        // Nothing before the reveal delay has passed.
        assert!(game.tick(COMPLETE_DELAY_MS - 10).is_empty());
        let events = game.tick(10);
        assert_eq!(completions(&events), 1);
        assert!(events.contains(&MinigameEvent::Closed));
        assert_eq!(game.phase(), MinigamePhase::Closed);
        assert!(run_for(&mut game, 5_000, 10).is_empty());
    }

    #[test]
    fn seventy_nine_percent_does_not_complete() {
        let mut game = started(solid(10, 10));
        wipe(&mut game, 7, 9);
        assert!((game.last_percent() - 79.0).abs() < 1e-4);
        assert!(!game.is_revealed());
        assert_eq!(completions(&run_for(&mut game, 10_000, 10)), 0);
        assert_eq!(game.phase(), MinigamePhase::Running);
    }

    #[test]
    fn progress_persists_across_strokes() {
        let mut game = started(solid(10, 10));
        wipe(&mut game, 4, 0);
        assert_eq!(game.last_percent(), 40.0);
        game.stroke_begin(0.0, 4.0);
        game.stroke_to(9.0, 4.0);
        game.stroke_end();
        assert_eq!(game.last_percent(), 50.0);
    }

    #[test]
    fn strokes_after_reveal_are_ignored() {
        let mut game = started(solid(10, 10));
        wipe(&mut game, 8, 0);
        assert!(game.is_revealed());
        game.stroke_begin(0.0, 9.0);
        game.stroke_to(9.0, 9.0);
        game.stroke_end();
        assert_eq!(game.coverage().cleaned_percentage(), 80.0);
        let events = run_for(&mut game, COMPLETE_DELAY_MS, 10);
        assert_eq!(completions(&events), 1);
    }

    #[test]
    fn brush_sound_is_rate_limited() {
        let mut game = started(solid(10, 10));
        let first = game.stroke_begin(0.0, 0.0);
        assert_eq!(first, vec![MinigameEvent::Sound(SoundCue::Brush)]);
        assert!(game.stroke_to(3.0, 0.0).is_empty());
        game.tick(BRUSH_SOUND_COOLDOWN_MS);
        assert_eq!(
            game.stroke_to(6.0, 0.0),
            vec![MinigameEvent::Sound(SoundCue::Brush)]
        );
    }

    #[test]
    fn pointer_leaving_canvas_ends_stroke() {
        let mut game = started(solid(10, 10));
        let down = PointerEvent {
            phase: PointerPhase::Down,
            hit: Some((MIRROR_CANVAS, 0, 0)),
        };
        game.handle_input(&InputEvent::Pointer(down));
        assert!(game.coverage().is_stroking());
        let away = PointerEvent {
            phase: PointerPhase::Move,
            hit: None,
        };
        game.handle_input(&InputEvent::Pointer(away));
        assert!(!game.coverage().is_stroking());
    }

    #[test]
    fn close_during_reveal_delay_cancels_completion() {
        let mut game = started(solid(10, 10));
        wipe(&mut game, 10, 0);
        game.close();
        assert!(run_for(&mut game, 5_000, 10).is_empty());
        assert!(!game.is_completed());

        // Next run starts from a fresh stain.
        game.initialize();
        assert_eq!(game.start(), StartOutcome::Started);
        assert_eq!(game.coverage().cleaned_percentage(), 0.0);
    }

    #[test]
    fn close_is_safe_from_idle_and_completed() {
        let mut game = MirrorGame::with_coverage(solid(4, 4));
        game.close();
        assert_eq!(game.phase(), MinigamePhase::Closed);

        let mut game = started(solid(10, 10));
        wipe(&mut game, 10, 0);
        run_for(&mut game, COMPLETE_DELAY_MS, 10);
        game.close();
        assert!(game.is_completed());
        assert!(run_for(&mut game, 1_000, 10).is_empty());
    }

    proptest! {
        #[test]
        fn cleaning_never_goes_backwards(
            strokes in proptest::collection::vec(((0f32..24.0, 0f32..16.0), (0f32..24.0, 0f32..16.0)), 0..30),
        ) {
            let mut cov = PixelCoverage::new(AlphaLayer::stain(24, 16), 1.5);
            let mut last = cov.cleaned_percentage();
            for (a, b) in strokes {
                cov.begin_stroke(a);
                cov.extend_stroke(b);
                let now = cov.end_stroke();
                prop_assert!(now >= last);
                prop_assert!((0.0..=100.0).contains(&now));
                last = now;
            }
        }
    }
}
