//! Fixed-step clock for the `draw_web` loop.
//!
//! Animation frames arrive at whatever rate the browser manages. The clock
//! turns wall time into whole steps of `step_ms`, so fades, bar sweeps and
//! the countdown all advance in the same reproducible increments.

/// Longest frame gap fed into the accumulator. A backgrounded tab resumes
/// without fast-forwarding through minutes of game time.
const MAX_FRAME_MS: f64 = 500.0;

pub struct GameTime {
    step_ms: f64,
    /// Wall time not yet turned into steps.
    carry: f64,
    last: Option<f64>,
}

impl GameTime {
    pub fn new(step_ms: u32) -> Self {
        Self {
            step_ms: step_ms.max(1) as f64,
            carry: 0.0,
            last: None,
        }
    }

    /// Feed a `performance.now()` reading; returns the steps to run.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = self
            .last
            .map_or(0.0, |prev| (now_ms - prev).clamp(0.0, MAX_FRAME_MS));
        self.last = Some(now_ms);

        self.carry += delta;
        let steps = (self.carry / self.step_ms) as u32;
        self.carry -= steps as f64 * self.step_ms;
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_only_sets_the_origin() {
        let mut clock = GameTime::new(10);
        assert_eq!(clock.update(1234.0), 0);
        assert_eq!(clock.update(1244.0), 1);
    }

    #[test]
    fn partial_steps_carry_over() {
        let mut clock = GameTime::new(10);
        clock.update(0.0);
        assert_eq!(clock.update(15.0), 1);
        assert_eq!(clock.update(20.0), 1);
        assert_eq!(clock.update(29.0), 0);
    }

    #[test]
    fn long_gap_is_capped() {
        let mut clock = GameTime::new(10);
        clock.update(0.0);
        assert_eq!(clock.update(60_000.0), 50);
    }

    #[test]
    fn clock_going_backwards_yields_nothing() {
        let mut clock = GameTime::new(10);
        clock.update(100.0);
        assert_eq!(clock.update(50.0), 0);
        assert_eq!(clock.update(60.0), 1);
    }

    #[test]
    fn sixty_fps_is_about_a_hundred_steps_a_second() {
        let mut clock = GameTime::new(10);
        clock.update(0.0);
        let total: u32 = (1..=60).map(|i| clock.update(i as f64 * 16.667)).sum();
        assert!((99..=101).contains(&total), "got {}", total);
    }
}
