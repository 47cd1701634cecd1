//! Blackout cover that hides room switches.
//!
//! `begin` stores the pending work and starts raising the cover. `advance`
//! hands the work back exactly once, on the tick the cover becomes fully
//! opaque, then holds for a short settle and fades out. Requests made while
//! a transition is in flight are dropped.

/// Time to raise (and later lower) the cover.
pub const FADE_MS: u32 = 800;
/// Hold at full opacity after the work has run.
pub const SETTLE_MS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Covering { elapsed: u32 },
    Settling { elapsed: u32 },
    Revealing { elapsed: u32 },
}

pub struct TransitionEffect<T> {
    phase: Phase,
    pending: Option<T>,
}

impl<T> TransitionEffect<T> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            pending: None,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Start a transition carrying `work`. Returns false, dropping `work`,
    /// if one is already running.
    pub fn begin(&mut self, work: T) -> bool {
        if self.is_transitioning() {
            return false;
        }
        self.pending = Some(work);
        self.phase = Phase::Covering { elapsed: 0 };
        true
    }

    /// Advance by `ms`. Returns the pending work on the step where the cover
    /// reaches full opacity; the caller runs it before the next draw.
    pub fn advance(&mut self, ms: u32) -> Option<T> {
        match self.phase {
            Phase::Idle => None,
            Phase::Covering { elapsed } => {
                let elapsed = elapsed.saturating_add(ms);
                if elapsed >= FADE_MS {
                    // Leftover time is discarded so the settle starts from
                    // the moment the work runs.
                    self.phase = Phase::Settling { elapsed: 0 };
                    self.pending.take()
                } else {
                    self.phase = Phase::Covering { elapsed };
                    None
                }
            }
            Phase::Settling { elapsed } => {
                let elapsed = elapsed.saturating_add(ms);
                self.phase = if elapsed >= SETTLE_MS {
                    Phase::Revealing {
                        elapsed: elapsed - SETTLE_MS,
                    }
                } else {
                    Phase::Settling { elapsed }
                };
                self.finish_if_revealed();
                None
            }
            Phase::Revealing { elapsed } => {
                self.phase = Phase::Revealing {
                    elapsed: elapsed.saturating_add(ms),
                };
                self.finish_if_revealed();
                None
            }
        }
    }

    fn finish_if_revealed(&mut self) {
        if let Phase::Revealing { elapsed } = self.phase {
            if elapsed >= FADE_MS {
                self.phase = Phase::Idle;
            }
        }
    }

    /// Cover opacity in `0.0..=1.0`.
    pub fn opacity(&self) -> f32 {
        match self.phase {
            Phase::Idle => 0.0,
            Phase::Covering { elapsed } => elapsed as f32 / FADE_MS as f32,
            Phase::Settling { .. } => 1.0,
            Phase::Revealing { elapsed } => 1.0 - elapsed.min(FADE_MS) as f32 / FADE_MS as f32,
        }
    }
}

impl<T> Default for TransitionEffect<T> {
    fn default() -> Self {
        Self::new()
    }
}
