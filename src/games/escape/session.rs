//! Process-wide world state for one play session.
//!
//! Everything here outlives individual room visits: inventory, solved
//! puzzles, consumed one-time hotspots, queued popups and sound cues,
//! the countdown and the ending. A restart builds a fresh `Session`.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info};

use super::inventory::{Inventory, InventoryItem, ItemId};
use super::room::RoomId;

/// Logical sound cues; the host maps them to audio files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Footstep,
    Brush,
    PerfectHit,
    GoodHit,
    Miss,
    RepairComplete,
    RepairFailed,
    Unlock,
    Error,
    ItemPickup,
}

impl SoundCue {
    pub fn asset(self) -> &'static str {
        match self {
            SoundCue::Footstep => "assets/sound/footstep.mp3",
            SoundCue::Brush => "assets/sound/brush.mp3",
            SoundCue::PerfectHit => "assets/sound/perfect_hit.mp3",
            SoundCue::GoodHit => "assets/sound/good_hit.mp3",
            SoundCue::Miss => "assets/sound/miss.mp3",
            SoundCue::RepairComplete => "assets/sound/repair_complete.mp3",
            SoundCue::RepairFailed => "assets/sound/repair_failed.mp3",
            SoundCue::Unlock => "assets/sound/unlock.mp3",
            SoundCue::Error => "assets/sound/error.mp3",
            SoundCue::ItemPickup => "assets/sound/pickup.mp3",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub image: Option<&'static str>,
    pub message: String,
}

impl Popup {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            image: None,
            message: message.into(),
        }
    }

    pub fn with_image(image: &'static str, message: impl Into<String>) -> Self {
        Self {
            image: Some(image),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// Escaped with the culprit identified.
    True,
    /// Escaped without the full story.
    Normal,
    /// Countdown ran out.
    Bad,
}

pub struct Session {
    pub inventory: Inventory,
    solved: HashSet<(RoomId, &'static str)>,
    consumed: HashSet<(RoomId, &'static str)>,
    popups: VecDeque<Popup>,
    sounds: Vec<SoundCue>,
    remaining_ms: u64,
    ending: Option<Ending>,
}

impl Session {
    pub fn new(countdown_ms: u64) -> Self {
        Self {
            inventory: Inventory::new(),
            solved: HashSet::new(),
            consumed: HashSet::new(),
            popups: VecDeque::new(),
            sounds: Vec::new(),
            remaining_ms: countdown_ms,
            ending: None,
        }
    }

    // ── Solved flags / consumed points ──────────────────────────

    pub fn is_solved(&self, room: RoomId, puzzle: &'static str) -> bool {
        self.solved.contains(&(room, puzzle))
    }

    pub fn mark_solved(&mut self, room: RoomId, puzzle: &'static str) {
        if self.solved.insert((room, puzzle)) {
            info!(room = room.as_str(), puzzle, "puzzle solved");
        }
    }

    pub fn is_consumed(&self, room: RoomId, point: &'static str) -> bool {
        self.consumed.contains(&(room, point))
    }

    pub fn consume(&mut self, room: RoomId, point: &'static str) {
        self.consumed.insert((room, point));
    }

    /// Grant an item and emit the pickup cue. Duplicate ids are ignored.
    pub fn grant(&mut self, id: ItemId) -> bool {
        let added = self.inventory.add(InventoryItem::of(id));
        if added {
            self.push_sound(SoundCue::ItemPickup);
        }
        added
    }

    // ── Popups ──────────────────────────────────────────────────

    pub fn show_popup(&mut self, popup: Popup) {
        debug!(message = %popup.message, "popup");
        self.popups.push_back(popup);
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popups.front()
    }

    pub fn dismiss_popup(&mut self) -> Option<Popup> {
        self.popups.pop_front()
    }

    // ── Sound outbox ────────────────────────────────────────────

    pub fn push_sound(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.sounds)
    }

    // ── Countdown / ending ──────────────────────────────────────

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Advance the countdown. Sets the bad ending when it reaches zero.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.ending.is_some() {
            return;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms as u64);
        if self.remaining_ms == 0 {
            self.finish(Ending::Bad);
        }
    }

    /// Record the ending. The first ending reached wins.
    pub fn finish(&mut self, ending: Ending) {
        if self.ending.is_none() {
            info!(?ending, "game over");
            self.ending = Some(ending);
        }
    }

    pub fn ending(&self) -> Option<Ending> {
        self.ending
    }
}

/// `mm:ss` rendering of a millisecond countdown, rounded up.
pub fn format_countdown(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
