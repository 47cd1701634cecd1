//! Owns the four rooms and serializes moves between them.

use tracing::{debug, info, warn};

use super::room::{Room, RoomId, World};
use super::session::SoundCue;
use super::transition::TransitionEffect;
use crate::input::InputEvent;

pub struct RoomManager {
    rooms: Vec<Box<dyn Room>>,
    current: Option<usize>,
    transition: TransitionEffect<RoomId>,
}

impl RoomManager {
    pub fn new(rooms: Vec<Box<dyn Room>>) -> Self {
        Self {
            rooms,
            current: None,
            transition: TransitionEffect::new(),
        }
    }

    pub fn current(&self) -> Option<RoomId> {
        self.current.map(|i| self.rooms[i].id())
    }

    pub fn current_room(&self) -> Option<&dyn Room> {
        self.current.map(|i| self.rooms[i].as_ref())
    }

    pub fn transition(&self) -> &TransitionEffect<RoomId> {
        &self.transition
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_transitioning()
    }

    fn index_of(&self, id: RoomId) -> Option<usize> {
        self.rooms.iter().position(|r| r.id() == id)
    }

    /// Cleanup the outgoing room, then bring `index` on stage.
    fn activate(&mut self, index: usize, world: &mut World) {
        if let Some(previous) = self.current.take() {
            self.rooms[previous].cleanup(world);
        }
        let room = &mut self.rooms[index];
        room.initialize(world);
        room.render(world);
        self.current = Some(index);
        info!(room = room.id().as_str(), "entered room");
    }

    /// Place the player in `id` immediately, without a transition.
    pub fn enter(&mut self, id: RoomId, world: &mut World) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.activate(index, world);
                true
            }
            None => {
                warn!(room = id.as_str(), "start room not registered");
                false
            }
        }
    }

    /// Start a covered move to `id`. Dropped while a move is in flight, for
    /// unregistered rooms, and for the room the player is already in.
    pub fn go_to(&mut self, id: RoomId, world: &mut World) -> bool {
        if self.transition.is_transitioning() {
            debug!(room = id.as_str(), "go_to dropped: transition in flight");
            return false;
        }
        if self.index_of(id).is_none() {
            warn!(room = id.as_str(), "go_to ignored: room not registered");
            return false;
        }
        if self.current() == Some(id) {
            return false;
        }
        self.transition.begin(id);
        world.session.push_sound(SoundCue::Footstep);
        true
    }

    pub fn tick(&mut self, elapsed_ms: u32, world: &mut World) {
        if let Some(target) = self.transition.advance(elapsed_ms) {
            if let Some(index) = self.index_of(target) {
                self.activate(index, world);
            }
        }
        if let Some(index) = self.current {
            self.rooms[index].tick(elapsed_ms, world);
        }
    }

    /// Trigger a hotspot in the current room.
    pub fn trigger(&mut self, point_id: &str, world: &mut World) {
        if self.transition.is_transitioning() {
            return;
        }
        if let Some(index) = self.current {
            self.rooms[index].trigger(point_id, world);
        }
    }

    /// Forward input to the current room's open minigame. Returns true when
    /// the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent, world: &mut World) -> bool {
        if self.transition.is_transitioning() {
            return true;
        }
        match self.current {
            Some(index) => self.rooms[index].handle_input(event, world),
            None => false,
        }
    }
}
