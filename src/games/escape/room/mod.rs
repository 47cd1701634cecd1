//! Rooms: the four scenes the player walks between.
//!
//! Each room owns its interaction points and minigame instances. World
//! state that must survive a room change lives in [`Session`]; the room
//! itself keeps only transient state (which minigame is open).

pub mod east;
pub mod north;
pub mod south;
pub mod west;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::actions::MINIGAME_CLOSE;
use super::inventory::ItemId;
use super::minigame::{Minigame, MinigameEvent, MinigameKey, Resolution, StartOutcome};
use super::session::{Popup, Session};
use super::stage::{Node, RegionId, Stage};
use crate::input::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomId {
    North,
    South,
    East,
    West,
}

impl RoomId {
    pub const ALL: [RoomId; 4] = [RoomId::North, RoomId::South, RoomId::East, RoomId::West];

    pub fn as_str(self) -> &'static str {
        match self {
            RoomId::North => "north",
            RoomId::South => "south",
            RoomId::East => "east",
            RoomId::West => "west",
        }
    }

    /// Heading shown above the room view.
    pub fn title(self) -> &'static str {
        match self {
            RoomId::North => "North · Restroom corridor",
            RoomId::South => "South · Meeting room",
            RoomId::East => "East · Lobby",
            RoomId::West => "West · Office desks",
        }
    }
}

/// Everything a room may read or mutate besides itself.
pub struct World {
    pub session: Session,
    pub stage: Stage,
}

impl World {
    pub fn new(session: Session, stage: Stage) -> Self {
        Self { session, stage }
    }
}

/// Message with an optional art reference, shown as a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub image: Option<&'static str>,
    pub message: &'static str,
}

impl Notice {
    pub const fn text(message: &'static str) -> Self {
        Self {
            image: None,
            message,
        }
    }

    pub const fn with_image(image: &'static str, message: &'static str) -> Self {
        Self {
            image: Some(image),
            message,
        }
    }

    pub fn popup(self) -> Popup {
        match self.image {
            Some(image) => Popup::with_image(image, self.message),
            None => Popup::text(self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointAction {
    OpenMinigame(MinigameKey),
    /// Hand over an item and mark the point solved.
    Grant { item: ItemId, notice: Notice },
    /// Show a clue; no state change.
    Inspect(Notice),
}

/// A clickable hotspot in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionPoint {
    /// Also the puzzle id for solved flags.
    pub id: &'static str,
    pub label: &'static str,
    /// `(left, top)` in percent of the room view.
    pub pos: (u16, u16),
    pub required_item: Option<ItemId>,
    pub one_time: bool,
    pub action: PointAction,
    pub locked: Notice,
    pub solved: Notice,
}

impl InteractionPoint {
    pub const fn new(id: &'static str, label: &'static str, pos: (u16, u16), action: PointAction) -> Self {
        Self {
            id,
            label,
            pos,
            required_item: None,
            one_time: false,
            action,
            locked: Notice::text("It won't budge."),
            solved: Notice::text("Nothing more to do here."),
        }
    }

    pub fn requires(mut self, item: ItemId, locked: Notice) -> Self {
        self.required_item = Some(item);
        self.locked = locked;
        self
    }

    pub fn one_time(mut self) -> Self {
        self.one_time = true;
        self
    }

    pub fn when_solved(mut self, solved: Notice) -> Self {
        self.solved = solved;
        self
    }
}

/// Pair a minigame with its key for [`RoomCore::new`].
pub fn slot<G: Minigame + 'static>(key: MinigameKey, game: G) -> (MinigameKey, Box<dyn Minigame>) {
    (key, Box::new(game))
}

/// State and behaviour shared by every room.
pub struct RoomCore {
    id: RoomId,
    points: Vec<InteractionPoint>,
    minigames: Vec<(MinigameKey, Box<dyn Minigame>)>,
    active: Option<MinigameKey>,
}

impl RoomCore {
    pub fn new(
        id: RoomId,
        points: Vec<InteractionPoint>,
        minigames: Vec<(MinigameKey, Box<dyn Minigame>)>,
    ) -> Self {
        Self {
            id,
            points,
            minigames,
            active: None,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn points(&self) -> &[InteractionPoint] {
        &self.points
    }

    pub fn active(&self) -> Option<MinigameKey> {
        self.active
    }

    pub fn minigame(&self, key: MinigameKey) -> Option<&dyn Minigame> {
        self.minigames
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, game)| game.as_ref())
    }

    fn minigame_mut(&mut self, key: MinigameKey) -> Option<&mut Box<dyn Minigame>> {
        self.minigames
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, game)| game)
    }

    /// The point that opens `key`, whose id doubles as the puzzle id.
    fn point_for(&self, key: MinigameKey) -> Option<&'static str> {
        self.points
            .iter()
            .find(|p| p.action == PointAction::OpenMinigame(key))
            .map(|p| p.id)
    }

    fn initialize(&mut self) {
        self.active = None;
        for (_, game) in &mut self.minigames {
            game.initialize();
        }
    }

    /// Remount background and hotspots. Item locks are read from the
    /// inventory on every call.
    fn render(&self, world: &mut World) {
        let World { session, stage } = world;
        match stage.region_mut(RegionId::Background) {
            Ok(region) => {
                region.clear();
                region.push(Node::Background(self.id));
            }
            Err(e) => warn!(room = self.id.as_str(), error = %e, "background skipped"),
        }
        match stage.region_mut(RegionId::Hotspots) {
            Ok(region) => {
                region.clear();
                for point in &self.points {
                    if session.is_consumed(self.id, point.id) {
                        continue;
                    }
                    region.push(Node::Hotspot {
                        point_id: point.id,
                        label: point.label,
                        pos: point.pos,
                        locked: point
                            .required_item
                            .is_some_and(|item| !session.inventory.has(item)),
                    });
                }
            }
            Err(e) => warn!(room = self.id.as_str(), error = %e, "hotspots skipped"),
        }
    }

    fn cleanup(&mut self, stage: &mut Stage) {
        for region in [RegionId::Background, RegionId::Hotspots, RegionId::Minigame] {
            match stage.region_mut(region) {
                Ok(r) => r.clear(),
                Err(e) => warn!(room = self.id.as_str(), error = %e, "unmount skipped"),
            }
        }
        for (_, game) in &mut self.minigames {
            game.close();
        }
        self.active = None;
    }

    fn open_minigame(&mut self, key: MinigameKey, world: &mut World) {
        if self.active == Some(key) {
            return;
        }
        self.close_active(&mut world.stage);
        let region = match world.stage.region_mut(RegionId::Minigame) {
            Ok(region) => region,
            Err(e) => {
                warn!(room = self.id.as_str(), minigame = key.as_str(), error = %e, "minigame not opened");
                return;
            }
        };
        let Some(game) = self.minigame_mut(key) else {
            warn!(minigame = key.as_str(), "no such minigame in room");
            return;
        };
        game.initialize();
        match game.start() {
            StartOutcome::Started => {
                region.clear();
                region.push(Node::Minigame(key));
                self.active = Some(key);
                info!(minigame = key.as_str(), "minigame started");
            }
            StartOutcome::AlreadyResolved => {
                game.close();
                debug!(minigame = key.as_str(), "minigame already resolved");
                world
                    .session
                    .show_popup(Popup::text("You've already dealt with this."));
            }
        }
    }

    fn close_active(&mut self, stage: &mut Stage) {
        let Some(key) = self.active.take() else {
            return;
        };
        if let Some(game) = self.minigame_mut(key) {
            game.close();
        }
        self.clear_minigame_region(key, stage);
        info!(minigame = key.as_str(), "minigame closed");
    }

    /// The minigame closed itself.
    fn unmount(&mut self, key: MinigameKey, stage: &mut Stage) {
        if self.active != Some(key) {
            return;
        }
        self.active = None;
        self.clear_minigame_region(key, stage);
        info!(minigame = key.as_str(), "minigame finished");
    }

    fn clear_minigame_region(&self, key: MinigameKey, stage: &mut Stage) {
        match stage.region_mut(RegionId::Minigame) {
            Ok(region) => region.clear(),
            Err(e) => warn!(room = self.id.as_str(), minigame = key.as_str(), error = %e, "minigame unmount skipped"),
        }
    }
}

/// One of the four scenes. Variants supply their content through
/// [`RoomCore`] and decide what a minigame success means.
pub trait Room {
    fn core(&self) -> &RoomCore;

    fn core_mut(&mut self) -> &mut RoomCore;

    /// Apply the reward for beating `key`.
    fn on_completed(&mut self, key: MinigameKey, resolution: &Resolution, world: &mut World);

    fn id(&self) -> RoomId {
        self.core().id()
    }

    fn initialize(&mut self, _world: &mut World) {
        debug!(room = self.id().as_str(), "room initialize");
        self.core_mut().initialize();
    }

    fn render(&mut self, world: &mut World) {
        debug!(room = self.id().as_str(), "room render");
        self.core().render(world);
    }

    fn cleanup(&mut self, world: &mut World) {
        debug!(room = self.id().as_str(), "room cleanup");
        self.core_mut().cleanup(&mut world.stage);
    }

    /// Run the gated action of `point_id`.
    fn trigger(&mut self, point_id: &str, world: &mut World) {
        let room = self.id();
        let Some(point) = self.core().points().iter().find(|p| p.id == point_id).copied() else {
            warn!(room = room.as_str(), point = point_id, "unknown interaction point");
            return;
        };
        if world.session.is_consumed(room, point.id) {
            return;
        }
        if world.session.is_solved(room, point.id) {
            world.session.show_popup(point.solved.popup());
            return;
        }
        if let Some(item) = point.required_item {
            if !world.session.inventory.has(item) {
                debug!(room = room.as_str(), point = point.id, item = item.as_str(), "gated");
                world.session.show_popup(point.locked.popup());
                return;
            }
        }
        match point.action {
            PointAction::OpenMinigame(key) => self.core_mut().open_minigame(key, world),
            PointAction::Grant { item, notice } => {
                world.session.grant(item);
                world.session.mark_solved(room, point.id);
                if point.one_time {
                    world.session.consume(room, point.id);
                }
                world.session.show_popup(notice.popup());
                self.render(world);
            }
            PointAction::Inspect(notice) => world.session.show_popup(notice.popup()),
        }
    }

    /// Route input to the open minigame. Returns false when none is open.
    fn handle_input(&mut self, event: &InputEvent, world: &mut World) -> bool {
        let Some(key) = self.core().active() else {
            return false;
        };
        if matches!(event, InputEvent::Escape | InputEvent::Click(MINIGAME_CLOSE)) {
            self.core_mut().close_active(&mut world.stage);
            return true;
        }
        let events = match self.core_mut().minigame_mut(key) {
            Some(game) => game.handle_input(event),
            None => Vec::new(),
        };
        self.apply(key, events, world);
        true
    }

    fn tick(&mut self, elapsed_ms: u32, world: &mut World) {
        let Some(key) = self.core().active() else {
            return;
        };
        let events = match self.core_mut().minigame_mut(key) {
            Some(game) => game.tick(elapsed_ms),
            None => Vec::new(),
        };
        self.apply(key, events, world);
    }

    fn apply(&mut self, key: MinigameKey, events: Vec<MinigameEvent>, world: &mut World) {
        for event in events {
            match event {
                MinigameEvent::Sound(cue) => world.session.push_sound(cue),
                MinigameEvent::Completed(resolution) => {
                    if let Some(puzzle) = self.core().point_for(key) {
                        world.session.mark_solved(self.id(), puzzle);
                    }
                    self.on_completed(key, &resolution, world);
                }
                MinigameEvent::Closed => self.core_mut().unmount(key, &mut world.stage),
            }
        }
    }
}

/// Build the room lookup table, one instance per direction.
pub fn all_rooms(puzzle_seed: u64) -> Vec<Box<dyn Room>> {
    vec![
        Box::new(north::NorthRoom::new()),
        Box::new(south::SouthRoom::new(puzzle_seed)),
        Box::new(east::EastRoom::new()),
        Box::new(west::WestRoom::new()),
    ]
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::games::escape::session::SoundCue;

    #[test]
    fn room_id_names_round_trip_through_serde() {
        for id in RoomId::ALL {
            let parsed: RoomId = serde_json::from_str(&format!("\"{}\"", id.as_str())).unwrap();
            assert_eq!(parsed, id);
        }
        assert!(serde_json::from_str::<RoomId>("\"attic\"").is_err());
    }

    #[test]
    fn every_room_is_registered_once() {
        let rooms = all_rooms(1);
        for id in RoomId::ALL {
            assert_eq!(rooms.iter().filter(|r| r.id() == id).count(), 1);
        }
    }

    #[test]
    fn every_minigame_point_has_a_minigame() {
        for room in all_rooms(1) {
            for point in room.core().points() {
                if let PointAction::OpenMinigame(key) = point.action {
                    assert!(room.core().minigame(key).is_some(), "{}", point.id);
                }
            }
        }
    }

    #[test]
    fn gated_points_never_run_without_item() {
        for mut room in all_rooms(1) {
            let gated: Vec<_> = room
                .core()
                .points()
                .iter()
                .filter(|p| p.required_item.is_some())
                .map(|p| p.id)
                .collect();
            for id in gated {
                let mut world = world();
                enter(room.as_mut(), &mut world);
                room.trigger(id, &mut world);
                assert!(world.session.inventory.is_empty());
                assert!(!world.session.is_solved(room.id(), id));
                assert_eq!(room.core().active(), None);
                assert!(world.stage.mounted_minigame().is_none());
                assert!(world.session.popup().is_some());
            }
        }
    }

    #[test]
    fn locked_hotspots_unlock_after_pickup() {
        let mut room = north::NorthRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        let locked = |world: &World, id: &str| {
            world
                .stage
                .region(RegionId::Hotspots)
                .unwrap()
                .nodes()
                .iter()
                .any(|n| matches!(n, Node::Hotspot { point_id, locked: true, .. } if *point_id == id))
        };
        assert!(locked(&world, "mirror"));
        room.trigger("trash", &mut world);
        assert!(!locked(&world, "mirror"));
    }

    #[test]
    fn one_time_grant_removes_point_in_same_step() {
        let mut room = north::NorthRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        assert!(world.stage.hotspot_ids().contains(&"trash"));

        room.trigger("trash", &mut world);
        assert!(world.session.inventory.has(ItemId::Towel));
        assert!(!world.stage.hotspot_ids().contains(&"trash"));
        assert!(world.session.drain_sounds().contains(&SoundCue::ItemPickup));

        // Re-render after a revisit still excludes it.
        room.cleanup(&mut world);
        enter(&mut room, &mut world);
        assert!(!world.stage.hotspot_ids().contains(&"trash"));
        room.trigger("trash", &mut world);
        assert_eq!(world.session.inventory.len(), 1);
    }

    #[test]
    fn opening_a_minigame_mounts_it_and_escape_closes_it() {
        let mut room = west::WestRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("laptop", &mut world);
        assert_eq!(room.core().active(), Some(MinigameKey::Laptop));
        assert_eq!(world.stage.mounted_minigame(), Some(MinigameKey::Laptop));

        assert!(room.handle_input(&InputEvent::Escape, &mut world));
        assert_eq!(room.core().active(), None);
        assert!(world.stage.mounted_minigame().is_none());
        assert!(!room.handle_input(&InputEvent::Escape, &mut world));
    }

    #[test]
    fn opening_another_minigame_closes_the_first() {
        let mut room = west::WestRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("laptop", &mut world);
        room.trigger("drawer", &mut world);
        assert_eq!(room.core().active(), Some(MinigameKey::Drawer));
        let laptop = room.core().minigame(MinigameKey::Laptop).unwrap();
        assert_eq!(laptop.phase(), crate::games::escape::minigame::MinigamePhase::Closed);
    }

    #[test]
    fn missing_minigame_mount_skips_open() {
        let mut room = west::WestRoom::new();
        let mut world = World::new(Session::new(1000), Stage::without(RegionId::Minigame));
        enter(&mut room, &mut world);
        room.trigger("laptop", &mut world);
        assert_eq!(room.core().active(), None);
        // Hotspots still mounted.
        assert!(!world.stage.hotspot_ids().is_empty());
    }

    #[test]
    fn missing_hotspot_mount_degrades_quietly() {
        let mut room = east::EastRoom::new();
        let mut world = World::new(Session::new(1000), Stage::without(RegionId::Hotspots));
        enter(&mut room, &mut world);
        assert!(world.stage.hotspot_ids().is_empty());
        assert_eq!(world.stage.background(), Some(RoomId::East));
    }

    #[test]
    fn cleanup_closes_every_minigame() {
        let mut room = west::WestRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("laptop", &mut world);
        room.cleanup(&mut world);
        assert_eq!(room.core().active(), None);
        assert!(world.stage.mounted_minigame().is_none());
        assert!(world.stage.hotspot_ids().is_empty());
        assert!(world.stage.background().is_none());
        for point in room.core().points() {
            if let PointAction::OpenMinigame(key) = point.action {
                let phase = room.core().minigame(key).unwrap().phase();
                assert_eq!(phase, crate::games::escape::minigame::MinigamePhase::Closed);
            }
        }
    }

    #[test]
    fn cleanup_without_mounts_still_closes_minigames() {
        let mut room = west::WestRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("laptop", &mut world);
        world.stage = Stage::without(RegionId::Minigame);
        room.cleanup(&mut world);
        assert_eq!(room.core().active(), None);
        assert_eq!(
            room.core().minigame(MinigameKey::Laptop).unwrap().phase(),
            crate::games::escape::minigame::MinigamePhase::Closed
        );
    }

    #[test]
    fn unknown_point_is_ignored() {
        let mut room = west::WestRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("ceiling", &mut world);
        assert!(world.session.popup().is_none());
    }
}
