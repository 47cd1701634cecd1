/// Office Escape: walk four rooms, collect items, beat the minigames and
/// find the exit code before the countdown runs out.

pub mod actions;
pub mod inventory;
pub mod minigame;
pub mod render;
pub mod room;
pub mod room_manager;
pub mod session;
pub mod stage;
pub mod transition;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::games::Game;
use crate::input::{Arrow, ClickState, InputEvent};

use actions::*;
use room::{all_rooms, RoomId, World};
use room_manager::RoomManager;
use session::{Session, SoundCue};
use stage::Stage;

/// Logic step length. `Game::tick` receives whole steps.
pub const TICK_MS: u32 = 10;
const MAX_HOTSPOTS: u16 = 20;
const MAX_SLOTS: u16 = 10;

pub struct EscapeGame {
    config: GameConfig,
    puzzle_seed: u64,
    world: World,
    manager: RoomManager,
}

impl EscapeGame {
    pub fn new(config: GameConfig, puzzle_seed: u64) -> Self {
        let (world, manager) = Self::fresh(&config, puzzle_seed);
        Self {
            config,
            puzzle_seed,
            world,
            manager,
        }
    }

    fn fresh(config: &GameConfig, puzzle_seed: u64) -> (World, RoomManager) {
        let mut world = World::new(Session::new(config.countdown_ms()), Stage::new());
        let mut manager = RoomManager::new(all_rooms(puzzle_seed));
        if !manager.enter(config.start_room, &mut world) {
            warn!("falling back to the west room");
            manager.enter(RoomId::West, &mut world);
        }
        (world, manager)
    }

    /// Throw the whole session away, like reloading the page.
    pub fn restart(&mut self) {
        self.puzzle_seed = self.puzzle_seed.rotate_left(17) ^ 0xA5A5_5A5A;
        let (world, manager) = Self::fresh(&self.config, self.puzzle_seed);
        self.world = world;
        self.manager = manager;
        info!("game restarted");
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn manager(&self) -> &RoomManager {
        &self.manager
    }

    pub fn drain_sounds(&mut self) -> Vec<SoundCue> {
        self.world.session.drain_sounds()
    }

    fn trigger_hotspot(&mut self, index: usize) -> bool {
        let Some(point_id) = self.world.stage.hotspot_ids().get(index).copied() else {
            return false;
        };
        self.manager.trigger(point_id, &mut self.world);
        true
    }
}

/// Arrow keys, WASD and the compass buttons.
fn direction_for(event: &InputEvent) -> Option<RoomId> {
    match event {
        InputEvent::Arrow(Arrow::Up) | InputEvent::Key('w' | 'W') | InputEvent::Click(GO_NORTH) => {
            Some(RoomId::North)
        }
        InputEvent::Arrow(Arrow::Down) | InputEvent::Key('s' | 'S') | InputEvent::Click(GO_SOUTH) => {
            Some(RoomId::South)
        }
        InputEvent::Arrow(Arrow::Left) | InputEvent::Key('a' | 'A') | InputEvent::Click(GO_WEST) => {
            Some(RoomId::West)
        }
        InputEvent::Arrow(Arrow::Right) | InputEvent::Key('d' | 'D') | InputEvent::Click(GO_EAST) => {
            Some(RoomId::East)
        }
        _ => None,
    }
}

impl Game for EscapeGame {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        if self.world.session.ending().is_some() {
            return match event {
                InputEvent::Key('r' | 'R') | InputEvent::Enter | InputEvent::Click(RESTART) => {
                    self.restart();
                    true
                }
                _ => false,
            };
        }

        // Popups are modal.
        if self.world.session.popup().is_some() {
            if matches!(
                event,
                InputEvent::Enter | InputEvent::Escape | InputEvent::Key(' ') | InputEvent::Click(DISMISS_POPUP)
            ) {
                self.world.session.dismiss_popup();
            }
            return true;
        }

        if self.manager.handle_input(event, &mut self.world) {
            return true;
        }

        if let Some(room) = direction_for(event) {
            self.manager.go_to(room, &mut self.world);
            return true;
        }

        match event {
            InputEvent::Click(id) if (HOTSPOT_BASE..HOTSPOT_BASE + MAX_HOTSPOTS).contains(id) => {
                self.trigger_hotspot((id - HOTSPOT_BASE) as usize)
            }
            InputEvent::Key(c @ '1'..='9') => self.trigger_hotspot(*c as usize - '1' as usize),
            InputEvent::Click(id) if (INVENTORY_SLOT_BASE..INVENTORY_SLOT_BASE + MAX_SLOTS).contains(id) => {
                self.world
                    .session
                    .inventory
                    .toggle_select((id - INVENTORY_SLOT_BASE) as usize)
                    .is_some()
            }
            _ => false,
        }
    }

    fn tick(&mut self, delta_ticks: u32) {
        for _ in 0..delta_ticks {
            if self.world.session.ending().is_some() {
                return;
            }
            self.world.session.tick(TICK_MS);
            self.manager.tick(TICK_MS, &mut self.world);
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::escape::inventory::ItemId;
    use crate::games::escape::room::east::{ESCAPE_CODE, WHITEBOARD_ANSWER};
    use crate::games::escape::session::Ending;
    use crate::games::escape::transition::{FADE_MS, SETTLE_MS};

    fn game() -> EscapeGame {
        EscapeGame::new(GameConfig::default(), 11)
    }

    fn walk(game: &mut EscapeGame, event: InputEvent) {
        assert!(game.handle_input(&event));
        game.tick((2 * FADE_MS + SETTLE_MS) / TICK_MS + 1);
    }

    fn click_point(game: &mut EscapeGame, id: &str) {
        let index = game
            .world()
            .stage
            .hotspot_ids()
            .iter()
            .position(|p| *p == id)
            .unwrap();
        game.handle_input(&InputEvent::Click(HOTSPOT_BASE + index as u16));
    }

    fn type_code(game: &mut EscapeGame, code: &str) {
        for c in code.chars() {
            game.handle_input(&InputEvent::Key(c));
        }
        game.handle_input(&InputEvent::Enter);
    }

    fn dismiss(game: &mut EscapeGame) {
        while game.world().session.popup().is_some() {
            game.handle_input(&InputEvent::Enter);
        }
    }

    #[test]
    fn starts_in_configured_room() {
        assert_eq!(game().manager().current(), Some(RoomId::West));
        let config = GameConfig::from_json(r#"{"start_room":"north"}"#).unwrap();
        let game = EscapeGame::new(config, 1);
        assert_eq!(game.manager().current(), Some(RoomId::North));
        assert_eq!(game.world().stage.background(), Some(RoomId::North));
    }

    #[test]
    fn arrows_and_wasd_navigate() {
        let mut game = game();
        walk(&mut game, InputEvent::Arrow(Arrow::Up));
        assert_eq!(game.manager().current(), Some(RoomId::North));
        walk(&mut game, InputEvent::Key('d'));
        assert_eq!(game.manager().current(), Some(RoomId::East));
        walk(&mut game, InputEvent::Click(GO_SOUTH));
        assert_eq!(game.manager().current(), Some(RoomId::South));
    }

    #[test]
    fn popup_blocks_navigation_until_dismissed() {
        let mut game = game();
        click_point(&mut game, "coffee");
        assert!(game.world().session.popup().is_some());

        game.handle_input(&InputEvent::Arrow(Arrow::Up));
        assert!(!game.manager().is_transitioning());

        game.handle_input(&InputEvent::Click(DISMISS_POPUP));
        assert!(game.world().session.popup().is_none());
        game.handle_input(&InputEvent::Arrow(Arrow::Up));
        assert!(game.manager().is_transitioning());
    }

    #[test]
    fn wasd_types_into_open_minigame() {
        let mut game = game();
        click_point(&mut game, "laptop");
        game.handle_input(&InputEvent::Key('w'));
        assert!(!game.manager().is_transitioning());
        assert_eq!(game.manager().current(), Some(RoomId::West));
    }

    #[test]
    fn number_keys_trigger_hotspots() {
        let mut game = game();
        let index = game.world().stage.hotspot_ids().iter().position(|p| *p == "coffee").unwrap();
        let key = char::from(b'1' + index as u8);
        game.handle_input(&InputEvent::Key(key));
        assert!(game.world().session.popup().is_some());
    }

    #[test]
    fn inventory_click_selects_item() {
        let mut game = game();
        click_point(&mut game, "drawer");
        type_code(&mut game, "314");
        dismiss(&mut game);
        game.tick(200);
        assert!(game.handle_input(&InputEvent::Click(INVENTORY_SLOT_BASE)));
        let selected = game.world().session.inventory.selected().map(|i| i.id);
        assert_eq!(selected, Some(ItemId::Wrench));
    }

    #[test]
    fn countdown_expiry_is_bad_ending() {
        let config = GameConfig::from_json(r#"{"countdown_minutes":1}"#).unwrap();
        let mut game = EscapeGame::new(config, 1);
        game.tick(60_000 / TICK_MS);
        assert_eq!(game.world().session.ending(), Some(Ending::Bad));

        // Only restart is accepted now.
        assert!(!game.handle_input(&InputEvent::Arrow(Arrow::Up)));
        assert!(game.handle_input(&InputEvent::Key('r')));
        assert_eq!(game.world().session.ending(), None);
        assert_eq!(game.manager().current(), Some(RoomId::West));
    }

    #[test]
    fn true_ending_run() {
        let mut game = game();
        walk(&mut game, InputEvent::Key('d'));
        assert_eq!(game.manager().current(), Some(RoomId::East));

        click_point(&mut game, "planter");
        dismiss(&mut game);
        assert!(game.world().session.inventory.has(ItemId::PuzzlePiece));
        assert!(!game.world().stage.hotspot_ids().contains(&"planter"));

        click_point(&mut game, "whiteboard");
        type_code(&mut game, WHITEBOARD_ANSWER);
        dismiss(&mut game);
        // The keypad lingers open after unlocking.
        game.tick(200);

        click_point(&mut game, "exit");
        type_code(&mut game, ESCAPE_CODE);
        assert_eq!(game.world().session.ending(), Some(Ending::True));
    }

    #[test]
    fn restart_clears_progress() {
        let mut game = game();
        walk(&mut game, InputEvent::Key('d'));
        click_point(&mut game, "planter");
        dismiss(&mut game);
        click_point(&mut game, "exit");
        type_code(&mut game, "1111");
        assert_eq!(game.world().session.ending(), Some(Ending::Normal));

        game.handle_input(&InputEvent::Click(RESTART));
        assert!(game.world().session.inventory.is_empty());
        assert_eq!(game.manager().current(), Some(RoomId::West));
    }
}
