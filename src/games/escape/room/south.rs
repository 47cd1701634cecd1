//! South: meeting room with the picture frame and the safe.

use crate::games::escape::inventory::ItemId;
use crate::games::escape::minigame::keypad::{KeypadGame, KeypadMode};
use crate::games::escape::minigame::swap_puzzle::SwapPuzzleGame;
use crate::games::escape::minigame::{MinigameKey, Resolution};

use super::{slot, InteractionPoint, Notice, PointAction, Room, RoomCore, RoomId, World};

pub const SAFE_CODE: &str = "743689";
const FRAME_NOTE: Notice = Notice::with_image(
    "clue_note",
    "A note fell out of the frame: \"The culprit is on the Solutions team.\"",
);
const ID_CARD: Notice = Notice::with_image(
    "item_id_card",
    "A bloodied ID card. The name is scratched off, only the initials 'M.S.' remain. '0525' is written on the back.",
);

pub struct SouthRoom {
    core: RoomCore,
}

impl SouthRoom {
    pub fn new(puzzle_seed: u64) -> Self {
        let points = vec![
            InteractionPoint::new("frame", "Picture frame", (30, 30), PointAction::OpenMinigame(MinigameKey::Frame))
                .requires(
                    ItemId::PuzzlePiece,
                    Notice::text("Something about the picture in the frame looks off. A piece is missing."),
                )
                .when_solved(FRAME_NOTE),
            InteractionPoint::new("safe", "Safe", (70, 65), PointAction::OpenMinigame(MinigameKey::Safe))
                .when_solved(ID_CARD),
        ];
        Self {
            core: RoomCore::new(
                RoomId::South,
                points,
                vec![
                    slot(MinigameKey::Frame, SwapPuzzleGame::new(puzzle_seed)),
                    slot(
                        MinigameKey::Safe,
                        KeypadGame::new(
                            "Safe",
                            "Enter the combination.",
                            KeypadMode::Unlock { code: SAFE_CODE },
                            8,
                        ),
                    ),
                ],
            ),
        }
    }
}

impl Room for SouthRoom {
    fn core(&self) -> &RoomCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RoomCore {
        &mut self.core
    }

    fn on_completed(&mut self, key: MinigameKey, _resolution: &Resolution, world: &mut World) {
        match key {
            MinigameKey::Frame => world.session.show_popup(FRAME_NOTE.popup()),
            MinigameKey::Safe => {
                world.session.grant(ItemId::IdCard);
                world.session.show_popup(ID_CARD.popup());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::games::escape::actions::PUZZLE_TILE_BASE;
    use crate::games::escape::minigame::keypad::ERROR_FLASH_MS;
    use crate::games::escape::minigame::swap_puzzle::{shuffled, TILES};
    use crate::input::InputEvent;

    #[test]
    fn safe_grants_id_card() {
        let mut room = SouthRoom::new(3);
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("safe", &mut world);

        for c in "000".chars() {
            room.handle_input(&InputEvent::Key(c), &mut world);
        }
        room.handle_input(&InputEvent::Enter, &mut world);
        assert!(!world.session.inventory.has(ItemId::IdCard));
        room.tick(ERROR_FLASH_MS, &mut world);

        for c in SAFE_CODE.chars() {
            room.handle_input(&InputEvent::Key(c), &mut world);
        }
        room.handle_input(&InputEvent::Enter, &mut world);
        assert!(world.session.inventory.has(ItemId::IdCard));
        assert!(popup_text(&mut world).unwrap().contains("0525"));
    }

    #[test]
    fn frame_puzzle_solves_with_piece() {
        let seed = 99u64;
        let mut room = SouthRoom::new(seed);
        let mut world = world();
        world.session.grant(ItemId::PuzzlePiece);
        enter(&mut room, &mut world);
        room.trigger("frame", &mut world);
        assert_eq!(room.core().active(), Some(MinigameKey::Frame));

        // First start reshuffles from the next seed in the sequence.
        let mut tiles = shuffled(seed.wrapping_add(0x9E37_79B9_7F4A_7C15));
        for home in 0..TILES {
            if tiles[home] as usize == home {
                continue;
            }
            let at = tiles.iter().position(|t| *t as usize == home).unwrap();
            room.handle_input(&InputEvent::Click(PUZZLE_TILE_BASE + home as u16), &mut world);
            room.handle_input(&InputEvent::Click(PUZZLE_TILE_BASE + at as u16), &mut world);
            tiles.swap(home, at);
        }
        assert!(world.session.is_solved(RoomId::South, "frame"));
        assert!(popup_text(&mut world).unwrap().contains("Solutions team"));
    }
}
