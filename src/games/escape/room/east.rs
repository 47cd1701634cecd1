//! East: the lobby with the whiteboard and the exit door.

use tracing::info;

use crate::games::escape::inventory::ItemId;
use crate::games::escape::minigame::keypad::{KeypadGame, KeypadMode};
use crate::games::escape::minigame::{MinigameKey, Resolution};
use crate::games::escape::session::Ending;

use super::{slot, InteractionPoint, Notice, PointAction, Room, RoomCore, RoomId, World};

pub const WHITEBOARD_ANSWER: &str = "2239";
pub const ESCAPE_CODE: &str = "0523";

pub struct EastRoom {
    core: RoomCore,
}

impl EastRoom {
    pub fn new() -> Self {
        let points = vec![
            InteractionPoint::new(
                "planter",
                "Planter",
                (12, 75),
                PointAction::Grant {
                    item: ItemId::PuzzlePiece,
                    notice: Notice::with_image(
                        "item_cat_puzzle",
                        "Something was buried in the soil. A jigsaw piece with a cat on it.",
                    ),
                },
            )
            .one_time(),
            InteractionPoint::new(
                "whiteboard",
                "Whiteboard",
                (35, 35),
                PointAction::OpenMinigame(MinigameKey::Whiteboard),
            )
            .when_solved(Notice::text("The answer is already on the board: 2239.")),
            InteractionPoint::new("exit", "Exit door", (60, 50), PointAction::OpenMinigame(MinigameKey::ExitDoor)),
        ];
        Self {
            core: RoomCore::new(
                RoomId::East,
                points,
                vec![
                    slot(
                        MinigameKey::Whiteboard,
                        KeypadGame::new(
                            "Whiteboard",
                            "Who is the culprit? Employee no. + birthday =",
                            KeypadMode::Unlock {
                                code: WHITEBOARD_ANSWER,
                            },
                            4,
                        ),
                    ),
                    slot(
                        MinigameKey::ExitDoor,
                        KeypadGame::new("Exit door", "Enter the escape code.", KeypadMode::Submit, 4),
                    ),
                ],
            ),
        }
    }
}

impl Default for EastRoom {
    fn default() -> Self {
        Self::new()
    }
}

/// Which ending a submitted escape code leads to.
pub fn ending_for(code: &str, whiteboard_solved: bool) -> Ending {
    if code == ESCAPE_CODE && whiteboard_solved {
        Ending::True
    } else {
        Ending::Normal
    }
}

impl Room for EastRoom {
    fn core(&self) -> &RoomCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RoomCore {
        &mut self.core
    }

    fn on_completed(&mut self, key: MinigameKey, resolution: &Resolution, world: &mut World) {
        match (key, resolution) {
            (MinigameKey::Whiteboard, _) => world
                .session
                .show_popup(Notice::text("Correct. Now you know who did it.").popup()),
            (MinigameKey::ExitDoor, Resolution::Submitted(code)) => {
                let solved = world.session.is_solved(RoomId::East, "whiteboard");
                let ending = ending_for(code, solved);
                info!(?ending, whiteboard = solved, "exit door opened");
                world.session.finish(ending);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::input::InputEvent;

    fn submit(room: &mut EastRoom, world: &mut World, digits: &str) {
        for c in digits.chars() {
            room.handle_input(&InputEvent::Key(c), world);
        }
        room.handle_input(&InputEvent::Enter, world);
    }

    #[test]
    fn ending_table() {
        assert_eq!(ending_for(ESCAPE_CODE, true), Ending::True);
        assert_eq!(ending_for(ESCAPE_CODE, false), Ending::Normal);
        assert_eq!(ending_for("1111", true), Ending::Normal);
    }

    #[test]
    fn empty_exit_code_just_closes() {
        let mut room = EastRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("exit", &mut world);
        submit(&mut room, &mut world, "");
        assert_eq!(room.core().active(), None);
        assert_eq!(world.session.ending(), None);
    }

    #[test]
    fn escaping_without_the_whiteboard_is_normal() {
        let mut room = EastRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("exit", &mut world);
        submit(&mut room, &mut world, ESCAPE_CODE);
        assert_eq!(world.session.ending(), Some(Ending::Normal));
        assert_eq!(room.core().active(), None);
    }

    #[test]
    fn whiteboard_then_code_is_true_ending() {
        let mut room = EastRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("whiteboard", &mut world);
        submit(&mut room, &mut world, WHITEBOARD_ANSWER);
        assert!(world.session.is_solved(RoomId::East, "whiteboard"));
        popup_text(&mut world);

        room.trigger("exit", &mut world);
        assert_eq!(room.core().active(), Some(MinigameKey::ExitDoor));
        submit(&mut room, &mut world, ESCAPE_CODE);
        assert_eq!(world.session.ending(), Some(Ending::True));
    }

    #[test]
    fn planter_gives_the_piece_once() {
        let mut room = EastRoom::new();
        let mut world = world();
        enter(&mut room, &mut world);
        room.trigger("planter", &mut world);
        room.trigger("planter", &mut world);
        assert!(world.session.inventory.has(ItemId::PuzzlePiece));
        assert_eq!(world.session.inventory.len(), 1);
        assert!(popup_text(&mut world).is_some());
        assert!(popup_text(&mut world).is_none());
    }
}
