//! West: the office desks. Starting room.

use crate::games::escape::inventory::ItemId;
use crate::games::escape::minigame::code_entry::CodeEntryGame;
use crate::games::escape::minigame::keypad::{KeypadGame, KeypadMode};
use crate::games::escape::minigame::{MinigameKey, Resolution};

use super::{slot, InteractionPoint, Notice, PointAction, Room, RoomCore, RoomId, World};

pub const DRAWER_CODE: &str = "314";
const SAFE_CODE_CLUE: Notice = Notice::text("Safe code: 55 52 51 54 56 57");

pub struct WestRoom {
    core: RoomCore,
}

impl WestRoom {
    pub fn new() -> Self {
        let points = vec![
            InteractionPoint::new(
                "paper",
                "Crumpled paper",
                (7, 70),
                PointAction::Inspect(Notice::with_image(
                    "clue_paper",
                    "A torn scrap of paper. \"Every character has a number.\"",
                )),
            ),
            InteractionPoint::new(
                "coffee",
                "Coffee cup",
                (20, 65),
                PointAction::Inspect(Notice::text("Nothing in it, it seems.")),
            ),
            InteractionPoint::new("laptop", "Laptop", (47, 40), PointAction::OpenMinigame(MinigameKey::Laptop))
                .when_solved(SAFE_CODE_CLUE),
            InteractionPoint::new("drawer", "Drawer", (80, 55), PointAction::OpenMinigame(MinigameKey::Drawer))
                .when_solved(Notice::text("It's empty now.")),
        ];
        Self {
            core: RoomCore::new(
                RoomId::West,
                points,
                vec![
                    slot(MinigameKey::Laptop, CodeEntryGame::new()),
                    slot(
                        MinigameKey::Drawer,
                        KeypadGame::new(
                            "Drawer lock",
                            "A three-digit lock.",
                            KeypadMode::Unlock { code: DRAWER_CODE },
                            3,
                        ),
                    ),
                ],
            ),
        }
    }
}

impl Default for WestRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl Room for WestRoom {
    fn core(&self) -> &RoomCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RoomCore {
        &mut self.core
    }

    fn on_completed(&mut self, key: MinigameKey, _resolution: &Resolution, world: &mut World) {
        match key {
            MinigameKey::Laptop => world.session.show_popup(SAFE_CODE_CLUE.popup()),
            MinigameKey::Drawer => {
                world.session.grant(ItemId::Wrench);
                world.session.show_popup(
                    Notice::with_image("item_wrench", "The drawer slid open. There's a wrench inside.")
                        .popup(),
                );
            }
            _ => {}
        }
    }
}
