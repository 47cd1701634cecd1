//! North: restroom corridor with the stained mirror and the jammed copier.

use crate::games::escape::inventory::ItemId;
use crate::games::escape::minigame::pixel_coverage::MirrorGame;
use crate::games::escape::minigame::timing_bar::CopierGame;
use crate::games::escape::minigame::{MinigameKey, Resolution};

use super::{slot, InteractionPoint, Notice, PointAction, Room, RoomCore, RoomId, World};

const MIRROR_CLUE: Notice = Notice::with_image(
    "clue_mirror",
    "\"314\" is written on the mirror. What could it be for?",
);
const BIRTHDAY_NOTICE: Notice = Notice::with_image(
    "clue_birthdays",
    "Admin notice, October birthdays: M.S. Kim, Solutions team, employee no. 1216, born 10/23.",
);

pub struct NorthRoom {
    core: RoomCore,
}

impl NorthRoom {
    pub fn new() -> Self {
        let points = vec![
            InteractionPoint::new(
                "trash",
                "Trash can",
                (12, 75),
                PointAction::Grant {
                    item: ItemId::Towel,
                    notice: Notice::with_image(
                        "item_towel",
                        "Something was stuffed in the trash. You found a towel.",
                    ),
                },
            )
            .one_time(),
            InteractionPoint::new("mirror", "Mirror", (35, 35), PointAction::OpenMinigame(MinigameKey::Mirror))
                .requires(
                    ItemId::Towel,
                    Notice::text("Blood is smeared across the mirror. You can't wipe it off bare-handed..."),
                )
                .when_solved(Notice::text("\"314\" is written on the mirror.")),
            InteractionPoint::new("copier", "Copier", (62, 50), PointAction::OpenMinigame(MinigameKey::Copier))
                .requires(
                    ItemId::Wrench,
                    Notice::text("A copier that stopped mid-print. Could it be fixed?"),
                )
                .when_solved(BIRTHDAY_NOTICE),
        ];
        Self {
            core: RoomCore::new(
                RoomId::North,
                points,
                vec![
                    slot(MinigameKey::Mirror, MirrorGame::new()),
                    slot(MinigameKey::Copier, CopierGame::new()),
                ],
            ),
        }
    }
}

impl Default for NorthRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl Room for NorthRoom {
    fn core(&self) -> &RoomCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RoomCore {
        &mut self.core
    }

    fn on_completed(&mut self, key: MinigameKey, _resolution: &Resolution, world: &mut World) {
        match key {
            MinigameKey::Mirror => world.session.show_popup(MIRROR_CLUE.popup()),
            MinigameKey::Copier => world.session.show_popup(BIRTHDAY_NOTICE.popup()),
            _ => {}
        }
    }
}
