//! Semantic action IDs for escape-room click targets.

// ── Navigation ───────────────────────────────────────────────
pub const GO_NORTH: u16 = 1;
pub const GO_SOUTH: u16 = 2;
pub const GO_EAST: u16 = 3;
pub const GO_WEST: u16 = 4;

// ── Room view ────────────────────────────────────────────────
pub const HOTSPOT_BASE: u16 = 10; // +index of mounted hotspot 0..19
pub const INVENTORY_SLOT_BASE: u16 = 40; // +slot 0..9

// ── Overlays ─────────────────────────────────────────────────
pub const DISMISS_POPUP: u16 = 60;
pub const MINIGAME_CLOSE: u16 = 61;
pub const RESTART: u16 = 62;

// ── Minigames ────────────────────────────────────────────────
pub const COPIER_HIT: u16 = 70;
pub const MIRROR_CANVAS: u16 = 71;
pub const KEYPAD_DIGIT_BASE: u16 = 80; // +digit 0..9
pub const KEYPAD_BACKSPACE: u16 = 90;
pub const KEYPAD_ENTER: u16 = 91;
pub const LAPTOP_TAB_TERMINAL: u16 = 92;
pub const LAPTOP_TAB_SOURCE: u16 = 93;
pub const PUZZLE_TILE_BASE: u16 = 100; // +tile 0..8
