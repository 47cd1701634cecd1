//! Shared input handling: coordinate conversion, click targets, and event types.
//!
//! This module is game-agnostic. The escape game dispatches these events
//! through its room manager.

use ratzilla::ratatui::layout::Rect;

/// Arrow keys, kept separate from `Key(char)` so WASD and arrows can share a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

impl PointerPhase {
    /// Phase for a DOM touch event type. A cancelled touch ends like a lift.
    pub fn from_touch(event_type: &str) -> Option<Self> {
        match event_type {
            "touchstart" => Some(PointerPhase::Down),
            "touchmove" => Some(PointerPhase::Move),
            "touchend" | "touchcancel" => Some(PointerPhase::Up),
            _ => None,
        }
    }
}

/// A pointer sample resolved against the click targets of the last frame.
///
/// `hit` is `(action_id, col, row)` with the cell offset relative to the
/// target's top-left corner, or `None` when the pointer is over no target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub hit: Option<(u16, u16, u16)>,
}

/// All possible input events, normalized from keyboard, mouse, and touch sources.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A printable key press from keyboard.
    Key(char),
    Arrow(Arrow),
    Enter,
    Backspace,
    Escape,
    /// A click/tap on a registered target, identified by a semantic action ID.
    Click(u16),
    /// Raw press/drag/release stream, used by drag-driven minigames.
    Pointer(PointerEvent),
}

/// A region on screen that can be tapped/clicked to trigger an action.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// The rectangular region (in terminal cell coordinates) for hit testing.
    pub rect: Rect,
    /// Semantic action ID. Each game defines its own constants.
    pub action_id: u16,
}

/// Shared state between the render loop and click handler.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Full-width target on one row of `area`; rows outside `area` are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.targets.push(ClickTarget {
                rect: Rect::new(area.x, row, area.width, 1),
                action_id,
            });
        }
    }

    /// Targets for a one-row tab bar. `tab_widths` holds `(padded label
    /// width, action_id)` per tab. Each target spans its label plus half of
    /// each neighbouring separator; the outer tabs reach the area edges.
    pub fn register_tab_targets(
        &mut self,
        tab_widths: &[(u16, u16)],
        separator_width: u16,
        x: u16,
        y: u16,
        total_width: u16,
        height: u16,
    ) {
        if tab_widths.is_empty() || total_width == 0 {
            return;
        }

        // (start, end) column of each label.
        let mut spans: Vec<(u16, u16)> = Vec::with_capacity(tab_widths.len());
        let mut cursor = 0u16;
        for &(width, _) in tab_widths {
            spans.push((cursor, cursor + width));
            cursor += width + separator_width;
        }

        let last = tab_widths.len() - 1;
        for (i, &(_, action_id)) in tab_widths.iter().enumerate() {
            let left = match i {
                0 => 0,
                _ => {
                    let prev_end = spans[i - 1].1;
                    prev_end + (spans[i].0 - prev_end) / 2
                }
            };
            let right = if i == last {
                total_width
            } else {
                let end = spans[i].1;
                end + (spans[i + 1].0 - end) / 2
            };
            if right > left {
                self.add_click_target(Rect::new(x + left, y, right - left, height), action_id);
            }
        }
    }

    /// Action id under a cell. Later targets sit on top of earlier ones.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.hit_test_local(col, row).map(|(action_id, _, _)| action_id)
    }

    /// Like [`hit_test`](ClickState::hit_test) but also returns the cell offset
    /// inside the matched target.
    pub fn hit_test_local(&self, col: u16, row: u16) -> Option<(u16, u16, u16)> {
        // Iterate in reverse so later-registered (topmost) targets win.
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some((t.action_id, col - r.x, row - r.y))
            } else {
                None
            }
        })
    }
}

/// Events for one pointer sample, mouse or touch alike.
/// A press on a target clicks it before the raw pointer event follows.
pub fn pointer_events(phase: PointerPhase, hit: Option<(u16, u16, u16)>) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(2);
    if let (PointerPhase::Down, Some((action_id, _, _))) = (phase, hit) {
        events.push(InputEvent::Click(action_id));
    }
    events.push(InputEvent::Pointer(PointerEvent { phase, hit }));
    events
}

/// Below this width the sidebar folds into tab rows under the room.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Cell index for a pixel offset along one axis of the grid container.
fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    (cell < cells).then_some(cell)
}

/// Row under `click_y`, measured from the grid container's top edge.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    pixel_to_cell(click_y, grid_height, terminal_rows)
}

/// Column under `click_x`, measured from the grid container's left edge.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    pixel_to_cell(click_x, grid_width, terminal_cols)
}
