//! Office Escape rendering: room view, sidebar, overlays.
//!
//! Reads game state only. Click targets are registered in paint order so
//! overlays (minigame, popup) sit on top of the room.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions::*;
use super::inventory::InventoryItem;
use super::minigame::render::centered;
use super::room::RoomId;
use super::session::{format_countdown, Ending, Popup};
use super::stage::{Node, RegionId};
use super::EscapeGame;

/// Countdown turns red below this.
const HURRY_MS: u64 = 5 * 60_000;
const SIDEBAR_W: u16 = 26;
const POPUP_W: u16 = 52;

pub fn render(game: &EscapeGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let mut cs = click_state.borrow_mut();
    let session = &game.world().session;

    if let Some(ending) = session.ending() {
        render_ending(ending, f, area, &mut cs);
        return;
    }

    let narrow = is_narrow_layout(area.width);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(if narrow { 2 } else { 0 }),
            Constraint::Length(1),
        ])
        .split(area);

    render_title(game, f, chunks[0]);

    let room_area = if narrow {
        render_room(game, f, chunks[1], &mut cs);
        render_narrow_bar(game, f, chunks[2], &mut cs);
        chunks[1]
    } else {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(SIDEBAR_W)])
            .split(chunks[1]);
        render_room(game, f, cols[0], &mut cs);
        render_sidebar(game, f, cols[1], &mut cs);
        cols[0]
    };

    render_help(f, chunks[3]);

    if let Some(room) = game.manager().current_room() {
        if let Some(key) = game.world().stage.mounted_minigame() {
            if let Some(minigame) = room.core().minigame(key) {
                minigame.render(f, room_area, &mut cs);
            }
        }
    }

    render_shade(game.manager().transition().opacity(), f, area);

    if let Some(popup) = session.popup() {
        render_popup(popup, f, area, &mut cs);
    }
}

fn render_title(game: &EscapeGame, f: &mut Frame, area: Rect) {
    let remaining = game.world().session.remaining_ms();
    let clock_color = if remaining < HURRY_MS { Color::Red } else { Color::White };
    let room = game.manager().current().map(RoomId::title).unwrap_or("");

    let clock = format!("⏱ {} ", format_countdown(remaining));
    let left = format!(" OFFICE ESCAPE · {}", room);
    let pad = (area.width as usize).saturating_sub(Line::from(left.as_str()).width() + Line::from(clock.as_str()).width());

    let line = Line::from(vec![
        Span::styled(left, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(pad)),
        Span::styled(clock, Style::default().fg(clock_color).add_modifier(Modifier::BOLD)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

// ── Room view ──────────────────────────────────────────────────

fn backdrop(room: RoomId) -> &'static str {
    match room {
        RoomId::North => "Cracked tiles. The air smells of bleach.",
        RoomId::South => "Chairs pushed back from the table in a hurry.",
        RoomId::East => "The reception desk is empty. The exit glows green.",
        RoomId::West => "Rows of dark monitors. One laptop is still on.",
    }
}

/// Where a hotspot label lands inside `inner`, clamped to stay visible.
fn hotspot_rect(inner: Rect, pos: (u16, u16), width: u16) -> Rect {
    let width = width.min(inner.width);
    let x = inner.x + (pos.0.min(100) as u32 * inner.width as u32 / 100) as u16;
    let y = inner.y + (pos.1.min(99) as u32 * inner.height as u32 / 100) as u16;
    let x = x.min(inner.x + inner.width - width);
    Rect::new(x, y.min(inner.bottom().saturating_sub(1)), width, 1)
}

fn render_room(game: &EscapeGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let stage = &game.world().stage;
    let Some(room) = stage.background() else {
        f.render_widget(Block::default().borders(Borders::ALL), area);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(format!(" {} ", room.title()), Style::default().fg(Color::White)));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width < 4 || inner.height < 3 {
        return;
    }

    let floor_y = inner.y + inner.height * 4 / 5;
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "─".repeat(inner.width as usize),
            Style::default().fg(Color::DarkGray),
        ))),
        Rect::new(inner.x, floor_y, inner.width, 1),
    );
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            backdrop(room),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center),
        Rect::new(inner.x, inner.bottom() - 1, inner.width, 1),
    );

    let Ok(hotspots) = stage.region(RegionId::Hotspots) else {
        return;
    };
    let mut index = 0u16;
    for node in hotspots.nodes() {
        let Node::Hotspot { label, pos, locked, .. } = node else {
            continue;
        };
        let (key_style, label_style) = if *locked {
            (
                Style::default().fg(Color::Black).bg(Color::DarkGray),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
                Style::default().fg(Color::Yellow),
            )
        };
        let line = Line::from(vec![
            Span::styled(format!(" {} ", index + 1), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]);
        let rect = hotspot_rect(inner, *pos, line.width() as u16);
        f.render_widget(Paragraph::new(line), rect);
        cs.add_click_target(rect, HOTSPOT_BASE + index);
        index += 1;
    }
}

// ── Sidebar ────────────────────────────────────────────────────

const COMPASS: [(RoomId, &str, u16); 4] = [
    (RoomId::North, " W  ↑ North", GO_NORTH),
    (RoomId::West, " A  ← West", GO_WEST),
    (RoomId::East, " D  → East", GO_EAST),
    (RoomId::South, " S  ↓ South", GO_SOUTH),
];

fn compass_style(game: &EscapeGame, room: RoomId) -> Style {
    if game.manager().current() == Some(room) {
        Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

fn render_sidebar(game: &EscapeGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(COMPASS.len() as u16 + 2), Constraint::Min(4)])
        .split(area);

    let mut cl = ClickableList::new();
    for (room, label, action) in COMPASS {
        cl.push_clickable(Line::from(Span::styled(label, compass_style(game, room))), action);
    }
    cl.register_targets(parts[0], cs, 1, 1, 0, 0);
    let block = Block::default().borders(Borders::ALL).title(" Move ");
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), parts[0]);

    let inventory = &game.world().session.inventory;
    let block = Block::default().borders(Borders::ALL).title(" Items ");
    let inner_width = block.inner(parts[1]).width;
    let mut cl = ClickableList::new();
    if inventory.is_empty() {
        cl.push(Line::from(Span::styled(" nothing yet", Style::default().fg(Color::DarkGray))));
    }
    for (i, item) in inventory.items().iter().enumerate() {
        let style = if item.selected {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().fg(Color::Green)
        };
        let marker = if item.selected { "▸" } else { " " };
        cl.push_clickable(
            Line::from(Span::styled(format!("{}{}", marker, item.name), style)),
            INVENTORY_SLOT_BASE + i as u16,
        );
    }
    if let Some(item) = inventory.selected() {
        cl.push(Line::from(""));
        for line in item_detail(item) {
            cl.push(line);
        }
    }
    cl.register_targets(parts[1], cs, 1, 1, 0, inner_width);
    f.render_widget(
        Paragraph::new(cl.into_lines())
            .block(block)
            .wrap(Wrap { trim: false }),
        parts[1],
    );
}

/// Narrow screens: compass and items as two tab rows.
fn render_narrow_bar(game: &EscapeGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let mut compass = TabBar::new(" ");
    for (room, label, action) in COMPASS {
        compass = compass.tab(label.trim(), compass_style(game, room), action);
    }
    compass.render(f, Rect::new(area.x, area.y, area.width, 1), cs);

    let inventory = &game.world().session.inventory;
    if inventory.is_empty() || area.height < 2 {
        return;
    }
    let mut items = TabBar::new("│");
    for (i, item) in inventory.items().iter().enumerate() {
        let style = if item.selected {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().fg(Color::Green)
        };
        items = items.tab(item.name, style, INVENTORY_SLOT_BASE + i as u16);
    }
    items.render(f, Rect::new(area.x, area.y + 1, area.width, 1), cs);
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Line::from(Span::styled(
        " WASD/arrows move · 1-9 or tap a hotspot · Esc closes",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(help), area);
}

// ── Overlays ───────────────────────────────────────────────────

fn shade_glyph(opacity: f32) -> Option<&'static str> {
    if opacity <= 0.0 {
        None
    } else if opacity < 0.34 {
        Some("░")
    } else if opacity < 0.67 {
        Some("▒")
    } else if opacity < 1.0 {
        Some("▓")
    } else {
        Some(" ")
    }
}

fn render_shade(opacity: f32, f: &mut Frame, area: Rect) {
    let Some(glyph) = shade_glyph(opacity) else {
        return;
    };
    let row = glyph.repeat(area.width as usize);
    let lines: Vec<Line> = (0..area.height).map(|_| Line::from(row.clone())).collect();
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).style(Style::default().fg(Color::Black).bg(Color::Black)),
        area,
    );
}

/// Placeholder for a piece of art, named by its reference.
fn art_line(image: &str) -> Line<'static> {
    Line::from(Span::styled(format!("▣ {}", image), Style::default().fg(Color::DarkGray)))
}

/// Art and description of the selected item, under the item list.
fn item_detail(item: &InventoryItem) -> Vec<Line<'static>> {
    vec![
        art_line(item.image),
        Line::from(Span::styled(item.description, Style::default().fg(Color::Gray))),
    ]
}

fn popup_body(popup: &Popup) -> Paragraph<'_> {
    let mut lines = Vec::new();
    if let Some(image) = popup.image {
        lines.push(art_line(image));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(popup.message.as_str()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter / tap to continue",
        Style::default().fg(Color::DarkGray),
    )));
    Paragraph::new(lines).wrap(Wrap { trim: true })
}

fn render_popup(popup: &Popup, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let width = POPUP_W.min(area.width.saturating_sub(2)).max(12);
    let body = popup_body(popup);
    let height = body.line_count(width.saturating_sub(4)) as u16 + 2;
    let rect = centered(area, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(rect);
    f.render_widget(Clear, rect);
    f.render_widget(block, rect);
    f.render_widget(body, Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height));
    cs.add_click_target(rect, DISMISS_POPUP);
}

fn ending_text(ending: Ending) -> (&'static str, Color, &'static str) {
    match ending {
        Ending::True => (
            "TRUE ENDING",
            Color::Green,
            "The door clicks open. You walk out with the culprit's name: M.S. Kim, Solutions team.",
        ),
        Ending::Normal => (
            "ESCAPED",
            Color::Yellow,
            "You stumble out into the night. Whoever did this is still out there.",
        ),
        Ending::Bad => (
            "TIME'S UP",
            Color::Red,
            "The lights go out. Footsteps stop right behind you.",
        ),
    }
}

fn render_ending(ending: Ending, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let (title, color, text) = ending_text(ending);
    let rect = centered(area, 48, 10);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));

    let mut cl = ClickableList::new();
    cl.push(Line::from(""));
    cl.push(Line::from(text));
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled(" [R] Play again", Style::default().fg(Color::Cyan))),
        RESTART,
    );
    let inner_width = block.inner(rect).width;
    cl.register_targets(rect, cs, 1, 1, 0, inner_width);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(cl.into_lines())
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}
