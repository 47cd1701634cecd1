//! Minigame rendering (read-only from minigame state).

use ratzilla::ratatui::layout::{Alignment, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratzilla::ratatui::Frame;

use crate::games::escape::actions::*;
use crate::input::ClickState;
use crate::widgets::{ClickableList, TabBar};

use super::code_entry::{CodeEntryGame, LaptopTab, SCRIPT_SOURCE};
use super::keypad::KeypadGame;
use super::pixel_coverage::{MirrorGame, CANVAS_H, CANVAS_W};
use super::swap_puzzle::{SwapPuzzleGame, SIDE};
use super::timing_bar::{BarState, CopierGame, CENTER, GOOD_RADIUS, LIVES, PERFECT_RADIUS};

/// Rect of at most `width`×`height` centred in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

fn overlay_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
}

fn push_close(cl: &mut ClickableList) {
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" Esc ", Style::default().fg(Color::Black).bg(Color::DarkGray)),
            Span::styled(" Close", Style::default().fg(Color::DarkGray)),
        ]),
        MINIGAME_CLOSE,
    );
}

fn meter(value: u32, max: u32, width: usize) -> String {
    let filled = (value.min(max) as usize * width) / max.max(1) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

// ── Copier ─────────────────────────────────────────────────────

pub fn render_copier(game: &CopierGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let area = centered(area, 56, 14);
    let block = overlay_block("Copier repair", Color::Yellow);
    let inner = block.inner(area);
    let engine = game.engine();

    let track_w = inner.width.saturating_sub(2).max(10) as i32;
    let to_col = |pos: i32| (pos * (track_w - 1) / 100) as usize;
    let mut track: Vec<Span> = vec![Span::raw(" ")];
    let marker = to_col(engine.position());
    for col in 0..track_w as usize {
        // Band membership is judged on the column's centre position.
        let pos = (col as i32 * 100 + (track_w - 1) / 2) / (track_w - 1);
        let distance = (pos - CENTER).abs();
        let bg = if distance <= PERFECT_RADIUS {
            Color::Green
        } else if distance <= GOOD_RADIUS {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let ch = if col == marker { "┃" } else { " " };
        track.push(Span::styled(ch, Style::default().fg(Color::White).bg(bg)));
    }

    let hearts: String = (0..LIVES)
        .map(|i| if i < engine.lives() { '♥' } else { '♡' })
        .collect();

    let status = match engine.state() {
        BarState::Won => Span::styled(
            " Repair complete! The copier hums back to life.",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        BarState::LostRetry => Span::styled(
            " Out of lives. The copier jams... hold on.",
            Style::default().fg(Color::Red),
        ),
        _ => match game.last_grade() {
            Some(grade) => Span::styled(
                format!(" {}", grade.label()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            None => Span::styled(
                " Hit when the marker crosses the green zone.",
                Style::default().fg(Color::Gray),
            ),
        },
    };

    let mut cl = ClickableList::new();
    cl.push(Line::from(vec![
        Span::styled(" Repair ", Style::default().fg(Color::White)),
        Span::styled(meter(engine.progress(), 100, 20), Style::default().fg(Color::Green)),
        Span::raw(format!(" {:>3}%", engine.progress())),
    ]));
    cl.push(Line::from(vec![
        Span::styled(" Lives  ", Style::default().fg(Color::White)),
        Span::styled(hearts, Style::default().fg(Color::Red)),
    ]));
    cl.push(Line::from(""));
    cl.push(Line::from(track.clone()));
    cl.push(Line::from(track));
    cl.push(Line::from(""));
    cl.push(Line::from(status));
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                "  ▶ HIT  ",
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Space / Enter", Style::default().fg(Color::DarkGray)),
        ]),
        COPIER_HIT,
    );
    push_close(&mut cl);

    cl.register_targets(area, cs, 1, 1, 0, 0);
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

// ── Mirror ─────────────────────────────────────────────────────

/// 3×5 bitmaps for the digits written under the stain.
const GLYPHS: [(char, [u8; 5]); 3] = [
    ('3', [0b111, 0b001, 0b111, 0b001, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
];

/// True where the hidden "314" is drawn on the glass.
fn writing_at(x: usize, y: usize) -> bool {
    const SCALE: usize = 2;
    const GAP: usize = 2;
    let glyph_w = 3 * SCALE;
    let total_w = GLYPHS.len() * glyph_w + (GLYPHS.len() - 1) * GAP;
    let left = (CANVAS_W - total_w) / 2;
    let top = (CANVAS_H - 5 * SCALE) / 2;
    if x < left || y < top || y >= top + 5 * SCALE {
        return false;
    }
    let local_x = x - left;
    let index = local_x / (glyph_w + GAP);
    let within = local_x % (glyph_w + GAP);
    if index >= GLYPHS.len() || within >= glyph_w {
        return false;
    }
    let row = GLYPHS[index].1[(y - top) / SCALE];
    let bit = 2 - within / SCALE;
    row >> bit & 1 == 1
}

fn mirror_color(game: &MirrorGame, x: usize, y: usize) -> Color {
    let cover = game.coverage().cover();
    if x >= cover.width() || y >= cover.height() {
        return Color::Black;
    }
    let alpha = cover.alpha(x, y) as u16;
    let (r, g, b) = if writing_at(x, y) {
        (40u16, 40u16, 48u16)
    } else {
        (180u16, 190u16, 200u16)
    };
    // Blend the stain (dark red) over the glass by its alpha.
    let blend = |base: u16, stain: u16| ((base * (255 - alpha) + stain * alpha) / 255) as u8;
    Color::Rgb(blend(r, 110), blend(g, 8), blend(b, 12))
}

pub fn render_mirror(game: &MirrorGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let canvas_rows = (CANVAS_H / 2) as u16;
    let area = centered(area, CANVAS_W as u16 + 4, canvas_rows + 6);
    let block = overlay_block("Bathroom mirror", Color::Red);
    let inner = block.inner(area);

    let mut cl = ClickableList::new();
    let percent = game.coverage().cleaned_percentage();
    let status = if game.is_revealed() {
        Span::styled(" The glass is clean.", Style::default().fg(Color::Green))
    } else {
        Span::styled(
            format!(" Drag to wipe the stain. Cleaned {:>3.0}%", percent),
            Style::default().fg(Color::Gray),
        )
    };
    cl.push(Line::from(status));

    let canvas = Rect::new(
        inner.x + inner.width.saturating_sub(CANVAS_W as u16) / 2,
        inner.y + 1,
        (CANVAS_W as u16).min(inner.width),
        canvas_rows.min(inner.height.saturating_sub(3)),
    );
    for row in 0..canvas.height as usize {
        let spans: Vec<Span> = (0..canvas.width as usize)
            .map(|col| {
                Span::styled(
                    "▀",
                    Style::default()
                        .fg(mirror_color(game, col, row * 2))
                        .bg(mirror_color(game, col, row * 2 + 1)),
                )
            })
            .collect();
        cl.push(Line::from(spans));
    }
    cl.push(Line::from(Span::styled(
        format!(" {}", meter(percent as u32, 100, 20)),
        Style::default().fg(Color::Green),
    )));
    push_close(&mut cl);

    cl.register_targets(area, cs, 1, 1, 0, 0);
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(cl.into_lines())
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
    // Registered last so the canvas wins over row targets.
    cs.add_click_target(canvas, MIRROR_CANVAS);
}

// ── Keypad ─────────────────────────────────────────────────────

const KEY_W: u16 = 5;
const KEY_ROWS: [[Option<u8>; 3]; 4] = [
    [Some(1), Some(2), Some(3)],
    [Some(4), Some(5), Some(6)],
    [Some(7), Some(8), Some(9)],
    [None, Some(0), None],
];

pub fn render_keypad(pad: &KeypadGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let area = centered(area, 36, 16);
    let color = if pad.is_flashing_error() {
        Color::Red
    } else if pad.is_unlocked() {
        Color::Green
    } else {
        Color::Cyan
    };
    let block = overlay_block(pad.title(), color);
    let inner = block.inner(area);

    let slots: String = (0..pad.max_len())
        .map(|i| pad.entry().chars().nth(i).unwrap_or('_'))
        .collect();
    let mut lines = vec![
        Line::from(Span::styled(pad.prompt(), Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("» {} «", slots),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let pad_x = inner.x + inner.width.saturating_sub(KEY_W * 3) / 2;
    let key_style = Style::default().fg(Color::White).bg(Color::DarkGray);
    for (r, keys) in KEY_ROWS.iter().enumerate() {
        let y = inner.y + lines.len() as u16;
        let mut spans = Vec::new();
        for (c, key) in keys.iter().enumerate() {
            let x = pad_x + c as u16 * KEY_W;
            let (label, action) = match (r, c, key) {
                (_, _, Some(d)) => (format!("  {}  ", d), KEYPAD_DIGIT_BASE + *d as u16),
                (3, 0, None) => ("  ←  ".to_string(), KEYPAD_BACKSPACE),
                _ => ("  ⏎  ".to_string(), KEYPAD_ENTER),
            };
            spans.push(Span::styled(label, key_style));
            if y < inner.y + inner.height {
                cs.add_click_target(Rect::new(x, y, KEY_W, 1), action);
            }
        }
        lines.push(Line::from(spans).alignment(Alignment::Center));
        lines.push(Line::from(""));
    }

    let close_row = inner.y + lines.len() as u16;
    lines.push(Line::from(vec![
        Span::styled(" Esc ", Style::default().fg(Color::Black).bg(Color::DarkGray)),
        Span::styled(" Close", Style::default().fg(Color::DarkGray)),
    ]));
    cs.add_row_target(inner, close_row, MINIGAME_CLOSE);

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}

// ── Laptop ─────────────────────────────────────────────────────

pub fn render_laptop(game: &CodeEntryGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let area = centered(area, 60, 20);
    let block = overlay_block("Laptop", Color::Green);
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    if inner.height < 3 {
        return;
    }

    let tab_style = |tab: LaptopTab| {
        if game.tab() == tab {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().fg(Color::Green)
        }
    };
    TabBar::new(" │ ")
        .tab("Terminal", tab_style(LaptopTab::Terminal), LAPTOP_TAB_TERMINAL)
        .tab("hack.js", tab_style(LaptopTab::Source), LAPTOP_TAB_SOURCE)
        .render(f, Rect::new(inner.x, inner.y, inner.width, 1), cs);

    let body = Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 1);
    let mut cl = ClickableList::new();
    match game.tab() {
        LaptopTab::Terminal => {
            let room = body.height.saturating_sub(3) as usize;
            let start = game.history().len().saturating_sub(room);
            for line in &game.history()[start..] {
                cl.push(Line::from(Span::styled(
                    line.clone(),
                    Style::default().fg(Color::Green),
                )));
            }
            cl.push(Line::from(vec![
                Span::styled("$ ", Style::default().fg(Color::Green)),
                Span::styled(game.command().to_string(), Style::default().fg(Color::White)),
                Span::styled("█", Style::default().fg(Color::Green)),
            ]));
        }
        LaptopTab::Source => {
            for line in SCRIPT_SOURCE {
                cl.push(Line::from(Span::styled(*line, Style::default().fg(Color::Yellow))));
            }
        }
    }
    cl.push(Line::from(""));
    push_close(&mut cl);

    cl.register_targets(body, cs, 0, 0, 0, 0);
    f.render_widget(Paragraph::new(cl.into_lines()), body);
}

// ── Picture frame puzzle ───────────────────────────────────────

const TILE_W: usize = 7;
const TILE_H: usize = 3;
const PICTURE: [&str; SIDE * TILE_H] = [
    r"    /\_____/\        ",
    r"   /  o   o  \       ",
    r"  ( ==  ^  == )      ",
    r"   )         (   ~~  ",
    r"  (           ) ~~   ",
    r" ( ( )     ( ) )     ",
    r"(__(__)___(__)__)    ",
    r"  office cat  '24    ",
    r"                     ",
];

fn tile_fragment(tile: u8, line: usize) -> String {
    let (row, col) = (tile as usize / SIDE, tile as usize % SIDE);
    PICTURE[row * TILE_H + line]
        .chars()
        .skip(col * TILE_W)
        .take(TILE_W)
        .collect()
}

pub fn render_swap_puzzle(game: &SwapPuzzleGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let grid_w = (SIDE * (TILE_W + 2)) as u16;
    let area = centered(area, grid_w + 6, (SIDE * (TILE_H + 1)) as u16 + 6);
    let block = overlay_block("Picture frame", Color::Magenta);
    let inner = block.inner(area);

    let mut lines = vec![Line::from(Span::styled(
        format!("Pick two tiles to swap them. Moves: {}", game.moves()),
        Style::default().fg(Color::Gray),
    ))];
    let grid_x = inner.x + inner.width.saturating_sub(grid_w) / 2;
    for grid_row in 0..SIDE {
        let top = inner.y + lines.len() as u16;
        for line in 0..TILE_H {
            let mut spans = Vec::new();
            for grid_col in 0..SIDE {
                let index = grid_row * SIDE + grid_col;
                let tile = game.tiles()[index];
                let style = if game.selected() == Some(index) {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else if tile as usize == index {
                    Style::default().fg(Color::White).bg(Color::Rgb(60, 40, 70))
                } else {
                    Style::default().fg(Color::Gray).bg(Color::Rgb(40, 40, 40))
                };
                spans.push(Span::styled(format!(" {} ", tile_fragment(tile, line)), style));
            }
            lines.push(Line::from(spans).alignment(Alignment::Center));
        }
        lines.push(Line::from(""));
        for grid_col in 0..SIDE {
            let x = grid_x + (grid_col * (TILE_W + 2)) as u16;
            let rect = Rect::new(x, top, (TILE_W + 2) as u16, TILE_H as u16);
            if top + TILE_H as u16 <= inner.y + inner.height {
                cs.add_click_target(rect, PUZZLE_TILE_BASE + (grid_row * SIDE + grid_col) as u16);
            }
        }
    }

    let close_row = inner.y + lines.len() as u16;
    lines.push(Line::from(vec![
        Span::styled(" Esc ", Style::default().fg(Color::Black).bg(Color::DarkGray)),
        Span::styled(" Close", Style::default().fg(Color::DarkGray)),
    ]));
    cs.add_row_target(inner, close_row, MINIGAME_CLOSE);

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );
}
