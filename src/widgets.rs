//! Clickable UI pieces that draw and register their own targets.
//!
//! - [`TabBar`]: one row of labelled buttons (laptop tabs, narrow compass).
//! - [`ClickableList`]: lines where some rows are buttons (sidebar, overlays).

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::Paragraph;
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ─────────────────────────────────────────────────────

/// A single row of tabs. Target positions come from the rendered label
/// widths, so wide glyphs such as arrows line up with what the player sees.
///
/// ```ignore
/// TabBar::new(" ")
///     .tab("Terminal", active, LAPTOP_TAB_TERMINAL)
///     .tab("hack.js", idle, LAPTOP_TAB_SOURCE)
///     .render(f, row, cs);
/// ```
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            tabs: Vec::new(),
            separator,
        }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let sep_width = Line::from(self.separator).width() as u16;
        let mut spans: Vec<Span> = Vec::new();
        let mut widths: Vec<(u16, u16)> = Vec::with_capacity(self.tabs.len());

        for (i, (label, style, action_id)) in self.tabs.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(self.separator, Style::default().fg(Color::DarkGray)));
            }
            let padded = format!(" {} ", label);
            widths.push((Line::from(padded.as_str()).width() as u16, action_id));
            spans.push(Span::styled(padded, style));
        }

        f.render_widget(Paragraph::new(Line::from(spans)), area);
        cs.register_tab_targets(&widths, sep_width, area.x, area.y, area.width, area.height.max(1));
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines paired with the action ids of the rows that act as buttons.
///
/// Row offsets are derived from line order, so inserting a status line
/// above a button never leaves its target behind.
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len() as u16, action_id));
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register a row target for every visible row of every clickable line.
    ///
    /// `top`/`bottom` are the rows taken by borders, `scroll` is in visual
    /// rows. Pass `inner_width = 0` for paragraphs without `Wrap`; otherwise
    /// lines wider than `inner_width` are counted as several rows.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top: u16,
        bottom: u16,
        scroll: u16,
        inner_width: u16,
    ) {
        let content_y = area.y + top;
        let content_end = area.y + area.height.saturating_sub(bottom);

        let mut starts: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut heights: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut cumulative = 0u16;
        for line in &self.lines {
            let h = match inner_width {
                0 => 1,
                w => (line.width().max(1)).div_ceil(w as usize) as u16,
            };
            starts.push(cumulative);
            heights.push(h);
            cumulative += h;
        }

        for &(index, action_id) in &self.actions {
            let index = index as usize;
            for visual in starts[index]..starts[index] + heights[index] {
                if visual < scroll {
                    continue;
                }
                let row = content_y + (visual - scroll);
                if row >= content_end {
                    break;
                }
                cs.add_row_target(area, row, action_id);
            }
        }
    }
}
