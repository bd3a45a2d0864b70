pub mod board;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use std::cmp::Reverse;
use unicode_width::UnicodeWidthStr;

use crate::{
    celebration::Celebration,
    session::Status,
    snapshot::{Snapshot, TargetPhase, TargetView},
};
use board::BoardProjection;

const HORIZONTAL_MARGIN: u16 = 2;
const HEADER_HEIGHT: u16 = 4;
const LEGEND_HEIGHT: u16 = 1;

const AMBER: Color = Color::Rgb(217, 119, 6);
const CREAM: Color = Color::Rgb(255, 251, 235);

/// Regions of the game screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    /// Board including its border
    pub board_frame: Rect,
    /// Drawable board cells
    pub board: Rect,
    pub legend: Rect,
}

/// Splits the screen and fits the largest board that looks square
/// (terminal cells are about twice as tall as they are wide).
pub fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(LEGEND_HEIGHT),
        ])
        .split(area);

    let space = chunks[1];
    let inner_h = space.height.saturating_sub(2).min(space.width.saturating_sub(2) / 2);
    let inner_w = inner_h * 2;
    let frame_w = inner_w + 2;
    let frame_h = inner_h + 2;
    let board_frame = Rect::new(
        space.x + space.width.saturating_sub(frame_w) / 2,
        space.y,
        frame_w.min(space.width),
        frame_h.min(space.height),
    );
    let board = Rect::new(board_frame.x + 1, board_frame.y + 1, inner_w, inner_h);

    ScreenLayout {
        header: chunks[0],
        board_frame,
        board,
        legend: chunks[2],
    }
}

/// Everything drawn on one frame
pub struct GameView<'a> {
    pub snapshot: &'a Snapshot,
    /// Count being typed on the setup prompt
    pub input: &'a str,
    /// True while no session has been started yet or a new count is being entered
    pub setup: bool,
    pub celebration: Option<&'a Celebration>,
}

impl Widget for &GameView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = screen_layout(area);
        let snapshot = self.snapshot;
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let (title, title_style) = banner(snapshot.status);
        let mut title_spans = vec![Span::styled(title, title_style)];
        if snapshot.autoplay_enabled {
            title_spans.push(Span::styled(
                "   [autoplay]",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ));
        }

        let points = if self.setup {
            format!("{}_", self.input)
        } else {
            snapshot.total_targets.to_string()
        };
        let header = Paragraph::new(vec![
            Line::from(title_spans),
            Line::from(vec![
                Span::raw("Time: "),
                Span::styled(format!("{:.2}s", snapshot.elapsed_secs), bold),
                Span::raw("    Points: "),
                Span::styled(points, bold),
            ]),
            Line::from(vec![
                Span::raw("Next number: "),
                Span::styled(next_label(snapshot), bold),
            ]),
        ]);
        header.render(layout.header, buf);

        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(AMBER))
            .render(layout.board_frame, buf);

        if self.setup || snapshot.status == Status::Idle {
            Paragraph::new(Span::styled(
                "Type a number and press Enter to start",
                Style::default().fg(Color::Gray),
            ))
            .alignment(Alignment::Center)
            .render(
                Rect::new(
                    layout.board.x,
                    layout.board.y + layout.board.height / 2,
                    layout.board.width,
                    1.min(layout.board.height),
                ),
                buf,
            );
        } else {
            let projection = BoardProjection::new(layout.board, snapshot.board_size);
            // lower orders are drawn last so they sit on top
            for target in snapshot
                .targets
                .iter()
                .sorted_by_key(|t| Reverse(t.order))
            {
                draw_target(target, snapshot.target_size, &projection, buf);
            }
        }

        if let Some(celebration) = self.celebration.filter(|c| c.is_active) {
            draw_sparks(celebration, layout.board, buf);
        }

        Paragraph::new(Span::styled(
            legend(self.setup, snapshot),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(layout.legend, buf);
    }
}

fn banner(status: Status) -> (&'static str, Style) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match status {
        Status::GameOver => ("GAME OVER", bold.fg(Color::Red)),
        Status::AllClear => ("ALL CLEARED!", bold.fg(Color::Green)),
        Status::Idle | Status::Playing => ("LET'S PLAY", bold),
    }
}

fn next_label(snapshot: &Snapshot) -> String {
    match snapshot.status {
        Status::Idle => "-".to_string(),
        _ => snapshot.expected_order.to_string(),
    }
}

fn legend(setup: bool, snapshot: &Snapshot) -> &'static str {
    if setup {
        "(0-9) points / (enter) play / (esc)ape"
    } else if snapshot.status == Status::Playing {
        "(click) targets in order / (a)utoplay / (r)estart / (n)ew / (esc)ape"
    } else {
        "(r)estart / (n)ew / (esc)ape"
    }
}

fn draw_target(target: &TargetView, size: u32, projection: &BoardProjection, buf: &mut Buffer) {
    let rect = projection.cell_rect(target.position.x, target.position.y, size);
    if rect.is_empty() {
        return;
    }
    let (col, row, w, h) = (rect.x, rect.y, rect.width, rect.height);

    let (fill, label_style) = match target.phase {
        TargetPhase::Pending => (
            Style::default().bg(CREAM),
            Style::default().bg(CREAM).fg(Color::Black).add_modifier(Modifier::BOLD),
        ),
        TargetPhase::Fading { opacity, .. } => {
            let mut style = Style::default().bg(AMBER).fg(Color::White);
            if opacity < 0.5 {
                style = style.add_modifier(Modifier::DIM);
            }
            (style, style)
        }
    };

    // labels stay inside the target so every painted cell belongs to it
    for y in row..rect.bottom() {
        put(buf, rect, col, y, &" ".repeat(w as usize), fill);
    }

    let label = target.order.to_string();
    let label_col = col + w.saturating_sub(label.width() as u16) / 2;
    put(buf, rect, label_col, row + h.saturating_sub(1) / 2, &label, label_style);

    // countdown needs a second row under the label
    if let (TargetPhase::Fading { remaining_secs, .. }, true) = (target.phase, h > 1) {
        let countdown = format!("{remaining_secs:.1}s");
        let countdown_col = col + w.saturating_sub(countdown.width() as u16) / 2;
        put(buf, rect, countdown_col, row + h - 1, &countdown, label_style);
    }
}

fn draw_sparks(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::LightYellow,
    ];

    for spark in &celebration.sparks {
        if spark.x < 0.0 || spark.y < 0.0 {
            continue;
        }
        let color = colors[spark.color_index % colors.len()];
        let style = if spark.brightness() > 0.6 {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if spark.brightness() > 0.25 {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };
        put(
            buf,
            area,
            area.x + spark.x as u16,
            area.y + spark.y as u16,
            &spark.symbol.to_string(),
            style,
        );
    }
}

/// Writes `text` one cell per char, dropping whatever falls outside `clip`
fn put(buf: &mut Buffer, clip: Rect, x: u16, y: u16, text: &str, style: Style) {
    if y < clip.y || y >= clip.bottom() {
        return;
    }
    for (i, ch) in text.chars().enumerate() {
        let cx = x.saturating_add(i as u16);
        if cx < clip.x || cx >= clip.right() {
            continue;
        }
        if let Some(cell) = buf.cell_mut((cx, y)) {
            cell.set_char(ch);
            cell.set_style(style);
        }
    }
}
