//! Layout and drawing: board, sidebar, game over popup, elimination fade.

use crate::app::Screen;
use crate::game::{Cell, GameState};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Duration of the elimination fade (TachyonFX) in ms.
const ELIMINATION_FADE_MS: u32 = 350;

/// Board size in terminal cells (border included) for the given grid.
fn board_pixel_size(state: &GameState) -> (u16, u16) {
    let bw = state.grid.cols as u16 * state.grid.cell_width as u16;
    let bh = state.grid.rows as u16 * state.grid.cell_height as u16;
    (bw + 2, bh + 2)
}

/// Max grid size (rows, cols) that fits the terminal with the given cell
/// size, leaving room for border and sidebar. Used to clamp --rows/--cols.
pub fn grid_size_for_terminal_clamped(
    term_cols: u16,
    term_rows: u16,
    cell_width: u16,
    cell_height: u16,
) -> (u16, u16) {
    let avail_w = term_cols.saturating_sub(2).saturating_sub(SIDEBAR_WIDTH);
    let avail_h = term_rows.saturating_sub(2);
    let max_cols = (avail_w / cell_width.max(1)).max(1);
    let max_rows = (avail_h / cell_height.max(1)).max(1);
    (max_rows, max_cols)
}

/// Board outer rect (border included), centered with the sidebar to its
/// right. Single source of truth: drawing and hit testing both use this.
fn board_outer_rect(area: Rect, state: &GameState) -> Rect {
    let (pw, ph) = board_pixel_size(state);
    let total_w = pw + SIDEBAR_WIDTH;
    Rect {
        x: area.x + area.width.saturating_sub(total_w) / 2,
        y: area.y + area.height.saturating_sub(ph) / 2,
        width: pw.min(area.width),
        height: ph.min(area.height),
    }
}

/// Board inner rect (cells only, no border).
pub(crate) fn board_inner_rect(area: Rect, state: &GameState) -> Rect {
    let outer = board_outer_rect(area, state);
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Map a buffer position (e.g. a mouse click) to grid (row, col) through the
/// same layout math that draws the board. None when outside the board.
pub fn hit_test(area: Rect, state: &GameState, x: u16, y: u16) -> Option<(usize, usize)> {
    let inner = board_inner_rect(area, state);
    if x < inner.x || y < inner.y {
        return None;
    }
    let col = usize::from((x - inner.x) / state.grid.cell_width as u16);
    let row = usize::from((y - inner.y) / state.grid.cell_height as u16);
    let inside = x < inner.x + inner.width && y < inner.y + inner.height;
    (inside && row < state.grid.rows && col < state.grid.cols).then_some((row, col))
}

/// Buffer rect for one cell, from its carried position/dimensions.
fn cell_rect(inner: Rect, cell: &Cell) -> Rect {
    let x0 = (cell.position[0] - cell.dimensions[0] / 2.0).round() as u16;
    let y0 = (cell.position[1] - cell.dimensions[1] / 2.0).round() as u16;
    Rect {
        x: inner.x + x0,
        y: inner.y + y0,
        width: (cell.dimensions[0] as u16).min(inner.width.saturating_sub(x0)),
        height: (cell.dimensions[1] as u16).min(inner.height.saturating_sub(y0)),
    }
}

fn fill_rect(frame: &mut Frame, rect: Rect, color: Color) {
    let buf = frame.buffer_mut();
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(color));
        }
    }
}

/// Draw current screen. Ghost cells are just-eliminated cells that linger
/// while the fade effect runs; `elim_effect` / `elim_process_time` are
/// created and advanced here, the caller retires them once done.
#[allow(clippy::too_many_arguments)]
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    theme: &Theme,
    cursor: (usize, usize),
    ghosts: &[Cell],
    elim_effect: &mut Option<Effect>,
    elim_process_time: &mut Option<Instant>,
    now: Instant,
    no_animation: bool,
    best: u32,
    new_best: bool,
) {
    let area = frame.area();
    draw_game(frame, state, theme, cursor, ghosts, area, best);
    if !ghosts.is_empty() && !no_animation {
        apply_elimination_effect(
            frame,
            state,
            theme,
            ghosts,
            area,
            elim_effect,
            elim_process_time,
            now,
        );
    }
    if screen == Screen::GameOver {
        draw_game_over(frame, state, theme, area, best, new_best);
    }
}

/// Draw game: board + sidebar; use full area and center both.
fn draw_game(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    cursor: (usize, usize),
    ghosts: &[Cell],
    area: Rect,
    best: u32,
) {
    let board_area = board_outer_rect(area, state);
    let sidebar_area = Rect {
        x: board_area.x + board_area.width,
        y: board_area.y,
        width: SIDEBAR_WIDTH.min(area.width.saturating_sub(board_area.width)),
        height: board_area.height,
    };

    draw_board(frame, state, theme, cursor, ghosts, board_area);
    draw_sidebar(frame, state, theme, sidebar_area, best);
}

fn draw_board(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    cursor: (usize, usize),
    ghosts: &[Cell],
    area: Rect,
) {
    // Status readout where the original put its window title.
    let mut title = format!(" Cromatui  Score: {}  Attempts: {} ", state.score, state.attempts);
    if state.game_over {
        title.push_str(" GAME OVER — R restarts ");
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    fill_rect(frame, inner, theme.bg);
    for cell in state.grid.live_cells() {
        fill_rect(frame, cell_rect(inner, cell), cell.color.to_color());
    }
    // Ghosts repaint at full color every frame; the fade effect pulls the
    // buffer toward the background until the app retires them.
    for cell in ghosts {
        fill_rect(frame, cell_rect(inner, cell), cell.color.to_color());
    }

    if let Some(cell) = state.grid.cell(cursor.0, cursor.1) {
        let rect = cell_rect(inner, cell);
        let outline = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.cursor));
        outline.render(rect, frame.buffer_mut());
    }
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect, best: u32) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let help_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Stats (border + score, best, attempts, tolerance, cells)
            Constraint::Length(1), // gap
            Constraint::Length(4), // Board gauge
            Constraint::Length(1), // gap
            Constraint::Length(7), // Keys
            Constraint::Fill(1),
        ])
        .split(area);

    // --- Stats (own border) ---
    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let total = state.grid.rows * state.grid.cols;
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score:     ", title_style),
            Span::styled(state.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best:      ", title_style),
            Span::styled(best.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Attempts:  ", title_style),
            Span::styled(state.attempts.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Tolerance: ", title_style),
            Span::styled(format!("{:.2}", state.tolerance), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Cells:     ", title_style),
            Span::styled(format!("{}/{}", state.grid.live_count(), total), fg_style),
        ]),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Board gauge: fraction of the board still live ---
    let gauge_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let gauge_inner = gauge_block.inner(chunks[2]);
    gauge_block.render(chunks[2], frame.buffer_mut());
    let gauge_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(gauge_inner);
    Paragraph::new(Line::from(Span::styled("Board", title_style)))
        .render(gauge_layout[0], frame.buffer_mut());
    let ratio = if total > 0 {
        state.grid.live_count() as f64 / total as f64
    } else {
        0.0
    };
    let bar_color = if ratio > 0.6 {
        Color::Green
    } else if ratio > 0.3 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .ratio(ratio)
        .gauge_style(Style::default().fg(bar_color))
        .render(gauge_layout[1], frame.buffer_mut());

    // --- Keys ---
    let keys_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let keys_inner = keys_block.inner(chunks[4]);
    keys_block.render(chunks[4], frame.buffer_mut());
    let keys_lines = vec![
        Line::from(Span::styled("Click  select cell", help_style)),
        Line::from(Span::styled("↑↓←→   move cursor", help_style)),
        Line::from(Span::styled("Enter  select", help_style)),
        Line::from(Span::styled("R      restart", help_style)),
        Line::from(Span::styled("Q      quit", help_style)),
    ];
    Paragraph::new(ratatui::text::Text::from(keys_lines)).render(keys_inner, frame.buffer_mut());
}

fn draw_game_over(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    best: u32,
    new_best: bool,
) {
    let popup_w = 30u16;
    let popup_h = 10u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Board cleared! ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", state.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Best: {} ", best),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Attempts: {} ", state.attempts),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if new_best {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R — Restart    Q — Quit ",
        Style::default().fg(theme.main_fg),
    )));
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" Cromatui ", Style::default().fg(theme.title))),
    );
    // Clear background behind the popup
    fill_rect(frame, popup, theme.bg);
    p.render(popup, frame.buffer_mut());
}

/// Build set of buffer (x, y) positions covered by the ghost cells.
fn ghost_buffer_positions(inner: Rect, ghosts: &[Cell]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for cell in ghosts {
        let rect = cell_rect(inner, cell);
        for x in rect.x..rect.x + rect.width {
            for y in rect.y..rect.y + rect.height {
                set.insert((x, y));
            }
        }
    }
    set
}

/// Create or update the elimination fade and process it (TachyonFX: fade the
/// just-removed cells to the board background).
#[allow(clippy::too_many_arguments)]
fn apply_elimination_effect(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    ghosts: &[Cell],
    area: Rect,
    elim_effect: &mut Option<Effect>,
    elim_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let inner = board_inner_rect(area, state);
    let delta = elim_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    *elim_process_time = Some(now);

    if elim_effect.is_none() {
        let ghost_set = ghost_buffer_positions(inner, ghosts);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            ghost_set.contains(&(pos.x, pos.y))
        }));
        let bg = theme.bg;
        let effect = fx::fade_to(bg, bg, (ELIMINATION_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(inner);
        *elim_effect = Some(effect);
    }

    if let Some(effect) = elim_effect {
        frame.render_effect(effect, inner, tfx_delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;

    fn state() -> GameState {
        GameState::new(&GameConfig {
            rows: 6,
            cols: 8,
            cell_width: 6,
            cell_height: 3,
            tolerance: 0.2,
            seed: Some(1),
        })
    }

    #[test]
    fn hit_test_roundtrips_every_cell_center() {
        let state = state();
        let area = Rect::new(0, 0, 100, 30);
        let inner = board_inner_rect(area, &state);
        for row in 0..state.grid.rows {
            for col in 0..state.grid.cols {
                let cell = state.grid.cell(row, col).unwrap();
                let x = inner.x + cell.position[0] as u16;
                let y = inner.y + cell.position[1] as u16;
                assert_eq!(hit_test(area, &state, x, y), Some((row, col)));
            }
        }
    }

    #[test]
    fn hit_test_rejects_border_and_outside() {
        let state = state();
        let area = Rect::new(0, 0, 100, 30);
        let inner = board_inner_rect(area, &state);
        // border corner, one step outside the inner rect
        assert_eq!(hit_test(area, &state, inner.x - 1, inner.y - 1), None);
        assert_eq!(
            hit_test(area, &state, inner.x + inner.width, inner.y),
            None
        );
        assert_eq!(hit_test(area, &state, 0, 0), None);
    }

    #[test]
    fn clamped_grid_fits_the_terminal() {
        let (rows, cols) = grid_size_for_terminal_clamped(80, 24, 6, 3);
        assert!(cols * 6 + 2 + SIDEBAR_WIDTH <= 80);
        assert!(rows * 3 + 2 <= 24);
        // degenerate terminals still give a playable 1x1
        assert_eq!(grid_size_for_terminal_clamped(0, 0, 6, 3), (1, 1));
    }
}
