//! App: terminal init, main loop, mouse and key handling.

use crate::game::{Cell, GameState};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::{Args, GameConfig, highscores, ui};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Target render interval (~60 FPS while the fade runs; otherwise we just
/// block on input up to this long).
const FRAME_INTERVAL_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    state: GameState,
    screen: Screen,
    /// Keyboard cursor in grid (row, col).
    cursor: (usize, usize),
    /// Just-eliminated cells kept around for the fade effect.
    ghosts: Vec<Cell>,
    /// TachyonFX fade for the ghosts (created when a selection removes cells).
    elim_effect: Option<Effect>,
    /// Last time the fade was processed (for delta).
    elim_effect_process_time: Option<Instant>,
    high_score: u32,
    new_best: bool,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let state = GameState::new(&config);
        let high_score = highscores::load_high_score();
        Ok(Self {
            args,
            config,
            theme,
            state,
            screen: Screen::Playing,
            cursor: (0, 0),
            ghosts: Vec::new(),
            elim_effect: None,
            elim_effect_process_time: None,
            high_score,
            new_best: false,
        })
    }

    fn reset_game(&mut self) {
        self.state.reset();
        self.screen = Screen::Playing;
        self.ghosts.clear();
        self.elim_effect = None;
        self.elim_effect_process_time = None;
        self.new_best = false;
    }

    /// Route an accepted or rejected selection; invalid ones are silent no-ops.
    fn try_select(&mut self, row: usize, col: usize) {
        let Some(selection) = self.state.select_cell(row, col) else {
            return;
        };
        if selection.removed > 0 {
            self.ghosts = selection.cells;
            self.elim_effect = None;
            self.elim_effect_process_time = None;
        }
        if self.state.score > self.high_score {
            self.high_score = self.state.score;
            self.new_best = true;
        }
        if self.state.game_over {
            self.screen = Screen::GameOver;
            let _ = highscores::save_high_score(self.high_score);
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
                size,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        // Clamp the grid so board + border + sidebar fit the terminal;
        // respect --rows/--cols when they fit.
        let (term_cols, term_rows) = size()?;
        let (max_rows, max_cols) = ui::grid_size_for_terminal_clamped(
            term_cols,
            term_rows,
            self.config.cell_width,
            self.config.cell_height,
        );
        if self.config.rows > max_rows || self.config.cols > max_cols {
            self.config.rows = self.config.rows.min(max_rows);
            self.config.cols = self.config.cols.min(max_cols);
            self.state = GameState::new(&self.config);
        }

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                ui::draw(
                    f,
                    self.screen,
                    &self.state,
                    &self.theme,
                    self.cursor,
                    &self.ghosts,
                    &mut self.elim_effect,
                    &mut self.elim_effect_process_time,
                    now,
                    self.args.no_animation,
                    self.high_score,
                    self.new_best,
                )
            })?;

            // Retire the fade once it has run its course.
            if !self.ghosts.is_empty()
                && (self.args.no_animation || self.elim_effect.as_ref().is_some_and(|e| e.done()))
            {
                self.ghosts.clear();
                self.elim_effect = None;
                self.elim_effect_process_time = None;
            }

            let timeout = Duration::from_millis(FRAME_INTERVAL_MS);
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) => {
                            if key.kind != KeyEventKind::Press {
                                continue;
                            }
                            match key_to_action(key) {
                                Action::Quit => return Ok(()),
                                Action::Reset => self.reset_game(),
                                Action::MoveUp => {
                                    self.cursor.0 = self.cursor.0.saturating_sub(1);
                                }
                                Action::MoveDown => {
                                    self.cursor.0 =
                                        (self.cursor.0 + 1).min(self.state.grid.rows - 1);
                                }
                                Action::MoveLeft => {
                                    self.cursor.1 = self.cursor.1.saturating_sub(1);
                                }
                                Action::MoveRight => {
                                    self.cursor.1 =
                                        (self.cursor.1 + 1).min(self.state.grid.cols - 1);
                                }
                                Action::Select => self.try_select(self.cursor.0, self.cursor.1),
                                Action::None => {}
                            }
                        }
                        Event::Mouse(mouse) => {
                            if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                                let size = terminal.size()?;
                                let area = Rect::new(0, 0, size.width, size.height);
                                if let Some((row, col)) =
                                    ui::hit_test(area, &self.state, mouse.column, mouse.row)
                                {
                                    self.cursor = (row, col);
                                    self.try_select(row, col);
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
