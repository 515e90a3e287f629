//! Game state: cell grid, similarity elimination, scoring.

use crate::GameConfig;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use ratatui::style::Color;

/// An RGB color with each channel in [0, 1].
///
/// Channels are drawn with 1/255 granularity (an integer in 0..=255 divided
/// by 255), so every cell color maps exactly onto a terminal RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl CellColor {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            r: f32::from(rng.gen_range(0..=255u8)) / 255.0,
            g: f32::from(rng.gen_range(0..=255u8)) / 255.0,
            b: f32::from(rng.gen_range(0..=255u8)) / 255.0,
        }
    }

    /// Euclidean distance in the unit color cube. Max is √3 (black to white).
    pub fn distance_to(&self, other: &Self) -> f32 {
        ((self.r - other.r).powi(2) + (self.g - other.g).powi(2) + (self.b - other.b).powi(2))
            .sqrt()
    }

    /// Distance divided by √3, so the result (and any tolerance compared
    /// against it) lives on a [0, 1] scale regardless of channel range.
    pub fn normalized_distance_to(&self, other: &Self) -> f32 {
        self.distance_to(other) / 3.0_f32.sqrt()
    }

    #[inline]
    pub fn to_color(&self) -> Color {
        Color::Rgb(
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        )
    }
}

/// One grid element: render-space center, fixed dimensions, color, and a
/// monotonic eliminated flag (false→true, cleared only by a full reset).
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub position: [f32; 3],
    pub dimensions: [f32; 3],
    pub color: CellColor,
    pub eliminated: bool,
}

/// Fixed-size grid of cells, stored row-major.
///
/// Two indexing conventions coexist: (row, col) pairs for the public API and
/// a flat `row * cols + col` index for the transient selection. `index_of`
/// is the single conversion point between them.
#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    /// Cell size in render-space units (terminal cells for this adapter).
    pub cell_width: f32,
    pub cell_height: f32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(
        rows: usize,
        cols: usize,
        cell_width: f32,
        cell_height: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let mut grid = Self {
            rows,
            cols,
            cell_width,
            cell_height,
            cells: Vec::new(),
        };
        grid.reset(rng);
        grid
    }

    /// Reassign every cell: position derived from (row, col) and the cell
    /// size, constant dimensions, three fresh uniform color channels, and
    /// `eliminated = false`.
    pub fn reset(&mut self, rng: &mut impl Rng) {
        let (w, h) = (self.cell_width, self.cell_height);
        self.cells.clear();
        for row in 0..self.rows {
            for col in 0..self.cols {
                self.cells.push(Cell {
                    position: [col as f32 * w + w / 2.0, row as f32 * h + h / 2.0, 0.0],
                    dimensions: [w, h, 1.0],
                    color: CellColor::random(rng),
                    eliminated: false,
                });
            }
        }
    }

    /// Flat index for (row, col), or None when out of bounds.
    #[inline]
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index_of(row, col).map(|i| &self.cells[i])
    }

    /// True when the cell exists and has not been eliminated.
    pub fn is_live(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(|c| !c.eliminated)
    }

    /// Game-over predicate: at least one cell still live.
    pub fn any_live(&self) -> bool {
        self.cells.iter().any(|c| !c.eliminated)
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.eliminated).count()
    }

    /// Live cells with their draw data, in row-major order.
    pub fn live_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| !c.eliminated)
    }
}

/// Result of one accepted selection: how many cells went, and their last
/// draw data so the adapter can fade them out.
#[derive(Debug, Clone)]
pub struct Selection {
    pub removed: u32,
    pub cells: Vec<Cell>,
}

/// The whole session: grid plus score/attempt/game-over bookkeeping and the
/// transient selection. Created and reset as one unit; no ambient globals.
#[derive(Debug)]
pub struct GameState {
    pub grid: Grid,
    pub attempts: u32,
    pub score: u32,
    pub game_over: bool,
    pub tolerance: f32,
    selected: Option<usize>,
    rng: SmallRng,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let grid = Grid::new(
            config.rows as usize,
            config.cols as usize,
            f32::from(config.cell_width),
            f32::from(config.cell_height),
            &mut rng,
        );
        Self {
            grid,
            attempts: 0,
            score: 0,
            game_over: false,
            tolerance: config.tolerance,
            selected: None,
            rng,
        }
    }

    /// Full restart: fresh colors, zeroed score and attempts, Playing state.
    pub fn reset(&mut self) {
        self.grid.reset(&mut self.rng);
        self.attempts = 0;
        self.score = 0;
        self.game_over = false;
        self.selected = None;
    }

    /// Accept a click on (row, col). Rejected as a silent no-op when the
    /// game is over, the coordinates are out of bounds, or the cell is
    /// already gone. An accepted selection resolves immediately.
    pub fn select_cell(&mut self, row: usize, col: usize) -> Option<Selection> {
        if self.game_over {
            return None;
        }
        let idx = self.grid.index_of(row, col)?;
        if self.grid.cells[idx].eliminated {
            return None;
        }
        self.selected = Some(idx);
        Some(self.resolve_selection())
    }

    /// Run the elimination sweep for the pending selection, then apply
    /// scoring: attempts increments, penalty equals the new attempt number,
    /// score gains `removed - penalty` clamped at zero (the clamp is
    /// destructive; negative intermediates are not tracked).
    fn resolve_selection(&mut self) -> Selection {
        let cells = self.eliminate_similar(self.tolerance);
        let removed = cells.len() as u32;
        if removed > 0 {
            self.attempts += 1;
            let penalty = i64::from(self.attempts);
            self.score = (i64::from(self.score) + i64::from(removed) - penalty).max(0) as u32;
        }
        if !self.grid.any_live() {
            self.game_over = true;
        }
        Selection { removed, cells }
    }

    /// Global similarity sweep, not flood fill: every still-live cell on the
    /// board is compared against the selected cell's color, so sweep order
    /// cannot chain matches. Consumes the selection. The target itself is
    /// always in the removed set when a selection exists.
    fn eliminate_similar(&mut self, tolerance: f32) -> Vec<Cell> {
        let Some(idx) = self.selected.take() else {
            return Vec::new();
        };
        self.grid.cells[idx].eliminated = true;
        let target = self.grid.cells[idx].color;
        let mut removed = vec![self.grid.cells[idx].clone()];
        for cell in self.grid.cells.iter_mut().filter(|c| !c.eliminated) {
            if cell.color.normalized_distance_to(&target) <= tolerance {
                cell.eliminated = true;
                removed.push(cell.clone());
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rows: u16, cols: u16, tolerance: f32) -> GameConfig {
        GameConfig {
            rows,
            cols,
            cell_width: 6,
            cell_height: 3,
            tolerance,
            seed: Some(42),
        }
    }

    fn state_with_colors(
        rows: u16,
        cols: u16,
        tolerance: f32,
        colors: &[(f32, f32, f32)],
    ) -> GameState {
        let mut state = GameState::new(&config(rows, cols, tolerance));
        assert_eq!(state.grid.cells.len(), colors.len());
        for (cell, &(r, g, b)) in state.grid.cells.iter_mut().zip(colors) {
            cell.color = CellColor { r, g, b };
        }
        state
    }

    #[test]
    fn reset_fills_grid_with_live_cells() {
        let mut state = GameState::new(&config(6, 8, 0.2));
        assert_eq!(state.grid.rows * state.grid.cols, 48);
        assert_eq!(state.grid.live_count(), 48);
        assert!(state.grid.any_live());

        state.select_cell(0, 0);
        state.reset();
        assert_eq!(state.grid.live_count(), 48);
        assert_eq!(state.attempts, 0);
        assert_eq!(state.score, 0);
        assert!(!state.game_over);
    }

    #[test]
    fn reset_is_deterministic_under_a_seed() {
        let a = GameState::new(&config(4, 4, 0.2));
        let b = GameState::new(&config(4, 4, 0.2));
        let colors_a: Vec<_> = a.grid.cells.iter().map(|c| c.color).collect();
        let colors_b: Vec<_> = b.grid.cells.iter().map(|c| c.color).collect();
        assert_eq!(colors_a, colors_b);
    }

    #[test]
    fn positions_follow_row_major_layout() {
        let state = GameState::new(&config(2, 3, 0.2));
        let cell = state.grid.cell(1, 2).unwrap();
        assert_eq!(cell.position[0], 2.0 * 6.0 + 3.0);
        assert_eq!(cell.position[1], 1.0 * 3.0 + 1.5);
        assert_eq!(cell.dimensions, [6.0, 3.0, 1.0]);
        assert_eq!(state.grid.index_of(1, 2), Some(5));
        assert_eq!(state.grid.index_of(2, 0), None);
        assert_eq!(state.grid.index_of(0, 3), None);
    }

    #[test]
    fn selection_always_removes_the_target() {
        // negative tolerance: nothing matches, not even at distance 0
        let mut state = state_with_colors(
            1,
            3,
            -1.0,
            &[(0.3, 0.3, 0.3), (0.3, 0.3, 0.3), (0.3, 0.3, 0.3)],
        );
        let sel = state.select_cell(0, 1).unwrap();
        assert_eq!(sel.removed, 1);
        assert!(!state.grid.is_live(0, 1));
        assert_eq!(state.grid.live_count(), 2);
    }

    #[test]
    fn tolerance_of_one_clears_the_board() {
        let mut state = state_with_colors(
            1,
            3,
            1.0,
            &[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (0.5, 0.2, 0.9)],
        );
        let sel = state.select_cell(0, 0).unwrap();
        assert_eq!(sel.removed, 3);
        assert!(state.game_over);
    }

    #[test]
    fn invalid_selections_are_silent_noops() {
        let mut state = GameState::new(&config(2, 2, 0.2));
        assert!(state.select_cell(5, 0).is_none());
        assert!(state.select_cell(0, 7).is_none());
        assert_eq!(state.attempts, 0);
        assert_eq!(state.grid.live_count(), 4);

        // an eliminated cell can't be re-selected
        let first = state.select_cell(0, 0).unwrap();
        assert!(first.removed >= 1);
        assert!(state.select_cell(0, 0).is_none());
        assert_eq!(state.attempts, 1);
    }

    #[test]
    fn no_selection_after_game_over() {
        let mut state = state_with_colors(1, 2, 1.0, &[(0.0, 0.0, 0.0), (0.1, 0.1, 0.1)]);
        state.select_cell(0, 0).unwrap();
        assert!(state.game_over);
        assert!(state.select_cell(0, 1).is_none());
        assert_eq!(state.attempts, 1);
    }

    #[test]
    fn eliminated_flags_are_monotonic_between_resets() {
        let mut state = GameState::new(&config(3, 3, 0.0));
        state.select_cell(1, 1).unwrap();
        assert!(!state.grid.is_live(1, 1));
        state.select_cell(0, 0).unwrap();
        assert!(!state.grid.is_live(1, 1));
        assert!(!state.grid.is_live(0, 0));
        state.reset();
        assert!(state.grid.is_live(1, 1));
    }

    #[test]
    fn score_never_goes_negative() {
        // 0.0 tolerance with all-distinct colors: each attempt removes one
        // cell while the penalty keeps growing past it.
        let mut state = state_with_colors(
            1,
            4,
            0.0,
            &[
                (0.1, 0.0, 0.0),
                (0.2, 0.0, 0.0),
                (0.4, 0.0, 0.0),
                (0.8, 0.0, 0.0),
            ],
        );
        for col in 0..4 {
            state.select_cell(0, col);
            assert_eq!(state.score, 0);
        }
        assert_eq!(state.attempts, 4);
        assert!(state.game_over);
    }

    #[test]
    fn near_black_pair_clears_in_one_attempt() {
        let mut state = state_with_colors(1, 2, 0.2, &[(0.0, 0.0, 0.0), (0.0, 0.0, 0.05)]);
        // normalized distance = 0.05 / √3 ≈ 0.0289 ≤ 0.2
        let sel = state.select_cell(0, 0).unwrap();
        assert_eq!(sel.removed, 2);
        assert_eq!(state.attempts, 1);
        assert_eq!(state.score, 1);
        assert!(state.game_over);
    }

    #[test]
    fn distant_cells_survive_the_sweep() {
        let mut state = state_with_colors(
            1,
            3,
            0.1,
            &[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (1.0, 1.0, 1.0)],
        );
        let sel = state.select_cell(0, 0).unwrap();
        assert_eq!(sel.removed, 1);
        assert_eq!(state.attempts, 1);
        assert_eq!(state.score, 0); // 1 removed - 1 penalty
        assert!(!state.game_over);
        assert_eq!(state.grid.live_count(), 2);

        // second attempt: the matching white pair goes together
        let sel = state.select_cell(0, 1).unwrap();
        assert_eq!(sel.removed, 2);
        assert_eq!(state.attempts, 2);
        assert_eq!(state.score, 0); // 0 + (2 - 2)
        assert!(state.game_over);
    }

    #[test]
    fn removed_cells_carry_their_draw_data() {
        let mut state = state_with_colors(1, 2, 0.2, &[(0.0, 0.0, 0.0), (0.0, 0.0, 0.05)]);
        let sel = state.select_cell(0, 0).unwrap();
        assert_eq!(sel.cells.len(), 2);
        assert!(sel.cells.iter().all(|c| c.eliminated));
        assert_eq!(sel.cells[0].position, [3.0, 1.5, 0.0]);
    }

    #[test]
    fn normalized_distance_spans_the_unit_range() {
        let black = CellColor {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        };
        let white = CellColor {
            r: 1.0,
            g: 1.0,
            b: 1.0,
        };
        assert!((black.normalized_distance_to(&white) - 1.0).abs() < 1e-6);
        assert_eq!(black.normalized_distance_to(&black), 0.0);
    }
}
