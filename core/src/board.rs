use core::time::Duration;
use std::collections::{BTreeSet, VecDeque};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - NotStarted -> Active (first reveal)
/// - Active -> Won
/// - Active -> Lost
///
/// Any state goes back to NotStarted through [`Board::reset`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    NotStarted,
    Active,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Where the mines of the next game come from.
#[derive(Clone, Debug, PartialEq)]
enum MineSource {
    /// Placed on first reveal, seeded from the thread RNG unless a seed is given.
    Random { seed: Option<u64> },
    /// Known up front, the first reveal only starts the game.
    Fixed(MineLayout),
}

/// Data a won game hands over to score submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub elapsed: Duration,
    pub started_at_ms: u64,
    pub event_timestamps_ms: Vec<u64>,
    pub mines: Vec<Coord2>,
}

impl GameSummary {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// A single game from the first click to a win or loss.
#[derive(Clone, Debug)]
pub struct Board {
    config: GameConfig,
    source: MineSource,
    cells: Array2<Cell>,
    mines: BTreeSet<Coord2>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: GameState,
    triggered_mine: Option<Coord2>,
    stopwatch: Stopwatch,
    started_at_ms: Option<u64>,
    event_timestamps_ms: Vec<u64>,
}

impl Board {
    pub fn new(config: GameConfig) -> Self {
        Self::with_source(config, MineSource::Random { seed: None })
    }

    /// Every game on this board places mines from the same seed.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_source(config, MineSource::Random { seed: Some(seed) })
    }

    /// Board with a known mine layout.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let layout = MineLayout::from_mine_coords(size, mine_coords)?;
        Ok(Self::with_source(layout.game_config(), MineSource::Fixed(layout)))
    }

    fn with_source(config: GameConfig, source: MineSource) -> Self {
        Self {
            config,
            source,
            cells: Array2::default(config.size().to_nd_index()),
            mines: BTreeSet::new(),
            revealed_count: 0,
            flagged_count: 0,
            state: GameState::default(),
            triggered_mine: None,
            stopwatch: Stopwatch::default(),
            started_at_ms: None,
            event_timestamps_ms: Vec::new(),
        }
    }

    /// Discards the current game and its timer.
    pub fn reset(&mut self) {
        log::debug!("Board reset");
        self.cells = Array2::default(self.config.size().to_nd_index());
        self.mines.clear();
        self.revealed_count = 0;
        self.flagged_count = 0;
        self.state = GameState::NotStarted;
        self.triggered_mine = None;
        self.stopwatch.reset();
        self.started_at_ms = None;
        self.event_timestamps_ms.clear();
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// # Panics
    ///
    /// When `coords` lies outside the board, see [`Board::get_cell`] for a checked lookup.
    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn get_cell(&self, coords: Coord2) -> Option<Cell> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// How many mines have not been flagged yet, negative when over-flagged.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count as isize)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Mine positions, empty until the first reveal.
    pub fn mine_coords(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mines.iter().copied()
    }

    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }

    pub fn timer_running(&self) -> bool {
        self.stopwatch.is_running()
    }

    pub fn cell_view(&self, coords: Coord2) -> CellView {
        let cell = self.cell_at(coords);
        if cell.is_flagged {
            if self.state == GameState::Lost && !cell.is_mine {
                CellView::Misflagged
            } else {
                CellView::Flagged
            }
        } else if cell.is_revealed {
            if !cell.is_mine {
                CellView::Revealed(cell.neighbor_mines)
            } else if self.triggered_mine == Some(coords) {
                CellView::TriggeredMine
            } else {
                CellView::Mine
            }
        } else {
            CellView::Hidden
        }
    }

    /// Projection of the whole grid for a renderer.
    pub fn view(&self) -> Array2<CellView> {
        let (rows, cols) = self.size();
        let mut view = Array2::default(self.size().to_nd_index());
        for row in 0..rows {
            for col in 0..cols {
                view[(row, col).to_nd_index()] = self.cell_view((row, col));
            }
        }
        view
    }

    /// Summary of a won game, `None` otherwise.
    pub fn summary(&self) -> Option<GameSummary> {
        if self.state != GameState::Won {
            return None;
        }
        Some(GameSummary {
            elapsed: self.elapsed(),
            started_at_ms: self.started_at_ms.unwrap_or_default(),
            event_timestamps_ms: self.event_timestamps_ms.clone(),
            mines: self.mines.iter().copied().collect(),
        })
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.validate_coords(coords).ok_or(GameError::InvalidCoords)?;
        self.check_active()?;

        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.is_revealed {
            return Ok(MarkOutcome::NoChange);
        }

        cell.is_flagged = !cell.is_flagged;
        if cell.is_flagged {
            self.flagged_count += 1;
        } else {
            self.flagged_count -= 1;
        }
        self.record_event();
        Ok(MarkOutcome::Changed)
    }

    /// Reveals a cell, flood-filling from cells without adjacent mines.
    ///
    /// The first reveal of a game places the mines so that the clicked cell and its
    /// neighbors are safe, then starts the timer.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_not_finished()?;

        let Some(coords) = self.validate_coords(coords) else {
            return Ok(RevealOutcome::NoChange);
        };
        if !self.cells[coords.to_nd_index()].is_hidden() {
            return Ok(RevealOutcome::NoChange);
        }

        if self.state.is_initial() {
            self.start(coords)?;
        }
        self.record_event();

        Ok(self.reveal_cell(coords))
    }

    fn start(&mut self, first: Coord2) -> Result<()> {
        let layout = match &self.source {
            MineSource::Fixed(layout) => layout.clone(),
            MineSource::Random { seed } => {
                let seed = seed.unwrap_or_else(rand::random);
                RandomMinePlacer::new(seed).place(self.config, first)?
            }
        };
        self.apply_layout(&layout);

        self.state = GameState::Active;
        self.stopwatch.start();
        let now = epoch_millis();
        self.started_at_ms = Some(now);
        log::debug!("Game started at {} from {:?}", now, first);
        Ok(())
    }

    fn apply_layout(&mut self, layout: &MineLayout) {
        self.mines = layout.mine_coords().into_iter().collect();
        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                let cell = &mut self.cells[coords.to_nd_index()];
                cell.is_mine = layout.contains_mine(coords);
                cell.neighbor_mines = if cell.is_mine {
                    0
                } else {
                    layout.adjacent_mine_count(coords)
                };
            }
        }
    }

    fn reveal_cell(&mut self, coords: Coord2) -> RevealOutcome {
        if self.cells[coords.to_nd_index()].is_mine {
            self.open(coords);
            self.triggered_mine = Some(coords);
            self.end_game(false);
            return RevealOutcome::HitMine;
        }

        let count = self.open(coords);
        log::debug!("Revealed cell at {:?}, mine count: {}", coords, count);

        if count == 0 {
            let mut visited = BTreeSet::from([coords]);
            let mut to_visit: VecDeque<_> = self
                .cells
                .iter_neighbors(coords)
                .filter(|&pos| self.cells[pos.to_nd_index()].is_hidden())
                .collect();
            log::trace!(
                "Starting flood-fill from {:?}, initial neighbors: {:?}",
                coords,
                to_visit
            );

            while let Some(visit_coords) = to_visit.pop_front() {
                if !visited.insert(visit_coords) {
                    continue;
                }

                // skip flagged or already revealed cells
                if !self.cells[visit_coords.to_nd_index()].is_hidden() {
                    continue;
                }

                let visit_count = self.open(visit_coords);
                log::trace!(
                    "Flood revealed cell at {:?}, mine count: {}",
                    visit_coords,
                    visit_count
                );

                if visit_count == 0 {
                    to_visit.extend(
                        self.cells
                            .iter_neighbors(visit_coords)
                            .filter(|&pos| self.cells[pos.to_nd_index()].is_hidden())
                            .filter(|pos| !visited.contains(pos)),
                    );
                }
            }
        }

        if self.revealed_count == self.config.safe_cells() {
            self.end_game(true);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Marks a hidden cell revealed and returns its adjacent mine count.
    fn open(&mut self, coords: Coord2) -> u8 {
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.is_revealed = true;
        self.revealed_count += 1;
        cell.neighbor_mines
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won { GameState::Won } else { GameState::Lost };
        self.stopwatch.stop();
        log::debug!(
            "Game {} after {:?}",
            if won { "won" } else { "lost" },
            self.stopwatch.elapsed()
        );

        if !won {
            // flagged mines stay flagged, the rest are shown
            let hidden_mines: Vec<_> = self
                .mines
                .iter()
                .copied()
                .filter(|&pos| self.cells[pos.to_nd_index()].is_hidden())
                .collect();
            for pos in hidden_mines {
                self.open(pos);
            }
        }
    }

    fn record_event(&mut self) {
        self.event_timestamps_ms.push(epoch_millis());
    }

    fn validate_coords(&self, coords: Coord2) -> Option<Coord2> {
        let (rows, cols) = self.size();
        (coords.0 < rows && coords.1 < cols).then_some(coords)
    }

    fn check_active(&self) -> Result<()> {
        match self.state {
            GameState::Active => Ok(()),
            GameState::NotStarted => Err(GameError::NotActive),
            GameState::Won | GameState::Lost => Err(GameError::AlreadyEnded),
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
