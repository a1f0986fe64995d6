use crate::*;

pub trait MinePlacer {
    /// Places `config.mines` mines anywhere except the 3x3 block centered on `exclude`.
    fn place(self, config: GameConfig, exclude: Coord2) -> Result<MineLayout>;
}

/// Uniform placement by rejection sampling: random cells inside the safe zone or already
/// holding a mine are drawn again.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinePlacer {
    seed: u64,
}

impl RandomMinePlacer {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinePlacer for RandomMinePlacer {
    fn place(self, config: GameConfig, exclude: Coord2) -> Result<MineLayout> {
        use rand::prelude::*;

        let (rows, cols) = config.size();
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidSize);
        }

        // the safe zone may hang off the grid, only cells that exist count against capacity
        let eligible = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .filter(|&coords| !in_neighborhood(coords, exclude))
            .count();
        if usize::from(config.mines) > eligible {
            log::warn!(
                "Cannot fit {} mines outside the safe zone, only {} cells available",
                config.mines,
                eligible
            );
            return Err(GameError::TooManyMines);
        }

        let mut mine_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed: CellCount = 0;
        let mut rejected: u32 = 0;

        while placed < config.mines {
            let coords: Coord2 = (rng.random_range(0..rows), rng.random_range(0..cols));
            if in_neighborhood(coords, exclude) || mine_mask[coords.to_nd_index()] {
                rejected += 1;
                continue;
            }
            mine_mask[coords.to_nd_index()] = true;
            placed += 1;
        }

        log::debug!(
            "Placed {} mines around safe zone {:?} ({} draws rejected)",
            placed,
            exclude,
            rejected
        );
        Ok(MineLayout::from_mine_mask(mine_mask))
    }
}
