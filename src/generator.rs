use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use tracing::debug;

use crate::board::{Board, Deflector, Orientation};
use crate::error::{Error, Result};
use crate::game::{GameState, Puzzle, Robot};
use crate::geometry::{ALL_DIRECTIONS, Coordinate};
use crate::solver::Solver;

/// Robot names, in the order robots are created. The first robot is the one
/// that has to reach the target.
pub const ROBOT_COLORS: [&str; 5] = ["red", "blue", "green", "yellow", "silver"];

const MAX_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub width: i32,
    pub height: i32,
    pub robots: usize,
    pub interior_walls: usize,
    pub blockers: usize,
    pub deflectors: usize,
    /// Fewest slides the target may take to reach.
    pub min_moves: usize,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            width: 16,
            height: 16,
            robots: 4,
            interior_walls: 24,
            blockers: 4,
            deflectors: 4,
            min_moves: 3,
            seed: 0,
        }
    }
}

/// Builds random, solvable puzzles from a seed.
pub struct Generator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Generator { config, rng }
    }

    fn validate(&self) -> Result<()> {
        let cfg = &self.config;
        if cfg.width <= 0 || cfg.height <= 0 {
            return Err(Error::InvalidLayout(format!(
                "board dimensions must be positive, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        if cfg.robots == 0 || cfg.robots > ROBOT_COLORS.len() {
            return Err(Error::InvalidLayout(format!(
                "robot count must be between 1 and {}, got {}",
                ROBOT_COLORS.len(),
                cfg.robots
            )));
        }
        let cells = cfg.width.checked_mul(cfg.height).ok_or_else(|| {
            Error::InvalidLayout(format!(
                "board of {}x{} cells is too large",
                cfg.width, cfg.height
            ))
        })? as usize;
        if cfg.blockers + cfg.deflectors + cfg.robots > cells {
            return Err(Error::InvalidLayout(format!(
                "{} cells cannot hold {} blockers, {} deflectors and {} robots",
                cells, cfg.blockers, cfg.deflectors, cfg.robots
            )));
        }
        Ok(())
    }

    fn random_cell(&mut self) -> Coordinate {
        Coordinate::new(
            self.rng.gen_range(0..self.config.width),
            self.rng.gen_range(0..self.config.height),
        )
    }

    fn random_board(&mut self) -> Result<Board> {
        let mut board = Board::with_perimeter(self.config.width, self.config.height)?;

        for _ in 0..self.config.interior_walls {
            let pos = self.random_cell();
            let dir = ALL_DIRECTIONS[self.rng.gen_range(0..ALL_DIRECTIONS.len())];
            board.add_wall(pos, dir)?;
        }

        let mut cells: Vec<Coordinate> = (0..self.config.height)
            .flat_map(|y| (0..self.config.width).map(move |x| Coordinate::new(x, y)))
            .collect();
        cells.shuffle(&mut self.rng);
        let mut cells = cells.into_iter();

        for pos in cells.by_ref().take(self.config.blockers) {
            board.add_blocker(pos)?;
        }
        for pos in cells.by_ref().take(self.config.deflectors) {
            let color = ROBOT_COLORS[self.rng.gen_range(0..self.config.robots)];
            let orientation = if self.rng.gen_bool(0.5) {
                Orientation::Slash
            } else {
                Orientation::Backslash
            };
            board.add_deflector(pos, Deflector::new(color, orientation))?;
        }
        Ok(board)
    }

    fn random_robots(&mut self, board: &Board) -> Vec<Robot> {
        let mut free: Vec<Coordinate> = (0..board.height())
            .flat_map(|y| (0..board.width()).map(move |x| Coordinate::new(x, y)))
            .filter(|&pos| board.is_free(pos) && board.deflector_at(pos).is_none())
            .collect();
        free.shuffle(&mut self.rng);
        ROBOT_COLORS[..self.config.robots]
            .iter()
            .zip(free)
            .map(|(&name, pos)| Robot::new(name, pos))
            .collect()
    }

    /// Generate a puzzle whose target the first robot can reach in at least
    /// `min_moves` slides.
    pub fn generate(&mut self) -> Result<Puzzle> {
        self.validate()?;
        let solver = Solver::default();

        for attempt in 0..MAX_ATTEMPTS {
            let board = self.random_board()?;
            let robots = self.random_robots(&board);
            let state = GameState::new(Arc::new(board), robots, ROBOT_COLORS[0])?;

            let robot = state.designated();
            let occupied: Vec<Coordinate> = state.robots()[1..].iter().map(|r| r.position).collect();
            let candidates: Vec<Coordinate> = solver
                .reachable(state.board(), robot.position, &occupied, &robot.color)
                .into_iter()
                .filter(|&(_, depth)| depth >= self.config.min_moves.max(1))
                .map(|(pos, _)| pos)
                .collect();

            if let Some(&target) = candidates.choose(&mut self.rng) {
                debug!(attempt, %target, candidates = candidates.len(), "puzzle generated");
                return Puzzle::new(state, vec![target]);
            }
            debug!(attempt, "no target far enough, retrying");
        }

        Err(Error::InvalidLayout(format!(
            "no puzzle needing {} moves found after {} attempts",
            self.config.min_moves, MAX_ATTEMPTS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            width: 8,
            height: 8,
            robots: 3,
            interior_walls: 8,
            blockers: 2,
            deflectors: 2,
            min_moves: 1,
            seed,
        }
    }

    #[test]
    fn test_same_seed_same_puzzle() {
        let first = Generator::new(small_config(7)).generate().unwrap();
        let second = Generator::new(small_config(7)).generate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generated_puzzle_is_solvable() {
        for seed in 0..8 {
            let config = GeneratorConfig {
                min_moves: 2,
                ..small_config(seed)
            };
            let puzzle = Generator::new(config).generate().unwrap();
            assert_eq!(puzzle.state.robots().len(), 3);
            assert_eq!(puzzle.state.designated().name, "red");
            assert!(!puzzle.is_solved());

            let result = Solver::default().solve(&puzzle.state, &puzzle.goals);
            assert!(result.success, "seed {} unsolvable", seed);
            assert!(result.moves() >= 2, "seed {} too easy", seed);

            let solved = result.apply(&puzzle.state, "red").unwrap();
            assert!(solved.is_goal_reached(&puzzle.goals));
        }
    }

    #[test]
    fn test_robots_on_free_distinct_cells() {
        let puzzle = Generator::new(small_config(3)).generate().unwrap();
        let board = puzzle.board();
        let robots = puzzle.state.robots();
        for (idx, robot) in robots.iter().enumerate() {
            assert!(board.is_free(robot.position));
            assert!(board.deflector_at(robot.position).is_none());
            assert!(robots[..idx].iter().all(|r| r.position != robot.position));
        }
        assert_eq!(board.blockers().count(), 2);
        assert_eq!(board.deflectors().count(), 2);
    }

    #[test]
    fn test_invalid_config() {
        let zero_robots = GeneratorConfig {
            robots: 0,
            ..small_config(0)
        };
        assert!(matches!(
            Generator::new(zero_robots).generate(),
            Err(Error::InvalidLayout(_))
        ));

        let crowded = GeneratorConfig {
            width: 2,
            height: 2,
            blockers: 3,
            ..small_config(0)
        };
        assert!(matches!(
            Generator::new(crowded).generate(),
            Err(Error::InvalidLayout(_))
        ));

        let huge = GeneratorConfig {
            width: 65536,
            height: 65536,
            ..small_config(0)
        };
        assert!(matches!(
            Generator::new(huge).generate(),
            Err(Error::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_unreachable_requirement() {
        // A 1x1 board has nowhere to slide to
        let config = GeneratorConfig {
            width: 1,
            height: 1,
            robots: 1,
            interior_walls: 0,
            blockers: 0,
            deflectors: 0,
            min_moves: 1,
            seed: 0,
        };
        assert!(matches!(
            Generator::new(config).generate(),
            Err(Error::InvalidLayout(_))
        ));
    }
}
