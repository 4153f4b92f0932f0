use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::board::Board;
use crate::error::{Error, Result};
use crate::geometry::{Coordinate, Direction};
use crate::traversal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Robot {
    pub name: String,
    /// Matched against deflector colours.
    pub color: String,
    pub position: Coordinate,
}

impl Robot {
    /// A robot whose colour is its name.
    pub fn new(name: impl Into<String>, position: Coordinate) -> Self {
        let name = name.into();
        Robot {
            color: name.clone(),
            name,
            position,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

/// Robot positions on a shared board, with one robot designated as the one
/// that has to reach a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Arc<Board>,
    robots: Vec<Robot>,
    initial: Vec<Coordinate>,
    history: Vec<(usize, Direction)>,
    designated: usize,
}

impl GameState {
    /// Validates that every robot stands on its own free cell of the board.
    pub fn new(board: Arc<Board>, robots: Vec<Robot>, designated: &str) -> Result<Self> {
        if robots.is_empty() {
            return Err(Error::InvalidLayout("no robots defined".to_string()));
        }

        for (idx, robot) in robots.iter().enumerate() {
            if !board.in_bounds(robot.position) {
                return Err(Error::out_of_bounds(robot.position));
            }
            if board.is_blocked_cell(robot.position) {
                return Err(Error::InvalidLayout(format!(
                    "robot '{}' starts on blocked cell {}",
                    robot.name, robot.position
                )));
            }
            if let Some(other) = robots[..idx]
                .iter()
                .find(|other| other.position == robot.position)
            {
                return Err(Error::InvalidLayout(format!(
                    "robots '{}' and '{}' share cell {}",
                    other.name, robot.name, robot.position
                )));
            }
            if robots[..idx]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&robot.name))
            {
                return Err(Error::InvalidLayout(format!(
                    "robot '{}' defined twice",
                    robot.name
                )));
            }
        }

        let designated = robots
            .iter()
            .position(|r| r.name.eq_ignore_ascii_case(designated))
            .ok_or_else(|| Error::UnknownRobot(designated.to_string()))?;
        let initial = robots.iter().map(|r| r.position).collect();

        Ok(GameState {
            board,
            robots,
            initial,
            history: Vec::new(),
            designated,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    /// Robot names are matched case-insensitively.
    pub fn robot_index(&self, id: &str) -> Result<usize> {
        self.robots
            .iter()
            .position(|r| r.name.eq_ignore_ascii_case(id))
            .ok_or_else(|| Error::UnknownRobot(id.to_string()))
    }

    pub fn robot(&self, id: &str) -> Result<&Robot> {
        Ok(&self.robots[self.robot_index(id)?])
    }

    pub fn position(&self, id: &str) -> Result<Coordinate> {
        Ok(self.robot(id)?.position)
    }

    pub fn designated(&self) -> &Robot {
        &self.robots[self.designated]
    }

    pub(crate) fn designated_index(&self) -> usize {
        self.designated
    }

    /// Moves applied since construction or the last `reset`.
    pub fn history(&self) -> impl Iterator<Item = (&str, Direction)> + '_ {
        self.history
            .iter()
            .map(|&(idx, dir)| (self.robots[idx].name.as_str(), dir))
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    /// Cells occupied by every robot except the one at `skip`.
    pub(crate) fn occupied_except(&self, skip: usize) -> Vec<Coordinate> {
        self.robots
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != skip)
            .map(|(_, r)| r.position)
            .collect()
    }

    /// Where robot `id` would stop if moved towards `dir`, without moving it.
    pub fn destination(&self, id: &str, dir: Direction) -> Result<Coordinate> {
        let idx = self.robot_index(id)?;
        Ok(self.destination_of(idx, dir))
    }

    fn destination_of(&self, idx: usize, dir: Direction) -> Coordinate {
        let robot = &self.robots[idx];
        let occupied = self.occupied_except(idx);
        traversal::resolve(&self.board, robot.position, dir, &occupied, &robot.color)
    }

    /// Slide robot `id` in place. Returns `false`, leaving the state untouched,
    /// when the robot cannot move in that direction.
    pub fn move_robot(&mut self, id: &str, dir: Direction) -> Result<bool> {
        let idx = self.robot_index(id)?;
        let start = self.robots[idx].position;
        let stop = self.destination_of(idx, dir);
        if stop == start {
            debug!(robot = %self.robots[idx].name, %dir, %start, "robot cannot move");
            return Ok(false);
        }
        self.robots[idx].position = stop;
        self.history.push((idx, dir));
        Ok(true)
    }

    /// The state after sliding robot `id`. An unchanged copy when the robot
    /// cannot move.
    pub fn moved(&self, id: &str, dir: Direction) -> Result<GameState> {
        let mut next = self.clone();
        next.move_robot(id, dir)?;
        Ok(next)
    }

    pub fn is_goal_reached(&self, goals: &[Coordinate]) -> bool {
        goals.contains(&self.designated().position)
    }

    /// Restore the initial robot positions and forget the move history.
    pub fn reset(&mut self) {
        for (robot, &start) in self.robots.iter_mut().zip(&self.initial) {
            robot.position = start;
        }
        self.history.clear();
    }
}

/// A game state together with the cells the designated robot has to reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub state: GameState,
    pub goals: Vec<Coordinate>,
}

impl Puzzle {
    pub fn new(state: GameState, goals: Vec<Coordinate>) -> Result<Self> {
        if goals.is_empty() {
            return Err(Error::InvalidLayout("no goal cells defined".to_string()));
        }
        if let Some(&goal) = goals.iter().find(|&&g| !state.board().in_bounds(g)) {
            return Err(Error::out_of_bounds(goal));
        }
        Ok(Puzzle { state, goals })
    }

    pub fn board(&self) -> &Board {
        self.state.board()
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_goal_reached(&self.goals)
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.board();
        let target = self.state.designated().initial().to_ascii_lowercase();
        let horizontal = |f: &mut fmt::Formatter<'_>, y: i32, dir: Direction| {
            let segments: Vec<&str> = (0..board.width())
                .map(|x| {
                    if board.is_wall_blocking(Coordinate::new(x, y), dir) {
                        "---"
                    } else {
                        "   "
                    }
                })
                .collect();
            writeln!(f, "+{}+", segments.join("+"))
        };

        for y in 0..board.height() {
            horizontal(f, y, Direction::North)?;

            let mut line = String::new();
            for x in 0..board.width() {
                let pos = Coordinate::new(x, y);
                let is_goal = self.goals.contains(&pos);
                let center = if let Some(robot) =
                    self.state.robots().iter().find(|r| r.position == pos)
                {
                    robot.initial().to_ascii_uppercase()
                } else if board.is_blocked_cell(pos) {
                    '#'
                } else if let Some(deflector) = board.deflector_at(pos) {
                    deflector.orientation.symbol()
                } else if is_goal {
                    target
                } else {
                    ' '
                };
                line.push(if board.is_wall_blocking(pos, Direction::West) {
                    '|'
                } else {
                    ' '
                });
                line.push(if is_goal { '(' } else { ' ' });
                line.push(center);
                line.push(if is_goal { ')' } else { ' ' });
            }
            let last = Coordinate::new(board.width() - 1, y);
            line.push(if board.is_wall_blocking(last, Direction::East) {
                '|'
            } else {
                ' '
            });
            writeln!(f, "{}", line)?;
        }

        horizontal(f, board.height() - 1, Direction::South)
    }
}
