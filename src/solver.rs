use arrayvec::ArrayVec;
use std::collections::{HashMap, VecDeque};
use std::fmt;

use tracing::{debug, trace};

use crate::bits::CellSet;
use crate::board::Board;
use crate::error::{Error, Result};
use crate::game::GameState;
use crate::geometry::{ALL_DIRECTIONS, Coordinate, Direction};
use crate::traversal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Directions tried at every node, in this order.
    pub directions: ArrayVec<Direction, 4>,
    /// Give up after dequeuing this many cells.
    pub max_nodes: Option<usize>,
}

impl SolverConfig {
    /// Restrict expansion to `dirs`. Duplicates are dropped, first occurrence wins.
    pub fn with_directions(dirs: &[Direction]) -> Self {
        let mut directions = ArrayVec::new();
        for &dir in dirs {
            if !directions.contains(&dir) {
                directions.push(dir);
            }
        }
        SolverConfig {
            directions,
            max_nodes: None,
        }
    }

    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::with_directions(&ALL_DIRECTIONS)
    }
}

/// One slide of a solution: the direction and where the robot comes to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub direction: Direction,
    pub destination: Coordinate,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move {} to {}", self.direction, self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    /// Cells from start to goal, both inclusive. Only the start cell on failure.
    pub path: Vec<Coordinate>,
    /// Launch direction of each slide, when known. A deflected slide ends off
    /// the axis it started on, so its direction cannot be read from the path.
    pub directions: Vec<Direction>,
    /// Number of cells dequeued during the search.
    pub explored: usize,
    pub success: bool,
}

impl SolveResult {
    fn failure(start: Coordinate, explored: usize) -> Self {
        SolveResult {
            path: vec![start],
            directions: Vec::new(),
            explored,
            success: false,
        }
    }

    /// Number of slides in the path.
    pub fn moves(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Translate consecutive path cells into slide commands. Without recorded
    /// directions every step must be a non-empty axis-aligned offset.
    pub fn to_commands(&self) -> Result<Vec<Command>> {
        self.path
            .windows(2)
            .enumerate()
            .map(|(step, pair)| {
                let (from, to) = (pair[0], pair[1]);
                if from == to {
                    return Err(Error::InvalidPath { from, to });
                }
                let direction = match self.directions.get(step) {
                    Some(&dir) => dir,
                    None => from
                        .direction_to(to)
                        .ok_or(Error::InvalidPath { from, to })?,
                };
                Ok(Command {
                    direction,
                    destination: to,
                })
            })
            .collect()
    }

    /// Replay the path on `state` by sliding robot `id`, checking that every
    /// slide ends where the path says it does.
    pub fn apply(&self, state: &GameState, id: &str) -> Result<GameState> {
        let mut current = state.clone();
        let mut from = current.position(id)?;
        for command in self.to_commands()? {
            current.move_robot(id, command.direction)?;
            let to = current.position(id)?;
            if to != command.destination {
                return Err(Error::InvalidPath {
                    from,
                    to: command.destination,
                });
            }
            from = to;
        }
        Ok(current)
    }
}

/// Breadth-first search over the cells one robot can reach by sliding, with
/// every other robot held in place as an obstacle.
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve for the designated robot of `state`.
    pub fn solve(&self, state: &GameState, goals: &[Coordinate]) -> SolveResult {
        let idx = state.designated_index();
        let robot = &state.robots()[idx];
        self.search(
            state.board(),
            robot.position,
            &state.occupied_except(idx),
            &robot.color,
            goals,
        )
    }

    /// Solve for any robot of `state`.
    pub fn solve_for(&self, state: &GameState, id: &str, goals: &[Coordinate]) -> Result<SolveResult> {
        let idx = state.robot_index(id)?;
        let robot = &state.robots()[idx];
        Ok(self.search(
            state.board(),
            robot.position,
            &state.occupied_except(idx),
            &robot.color,
            goals,
        ))
    }

    /// Shortest slide path from `start` to any of `goals` on `board`.
    pub fn search(
        &self,
        board: &Board,
        start: Coordinate,
        obstacles: &[Coordinate],
        color: &str,
        goals: &[Coordinate],
    ) -> SolveResult {
        let width = board.width() as usize;
        let height = board.height() as usize;

        let mut goal_set = CellSet::new(width, height);
        for &goal in goals.iter().filter(|&&g| board.in_bounds(g)) {
            goal_set.insert(goal);
        }

        let mut visited = CellSet::new(width, height);
        let mut parents: HashMap<Coordinate, (Coordinate, Direction)> = HashMap::new();
        let mut queue = VecDeque::new();
        let mut explored = 0;

        if !board.in_bounds(start) {
            return SolveResult::failure(start, explored);
        }
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if self.config.max_nodes.is_some_and(|max| explored >= max) {
                debug!(explored, "node limit reached");
                return SolveResult::failure(start, explored);
            }
            explored += 1;

            if goal_set.contains(current) {
                let (path, directions) = reconstruct_path(current, &parents);
                debug!(explored, moves = directions.len(), "solved");
                return SolveResult {
                    path,
                    directions,
                    explored,
                    success: true,
                };
            }

            for &dir in &self.config.directions {
                let next = traversal::resolve(board, current, dir, obstacles, color);
                if next == current || !visited.insert(next) {
                    continue;
                }
                trace!(from = %current, %dir, to = %next, "enqueue");
                parents.insert(next, (current, dir));
                queue.push_back(next);
            }
        }

        debug!(explored, "no path to goal");
        SolveResult::failure(start, explored)
    }
}

impl Solver {
    /// Every cell the robot can come to rest on, paired with the fewest slides
    /// needed to get there, in breadth-first order. The start cell comes first.
    pub fn reachable(
        &self,
        board: &Board,
        start: Coordinate,
        obstacles: &[Coordinate],
        color: &str,
    ) -> Vec<(Coordinate, usize)> {
        let mut visited = CellSet::new(board.width() as usize, board.height() as usize);
        let mut order = Vec::new();
        if !board.in_bounds(start) {
            return order;
        }
        visited.insert(start);
        order.push((start, 0));

        let mut head = 0;
        while head < order.len() {
            let (current, depth) = order[head];
            head += 1;
            for &dir in &self.config.directions {
                let next = traversal::resolve(board, current, dir, obstacles, color);
                if next != current && visited.insert(next) {
                    order.push((next, depth + 1));
                }
            }
        }
        order
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

fn reconstruct_path(
    goal: Coordinate,
    parents: &HashMap<Coordinate, (Coordinate, Direction)>,
) -> (Vec<Coordinate>, Vec<Direction>) {
    let mut path = vec![goal];
    let mut directions = Vec::new();
    let mut current = goal;
    while let Some(&(parent, dir)) = parents.get(&current) {
        path.push(parent);
        directions.push(dir);
        current = parent;
    }
    path.reverse();
    directions.reverse();
    (path, directions)
}
