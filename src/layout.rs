use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::board::{Board, Deflector, Orientation};
use crate::error::{Error, Result};
use crate::game::{GameState, Puzzle, Robot};
use crate::geometry::{Coordinate, Direction};

const CLASSIC: &str = include_str!("../layouts/classic.json");
const DEMO: &str = include_str!("../layouts/demo.json");

/// A puzzle description as read from JSON.
///
/// ```json
/// {
///   "board": {
///     "width": 8, "height": 8,
///     "walls": [[1, 1, "south"]],
///     "blockers": [[4, 4]],
///     "deflectors": [{"position": [2, 5], "color": "blue", "orientation": "\\"}]
///   },
///   "robots": {"red": [0, 7], "blue": [7, 0]},
///   "target": {"robot": "red", "position": [2, 0]}
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    pub board: BoardLayout,
    pub robots: RobotsLayout,
    pub target: Option<TargetLayout>,
    /// Extra goal cells besides the target position.
    #[serde(default)]
    pub goals: Vec<Coordinate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardLayout {
    pub width: i32,
    pub height: i32,
    /// `[x, y, direction]` triples. Directions accept any prefix of their name.
    #[serde(default)]
    pub walls: Vec<(i32, i32, String)>,
    #[serde(default)]
    pub blockers: Vec<Coordinate>,
    #[serde(default)]
    pub deflectors: Vec<DeflectorLayout>,
    #[serde(default)]
    pub bounce_pads: Vec<Coordinate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeflectorLayout {
    pub position: Coordinate,
    pub color: String,
    pub orientation: Orientation,
}

/// Robots either as a `name -> position` map or as a list with optional colours.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RobotsLayout {
    Positions(BTreeMap<String, Coordinate>),
    List(Vec<RobotLayout>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RobotLayout {
    pub name: String,
    pub color: Option<String>,
    pub position: Coordinate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetLayout {
    pub robot: String,
    pub position: Coordinate,
}

impl Layout {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The 16x16 board with the classic blocker islands and objective cells.
    pub fn classic() -> Result<Self> {
        Self::from_json(CLASSIC)
    }

    /// A small board with three robots and a deflector.
    pub fn demo() -> Result<Self> {
        Self::from_json(DEMO)
    }

    fn robots(&self) -> Vec<Robot> {
        match &self.robots {
            RobotsLayout::Positions(map) => map
                .iter()
                .map(|(name, &pos)| Robot::new(name.clone(), pos))
                .collect(),
            RobotsLayout::List(list) => list
                .iter()
                .map(|r| {
                    let robot = Robot::new(r.name.clone(), r.position);
                    match &r.color {
                        Some(color) => robot.with_color(color.clone()),
                        None => robot,
                    }
                })
                .collect(),
        }
    }

    fn build_board(&self) -> Result<Board> {
        let cfg = &self.board;
        let mut board = Board::with_perimeter(cfg.width, cfg.height)?;
        for (x, y, dir) in &cfg.walls {
            let dir: Direction = dir.parse()?;
            board.add_wall(Coordinate::new(*x, *y), dir)?;
        }
        for &pos in &cfg.blockers {
            board.add_blocker(pos)?;
        }
        for d in &cfg.deflectors {
            board.add_deflector(d.position, Deflector::new(d.color.clone(), d.orientation))?;
        }
        for &pos in &cfg.bounce_pads {
            board.add_bounce_pad(pos)?;
        }
        Ok(board)
    }

    /// Validate the layout and build the board, robots and goal cells.
    pub fn build(&self) -> Result<Puzzle> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| Error::InvalidLayout("layout is missing target info".to_string()))?;

        let board = self.build_board()?;
        let robots = self.robots();

        if !robots
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(&target.robot))
        {
            return Err(Error::InvalidLayout(format!(
                "target robot '{}' is not defined",
                target.robot
            )));
        }
        if !board.in_bounds(target.position) {
            return Err(Error::InvalidLayout(format!(
                "target position {} is out of bounds",
                target.position
            )));
        }

        let mut goals = vec![target.position];
        for &goal in &self.goals {
            if !goals.contains(&goal) {
                goals.push(goal);
            }
        }

        let robot_count = robots.len();
        let state = GameState::new(Arc::new(board), robots, &target.robot)?;
        let puzzle = Puzzle::new(state, goals)?;
        info!(
            width = self.board.width,
            height = self.board.height,
            robots = robot_count,
            target = %target.position,
            "layout loaded"
        );
        Ok(puzzle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Solver;

    fn c(x: i32, y: i32) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_build_basic() {
        let layout = Layout::from_json(
            r#"{
                "board": {"width": 4, "height": 4, "walls": [[1, 1, "east"]]},
                "robots": {"red": [1, 1], "blue": [3, 3]},
                "target": {"robot": "red", "position": [1, 0]}
            }"#,
        )
        .unwrap();
        let puzzle = layout.build().unwrap();
        let board = puzzle.board();

        assert_eq!(board.width(), 4);
        // Perimeter is synthesised
        assert!(board.is_wall_blocking(c(0, 2), Direction::West));
        assert!(board.is_wall_blocking(c(3, 0), Direction::North));
        // Listed wall is mirrored
        assert!(board.is_wall_blocking(c(1, 1), Direction::East));
        assert!(board.is_wall_blocking(c(2, 1), Direction::West));

        assert_eq!(puzzle.state.position("red").unwrap(), c(1, 1));
        assert_eq!(puzzle.state.designated().name, "red");
        assert_eq!(puzzle.goals, vec![c(1, 0)]);
        assert!(!puzzle.is_solved());
    }

    #[test]
    fn test_wall_direction_prefixes() {
        let layout = Layout::from_json(
            r#"{
                "board": {"width": 3, "height": 3, "walls": [[1, 1, "S"], [1, 1, "we"]]},
                "robots": {"red": [0, 0]},
                "target": {"robot": "red", "position": [2, 2]}
            }"#,
        )
        .unwrap();
        let puzzle = layout.build().unwrap();
        assert!(puzzle.board().is_wall_blocking(c(1, 1), Direction::South));
        assert!(puzzle.board().is_wall_blocking(c(1, 1), Direction::West));
    }

    #[test]
    fn test_unknown_wall_direction() {
        let layout = Layout::from_json(
            r#"{
                "board": {"width": 3, "height": 3, "walls": [[1, 1, "up"]]},
                "robots": {"red": [0, 0]},
                "target": {"robot": "red", "position": [2, 2]}
            }"#,
        )
        .unwrap();
        assert!(matches!(layout.build(), Err(Error::UnknownDirection(d)) if d == "up"));
    }

    #[test]
    fn test_missing_target() {
        let layout = Layout::from_json(
            r#"{"board": {"width": 3, "height": 3}, "robots": {"red": [0, 0]}}"#,
        )
        .unwrap();
        assert!(matches!(layout.build(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_undefined_target_robot() {
        let layout = Layout::from_json(
            r#"{
                "board": {"width": 3, "height": 3},
                "robots": {"red": [0, 0]},
                "target": {"robot": "blue", "position": [2, 2]}
            }"#,
        )
        .unwrap();
        assert!(matches!(layout.build(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_target_out_of_bounds() {
        let layout = Layout::from_json(
            r#"{
                "board": {"width": 3, "height": 3},
                "robots": {"red": [0, 0]},
                "target": {"robot": "red", "position": [3, 1]}
            }"#,
        )
        .unwrap();
        assert!(matches!(layout.build(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_positions_out_of_bounds() {
        let wall = Layout::from_json(
            r#"{
                "board": {"width": 3, "height": 3, "walls": [[5, 0, "north"]]},
                "robots": {"red": [0, 0]},
                "target": {"robot": "red", "position": [1, 1]}
            }"#,
        )
        .unwrap();
        assert!(matches!(wall.build(), Err(Error::OutOfBounds { x: 5, y: 0 })));

        let robot = Layout::from_json(
            r#"{
                "board": {"width": 3, "height": 3},
                "robots": {"red": [0, 0], "blue": [0, 7]},
                "target": {"robot": "red", "position": [1, 1]}
            }"#,
        )
        .unwrap();
        assert!(matches!(robot.build(), Err(Error::OutOfBounds { x: 0, y: 7 })));

        let deflector = Layout::from_json(
            r#"{
                "board": {"width": 3, "height": 3,
                          "deflectors": [{"position": [-1, 0], "color": "red", "orientation": "/"}]},
                "robots": {"red": [0, 0]},
                "target": {"robot": "red", "position": [1, 1]}
            }"#,
        )
        .unwrap();
        assert!(matches!(deflector.build(), Err(Error::OutOfBounds { x: -1, y: 0 })));
    }

    #[test]
    fn test_invalid_dimensions() {
        let layout = Layout::from_json(
            r#"{
                "board": {"width": 0, "height": 3},
                "robots": {"red": [0, 0]},
                "target": {"robot": "red", "position": [0, 0]}
            }"#,
        )
        .unwrap();
        assert!(matches!(layout.build(), Err(Error::InvalidLayout(_))));

        let huge = Layout::from_json(
            r#"{
                "board": {"width": 65536, "height": 65536},
                "robots": {"red": [0, 0]},
                "target": {"robot": "red", "position": [1, 1]}
            }"#,
        )
        .unwrap();
        assert!(matches!(huge.build(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Layout::from_json("{\"board\": 3}"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Layout::from_file("nonexistent_layout.json"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_robot_list_with_colors() {
        let layout = Layout::from_json(
            r#"{
                "board": {"width": 5, "height": 5,
                          "deflectors": [{"position": [2, 2], "color": "red", "orientation": "/"}]},
                "robots": [
                    {"name": "r1", "color": "red", "position": [2, 4]},
                    {"name": "b1", "position": [0, 0]}
                ],
                "target": {"robot": "r1", "position": [2, 0]}
            }"#,
        )
        .unwrap();
        let puzzle = layout.build().unwrap();
        assert_eq!(puzzle.state.robot("r1").unwrap().color, "red");
        assert_eq!(puzzle.state.robot("b1").unwrap().color, "b1");
        // r1 matches the deflector colour and slides straight through it
        let result = Solver::default().solve(&puzzle.state, &puzzle.goals);
        assert!(result.success);
        assert_eq!(result.path, vec![c(2, 4), c(2, 0)]);
    }

    #[test]
    fn test_extra_goals_are_merged() {
        let layout = Layout::from_json(
            r#"{
                "board": {"width": 4, "height": 4},
                "robots": {"red": [0, 0]},
                "target": {"robot": "red", "position": [3, 3]},
                "goals": [[3, 0], [3, 3]]
            }"#,
        )
        .unwrap();
        let puzzle = layout.build().unwrap();
        assert_eq!(puzzle.goals, vec![c(3, 3), c(3, 0)]);
    }

    #[test]
    fn test_classic_layout() {
        let puzzle = Layout::classic().unwrap().build().unwrap();
        let board = puzzle.board();
        assert_eq!((board.width(), board.height()), (16, 16));
        assert_eq!(board.blockers().count(), 27);
        assert!(board.is_blocked_cell(c(8, 8)));
        assert_eq!(puzzle.goals.len(), 17);
        assert_eq!(puzzle.goals[0], c(7, 7));
        assert_eq!(puzzle.state.position("red").unwrap(), c(1, 13));
    }

    #[test]
    fn test_demo_layout_solves_through_deflector() {
        let puzzle = Layout::demo().unwrap().build().unwrap();
        assert_eq!(puzzle.state.robots().len(), 3);
        let result = Solver::default().solve(&puzzle.state, &puzzle.goals);
        assert!(result.success);
        assert_eq!(result.path, vec![c(0, 7), c(4, 7), c(4, 5), c(2, 0)]);
        assert_eq!(
            result.directions,
            vec![Direction::East, Direction::North, Direction::West]
        );

        let solved = result.apply(&puzzle.state, "red").unwrap();
        assert!(solved.is_goal_reached(&puzzle.goals));
    }
}
