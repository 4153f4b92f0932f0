use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::bits::{CellSet, DirectionSet};
use crate::error::{Error, Result};
use crate::geometry::{Coordinate, Direction};

/// The two diagonal orientations a deflector can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "/")]
    Slash,
    #[serde(rename = "\\")]
    Backslash,
}

impl Orientation {
    pub fn symbol(self) -> char {
        match self {
            Orientation::Slash => '/',
            Orientation::Backslash => '\\',
        }
    }
}

/// A coloured diagonal barrier. Robots of its colour pass straight through,
/// every other robot is turned by 90 degrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deflector {
    pub color: String,
    pub orientation: Orientation,
}

impl Deflector {
    pub fn new(color: impl Into<String>, orientation: Orientation) -> Self {
        Deflector {
            color: color.into(),
            orientation,
        }
    }

    /// Colour comparison is case-insensitive.
    pub fn allows(&self, robot_color: &str) -> bool {
        self.color.eq_ignore_ascii_case(robot_color)
    }

    pub fn deflect(&self, dir: Direction) -> Direction {
        match (self.orientation, dir) {
            (Orientation::Slash, Direction::North) => Direction::East,
            (Orientation::Slash, Direction::East) => Direction::North,
            (Orientation::Slash, Direction::South) => Direction::West,
            (Orientation::Slash, Direction::West) => Direction::South,
            (Orientation::Backslash, Direction::North) => Direction::West,
            (Orientation::Backslash, Direction::West) => Direction::North,
            (Orientation::Backslash, Direction::South) => Direction::East,
            (Orientation::Backslash, Direction::East) => Direction::South,
        }
    }
}

/// Static board geometry: walls, blocker cells, deflectors and bounce pads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    // One entry per cell, row-major
    walls: Vec<DirectionSet>,
    blockers: CellSet,
    deflectors: HashMap<Coordinate, Deflector>,
    bounce_pads: CellSet,
}

impl Board {
    /// An empty board with no walls at all, not even on the perimeter.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidLayout(format!(
                "board dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let cells = width.checked_mul(height).ok_or_else(|| {
            Error::InvalidLayout(format!("board of {}x{} cells is too large", width, height))
        })? as usize;
        Ok(Board {
            width,
            height,
            walls: vec![DirectionSet::new(); cells],
            blockers: CellSet::new(width as usize, height as usize),
            deflectors: HashMap::new(),
            bounce_pads: CellSet::new(width as usize, height as usize),
        })
    }

    /// An empty board whose boundary cells carry a wall on their outward side.
    pub fn with_perimeter(width: i32, height: i32) -> Result<Self> {
        let mut board = Board::new(width, height)?;
        for x in 0..width {
            board.add_wall(Coordinate::new(x, 0), Direction::North)?;
            board.add_wall(Coordinate::new(x, height - 1), Direction::South)?;
        }
        for y in 0..height {
            board.add_wall(Coordinate::new(0, y), Direction::West)?;
            board.add_wall(Coordinate::new(width - 1, y), Direction::East)?;
        }
        Ok(board)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: Coordinate) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Coordinate) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    fn check_bounds(&self, pos: Coordinate) -> Result<()> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(Error::out_of_bounds(pos))
        }
    }

    /// Place a wall on the `dir` side of `pos`. The neighbouring cell, if on the
    /// board, gets the mirrored wall so the wall blocks from both sides.
    pub fn add_wall(&mut self, pos: Coordinate, dir: Direction) -> Result<()> {
        self.check_bounds(pos)?;
        let idx = self.index(pos);
        self.walls[idx].add(dir);

        let neighbor = pos.translate(dir);
        if self.in_bounds(neighbor) {
            let idx = self.index(neighbor);
            self.walls[idx].add(dir.opposite());
        }
        Ok(())
    }

    pub fn add_blocker(&mut self, pos: Coordinate) -> Result<()> {
        self.check_bounds(pos)?;
        self.blockers.insert(pos);
        Ok(())
    }

    /// Replaces any deflector already on `pos`.
    pub fn add_deflector(&mut self, pos: Coordinate, deflector: Deflector) -> Result<()> {
        self.check_bounds(pos)?;
        self.deflectors.insert(pos, deflector);
        Ok(())
    }

    pub fn add_bounce_pad(&mut self, pos: Coordinate) -> Result<()> {
        self.check_bounds(pos)?;
        self.bounce_pads.insert(pos);
        Ok(())
    }

    /// Walls on `pos`. Off-board cells have none.
    pub fn walls_at(&self, pos: Coordinate) -> DirectionSet {
        if self.in_bounds(pos) {
            self.walls[self.index(pos)]
        } else {
            DirectionSet::new()
        }
    }

    pub fn is_wall_blocking(&self, pos: Coordinate, dir: Direction) -> bool {
        self.walls_at(pos).contains(dir)
    }

    pub fn is_blocked_cell(&self, pos: Coordinate) -> bool {
        self.blockers.contains(pos)
    }

    pub fn deflector_at(&self, pos: Coordinate) -> Option<&Deflector> {
        self.deflectors.get(&pos)
    }

    pub fn is_bounce_pad(&self, pos: Coordinate) -> bool {
        self.bounce_pads.contains(pos)
    }

    pub fn blockers(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.blockers.iter()
    }

    pub fn deflectors(&self) -> impl Iterator<Item = (Coordinate, &Deflector)> + '_ {
        self.deflectors.iter().map(|(&pos, d)| (pos, d))
    }

    /// Cells a robot may stand on: in bounds and not a blocker.
    pub fn is_free(&self, pos: Coordinate) -> bool {
        self.in_bounds(pos) && !self.is_blocked_cell(pos)
    }
}
