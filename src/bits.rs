use crate::geometry::{Coordinate, Direction};

/// A set of directions packed into the low four bits of a byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DirectionSet {
    bits: u8,
}

impl DirectionSet {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn contains(&self, dir: Direction) -> bool {
        (self.bits & (1u8 << dir.index())) != 0
    }

    pub fn add(&mut self, dir: Direction) {
        self.bits |= 1u8 << dir.index();
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }
}

/// A set of cells on a `width` x `height` grid, one bit per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSet {
    words: Vec<u64>,
    width: usize,
    height: usize,
}

impl CellSet {
    pub fn new(width: usize, height: usize) -> Self {
        let words = (width * height).div_ceil(64);
        Self {
            words: vec![0; words],
            width,
            height,
        }
    }

    fn bit(&self, pos: Coordinate) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Off-grid cells are never members.
    pub fn contains(&self, pos: Coordinate) -> bool {
        match self.bit(pos) {
            Some(bit) => (self.words[bit / 64] & (1u64 << (bit % 64))) != 0,
            None => false,
        }
    }

    /// Returns `true` if the cell was newly inserted.
    pub fn insert(&mut self, pos: Coordinate) -> bool {
        let bit = self
            .bit(pos)
            .unwrap_or_else(|| panic!("position {} out of bounds", pos));
        let mask = 1u64 << (bit % 64);
        let was_set = (self.words[bit / 64] & mask) != 0;
        self.words[bit / 64] |= mask;
        !was_set
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let width = self.width;
        self.words.iter().enumerate().flat_map(move |(word_idx, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = word_idx * 64 + bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(Coordinate::new((bit % width) as i32, (bit / width) as i32))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ALL_DIRECTIONS;

    #[test]
    fn test_direction_set_add_contains() {
        let mut set = DirectionSet::new();
        assert!(set.is_empty());
        for dir in ALL_DIRECTIONS {
            assert!(!set.contains(dir));
        }

        set.add(Direction::East);
        assert!(set.contains(Direction::East));
        assert!(!set.contains(Direction::West));
        assert_eq!(set.len(), 1);

        // Adding twice is idempotent
        set.add(Direction::East);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_cell_set_insert() {
        let mut set = CellSet::new(10, 10);
        assert!(set.is_empty());
        assert!(set.insert(Coordinate::new(3, 4)));
        assert!(!set.insert(Coordinate::new(3, 4)));
        assert!(set.contains(Coordinate::new(3, 4)));
        assert!(!set.contains(Coordinate::new(4, 3)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_cell_set_off_grid() {
        let set = CellSet::new(4, 4);
        assert!(!set.contains(Coordinate::new(-1, 0)));
        assert!(!set.contains(Coordinate::new(0, 4)));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_cell_set_insert_off_grid() {
        let mut set = CellSet::new(4, 4);
        set.insert(Coordinate::new(4, 0));
    }

    #[test]
    fn test_cell_set_iter_spans_words() {
        let mut set = CellSet::new(20, 20);
        let cells = [
            Coordinate::new(0, 0),
            Coordinate::new(5, 3),
            Coordinate::new(19, 19),
        ];
        for &cell in &cells {
            set.insert(cell);
        }
        let collected: Vec<Coordinate> = set.iter().collect();
        assert_eq!(collected, cells.to_vec());
    }
}
