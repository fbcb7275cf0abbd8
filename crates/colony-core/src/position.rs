use core::fmt;

use serde::{Deserialize, Serialize};

/// Side length of a region grid.
pub const REGION_SIZE: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// A region-qualified grid cell.
///
/// Field order matters: the derived `Ord` groups cells by region, then row-major
/// within a region's columns, which keeps `BTreeMap<Position, _>` iteration stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub region: RegionId,
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(region: RegionId, x: i32, y: i32) -> Self {
        Self { region, x, y }
    }

    pub fn in_bounds(&self) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < REGION_SIZE && self.y < REGION_SIZE
    }

    /// Chebyshev distance. Cells in different regions are infinitely far apart.
    pub fn range_to(&self, other: Position) -> u32 {
        if self.region != other.region {
            return u32::MAX;
        }
        (self.x - other.x).abs().max((self.y - other.y).abs()) as u32
    }

    pub fn in_range_to(&self, other: Position, range: u32) -> bool {
        self.range_to(other) <= range
    }

    pub fn is_near_to(&self, other: Position) -> bool {
        self.in_range_to(other, 1)
    }

    /// The neighboring cell in `dir`, or `None` when it would leave the region.
    pub fn offset(&self, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let next = Position::new(self.region, self.x + dx, self.y + dy);
        next.in_bounds().then_some(next)
    }

    /// Direction of a single step from `self` toward `other` (same region only).
    pub fn direction_to(&self, other: Position) -> Option<Direction> {
        if self.region != other.region {
            return None;
        }
        Direction::from_delta((other.x - self.x).signum(), (other.y - self.y).signum())
    }

    pub fn neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL.iter().filter_map(move |dir| self.offset(*dir))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {},{}]", self.region, self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl Direction {
    /// Fixed order for determinism: clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Top => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Bottom => (0, 1),
            Direction::BottomLeft => (-1, 1),
            Direction::Left => (-1, 0),
            Direction::TopLeft => (-1, -1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Direction::ALL
            .iter()
            .copied()
            .find(|dir| dir.delta() == (dx, dy))
    }

    pub fn reverse(self) -> Direction {
        let (dx, dy) = self.delta();
        // Every direction has an opposite, so the lookup cannot miss.
        Direction::from_delta(-dx, -dy).unwrap_or(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: RegionId = RegionId(1);

    #[test]
    fn range_is_chebyshev_within_region() {
        let a = Position::new(R, 10, 10);
        assert_eq!(a.range_to(Position::new(R, 13, 11)), 3);
        assert_eq!(a.range_to(Position::new(R, 9, 9)), 1);
        assert!(a.is_near_to(Position::new(R, 11, 9)));
    }

    #[test]
    fn range_across_regions_is_unbounded() {
        let a = Position::new(R, 10, 10);
        let b = Position::new(RegionId(2), 10, 10);
        assert_eq!(a.range_to(b), u32::MAX);
        assert!(!a.in_range_to(b, 100));
        assert_eq!(a.direction_to(b), None);
    }

    #[test]
    fn offset_stops_at_region_edge() {
        let corner = Position::new(R, 0, 0);
        assert_eq!(corner.offset(Direction::Left), None);
        assert_eq!(corner.offset(Direction::Bottom), Some(Position::new(R, 0, 1)));
        assert_eq!(corner.neighbors().count(), 3);
    }

    #[test]
    fn reverse_direction_round_trips() {
        for dir in Direction::ALL {
            assert_eq!(dir.reverse().reverse(), dir);
            assert_ne!(dir.reverse(), dir);
        }
    }
}
