pub mod area;
pub mod cell;
pub mod direction;

use crate::geometry::cell::Cell;
use derive_more::{Add, Constructor, Sub};
use serde::{Deserialize, Serialize};

/// Fractional map coordinate. Object positions are footprint centers, so a 1x1 object sits at `x.5`.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize, Constructor, Add, Sub)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The cell containing the point.
    pub fn floor(self) -> Cell {
        Cell::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    pub fn manhattan_distance(self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn in_circle(self, origin: Point, radius: f64) -> bool {
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        dx * dx + dy * dy <= radius * radius
    }
}

/// Rounds halves towards positive infinity, so `-0.5` becomes `0` and `0.5` becomes `1`.
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use crate::geometry::{round_half_up, Point};

    #[test]
    fn test_point_arithmetic() {
        let p1 = Point::new(1.5, 1.0);
        let p2 = Point::new(-1.0, 2.5);
        let p3 = Point::new(0.5, 3.5);
        assert_eq!(p1 + p2 - p3, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(2.4), 2.0);
    }

    #[test]
    fn test_in_circle() {
        let origin = Point::new(0.5, 0.5);
        assert!(Point::new(7.5, 0.5).in_circle(origin, 7.0));
        assert!(!Point::new(7.5, 1.5).in_circle(origin, 7.0));
        assert_eq!(Point::new(3.5, -1.5).manhattan_distance(origin), 5.0);
    }
}
