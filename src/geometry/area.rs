use crate::geometry::cell::Cell;
use crate::geometry::{round_half_up, Point};
use derive_more::Constructor;

/// Rectangle given by its center and integer size, i.e., an object footprint.
#[derive(Copy, Clone, Debug, PartialEq, Constructor)]
pub struct Area {
    pub center: Point,
    pub width: i32,
    pub height: i32,
}

impl Area {
    pub fn top_left(&self) -> Cell {
        Cell::new(
            round_half_up(self.center.x - self.width as f64 / 2.0) as i32,
            round_half_up(self.center.y - self.height as f64 / 2.0) as i32,
        )
    }

    /// Cells covered by the area, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let top_left = self.top_left();
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |dy| (0..width).map(move |dx| top_left.offset(dx, dy)))
    }

    /// The one cell wide ring around the area, corners included.
    pub fn perimeter(&self) -> Vec<Cell> {
        let top_left = self.top_left();
        let mut result = Vec::with_capacity(2 * (self.width + self.height) as usize + 4);
        for dx in -1..=self.width {
            result.push(top_left.offset(dx, -1));
            result.push(top_left.offset(dx, self.height));
        }
        for dy in 0..self.height {
            result.push(top_left.offset(-1, dy));
            result.push(top_left.offset(self.width, dy));
        }
        result
    }

    pub fn size(&self) -> i32 {
        self.width * self.height
    }

    pub fn min(&self) -> Point {
        Point::new(
            self.center.x - self.width as f64 / 2.0,
            self.center.y - self.height as f64 / 2.0,
        )
    }

    pub fn max(&self) -> Point {
        Point::new(
            self.center.x + self.width as f64 / 2.0,
            self.center.y + self.height as f64 / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        let (min, max) = (self.min(), self.max());
        min.x <= point.x && point.x <= max.x && min.y <= point.y && point.y <= max.y
    }
}

/// Axis-aligned bounding box folded over footprints and tiles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn of_area(area: &Area) -> Self {
        Bounds {
            min: area.min(),
            max: area.max(),
        }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn extend(bounds: Option<Bounds>, other: Bounds) -> Option<Bounds> {
        Some(match bounds {
            Some(bounds) => bounds.union(other),
            None => other,
        })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}
