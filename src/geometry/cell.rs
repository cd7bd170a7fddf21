use crate::geometry::Point;
use derive_more::{Add, Constructor, Display, Sub};

/// Integer grid cell. Its `Display` form `x,y` is the canonical cell key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Constructor, Display, Add, Sub)]
#[display(fmt = "{},{}", x, y)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Cell {
        Cell::new(self.x + dx, self.y + dy)
    }

    pub fn center(self) -> Point {
        Point::new(self.x as f64 + 0.5, self.y as f64 + 0.5)
    }

    /// The four cells sharing an edge with this one, clockwise from the one above.
    pub fn around(self) -> [Cell; 4] {
        [self.offset(0, -1), self.offset(1, 0), self.offset(0, 1), self.offset(-1, 0)]
    }

    /// Cells of the square of the given radius centered on this one, row by row.
    pub fn square(self, radius: i32) -> impl Iterator<Item = Cell> {
        (-radius..=radius).flat_map(move |dy| (-radius..=radius).map(move |dx| self.offset(dx, dy)))
    }

    pub fn manhattan_distance(self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Rectangle of cells, both corners inclusive.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CellRect {
    pub top_left: Cell,
    pub bottom_right: Cell,
}

impl CellRect {
    /// The smallest rectangle containing all the cells, if there are any.
    pub fn enclosing<I: IntoIterator<Item = Cell>>(cells: I) -> Option<CellRect> {
        cells.into_iter().fold(None, |rect, cell| {
            Some(match rect {
                None => CellRect {
                    top_left: cell,
                    bottom_right: cell,
                },
                Some(CellRect { top_left, bottom_right }) => CellRect {
                    top_left: Cell::new(top_left.x.min(cell.x), top_left.y.min(cell.y)),
                    bottom_right: Cell::new(bottom_right.x.max(cell.x), bottom_right.y.max(cell.y)),
                },
            })
        })
    }

    pub fn grown(self, margin: i32) -> CellRect {
        CellRect {
            top_left: self.top_left.offset(-margin, -margin),
            bottom_right: self.bottom_right.offset(margin, margin),
        }
    }

    pub fn inside(self, cell: Cell) -> bool {
        self.top_left.x <= cell.x
            && cell.x <= self.bottom_right.x
            && self.top_left.y <= cell.y
            && cell.y <= self.bottom_right.y
    }
}
