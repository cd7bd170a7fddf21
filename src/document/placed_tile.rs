use crate::geometry::Point;

/// One floor tile. Tiles are replaced rather than mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTile {
    pub name: String,
    pub position: Point,
}

impl PlacedTile {
    pub fn new(name: &str, position: Point) -> Self {
        PlacedTile {
            name: name.to_string(),
            position,
        }
    }

    pub fn hash(&self) -> String {
        tile_hash(self.position)
    }
}

/// Key of the tile at the position, e.g. `1.5,-0.5`.
pub fn tile_hash(position: Point) -> String {
    format!("{},{}", position.x, position.y)
}

#[cfg(test)]
mod tests {
    use crate::document::placed_tile::{tile_hash, PlacedTile};
    use crate::geometry::Point;

    #[test]
    fn test_hash() {
        assert_eq!(PlacedTile::new("concrete", Point::new(1.5, -0.5)).hash(), "1.5,-0.5");
        assert_eq!(tile_hash(Point::new(2.0, 3.0)), "2,3");
    }
}
