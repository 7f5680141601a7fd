/// Grid geometry: cell coordinates, directions, and the cell <-> screen
/// coordinate transform.
///
/// Screen coordinates are whatever unit the renderer draws in (terminal
/// columns/rows for the crossterm front end). The transform is:
///
///   xy = row_col * tile_size + origin
///
/// and the inverse floors toward the containing cell.

/// Row-column coordinates on a level grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RowCol {
    pub row: usize,
    pub col: usize,
}

impl RowCol {
    pub const fn new(row: usize, col: usize) -> Self {
        RowCol { row, col }
    }

    /// The neighbouring cell in `dir`, or None when it would leave a
    /// `height` x `width` grid.
    pub fn step(self, dir: Direction, height: usize, width: usize) -> Option<RowCol> {
        let (dr, dc) = dir.offset();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        if row < height && col < width {
            Some(RowCol { row, col })
        } else {
            None
        }
    }
}

/// One of the four cardinal directions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// (row, col) delta.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Down
    }
}

/// A screen-space position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Maps grid cells to screen positions and back.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Layout {
    pub tile_w: i32,
    pub tile_h: i32,
    pub origin: Point,
    pub rows: usize,
    pub cols: usize,
}

impl Layout {
    pub fn new(tile_w: i32, tile_h: i32, origin: Point, rows: usize, cols: usize) -> Self {
        assert!(tile_w > 0 && tile_h > 0, "tile size must be positive");
        Layout { tile_w, tile_h, origin, rows, cols }
    }

    /// Top-left screen position of a cell.
    pub fn row_col_to_xy(&self, rc: RowCol) -> Point {
        Point {
            x: rc.col as i32 * self.tile_w + self.origin.x,
            y: rc.row as i32 * self.tile_h + self.origin.y,
        }
    }

    /// Cell containing a screen position, or None outside the grid.
    pub fn xy_to_row_col(&self, xy: Point) -> Option<RowCol> {
        let col = (xy.x - self.origin.x).div_euclid(self.tile_w);
        let row = (xy.y - self.origin.y).div_euclid(self.tile_h);
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row < self.rows && col < self.cols {
            Some(RowCol { row, col })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stays_inside_grid() {
        let rc = RowCol::new(0, 0);
        assert_eq!(rc.step(Direction::Up, 3, 3), None);
        assert_eq!(rc.step(Direction::Left, 3, 3), None);
        assert_eq!(rc.step(Direction::Right, 3, 3), Some(RowCol::new(0, 1)));
        assert_eq!(RowCol::new(2, 2).step(Direction::Down, 3, 3), None);
    }

    #[test]
    fn layout_transform_is_exact() {
        let layout = Layout::new(2, 1, Point::new(4, 2), 5, 7);
        let rc = RowCol::new(3, 5);
        let xy = layout.row_col_to_xy(rc);
        assert_eq!(xy, Point::new(14, 5));
        assert_eq!(layout.xy_to_row_col(xy), Some(rc));
        // Right half of a two-column tile still lands in the same cell
        assert_eq!(layout.xy_to_row_col(Point::new(15, 5)), Some(rc));
    }

    #[test]
    fn layout_rejects_points_off_grid() {
        let layout = Layout::new(2, 1, Point::new(4, 2), 5, 7);
        // Just left of the origin floors to col -1, not col 0
        assert_eq!(layout.xy_to_row_col(Point::new(3, 2)), None);
        assert_eq!(layout.xy_to_row_col(Point::new(4, 1)), None);
        assert_eq!(layout.xy_to_row_col(Point::new(4 + 2 * 7, 2)), None);
        assert_eq!(layout.xy_to_row_col(Point::new(4, 2 + 5)), None);
    }
}
