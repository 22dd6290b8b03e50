use std::collections::HashMap;

use glam::DVec2;

/// Items that landed in one grid cell, in insertion order
#[derive(Debug)]
pub struct Bucket<T> {
    pub members: Vec<T>,
}

/// Uniform screen-space hash grid.
/// Buckets come out in the order their first member went in, so the result
/// never depends on hash iteration order.
pub struct ScreenGrid<T> {
    /// Cell coordinates to bucket index
    cells: HashMap<(i64, i64), usize>,
    buckets: Vec<Bucket<T>>,
    /// Cell edge in pixels
    cell_size: f64,
}

impl<T> ScreenGrid<T> {
    pub fn with_capacity(cell_size: f64, capacity: usize) -> Self {
        Self {
            cells: HashMap::with_capacity(capacity),
            buckets: Vec::with_capacity(capacity),
            cell_size,
        }
    }

    /// Convert a pixel position to cell coordinates
    #[inline(always)]
    pub fn to_cell(&self, position: DVec2) -> (i64, i64) {
        let x = (position.x / self.cell_size).floor() as i64;
        let y = (position.y / self.cell_size).floor() as i64;
        (x, y)
    }

    /// Insert an item at a pixel position
    pub fn insert(&mut self, position: DVec2, item: T) {
        let cell = self.to_cell(position);
        match self.cells.get(&cell) {
            Some(&idx) => self.buckets[idx].members.push(item),
            None => {
                self.cells.insert(cell, self.buckets.len());
                self.buckets.push(Bucket {
                    members: vec![item],
                });
            }
        }
    }

    /// Number of non-empty cells
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn into_buckets(self) -> Vec<Bucket<T>> {
        self.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_floor_negative_positions() {
        let grid: ScreenGrid<()> = ScreenGrid::with_capacity(10.0, 4);
        assert_eq!(grid.to_cell(DVec2::new(0.0, 9.99)), (0, 0));
        assert_eq!(grid.to_cell(DVec2::new(-0.1, 10.0)), (-1, 1));
    }

    #[test]
    fn test_buckets_keep_first_encounter_order() {
        let mut grid = ScreenGrid::with_capacity(10.0, 4);
        grid.insert(DVec2::new(55.0, 5.0), 'a');
        grid.insert(DVec2::new(5.0, 5.0), 'b');
        grid.insert(DVec2::new(51.0, 9.0), 'c');
        assert_eq!(grid.len(), 2);

        let buckets = grid.into_buckets();
        assert_eq!(buckets[0].members, vec!['a', 'c']);
        assert_eq!(buckets[1].members, vec!['b']);
    }
}
