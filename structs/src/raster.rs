use serde::{Deserialize, Serialize};
use tinyvec::TinyVec;

use crate::Position;

/// Index of a raster cell. Only meaningful together with the raster it came from.
#[derive(Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

/// A rectangular grid with an affine cell-to-world mapping.
///
/// Cell (0, 0) is centered on world point (x_offset, y_offset) and cells are
/// square with side `cell_width`. Data is stored x-major.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Raster<T> {
    data: Vec<T>,
    pub x_width: usize,
    pub y_height: usize,
    pub x_offset: f64,
    pub y_offset: f64,
    pub cell_width: f64,
}

impl<T: Copy> Raster<T> {
    /// Raster taking ownership of a flat x-major buffer.
    pub fn from_data(
        data: Vec<T>,
        x_width: usize,
        y_height: usize,
        x_offset: f64,
        y_offset: f64,
        cell_width: f64,
    ) -> Self {
        assert!(data.len() == x_width * y_height);
        assert!(cell_width > 0.0);
        Raster { data, x_width, y_height, x_offset, y_offset, cell_width }
    }

    /// Raster copying a borrowed flat x-major buffer.
    pub fn from_slice(
        data: &[T],
        x_width: usize,
        y_height: usize,
        x_offset: f64,
        y_offset: f64,
        cell_width: f64,
    ) -> Self {
        Self::from_data(data.to_vec(), x_width, y_height, x_offset, y_offset, cell_width)
    }

    /// Freshly allocated raster with every cell set to `value`.
    pub fn fill(
        value: T,
        x_width: usize,
        y_height: usize,
        x_offset: f64,
        y_offset: f64,
        cell_width: f64,
    ) -> Self {
        Self::from_data(vec![value; x_width * y_height], x_width, y_height, x_offset, y_offset, cell_width)
    }

    /// Raster with the same shape and mapping as `other`, every cell set to `value`.
    pub fn fill_like<U: Copy>(value: T, other: &Raster<U>) -> Self {
        Self::fill(value, other.x_width, other.y_height, other.x_offset, other.y_offset, other.cell_width)
    }

    pub fn get(&self, cell: Cell) -> T {
        assert!(self.is_in(cell), "raster access out of bounds: {:?}", cell);
        self.data[cell.x * self.y_height + cell.y]
    }

    pub fn set(&mut self, cell: Cell, value: T) {
        assert!(self.is_in(cell), "raster access out of bounds: {:?}", cell);
        self.data[cell.x * self.y_height + cell.y] = value;
    }

    pub fn is_in(&self, cell: Cell) -> bool {
        cell.x < self.x_width && cell.y < self.y_height
    }

    pub fn is_in_position(&self, pos: &Position) -> bool {
        let half = self.cell_width / 2.0;
        pos.x >= self.x_offset - half
            && pos.x <= self.x_offset + self.cell_width * (self.x_width as f64 - 1.0) + half
            && pos.y >= self.y_offset - half
            && pos.y <= self.y_offset + self.cell_width * (self.y_height as f64 - 1.0) + half
    }

    pub fn x_coord(&self, x_index: usize) -> f64 {
        self.x_offset + self.cell_width * x_index as f64
    }

    pub fn y_coord(&self, y_index: usize) -> f64 {
        self.y_offset + self.cell_width * y_index as f64
    }

    pub fn x_index(&self, x_coord: f64) -> usize {
        ((x_coord - self.x_offset) / self.cell_width).round() as usize
    }

    pub fn y_index(&self, y_coord: f64) -> usize {
        ((y_coord - self.y_offset) / self.cell_width).round() as usize
    }

    pub fn as_cell(&self, pos: &Position) -> Cell {
        assert!(self.is_in_position(pos), "position outside raster: {:?}", pos);
        Cell { x: self.x_index(pos.x), y: self.y_index(pos.y) }
    }

    pub fn as_position(&self, cell: Cell) -> Position {
        assert!(self.is_in(cell));
        Position { x: self.x_coord(cell.x), y: self.y_coord(cell.y) }
    }

    /// The 8-connected neighbors of `cell` that lie inside the grid.
    pub fn neighbor_cells(&self, cell: Cell) -> TinyVec<[Cell; 8]> {
        let mut neighbors: TinyVec<[Cell; 8]> = Default::default();
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = cell.x as i64 + dx;
                let ny = cell.y as i64 + dy;
                if nx >= 0 && (nx as usize) < self.x_width && ny >= 0 && (ny as usize) < self.y_height {
                    neighbors.push(Cell { x: nx as usize, y: ny as usize });
                }
            }
        }
        neighbors
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.x_width).flat_map(move |x| (0..self.y_height).map(move |y| Cell { x, y }))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}
