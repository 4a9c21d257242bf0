//! Uniform cell lattice over a rectangular map.
//!
//! This module defines [`Grid`], [`Cell`] and [`CellCoord`]. The map covers
//! `[0, width) x [0, height)` in map units and is split into `grid_size x grid_size`
//! identical cells stored row-major. Cells never reference each other; all
//! neighbor and radius lookups go through the grid by coordinate arithmetic.
//!
//! Spatial queries never fail: out-of-bounds or degenerate inputs yield `None`
//! or an empty result.
use glam::Vec2;

use crate::error::{Error, HeightFault, Result};
use crate::terrain::TerrainProperties;

mod direction;

pub use direction::Direction;

/// Integer coordinates of a cell in the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

impl CellCoord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A single lattice cell with its spatial bounds and analyzed terrain.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Lattice coordinates.
    pub coord: CellCoord,
    /// Map-space position of the cell's lower corner.
    pub origin: Vec2,
    /// Cell extent in map units.
    pub size: Vec2,
    /// Terrain properties, populated by [`crate::terrain::analyzer::TerrainAnalyzer`].
    pub terrain: TerrainProperties,
    /// First invalid height sample seen while analyzing this cell, if any.
    pub fault: Option<HeightFault>,
}

impl Cell {
    /// Map-space center of the cell.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Returns `true` if `p` lies inside the half-open cell bounds.
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.origin + self.size;
        p.x >= self.origin.x && p.y >= self.origin.y && p.x < max.x && p.y < max.y
    }
}

/// A `grid_size x grid_size` lattice over a `width x height` map.
#[derive(Clone, Debug)]
pub struct Grid {
    map_extent: Vec2,
    grid_size: usize,
    cell_size: Vec2,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds a grid, validating that the extent is finite and positive and `grid_size > 0`.
    pub fn try_new(map_extent: Vec2, grid_size: usize) -> Result<Self> {
        if !map_extent.is_finite() || map_extent.x <= 0.0 || map_extent.y <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "map extent must be finite and > 0 in both components, got ({}, {})",
                map_extent.x, map_extent.y
            )));
        }
        if grid_size == 0 {
            return Err(Error::InvalidConfig("grid_size must be > 0".into()));
        }

        let cell_size = map_extent / grid_size as f32;
        let mut cells = Vec::with_capacity(grid_size * grid_size);
        for y in 0..grid_size {
            for x in 0..grid_size {
                cells.push(Cell {
                    coord: CellCoord::new(x, y),
                    origin: Vec2::new(x as f32 * cell_size.x, y as f32 * cell_size.y),
                    size: cell_size,
                    terrain: TerrainProperties::default(),
                    fault: None,
                });
            }
        }

        Ok(Self {
            map_extent,
            grid_size,
            cell_size,
            cells,
        })
    }

    /// Map extent `(width, height)` in map units.
    pub fn map_extent(&self) -> Vec2 {
        self.map_extent
    }

    /// Number of cells along each axis.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Size of every cell in map units.
    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Row-major index of `coord`, or `None` when out of bounds.
    #[inline]
    pub fn index_of(&self, coord: CellCoord) -> Option<usize> {
        if coord.x < self.grid_size && coord.y < self.grid_size {
            Some(coord.y * self.grid_size + coord.x)
        } else {
            None
        }
    }

    /// Coordinates for a row-major index. Panics in debug builds if out of range.
    #[inline]
    pub fn coord_of(&self, index: usize) -> CellCoord {
        debug_assert!(index < self.cells.len(), "cell index out of range");
        CellCoord::new(index % self.grid_size, index / self.grid_size)
    }

    /// Cell at the given coordinates.
    pub fn cell_at(&self, coord: CellCoord) -> Option<&Cell> {
        self.index_of(coord).map(|i| &self.cells[i])
    }

    /// Cell containing a map-space point, or `None` if the point is outside the map.
    pub fn cell_at_point(&self, p: Vec2) -> Option<&Cell> {
        self.coord_at_point(p).and_then(|c| self.cell_at(c))
    }

    /// Coordinates of the cell containing `p`.
    pub fn coord_at_point(&self, p: Vec2) -> Option<CellCoord> {
        if !p.is_finite()
            || p.x < 0.0
            || p.y < 0.0
            || p.x >= self.map_extent.x
            || p.y >= self.map_extent.y
        {
            return None;
        }
        let ix = ((p.x / self.cell_size.x) as usize).min(self.grid_size - 1);
        let iy = ((p.y / self.cell_size.y) as usize).min(self.grid_size - 1);
        Some(CellCoord::new(ix, iy))
    }

    /// Coordinates of the neighbor in `direction`, if it exists.
    #[inline]
    pub fn neighbor_coord(&self, coord: CellCoord, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.offset();
        let nx = coord.x.checked_add_signed(dx)?;
        let ny = coord.y.checked_add_signed(dy)?;
        if nx < self.grid_size && ny < self.grid_size {
            Some(CellCoord::new(nx, ny))
        } else {
            None
        }
    }

    /// Neighbor cell in `direction`, if it exists.
    pub fn neighbor(&self, coord: CellCoord, direction: Direction) -> Option<&Cell> {
        self.neighbor_coord(coord, direction)
            .and_then(|c| self.cell_at(c))
    }

    /// Row-major indices of the existing Moore neighbors of `coord`.
    pub fn neighbor_indices(&self, coord: CellCoord) -> impl Iterator<Item = usize> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.neighbor_coord(coord, d))
            .map(move |c| c.y * self.grid_size + c.x)
    }

    /// The 8-connected Moore neighborhood of `coord`, without wrapping.
    pub fn neighbors(&self, coord: CellCoord) -> Vec<&Cell> {
        self.neighbor_indices(coord).map(|i| &self.cells[i]).collect()
    }

    /// All cells whose center lies within `radius` of `center`.
    ///
    /// The search is first bounded to a box of `ceil(radius / min(cell_w, cell_h))`
    /// cells around the cell containing `center`, then filtered by exact distance.
    /// Cells are returned in row-major order.
    pub fn cells_in_radius(&self, center: Vec2, radius: f32) -> Vec<&Cell> {
        self.indices_in_radius(center, radius)
            .into_iter()
            .map(|i| &self.cells[i])
            .collect()
    }

    /// Row-major indices of the cells returned by [`Grid::cells_in_radius`].
    pub fn indices_in_radius(&self, center: Vec2, radius: f32) -> Vec<usize> {
        if !center.is_finite() || !radius.is_finite() || radius < 0.0 {
            return Vec::new();
        }

        let min_cell = self.cell_size.x.min(self.cell_size.y);
        let span = (radius / min_cell).ceil() as isize;
        let cx = (center.x / self.cell_size.x).floor() as isize;
        let cy = (center.y / self.cell_size.y).floor() as isize;

        let last = self.grid_size as isize - 1;
        let x0 = cx.saturating_sub(span).max(0);
        let x1 = cx.saturating_add(span).min(last);
        let y0 = cy.saturating_sub(span).max(0);
        let y1 = cy.saturating_add(span).min(last);
        if x0 > x1 || y0 > y1 {
            return Vec::new();
        }

        let r2 = radius * radius;
        let mut out = Vec::new();
        for y in y0..=y1 {
            let row = y as usize * self.grid_size;
            for x in x0..=x1 {
                let idx = row + x as usize;
                if self.cells[idx].center().distance_squared(center) <= r2 {
                    out.push(idx);
                }
            }
        }
        out
    }
}
