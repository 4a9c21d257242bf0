//! Binary placement masks.
use glam::Vec2;

use crate::grid::{CellCoord, Grid};
use crate::rules::ObjectTypeId;

/// Per-cell permission bitmap for one object type.
///
/// Values are stored row-major as `0` or `1`, in the same lattice as the
/// [`Grid`] that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementMask {
    /// Object type this mask belongs to. Empty until assigned by the pipeline.
    pub object_type: ObjectTypeId,
    /// Map extent of the originating grid.
    pub map_extent: Vec2,
    /// Cells per axis.
    pub grid_size: usize,
    data: Vec<u8>,
}

impl PlacementMask {
    /// An all-zero mask shaped like `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        Self {
            object_type: ObjectTypeId::new(),
            map_extent: grid.map_extent(),
            grid_size: grid.grid_size(),
            data: vec![0; grid.len()],
        }
    }

    pub fn with_object_type(mut self, object_type: impl Into<ObjectTypeId>) -> Self {
        self.object_type = object_type.into();
        self
    }

    /// Number of cells in the mask.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major values, each `0` or `1`.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn is_set_index(&self, index: usize) -> bool {
        self.data.get(index).is_some_and(|v| *v != 0)
    }

    pub fn is_set(&self, coord: CellCoord) -> bool {
        coord.x < self.grid_size
            && coord.y < self.grid_size
            && self.is_set_index(coord.y * self.grid_size + coord.x)
    }

    /// Marks a cell as permitted. Out-of-range indices are ignored.
    #[inline]
    pub fn set_index(&mut self, index: usize) {
        if let Some(v) = self.data.get_mut(index) {
            *v = 1;
        }
    }

    /// Clears a cell. Only post-processing passes should need this.
    #[inline]
    pub fn clear_index(&mut self, index: usize) {
        if let Some(v) = self.data.get_mut(index) {
            *v = 0;
        }
    }

    /// Number of permitted cells.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|v| **v != 0).count()
    }

    /// Row-major indices of permitted cells.
    pub fn set_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(i, _)| i)
    }

    /// Looks up the mask at a map-space position; `false` outside the map.
    pub fn sample_domain(&self, p: Vec2) -> bool {
        if self.grid_size == 0
            || !p.is_finite()
            || p.x < 0.0
            || p.y < 0.0
            || p.x >= self.map_extent.x
            || p.y >= self.map_extent.y
        {
            return false;
        }
        let last = self.grid_size - 1;
        let x = ((p.x / self.map_extent.x * self.grid_size as f32) as usize).min(last);
        let y = ((p.y / self.map_extent.y * self.grid_size as f32) as usize).min(last);
        self.is_set_index(y * self.grid_size + x)
    }

    /// Grayscale bytes (`0` or `255`), row-major, for rasterization.
    pub fn to_luma8(&self) -> Vec<u8> {
        self.data.iter().map(|v| if *v != 0 { 255 } else { 0 }).collect()
    }
}
