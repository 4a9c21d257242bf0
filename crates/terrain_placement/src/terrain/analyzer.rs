//! Per-cell terrain analysis over a [`Grid`].
//!
//! Analysis runs in two passes:
//! 1. sample every cell (an `N x N` sub-sample lattice plus the cell center) and derive
//!    height statistics and the scalar slope;
//! 2. derive directional slopes and classify features from the completed neighbor data.
//!
//! Classification never reads a neighbor that has not been sampled yet, so cells on
//! the south and east borders are classified against real data.
//!
//! Invalid samples (non-finite or outside `[0, 1]`) do not abort the analysis. The first
//! one per cell is recorded in [`crate::grid::Cell::fault`] and the cell's terrain is left
//! zeroed; the pipeline turns those faults into per-request failures.
use glam::Vec2;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Error, HeightFault, Result};
use crate::grid::{Cell, Direction, Grid};
use crate::terrain::height::HeightSource;
use crate::terrain::{
    DirectionalSlopes, ElevationClass, TerrainFeatures, TerrainProperties, FLAT_SLOPE,
    STEEP_SLOPE,
};

/// Default sub-sample count per cell axis.
pub const DEFAULT_SUB_SAMPLES: usize = 5;

/// Summary of a terrain analysis pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisReport {
    /// Number of analyzed cells.
    pub cells: usize,
    /// Number of height samples taken.
    pub samples: usize,
    /// Cells with at least one invalid sample.
    pub faulted_cells: usize,
    /// First invalid sample in row-major order.
    pub first_fault: Option<HeightFault>,
    pub peaks: usize,
    pub valleys: usize,
    pub ridges: usize,
}

/// Samples a height source over the grid and classifies terrain features.
#[derive(Clone, Debug)]
pub struct TerrainAnalyzer {
    /// Sub-samples per cell axis (`N` in an `N x N` lattice).
    pub sub_samples: usize,
}

impl Default for TerrainAnalyzer {
    fn default() -> Self {
        Self {
            sub_samples: DEFAULT_SUB_SAMPLES,
        }
    }
}

struct Sampled {
    terrain: TerrainProperties,
    center_height: f32,
    fault: Option<HeightFault>,
}

impl TerrainAnalyzer {
    pub fn new(sub_samples: usize) -> Self {
        Self { sub_samples }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sub_samples == 0 {
            return Err(Error::InvalidConfig("sub_samples must be > 0".into()));
        }
        Ok(())
    }

    /// Populates the terrain of every cell in `grid`.
    pub fn analyze(&self, grid: &mut Grid, source: &dyn HeightSource) -> Result<AnalysisReport> {
        self.validate()?;

        let n = self.sub_samples;
        let cell_width = grid.cell_size().x;

        #[cfg(feature = "parallel")]
        let sampled: Vec<Sampled> = grid
            .cells()
            .par_iter()
            .map(|cell| sample_cell(cell, n, cell_width, source))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let sampled: Vec<Sampled> = grid
            .cells()
            .iter()
            .map(|cell| sample_cell(cell, n, cell_width, source))
            .collect();

        let mut report = AnalysisReport {
            cells: grid.len(),
            samples: grid.len() * (n * n + 1),
            ..Default::default()
        };

        let centers: Vec<f32> = sampled.iter().map(|s| s.center_height).collect();
        let heights: Vec<f32> = sampled.iter().map(|s| s.terrain.height).collect();

        for (cell, s) in grid.cells_mut().iter_mut().zip(sampled) {
            cell.terrain = s.terrain;
            cell.fault = s.fault;
            if let Some(fault) = s.fault {
                report.faulted_cells += 1;
                report.first_fault.get_or_insert(fault);
            }
        }

        // Second pass: every cell is populated, neighbors can be read safely.
        let diagonal = cell_width * std::f32::consts::SQRT_2;
        let mut classified = Vec::with_capacity(grid.len());
        for (idx, cell) in grid.cells().iter().enumerate() {
            let mut slopes = DirectionalSlopes::default();
            let mut higher_than_all = true;
            let mut lower_than_all = true;
            let mut neighbor_count = 0;

            for direction in Direction::ALL {
                let Some(nc) = grid.neighbor_coord(cell.coord, direction) else {
                    continue;
                };
                let Some(nidx) = grid.index_of(nc) else {
                    continue;
                };
                neighbor_count += 1;

                let distance = if direction.is_diagonal() {
                    diagonal
                } else {
                    cell_width
                };
                slopes.set(direction, (centers[nidx] - centers[idx]) / distance);

                let own = heights[idx];
                let other = heights[nidx];
                if own <= other {
                    higher_than_all = false;
                }
                if own >= other {
                    lower_than_all = false;
                }
            }

            let is_ridge = Direction::AXES.iter().any(|&(a, b)| {
                let (sa, sb) = (slopes.get(a), slopes.get(b));
                (sa > 0.0 && sb < 0.0) || (sa < 0.0 && sb > 0.0)
            });

            let t = &cell.terrain;
            let features = TerrainFeatures {
                is_peak: neighbor_count > 0 && higher_than_all,
                is_valley: neighbor_count > 0 && lower_than_all,
                is_ridge,
                is_flat: t.slope < FLAT_SLOPE,
                is_steep: t.slope > STEEP_SLOPE,
                elevation: ElevationClass::from_height(t.height),
            };
            classified.push((slopes, features));
        }

        for (cell, (slopes, features)) in grid.cells_mut().iter_mut().zip(classified) {
            if cell.fault.is_some() {
                continue;
            }
            cell.terrain.directional_slopes = slopes;
            cell.terrain.features = features;
            report.peaks += features.is_peak as usize;
            report.valleys += features.is_valley as usize;
            report.ridges += features.is_ridge as usize;
        }

        if let Some(fault) = report.first_fault {
            warn!(
                "Height source produced invalid samples in {} cell(s); first: {}.",
                report.faulted_cells, fault
            );
        }
        debug!(
            "Terrain analyzed: {} cells, {} peaks, {} valleys, {} ridges.",
            report.cells, report.peaks, report.valleys, report.ridges
        );

        Ok(report)
    }
}

fn sample_cell(cell: &Cell, n: usize, cell_width: f32, source: &dyn HeightSource) -> Sampled {
    let mut fault = None;
    let mut check = |p: Vec2| -> f32 {
        let value = source.height_at(p);
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            value
        } else {
            fault.get_or_insert(HeightFault {
                x: p.x,
                y: p.y,
                value,
            });
            0.0
        }
    };

    let mut sum = 0.0f32;
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let step = cell.size / n as f32;
    for j in 0..n {
        for i in 0..n {
            let p = cell.origin
                + Vec2::new((i as f32 + 0.5) * step.x, (j as f32 + 0.5) * step.y);
            let h = check(p);
            sum += h;
            min = min.min(h);
            max = max.max(h);
        }
    }
    let center_height = check(cell.center());

    if fault.is_some() {
        return Sampled {
            terrain: TerrainProperties::default(),
            center_height: 0.0,
            fault,
        };
    }

    Sampled {
        terrain: TerrainProperties {
            height: sum / (n * n) as f32,
            min_height: min,
            max_height: max,
            slope: (max - min) / cell_width,
            ..Default::default()
        },
        center_height,
        fault,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellCoord;
    use crate::terrain::height::{ConstantHeight, FnHeightSource};

    fn analyzed(size: usize, source: &dyn HeightSource) -> (Grid, AnalysisReport) {
        let mut grid = Grid::try_new(Vec2::new(size as f32, size as f32), size).unwrap();
        let report = TerrainAnalyzer::default()
            .analyze(&mut grid, source)
            .unwrap();
        (grid, report)
    }

    #[test]
    fn rejects_zero_sub_samples() {
        let mut grid = Grid::try_new(Vec2::new(4.0, 4.0), 2).unwrap();
        let err = TerrainAnalyzer::new(0)
            .analyze(&mut grid, &ConstantHeight(0.5))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn uniform_height_is_flat_everywhere() {
        let (grid, report) = analyzed(4, &ConstantHeight(0.5));
        assert_eq!(report.cells, 16);
        assert_eq!(report.samples, 16 * 26);
        for cell in grid.cells() {
            let t = &cell.terrain;
            assert_eq!(t.height, 0.5);
            assert_eq!(t.slope, 0.0);
            assert!(t.features.is_flat);
            assert!(!t.features.is_peak && !t.features.is_valley && !t.features.is_ridge);
            assert_eq!(t.features.elevation, ElevationClass::Midland);
            assert!(t.directional_slopes.iter().all(|(_, s)| s == 0.0));
        }
    }

    #[test]
    fn single_cell_is_neither_peak_nor_valley() {
        let src = FnHeightSource::new(|p: Vec2| 0.2 + 0.5 * p.x);
        let (grid, report) = analyzed(1, &src);
        let features = &grid.cells()[0].terrain.features;
        assert!(!features.is_peak && !features.is_valley && !features.is_ridge);
        assert_eq!((report.peaks, report.valleys, report.ridges), (0, 0, 0));
    }

    #[test]
    fn ramp_produces_signed_directional_slopes() {
        // Height rises eastwards by 0.1 per map unit; cells are 1 unit wide.
        let src = FnHeightSource::new(|p: Vec2| (p.x * 0.1).clamp(0.0, 1.0));
        let (grid, _) = analyzed(5, &src);
        let t = &grid.cell_at(CellCoord::new(2, 2)).unwrap().terrain;
        assert!((t.directional_slopes.get(Direction::East) - 0.1).abs() < 1e-5);
        assert!((t.directional_slopes.get(Direction::West) + 0.1).abs() < 1e-5);
        assert_eq!(t.directional_slopes.get(Direction::North), 0.0);
        let diag = 0.1 / std::f32::consts::SQRT_2;
        assert!((t.directional_slopes.get(Direction::NorthEast) - diag).abs() < 1e-5);
        // Slope proxy: (max - min) / width = 0.08 across the 5 sub-samples.
        assert!((t.slope - 0.08).abs() < 1e-5);
        // Uphill east, downhill west: the E/W axis has opposite signs.
        assert!(t.features.is_ridge);

        let west_edge = &grid.cell_at(CellCoord::new(0, 2)).unwrap().terrain;
        assert_eq!(west_edge.directional_slopes.get(Direction::West), 0.0);
    }

    #[test]
    fn classifies_peaks_and_valleys_at_bottom_right() {
        // Single bump in the south-east corner cell and a pit next to it.
        let src = FnHeightSource::new(|p: Vec2| {
            if p.x >= 3.0 && p.y >= 3.0 {
                0.9
            } else if p.x < 1.0 && p.y >= 3.0 {
                0.1
            } else {
                0.5
            }
        });
        let (grid, report) = analyzed(4, &src);
        let peak = &grid.cell_at(CellCoord::new(3, 3)).unwrap().terrain.features;
        assert!(peak.is_peak);
        assert_eq!(peak.elevation, ElevationClass::Highland);
        let valley = &grid.cell_at(CellCoord::new(0, 3)).unwrap().terrain.features;
        assert!(valley.is_valley);
        assert_eq!(report.peaks, 1);
        assert_eq!(report.valleys, 1);
    }

    #[test]
    fn ridge_detected_when_opposite_slopes_disagree() {
        // A north-south ridge along column 2.
        let src = FnHeightSource::new(|p: Vec2| if (2.0..3.0).contains(&p.x) { 0.8 } else { 0.3 });
        let (grid, _) = analyzed(5, &src);
        let west_of_ridge = &grid.cell_at(CellCoord::new(1, 2)).unwrap().terrain;
        // East goes uphill, west stays level: no ridge here.
        assert!(!west_of_ridge.features.is_ridge);
        let ridge_cell = &grid.cell_at(CellCoord::new(2, 2)).unwrap().terrain;
        // Both east and west go downhill: same sign, not a ridge either.
        assert!(!ridge_cell.features.is_ridge);

        // Uphill to the north, downhill to the south.
        let tilted = FnHeightSource::new(|p: Vec2| (0.8 - p.y * 0.1).max(0.0));
        let (grid, _) = analyzed(3, &tilted);
        assert!(grid.cell_at(CellCoord::new(1, 1)).unwrap().terrain.features.is_ridge);
        // Corner cells lack one side of every axis.
        assert!(!grid.cell_at(CellCoord::new(0, 0)).unwrap().terrain.features.is_ridge);
    }

    #[test]
    fn invalid_samples_are_recorded_not_fatal() {
        let src = FnHeightSource::new(|p: Vec2| if p.x > 3.0 { f32::NAN } else { 0.5 });
        let (grid, report) = analyzed(4, &src);
        assert_eq!(report.faulted_cells, 4);
        let fault = report.first_fault.expect("fault recorded");
        assert!(fault.value.is_nan());
        assert!(grid.cell_at(CellCoord::new(3, 0)).unwrap().fault.is_some());
        assert!(grid.cell_at(CellCoord::new(0, 0)).unwrap().fault.is_none());

        let out_of_range = FnHeightSource::new(|_| 1.5);
        let (_, report) = analyzed(2, &out_of_range);
        assert_eq!(report.faulted_cells, 4);
    }
}
