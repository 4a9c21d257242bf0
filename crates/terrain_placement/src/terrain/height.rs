//! Height sources sampled by the terrain analyzer.
//!
//! A height source is a pure, total function over the map extent returning a value
//! in `[0, 1]`. Define custom sources by implementing [`HeightSource`], or use:
//! - [`FnHeightSource`] to wrap a closure,
//! - [`ConstantHeight`] for a flat map,
//! - [`HeightRaster`] for a sampled heightmap with bilinear interpolation.
use glam::Vec2;

use crate::error::{Error, Result};

/// Trait for continuous height fields sampled at a map-space position.
pub trait HeightSource: Send + Sync {
    fn height_at(&self, p: Vec2) -> f32;
}

/// Height source backed by a closure.
pub struct FnHeightSource<F>
where
    F: Fn(Vec2) -> f32 + Send + Sync,
{
    f: F,
}

impl<F> FnHeightSource<F>
where
    F: Fn(Vec2) -> f32 + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> HeightSource for FnHeightSource<F>
where
    F: Fn(Vec2) -> f32 + Send + Sync,
{
    #[inline]
    fn height_at(&self, p: Vec2) -> f32 {
        (self.f)(p)
    }
}

/// The same height everywhere.
#[derive(Clone, Copy, Debug)]
pub struct ConstantHeight(pub f32);

impl HeightSource for ConstantHeight {
    #[inline]
    fn height_at(&self, _p: Vec2) -> f32 {
        self.0
    }
}

/// Row-major height samples spanning the map extent.
///
/// Sample `(0, 0)` sits at the map origin and sample `(width - 1, height - 1)` at the
/// far corner; positions in between are bilinearly interpolated and positions
/// outside are clamped to the border.
#[derive(Clone, Debug)]
pub struct HeightRaster {
    pub map_extent: Vec2,
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl HeightRaster {
    pub fn try_new(map_extent: Vec2, width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig(
                "height raster dimensions must be > 0".into(),
            ));
        }
        if data.len() != width * height {
            return Err(Error::InvalidConfig(format!(
                "height raster expects {} samples, got {}",
                width * height,
                data.len()
            )));
        }
        if !map_extent.is_finite() || map_extent.x <= 0.0 || map_extent.y <= 0.0 {
            return Err(Error::InvalidConfig(
                "height raster extent must be finite and > 0".into(),
            ));
        }
        Ok(Self {
            map_extent,
            width,
            height,
            data,
        })
    }

    /// Bakes any height source into a raster of `width x height` samples.
    ///
    /// Fails with [`Error::InvalidConfig`] under the same conditions as [`Self::try_new`].
    pub fn try_bake(
        source: &dyn HeightSource,
        map_extent: Vec2,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig(
                "height raster dimensions must be > 0".into(),
            ));
        }
        let step = Vec2::new(
            map_extent.x / (width.max(2) - 1) as f32,
            map_extent.y / (height.max(2) - 1) as f32,
        );
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(source.height_at(Vec2::new(x as f32 * step.x, y as f32 * step.y)));
            }
        }
        Self::try_new(map_extent, width, height, data)
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

impl HeightSource for HeightRaster {
    fn height_at(&self, p: Vec2) -> f32 {
        let fx = if self.width > 1 {
            (p.x / self.map_extent.x).clamp(0.0, 1.0) * (self.width - 1) as f32
        } else {
            0.0
        };
        let fy = if self.height > 1 {
            (p.y / self.map_extent.y).clamp(0.0, 1.0) * (self.height - 1) as f32
        } else {
            0.0
        };

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let a = self.get(x0, y0) * (1.0 - tx) + self.get(x1, y0) * tx;
        let b = self.get(x0, y1) * (1.0 - tx) + self.get(x1, y1) * tx;
        a * (1.0 - ty) + b * ty
    }
}
