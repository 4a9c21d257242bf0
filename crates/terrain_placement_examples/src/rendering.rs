use std::collections::BTreeMap;
use std::path::Path;

use image::{GrayImage, Rgb, RgbImage};
use terrain_placement::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a compact fmt subscriber; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// How a mask is drawn on top of the shaded terrain.
#[derive(Clone, Copy, Debug)]
pub struct MaskStyle {
    pub color: [u8; 3],
    /// Blend factor in `[0, 1]`.
    pub opacity: f32,
}

impl MaskStyle {
    pub fn solid(color: [u8; 3]) -> Self {
        Self {
            color,
            opacity: 1.0,
        }
    }
}

pub struct RenderConfig {
    /// Pixels per grid cell.
    pub scale: u32,
    pub styles: BTreeMap<ObjectTypeId, MaskStyle>,
}

impl RenderConfig {
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
            styles: BTreeMap::new(),
        }
    }

    pub fn with_style(mut self, object_type: impl Into<ObjectTypeId>, style: MaskStyle) -> Self {
        self.styles.insert(object_type.into(), style);
        self
    }
}

fn terrain_color(t: &TerrainProperties) -> [u8; 3] {
    let h = t.height;
    let base: [f32; 3] = if t.is_deep_water() {
        [20.0, 50.0, 120.0]
    } else if t.is_water() {
        [40.0, 90.0, 170.0]
    } else {
        match t.features.elevation {
            ElevationClass::Lowland => [190.0, 180.0, 120.0],
            ElevationClass::Midland => [90.0, 140.0, 70.0],
            ElevationClass::Highland => [130.0, 120.0, 110.0],
        }
    };
    let shade = 0.6 + 0.4 * h;
    base.map(|c| (c * shade).clamp(0.0, 255.0) as u8)
}

fn blend(under: [u8; 3], over: [u8; 3], alpha: f32) -> [u8; 3] {
    let a = alpha.clamp(0.0, 1.0);
    std::array::from_fn(|i| (under[i] as f32 * (1.0 - a) + over[i] as f32 * a) as u8)
}

/// Shaded terrain with every styled mask composited on top.
pub fn render_result_to_png(
    grid: &Grid,
    result: &PlacementResult,
    config: &RenderConfig,
    out: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let size = grid.grid_size() as u32;
    let scale = config.scale;
    let mut img = RgbImage::new(size * scale, size * scale);

    for (idx, cell) in grid.cells().iter().enumerate() {
        let mut color = terrain_color(&cell.terrain);
        for (object_type, style) in &config.styles {
            if result
                .mask(object_type)
                .is_some_and(|mask| mask.is_set_index(idx))
            {
                color = blend(color, style.color, style.opacity);
            }
        }
        let (x, y) = (cell.coord.x as u32, cell.coord.y as u32);
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(x * scale + dx, y * scale + dy, Rgb(color));
            }
        }
    }

    img.save(out.as_ref())?;
    info!("Wrote {}", out.as_ref().display());
    Ok(())
}

/// A single mask as a black and white image, one pixel per cell.
pub fn render_mask_to_png(mask: &PlacementMask, out: impl AsRef<Path>) -> anyhow::Result<()> {
    let size = mask.grid_size as u32;
    let img = GrayImage::from_raw(size, size, mask.to_luma8())
        .ok_or_else(|| anyhow::anyhow!("mask buffer does not match {size}x{size}"))?;
    img.save(out.as_ref())?;
    info!("Wrote {}", out.as_ref().display());
    Ok(())
}

/// Cell heights as grayscale, one pixel per cell.
pub fn render_height_to_png(grid: &Grid, out: impl AsRef<Path>) -> anyhow::Result<()> {
    let size = grid.grid_size() as u32;
    let bytes = grid
        .cells()
        .iter()
        .map(|c| (c.terrain.height.clamp(0.0, 1.0) * 255.0) as u8)
        .collect();
    let img = GrayImage::from_raw(size, size, bytes)
        .ok_or_else(|| anyhow::anyhow!("height buffer does not match {size}x{size}"))?;
    img.save(out.as_ref())?;
    info!("Wrote {}", out.as_ref().display());
    Ok(())
}
