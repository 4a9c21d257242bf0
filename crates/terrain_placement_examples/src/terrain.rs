use glam::Vec2;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use terrain_placement::prelude::*;

/// Lowers a noise function towards the rim of a disc so the land sinks into the sea.
pub struct IslandFalloff<T> {
    source: T,
    center: [f64; 2],
    radius: f64,
}

impl<T> IslandFalloff<T> {
    pub fn new(source: T, center: [f64; 2], radius: f64) -> Self {
        Self {
            source,
            center,
            radius,
        }
    }

    /// Zero inside 60% of the radius, then a quadratic drop reaching 1.5 at the rim.
    pub fn offset(&self, point: [f64; 2]) -> f64 {
        let dx = point[0] - self.center[0];
        let dy = point[1] - self.center[1];
        let d = (dx * dx + dy * dy).sqrt() / self.radius.max(f64::EPSILON);
        if d < 0.6 {
            0.0
        } else {
            let t = (d - 0.6) / 0.4;
            1.5 * t * t
        }
    }
}

impl<T: NoiseFn<f64, 2>> NoiseFn<f64, 2> for IslandFalloff<T> {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.source.get(point) - self.offset(point)
    }
}

/// Adapts a `noise` function in roughly `[-1, 1]` to a [`HeightSource`] in `[0, 1]`.
pub struct NoiseHeight<N> {
    noise: N,
}

impl<N> NoiseHeight<N> {
    pub fn new(noise: N) -> Self {
        Self { noise }
    }
}

impl<N> HeightSource for NoiseHeight<N>
where
    N: NoiseFn<f64, 2> + Send + Sync,
{
    fn height_at(&self, p: Vec2) -> f32 {
        let v = self.noise.get([p.x as f64, p.y as f64]);
        ((v * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }
}

/// Bakes an island-shaped heightmap: fBm Perlin hills that sink into water towards the edges.
pub fn island_heights(map_extent: Vec2, resolution: usize, seed: u32) -> Result<HeightRaster> {
    let hills = Fbm::<Perlin>::new(seed)
        .set_octaves(5)
        .set_frequency(6.0 / map_extent.max_element().max(1.0) as f64)
        .set_persistence(0.5);
    let center = [map_extent.x as f64 * 0.5, map_extent.y as f64 * 0.5];
    let radius = map_extent.min_element() as f64 * 0.5;
    let source = NoiseHeight::new(IslandFalloff::new(hills, center, radius));
    HeightRaster::try_bake(&source, map_extent, resolution, resolution)
}
