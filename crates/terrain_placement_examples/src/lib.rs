#![forbid(unsafe_code)]

mod rendering;
mod terrain;

pub use rendering::{
    init_tracing, render_height_to_png, render_mask_to_png, render_result_to_png, MaskStyle,
    RenderConfig,
};
pub use terrain::{island_heights, IslandFalloff, NoiseHeight};
