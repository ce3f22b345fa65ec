/// Software rendering backend: framebuffer, textures and the rasterizer
/// that runs programs.
pub mod framebuffer;
pub mod rasterizer;
pub mod texture;

pub use framebuffer::{blend_over, pack_color, rgb_to_u32, unpack_color, FrameSlice, Framebuffer};
pub use rasterizer::{attachment_depth, DrawStats, RasterConfig, Rasterizer};
pub use texture::Texture;
