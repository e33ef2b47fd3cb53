pub mod digits;
pub mod render;
mod scenes;

pub use render::{FrameStats, SceneRenderer, SkiaRenderer};
