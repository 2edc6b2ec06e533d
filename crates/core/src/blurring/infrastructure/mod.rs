pub mod blur_renderer;
pub mod debug_renderer;
mod gaussian;

use crate::blurring::domain::frame_renderer::FrameRenderer;

use blur_renderer::BlurRenderer;
use debug_renderer::DebugRenderer;

/// How detected faces are rendered into the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Gaussian-blur each face area (the release behavior).
    Blur,
    /// Outline each face instead, for inspecting detection quality.
    Debug,
}

pub fn create_renderer(mode: RenderMode, strength: f64) -> Box<dyn FrameRenderer> {
    match mode {
        RenderMode::Blur => Box::new(BlurRenderer::new(strength)),
        RenderMode::Debug => Box::new(DebugRenderer),
    }
}
