use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for de-identifying face areas within a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`) to avoid
/// allocation. Boxes may extend past the frame edges; implementations clamp
/// before touching pixels.
pub trait FrameRenderer: Send {
    fn render(&self, frame: &mut Frame, faces: &[FaceBox])
        -> Result<(), Box<dyn std::error::Error>>;
}
