use crate::blurring::domain::frame_renderer::FrameRenderer;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

const OUTLINE_COLOR: [u8; 3] = [255, 0, 0];
const OUTLINE_WIDTH: i32 = 3;

/// Draws a red rectangle outline around each face instead of obscuring it.
/// Meant for inspecting detector and tracking output, not for release.
pub struct DebugRenderer;

impl DebugRenderer {
    fn draw_row(frame: &mut Frame, y: i32, left: i32, right: i32) {
        let fw = frame.width() as i32;
        let fh = frame.height() as i32;
        if y < 0 || y >= fh {
            return;
        }
        let channels = frame.channels() as usize;
        let data = frame.data_mut();
        for x in left.max(0)..=right.min(fw - 1) {
            let idx = (y as usize * fw as usize + x as usize) * channels;
            data[idx..idx + 3].copy_from_slice(&OUTLINE_COLOR);
        }
    }

    fn draw_column(frame: &mut Frame, x: i32, top: i32, bottom: i32) {
        let fw = frame.width() as i32;
        let fh = frame.height() as i32;
        if x < 0 || x >= fw {
            return;
        }
        let channels = frame.channels() as usize;
        let data = frame.data_mut();
        for y in top.max(0)..=bottom.min(fh - 1) {
            let idx = (y as usize * fw as usize + x as usize) * channels;
            data[idx..idx + 3].copy_from_slice(&OUTLINE_COLOR);
        }
    }
}

impl FrameRenderer for DebugRenderer {
    fn render(
        &self,
        frame: &mut Frame,
        faces: &[FaceBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        for face in faces {
            for offset in 0..OUTLINE_WIDTH {
                // Outline grows inward so it stays on the face.
                Self::draw_row(frame, face.top + offset, face.left, face.right);
                Self::draw_row(frame, face.bottom - offset, face.left, face.right);
                Self::draw_column(frame, face.left + offset, face.top, face.bottom);
                Self::draw_column(frame, face.right - offset, face.top, face.bottom);
            }
        }
        Ok(())
    }
}
