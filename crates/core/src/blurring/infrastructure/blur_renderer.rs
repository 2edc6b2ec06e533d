use std::cell::RefCell;
use std::collections::HashMap;

use crate::blurring::domain::frame_renderer::FrameRenderer;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::gaussian::{self, RoiRect};

/// Lower bound on the per-face blur radius in pixels.
const MIN_FILTER_SIZE: i32 = 4;

/// Upper bound on the per-face blur radius in pixels.
const MAX_FILTER_SIZE: i32 = 1024;

/// A face's blur radius is its larger dimension divided by this.
const FACE_FILTER_DIVISOR: f64 = 20.0;

/// Rectangular Gaussian blur over each face box, in-place.
///
/// The blur radius scales with the face so close-up faces get blurred as
/// strongly as distant ones, multiplied by a user-facing `strength` knob.
/// Kernels are cached per size since a video tends to reuse a handful of
/// face scales. Buffers are reused across faces and frames.
pub struct BlurRenderer {
    strength: f64,
    kernels: RefCell<HashMap<usize, Vec<f32>>>,
    roi_buf: RefCell<Vec<u8>>,
    blur_temp: RefCell<Vec<f32>>,
}

impl BlurRenderer {
    pub fn new(strength: f64) -> Self {
        Self {
            strength,
            kernels: RefCell::new(HashMap::new()),
            roi_buf: RefCell::new(Vec::new()),
            blur_temp: RefCell::new(Vec::new()),
        }
    }

    /// Kernel size for a face: `max(w, h) / 20 * strength` as a radius,
    /// clamped, then widened to an odd full kernel.
    fn kernel_size_for(&self, face: &FaceBox) -> usize {
        let largest = (face.width().max(face.height()) + 1) as f64;
        let radius = ((largest / FACE_FILTER_DIVISOR * self.strength).round() as i32)
            .clamp(MIN_FILTER_SIZE, MAX_FILTER_SIZE);
        (radius as usize) * 2 + 1
    }
}

impl Default for BlurRenderer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FrameRenderer for BlurRenderer {
    fn render(
        &self,
        frame: &mut Frame,
        faces: &[FaceBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let fw = frame.width();
        let fh = frame.height();
        let frame_width = fw as usize;
        let channels = frame.channels() as usize;

        for face in faces {
            let Some(clamped) = face.clamp_to(fw, fh) else {
                continue;
            };
            let kernel_size = self.kernel_size_for(face);

            let mut kernels = self.kernels.borrow_mut();
            let kernel = kernels
                .entry(kernel_size)
                .or_insert_with(|| gaussian::gaussian_kernel_1d(kernel_size));

            let rect = RoiRect {
                x: clamped.left as usize,
                y: clamped.top as usize,
                w: (clamped.width() + 1) as usize,
                h: (clamped.height() + 1) as usize,
            };

            let data = frame.data_mut();
            let mut roi = self.roi_buf.borrow_mut();
            let mut temp = self.blur_temp.borrow_mut();
            gaussian::extract_roi(data, frame_width, channels, rect, &mut roi);
            gaussian::separable_gaussian_blur_with_kernel(
                &mut roi, rect.w, rect.h, channels, kernel, &mut temp,
            );
            gaussian::write_roi_back(data, &roi, frame_width, channels, rect);
        }

        Ok(())
    }
}
