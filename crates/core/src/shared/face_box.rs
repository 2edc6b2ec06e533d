use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("invalid box geometry: left={left} right={right} top={top} bottom={bottom}")]
    InvalidGeometry {
        top: i32,
        left: i32,
        right: i32,
        bottom: i32,
    },
}

/// An axis-aligned face bounding box in image pixel coordinates.
///
/// Coordinates are inclusive: a box with `left == right` still covers one
/// pixel column. Immutable value type, copied freely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FaceBox {
    pub top: i32,
    pub left: i32,
    pub right: i32,
    pub bottom: i32,
}

impl FaceBox {
    pub fn new(top: i32, left: i32, right: i32, bottom: i32) -> Result<Self, GeometryError> {
        if left > right || top > bottom {
            return Err(GeometryError::InvalidGeometry {
                top,
                left,
                right,
                bottom,
            });
        }
        Ok(Self {
            top,
            left,
            right,
            bottom,
        })
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Area under the inclusive-pixel convention: a degenerate box still
    /// covers one pixel.
    pub fn area(&self) -> i64 {
        (self.bottom - self.top + 1) as i64 * (self.right - self.left + 1) as i64
    }

    /// Overlapping region of two boxes, or `None` when they are disjoint.
    pub fn intersect(&self, other: &FaceBox) -> Option<FaceBox> {
        let top = self.top.max(other.top);
        let left = self.left.max(other.left);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);

        if left > right || top > bottom {
            return None;
        }

        Some(FaceBox {
            top,
            left,
            right,
            bottom,
        })
    }

    /// Smallest box covering both inputs.
    pub fn union(&self, other: &FaceBox) -> FaceBox {
        FaceBox {
            top: self.top.min(other.top),
            left: self.left.min(other.left),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Intersection over union in `[0, 1]`; 0 for disjoint boxes.
    ///
    /// The union area of two valid boxes is always positive, so this never
    /// divides by zero.
    pub fn intersection_over_union(&self, other: &FaceBox) -> f64 {
        let Some(intersection) = self.intersect(other) else {
            return 0.0;
        };

        let intersection_area = intersection.area();
        let union_area = self.area() + other.area() - intersection_area;
        intersection_area as f64 / union_area as f64
    }

    /// Per-coordinate linear blend between two boxes at `t` in `[0, 1]`.
    ///
    /// Monotonic interpolation of two valid boxes cannot produce a
    /// degenerate box, so the result is constructed directly.
    pub fn lerp(a: &FaceBox, b: &FaceBox, t: f64) -> FaceBox {
        fn blend(a: i32, b: i32, t: f64) -> i32 {
            (a as f64 + (b as f64 - a as f64) * t) as i32
        }

        FaceBox {
            top: blend(a.top, b.top, t),
            left: blend(a.left, b.left, t),
            right: blend(a.right, b.right, t),
            bottom: blend(a.bottom, b.bottom, t),
        }
    }

    /// Clamps the box to `[0, width) x [0, height)`, or `None` when the box
    /// lies entirely outside the frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<FaceBox> {
        let frame = FaceBox {
            top: 0,
            left: 0,
            right: width as i32 - 1,
            bottom: height as i32 - 1,
        };
        self.intersect(&frame)
    }
}
