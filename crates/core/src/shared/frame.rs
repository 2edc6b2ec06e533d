use ndarray::ArrayView3;

/// A single decoded video/image frame: contiguous RGB bytes in row-major
/// order, tagged with the container stream it came from and its zero-based
/// decode-order index within that stream.
///
/// Format conversion happens at I/O boundaries only; everything above the
/// adapters treats pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    stream_index: usize,
    index: usize,
}

impl Frame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        stream_index: usize,
        index: usize,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            stream_index,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Detection-pass key: `(stream, frame_index)`.
    pub fn key(&self) -> (usize, usize) {
        (self.stream_index, self.index)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                self.channels as usize,
            ),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }
}
