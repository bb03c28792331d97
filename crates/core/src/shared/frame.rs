use ndarray::{ArrayView3, ArrayViewMut3};

/// Bytes per pixel of every frame handed to the control loop (RGB24).
pub const CHANNELS: usize = 3;

/// One captured video frame: packed RGB24 rows, no stride padding.
///
/// Frames are transient. The capture adapter allocates one per tick and the
/// loop drops it once the tick's command has been decided.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A uniformly black frame, mostly useful for stubs and dry runs.
    pub fn blank(width: u32, height: u32, index: usize) -> Self {
        Self::new(
            vec![0; (width as usize) * (height as usize) * CHANNELS],
            width,
            height,
            index,
        )
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Horizontal pixel coordinate the controller steers toward.
    pub fn center_x(&self) -> i32 {
        (self.width / 2) as i32
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Writes one pixel, silently ignoring coordinates outside the frame.
    pub fn put_pixel(&mut self, x: i32, y: i32, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.data[offset..offset + CHANNELS].copy_from_slice(&rgb);
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}
