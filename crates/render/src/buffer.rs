use cubecast_common::Resolution;

/// Flat RGB pixel buffer, row-major, three bytes per pixel.
///
/// # Invariants
/// - `pixels.len() == width * height * 3` at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            width: resolution.width,
            height: resolution.height,
            pixels: vec![0; resolution.byte_len()],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Flood the whole buffer with one color.
    pub fn fill(&mut self, color: [u8; 3]) {
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&color);
        }
    }

    /// Write one pixel. Out-of-bounds coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y * self.width + x) as usize * 3;
        self.pixels[idx..idx + 3].copy_from_slice(&color);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) as usize * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// Fill a rectangle given in signed pixel coordinates, clipped to the
    /// buffer. Empty and fully off-screen rectangles are no-ops.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: [u8; 3]) {
        let x0 = x0.max(0) as u32;
        let y0 = y0.max(0) as u32;
        let x1 = (x1.max(0) as u32).min(self.width);
        let y1 = (y1.max(0) as u32).min(self.height);
        for y in y0..y1 {
            let row = (y * self.width + x0) as usize * 3;
            let end = (y * self.width + x1) as usize * 3;
            for px in self.pixels[row..end].chunks_exact_mut(3) {
                px.copy_from_slice(&color);
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Nearest-neighbor copy of `src` into this buffer, covering it fully.
    /// Used to upscale a subsampled render to the configured resolution.
    pub fn upscale_from(&mut self, src: &FrameBuffer) {
        for y in 0..self.height {
            let sy = (y * src.height / self.height).min(src.height - 1);
            for x in 0..self.width {
                let sx = (x * src.width / self.width).min(src.width - 1);
                let sidx = (sy * src.width + sx) as usize * 3;
                let didx = (y * self.width + x) as usize * 3;
                self.pixels[didx..didx + 3].copy_from_slice(&src.pixels[sidx..sidx + 3]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_has_exact_byte_length() {
        let buf = FrameBuffer::new(Resolution::new(320, 240));
        assert_eq!(buf.as_bytes().len(), 320 * 240 * 3);
    }

    #[test]
    fn out_of_bounds_set_is_ignored() {
        let mut buf = FrameBuffer::new(Resolution::new(4, 4));
        buf.set(10, 10, [255, 0, 0]);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut buf = FrameBuffer::new(Resolution::new(4, 4));
        buf.fill_rect(-2, -2, 2, 2, [1, 2, 3]);
        assert_eq!(buf.get(0, 0), Some([1, 2, 3]));
        assert_eq!(buf.get(1, 1), Some([1, 2, 3]));
        assert_eq!(buf.get(2, 2), Some([0, 0, 0]));
        assert_eq!(buf.as_bytes().len(), 4 * 4 * 3);
    }

    #[test]
    fn upscale_replicates_source_pixels() {
        let mut src = FrameBuffer::new(Resolution::new(2, 2));
        src.set(0, 0, [10, 0, 0]);
        src.set(1, 0, [0, 20, 0]);
        src.set(0, 1, [0, 0, 30]);
        src.set(1, 1, [40, 40, 40]);

        let mut dst = FrameBuffer::new(Resolution::new(4, 4));
        dst.upscale_from(&src);
        assert_eq!(dst.get(0, 0), Some([10, 0, 0]));
        assert_eq!(dst.get(1, 1), Some([10, 0, 0]));
        assert_eq!(dst.get(3, 0), Some([0, 20, 0]));
        assert_eq!(dst.get(0, 3), Some([0, 0, 30]));
        assert_eq!(dst.get(3, 3), Some([40, 40, 40]));
    }
}
