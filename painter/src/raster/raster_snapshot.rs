use std::{fmt, sync::Arc};

use super::{pixel_at, RasterBuffer, Rgba};

/// Read-only copy of a [`RasterBuffer`], cheap to clone and safe to hand to
/// other threads.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterSnapshot {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl RasterSnapshot {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        pixel_at(&self.pixels, self.width, self.height, x, y)
    }

    /// Writable copy, e.g. to resume from an earlier snapshot.
    pub fn to_buffer(&self) -> RasterBuffer {
        RasterBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.to_vec(),
        }
    }
}

impl From<&RasterBuffer> for RasterSnapshot {
    fn from(buffer: &RasterBuffer) -> Self {
        RasterSnapshot {
            width: buffer.width,
            height: buffer.height,
            pixels: Arc::from(buffer.pixels.as_slice()),
        }
    }
}

impl fmt::Debug for RasterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSnapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::raster::RasterBuffer;

    #[test]
    fn test_snapshot_is_detached_from_buffer() {
        // Given
        let mut buffer = RasterBuffer::new(4, 4).unwrap();
        buffer.fill_circle(2, 2, 1, [10, 20, 30, 40]);

        // When
        let snapshot = buffer.to_snapshot();
        buffer.clear_rect(0, 0, 4, 4);

        // Then
        assert_eq!(Some([10, 20, 30, 255]), snapshot.pixel(1, 1));
        assert_eq!(Some([0, 0, 0, 0]), buffer.pixel(1, 1));
        assert_ne!(buffer, snapshot.to_buffer(), "Should keep the pixels seen at capture");
    }

    #[test]
    fn test_snapshot_clones_share_pixels() {
        let snapshot = RasterBuffer::new(2, 3).unwrap().to_snapshot();
        let clone = snapshot.clone();
        assert_eq!((2, 3), clone.dimensions());
        assert!(std::ptr::eq(snapshot.pixels(), clone.pixels()));
    }
}
