mod raster_error;
mod raster_snapshot;

use std::fmt;

pub use raster_error::RasterError;
pub use raster_snapshot::RasterSnapshot;

/// Red, green, blue, alpha.
pub type Rgba = [u8; 4];

pub const CHANNELS: usize = 4;
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Fixed-size RGBA pixel grid, rows top to bottom, alpha last.
///
/// Transparent pixels are stored as `(0, 0, 0, 0)` so two fully transparent
/// images always compare equal.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        let len = byte_len(width, height)?;
        Ok(RasterBuffer {
            width,
            height,
            pixels: vec![0; len],
        })
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Result<Self, RasterError> {
        let len = byte_len(width, height)?;
        Ok(RasterBuffer {
            width,
            height,
            pixels: color.iter().copied().cycle().take(len).collect(),
        })
    }

    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        let expected = byte_len(width, height)?;
        if pixels.len() != expected {
            return Err(RasterError::InvalidLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(RasterBuffer {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        pixel_at(&self.pixels, self.width, self.height, x, y)
    }

    pub fn ensure_same_shape(&self, other: &RasterBuffer) -> Result<(), RasterError> {
        if self.dimensions() != other.dimensions() {
            return Err(RasterError::ShapeMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }

    pub fn copy_from(&mut self, other: &RasterBuffer) -> Result<(), RasterError> {
        self.ensure_same_shape(other)?;
        self.pixels.copy_from_slice(&other.pixels);
        Ok(())
    }

    /// Makes every pixel of the rectangle fully transparent.
    ///
    /// The rectangle is clipped to the buffer. Like a 2D canvas, a negative
    /// width or height extends the rectangle left or up from `(x, y)`.
    pub fn clear_rect(&mut self, x: i64, y: i64, width: i64, height: i64) {
        let Some((x0, x1)) = clip_span(x, width, self.width) else {
            return;
        };
        let Some((y0, y1)) = clip_span(y, height, self.height) else {
            return;
        };
        let stride = self.width as usize * CHANNELS;
        for row in y0..y1 {
            let start = row * stride + x0 * CHANNELS;
            let end = row * stride + x1 * CHANNELS;
            self.pixels[start..end].fill(0);
        }
    }

    /// Paints every pixel whose center lies within `radius` of `(cx, cy)`.
    ///
    /// Coordinates address pixel corners, so pixel `(x, y)` has its center at
    /// `(x + 0.5, y + 0.5)`. The color is always painted opaque and a zero
    /// radius paints nothing.
    pub fn fill_circle(&mut self, cx: i64, cy: i64, radius: u32, color: Rgba) {
        if radius == 0 {
            return;
        }
        let r = i64::from(radius);
        let Some((x0, x1)) = clip_span(cx.saturating_sub(r), 2 * r, self.width) else {
            return;
        };
        let Some((y0, y1)) = clip_span(cy.saturating_sub(r), 2 * r, self.height) else {
            return;
        };

        let [red, green, blue, _] = color;
        let opaque = [red, green, blue, u8::MAX];
        // Doubled coordinates keep the distance test in integers. Once clipped,
        // the center lies within `r` of the buffer, so squares fit in i128.
        let (cx, cy, r) = (i128::from(cx), i128::from(cy), i128::from(radius));
        let limit = 4 * r * r;
        for py in y0..y1 {
            let dy = 2 * py as i128 + 1 - 2 * cy;
            for px in x0..x1 {
                let dx = 2 * px as i128 + 1 - 2 * cx;
                if dx * dx + dy * dy <= limit {
                    let index = (py * self.width as usize + px) * CHANNELS;
                    self.pixels[index..index + CHANNELS].copy_from_slice(&opaque);
                }
            }
        }
    }

    pub fn to_snapshot(&self) -> RasterSnapshot {
        RasterSnapshot::from(self)
    }
}

impl From<&RasterSnapshot> for RasterBuffer {
    fn from(snapshot: &RasterSnapshot) -> Self {
        snapshot.to_buffer()
    }
}

impl fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions(width, height));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|count| count.checked_mul(CHANNELS))
        .ok_or(RasterError::InvalidDimensions(width, height))
}

pub(crate) fn pixel_at(pixels: &[u8], width: u32, height: u32, x: u32, y: u32) -> Option<Rgba> {
    if x >= width || y >= height {
        return None;
    }
    let index = (y as usize * width as usize + x as usize) * CHANNELS;
    let mut rgba = TRANSPARENT;
    rgba.copy_from_slice(&pixels[index..index + CHANNELS]);
    Some(rgba)
}

/// Part of `[start, start + length)` inside `[0, limit)`, `None` when empty.
fn clip_span(start: i64, length: i64, limit: u32) -> Option<(usize, usize)> {
    let end = start.saturating_add(length);
    let (from, to) = if length < 0 { (end, start) } else { (start, end) };
    let from = from.clamp(0, limit as i64);
    let to = to.clamp(0, limit as i64);
    (from < to).then_some((from as usize, to as usize))
}
