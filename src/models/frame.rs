//! Decoded sprite frames and the sources that hand them out.
//!
//! Frames hold raw palette indices in a [`GrayImage`]; index 0 is transparent.
//! Container decoding happens elsewhere; this module only models the result.

use image::GrayImage;

use super::tile::Rect;

/// Stable identity of a frame source, used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u32);

/// Identity of one frame of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub source: SourceId,
    pub frame: usize,
}

/// One decoded frame of indexed pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: GrayImage,
    bounds: Option<Rect>,
}

impl Frame {
    pub fn new(pixels: GrayImage) -> Self {
        let bounds = opaque_bounds(&pixels);
        Self { pixels, bounds }
    }

    /// Build a frame from a row-major index buffer.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_indices(width: u32, height: u32, indices: Vec<u8>) -> Option<Self> {
        GrayImage::from_raw(width, height, indices).map(Frame::new)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    /// Palette index at a pixel, or `None` outside the frame.
    pub fn index_at(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return None;
        }
        Some(self.pixels.get_pixel(x as u32, y as u32)[0])
    }

    /// Rectangle around the opaque pixels, `None` if fully transparent.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.bounds
    }
}

fn opaque_bounds(pixels: &GrayImage) -> Option<Rect> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut any = false;

    for (x, y, pixel) in pixels.enumerate_pixels() {
        if pixel[0] != 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    any.then(|| Rect::new(min_x as i32, min_y as i32, max_x - min_x + 1, max_y - min_y + 1))
}

/// Decoded asset that hands out frames by index.
///
/// Implementations must keep `source_id` stable for the lifetime of the
/// source: radar mini-tiles are cached by it.
pub trait FrameSource: std::fmt::Debug {
    /// Asset name, for diagnostics.
    fn name(&self) -> &str;

    fn source_id(&self) -> SourceId;

    fn frame_count(&self) -> usize;

    fn frame(&self, index: usize) -> Option<&Frame>;

    fn bounding_box(&self, index: usize) -> Option<Rect> {
        self.frame(index).and_then(Frame::bounding_box)
    }

    fn frame_key(&self, index: usize) -> FrameKey {
        FrameKey { source: self.source_id(), frame: index }
    }
}

/// In-memory frame source. Its identity is a CRC32 over the frame contents,
/// so two sheets with identical pixels share cache entries.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    name: String,
    frames: Vec<Frame>,
    id: SourceId,
}

impl SpriteSheet {
    pub fn new(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        let mut hasher = crc32fast::Hasher::new();
        for frame in &frames {
            hasher.update(&frame.width().to_le_bytes());
            hasher.update(&frame.height().to_le_bytes());
            hasher.update(frame.pixels().as_raw());
        }
        Self { name: name.into(), frames, id: SourceId(hasher.finalize()) }
    }
}

impl FrameSource for SpriteSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_id(&self) -> SourceId {
        self.id
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }
}
