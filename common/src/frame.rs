use image::RgbaImage;

/// The fixed screen rectangle sampled on every capture.
///
/// `x`/`y` are virtual-desktop coordinates and may be negative on
/// multi-monitor setups. Width and height are bounded by the GIF format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

/// One full-colour sample of the capture region.
///
/// The frame's position in the recording is its index in the
/// [`FrameBuffer`]; `captured_at_ms` is informational only.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub pixels: RgbaImage,
    pub captured_at_ms: i64,
}

impl RawFrame {
    /// Wrap freshly captured pixels, stamping them with the current time.
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            captured_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Append-only, capture-ordered sequence of raw frames.
///
/// There is exactly one owner at a time: the capture loop while recording,
/// then whoever the loop hands it to by value.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: Vec<RawFrame>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: RawFrame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Wall-clock time between the first and last capture.
    pub fn span_ms(&self) -> i64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.captured_at_ms - first.captured_at_ms,
            _ => 0,
        }
    }

    pub fn into_frames(self) -> Vec<RawFrame> {
        self.frames
    }
}

/// A frame translated to palette indices, one byte per pixel in row-major
/// order, plus how long it stays on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    pub width: u16,
    pub height: u16,
    pub indices: Vec<u8>,
    /// Display duration in hundredths of a second.
    pub delay_cs: u16,
}

impl IndexedFrame {
    pub fn new(width: u16, height: u16, indices: Vec<u8>, delay_cs: u16) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(FrameError::IndexCount {
                got: indices.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            indices,
            delay_cs,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("indexed frame has {got} pixels, expected {expected}")]
    IndexCount { got: usize, expected: usize },
}
