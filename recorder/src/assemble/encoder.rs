use std::borrow::Cow;
use std::io::Write;
use std::sync::Arc;

use gifcap_common::frame::IndexedFrame;
use gifcap_common::palette::Palette;
use tracing::{debug, info};

use super::EncodeError;

/// The complete recording, ready to serialize. Built once, written once.
pub struct Animation {
    pub width: u16,
    pub height: u16,
    pub palette: Arc<Palette>,
    pub frames: Vec<IndexedFrame>,
    /// Number of times to play; 0 loops forever.
    pub loop_count: u16,
}

impl Animation {
    /// Assemble frames into an animation whose canvas is the size of the
    /// first frame. Every other frame must match it.
    pub fn new(palette: Arc<Palette>, frames: Vec<IndexedFrame>, loop_count: u16) -> Result<Self, EncodeError> {
        let first = frames.first().ok_or(EncodeError::NoFrames)?;
        let (width, height) = (first.width, first.height);

        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| (f.width, f.height) != (width, height))
        {
            return Err(EncodeError::FrameSizeMismatch {
                index,
                width: frame.width,
                height: frame.height,
                canvas_width: width,
                canvas_height: height,
            });
        }

        Ok(Self {
            width,
            height,
            palette,
            frames,
            loop_count,
        })
    }

    fn repeat(&self) -> gif::Repeat {
        match self.loop_count {
            0 => gif::Repeat::Infinite,
            n => gif::Repeat::Finite(n),
        }
    }
}

/// Serialize `animation` as a GIF89a stream and flush the writer.
///
/// The palette becomes the global colour table; frames carry no local
/// table. Returns the writer once the trailer has been written.
pub fn write_gif<W: Write>(animation: &Animation, writer: W) -> Result<W, EncodeError> {
    let palette = animation.palette.to_rgb_bytes();
    let mut encoder = gif::Encoder::new(writer, animation.width, animation.height, &palette)?;
    encoder.set_repeat(animation.repeat())?;

    for (seq, frame) in animation.frames.iter().enumerate() {
        let gif_frame = gif::Frame {
            width: frame.width,
            height: frame.height,
            delay: frame.delay_cs,
            buffer: Cow::Borrowed(frame.indices.as_slice()),
            ..gif::Frame::default()
        };
        encoder.write_frame(&gif_frame)?;
        debug!(seq, delay_cs = frame.delay_cs, "frame encoded");
    }

    let mut writer = encoder.into_inner()?;
    writer.flush()?;

    info!(
        frames = animation.frames.len(),
        width = animation.width,
        height = animation.height,
        colors = animation.palette.len(),
        "animation encoded"
    );
    Ok(writer)
}
