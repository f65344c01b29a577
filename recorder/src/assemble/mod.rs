pub mod encoder;

pub use encoder::{write_gif, Animation};

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("animation has no frames")]
    NoFrames,
    #[error("frame {index} is {width}x{height}, canvas is {canvas_width}x{canvas_height}")]
    FrameSizeMismatch {
        index: usize,
        width: u16,
        height: u16,
        canvas_width: u16,
        canvas_height: u16,
    },
    #[error("failed to encode GIF: {0}")]
    Gif(#[from] gif::EncodingError),
    #[error("failed to write animation: {0}")]
    Io(#[from] std::io::Error),
}
