pub mod dither;
pub mod pool;
pub mod traits;

pub use dither::DitherConverter;
pub use pool::convert_all;
pub use traits::FrameConverter;

use gifcap_common::frame::FrameError;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("frame has zero width or height")]
    EmptyFrame,
    #[error("frame is {width}x{height}, GIF frames are limited to 65535x65535")]
    TooLarge { width: u32, height: u32 },
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("conversion task failed: {0}")]
    Task(String),
    #[error("no converted frame for position {0}")]
    MissingFrame(usize),
}
