pub mod source;
pub mod worker;

pub use source::{FrameSource, ScreenSource};
pub use worker::CaptureTask;

use gifcap_common::frame::CaptureRegion;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("screen capture failed: {0}")]
    Device(String),
    #[error("region {region:?} does not fit on its screen ({screen_width}x{screen_height})")]
    RegionUnavailable {
        region: CaptureRegion,
        screen_width: u32,
        screen_height: u32,
    },
    #[error("captured {got_width}x{got_height} pixels, expected {width}x{height}")]
    UnexpectedSize {
        got_width: u32,
        got_height: u32,
        width: u16,
        height: u16,
    },
    #[error("capture loop panicked: {0}")]
    Panicked(String),
}
