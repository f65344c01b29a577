use gifcap_common::frame::CaptureRegion;
use image::RgbaImage;
use tracing::debug;

use super::CaptureError;

/// Something that can produce the current pixels of a screen region.
///
/// Implementations are moved onto the capture thread, so they must be
/// `Send`; they are never shared.
pub trait FrameSource: Send {
    fn capture(&mut self, region: &CaptureRegion) -> Result<RgbaImage, CaptureError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Captures from the physical display through `xcap`.
///
/// The monitor is looked up on every capture from the region origin, so no
/// platform handle has to cross threads.
#[derive(Debug, Default)]
pub struct ScreenSource;

impl ScreenSource {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "screen")]
impl FrameSource for ScreenSource {
    fn capture(&mut self, region: &CaptureRegion) -> Result<RgbaImage, CaptureError> {
        use xcap::Monitor;

        let monitor = Monitor::from_point(region.x, region.y)
            .map_err(|e| CaptureError::Device(e.to_string()))?;
        let screen = monitor
            .capture_image()
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        let left = i64::from(region.x) - i64::from(monitor.x());
        let top = i64::from(region.y) - i64::from(monitor.y());
        let fits = left >= 0
            && top >= 0
            && left + i64::from(region.width) <= i64::from(screen.width())
            && top + i64::from(region.height) <= i64::from(screen.height());
        if !fits {
            return Err(CaptureError::RegionUnavailable {
                region: *region,
                screen_width: screen.width(),
                screen_height: screen.height(),
            });
        }

        debug!(
            monitor = monitor.name(),
            left,
            top,
            "cropping monitor capture to region"
        );

        Ok(image::imageops::crop_imm(
            &screen,
            left as u32,
            top as u32,
            u32::from(region.width),
            u32::from(region.height),
        )
        .to_image())
    }

    fn name(&self) -> &str {
        "screen"
    }
}

#[cfg(not(feature = "screen"))]
impl FrameSource for ScreenSource {
    fn capture(&mut self, _region: &CaptureRegion) -> Result<RgbaImage, CaptureError> {
        debug!("screen capture requested without the `screen` feature");
        Err(CaptureError::Device(
            "gifcap was built without the `screen` feature".into(),
        ))
    }

    fn name(&self) -> &str {
        "screen"
    }
}
