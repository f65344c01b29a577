use std::sync::Arc;

use gifcap_common::frame::{IndexedFrame, RawFrame};
use gifcap_common::palette::Palette;

use super::ConversionError;

/// Turns one full-colour frame into palette indices.
///
/// A converter is shared by every conversion task, so `convert` takes
/// `&self` and must not depend on the order frames are handed to it.
pub trait FrameConverter: Send + Sync {
    fn convert(&self, frame: &RawFrame, delay_cs: u16) -> Result<IndexedFrame, ConversionError>;

    /// The palette every produced index refers to.
    fn palette(&self) -> Arc<Palette>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
