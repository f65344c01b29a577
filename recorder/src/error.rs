use gifcap_common::config::ConfigError;

use crate::assemble::EncodeError;
use crate::capture::CaptureError;
use crate::convert::ConversionError;

/// Every way a recording can fail. Each variant ends the process; nothing
/// is retried and nothing already captured is salvaged.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("failed waiting for stop signal: {0}")]
    SignalWait(std::io::Error),
    #[error("recording is empty: stopped before the first frame was captured")]
    EmptyRecording,
}
