use std::future::Future;
use std::io;

use gifcap_common::frame::FrameBuffer;
use tracing::info;

use crate::capture::CaptureTask;
use crate::error::RecorderError;

enum Wake {
    Signal(io::Result<()>),
    Capture(Result<FrameBuffer, crate::capture::CaptureError>),
}

/// Block until the recording should end and return the finalized buffer.
///
/// The stop signal sets the capture loop's stop flag once and then waits,
/// without a timeout, for the loop to hand its buffer over. If the loop
/// ends on its own first (which only a capture failure does) that result
/// is returned straight away instead of waiting for a signal that will
/// never matter.
pub async fn await_handoff<F>(stop_signal: F, mut capture: CaptureTask) -> Result<FrameBuffer, RecorderError>
where
    F: Future<Output = io::Result<()>>,
{
    let wake = tokio::select! {
        signal = stop_signal => Wake::Signal(signal),
        finished = capture.join() => Wake::Capture(finished),
    };

    match wake {
        Wake::Signal(Ok(())) => {
            info!("stop signal received, waiting for capture loop to hand off");
            capture.stop();
            let buffer = capture.join().await?;
            info!(frames = buffer.len(), "frame buffer handed off");
            Ok(buffer)
        }
        Wake::Signal(Err(e)) => {
            capture.stop();
            Err(RecorderError::SignalWait(e))
        }
        Wake::Capture(result) => Ok(result?),
    }
}
