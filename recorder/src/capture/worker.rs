use std::time::{Duration, Instant};

use gifcap_common::frame::{CaptureRegion, FrameBuffer, RawFrame};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{CaptureError, FrameSource};

/// Handle to the background capture loop.
///
/// The loop owns the [`FrameBuffer`] for its whole life and gives it up
/// only by returning it through the join handle, so nothing can read the
/// buffer before the last frame has been appended.
pub struct CaptureTask {
    token: CancellationToken,
    handle: JoinHandle<Result<FrameBuffer, CaptureError>>,
}

impl CaptureTask {
    /// Start capturing `region` every `period` on a blocking thread until
    /// `token` is cancelled.
    pub fn spawn<S>(source: S, region: CaptureRegion, period: Duration, token: CancellationToken) -> Self
    where
        S: FrameSource + 'static,
    {
        let loop_token = token.clone();
        let handle =
            tokio::task::spawn_blocking(move || run_capture_loop(source, region, period, &loop_token));
        Self { token, handle }
    }

    /// Ask the loop to exit at its next iteration boundary. Idempotent.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Wait for the loop to exit and take ownership of what it recorded.
    ///
    /// Must not be awaited again once it has resolved.
    pub async fn join(&mut self) -> Result<FrameBuffer, CaptureError> {
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(e) => Err(CaptureError::Panicked(e.to_string())),
        }
    }
}

/// The capture loop body. The stop flag is checked only at the top of an
/// iteration, so a capture that has started is always appended.
fn run_capture_loop<S: FrameSource>(
    mut source: S,
    region: CaptureRegion,
    period: Duration,
    token: &CancellationToken,
) -> Result<FrameBuffer, CaptureError> {
    let mut buffer = FrameBuffer::new();

    info!(
        source = source.name(),
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        period_ms = period.as_millis() as u64,
        "capture loop started"
    );

    while !token.is_cancelled() {
        let started = Instant::now();
        let seq = buffer.len();

        let pixels = source.capture(&region).map_err(|e| {
            error!(error = %e, seq, "capture failed, abandoning recording");
            e
        })?;
        if pixels.dimensions() != (u32::from(region.width), u32::from(region.height)) {
            return Err(CaptureError::UnexpectedSize {
                got_width: pixels.width(),
                got_height: pixels.height(),
                width: region.width,
                height: region.height,
            });
        }
        buffer.push(RawFrame::new(pixels));

        let elapsed = started.elapsed();
        debug!(seq, capture_ms = elapsed.as_millis() as u64, "frame captured");

        // No catch-up: a slow capture just shortens this iteration's sleep.
        match period.checked_sub(elapsed) {
            Some(remaining) => std::thread::sleep(remaining),
            None => warn!(
                seq,
                capture_ms = elapsed.as_millis() as u64,
                period_ms = period.as_millis() as u64,
                "capture overran its period"
            ),
        }
    }

    info!(
        frames = buffer.len(),
        span_ms = buffer.span_ms(),
        "capture loop stopped"
    );
    Ok(buffer)
}
