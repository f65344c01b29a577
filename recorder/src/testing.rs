//! Stubs shared by the unit tests.

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gifcap_common::frame::{CaptureRegion, RawFrame};
use image::{Rgba, RgbaImage};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::capture::{CaptureError, FrameSource};

pub fn region(width: u16, height: u16) -> CaptureRegion {
    CaptureRegion {
        x: 0,
        y: 0,
        width,
        height,
    }
}

/// Deterministic gradient that differs per `seed`.
pub fn synthetic_image(width: u32, height: u32, seed: usize) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x as usize * 7 + seed * 40) as u8,
            (y as usize * 5 + seed * 3) as u8,
            ((x + y) as usize + seed * 90) as u8,
            255,
        ])
    })
}

/// Raw frame whose first pixel's red channel carries `marker`.
pub fn marked_frame(width: u32, height: u32, marker: u8) -> RawFrame {
    let mut pixels = synthetic_image(width, height, marker as usize);
    pixels.put_pixel(0, 0, Rgba([marker, 0, 0, 255]));
    RawFrame::new(pixels)
}

/// Stop-signal future resolved by a oneshot sender.
pub fn stop_signal(rx: oneshot::Receiver<()>) -> impl Future<Output = io::Result<()>> {
    async move { rx.await.map_err(io::Error::other) }
}

struct Hold {
    call: usize,
    token: CancellationToken,
    notify: Option<oneshot::Sender<()>>,
}

/// In-memory frame source with a call counter.
///
/// `failing_on(n)` makes the n-th capture fail. `stopping_on(n, ..)` makes
/// the n-th capture fire a notification and then stay in flight until the
/// token is cancelled, which pins the exact number of recorded frames.
pub struct SyntheticSource {
    calls: Arc<AtomicUsize>,
    fail_on: Option<usize>,
    hold: Option<Hold>,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_on: None,
            hold: None,
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn stopping_on(mut self, call: usize, token: CancellationToken, notify: oneshot::Sender<()>) -> Self {
        self.hold = Some(Hold {
            call,
            token,
            notify: Some(notify),
        });
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl FrameSource for SyntheticSource {
    fn capture(&mut self, region: &CaptureRegion) -> Result<RgbaImage, CaptureError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(call) {
            return Err(CaptureError::Device(format!("synthetic failure on call {call}")));
        }

        if let Some(hold) = self.hold.as_mut().filter(|h| h.call == call) {
            if let Some(notify) = hold.notify.take() {
                let _ = notify.send(());
            }
            while !hold.token.is_cancelled() {
                std::thread::sleep(Duration::from_millis(1));
            }
        }

        Ok(synthetic_image(
            u32::from(region.width),
            u32::from(region.height),
            call,
        ))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
