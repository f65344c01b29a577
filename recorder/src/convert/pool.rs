use std::sync::Arc;
use std::time::Instant;

use gifcap_common::frame::{FrameBuffer, IndexedFrame};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::traits::FrameConverter;
use super::ConversionError;
use crate::error::RecorderError;

/// Convert every frame of a finalized buffer in parallel.
///
/// One blocking task per frame. Each task is tagged with its frame's
/// position and its result goes into the slot of that position, so the
/// output order is the capture order no matter which task finishes first.
/// Returns only after every task has been joined. The first failure drops
/// the `JoinSet`, aborting whatever has not started yet.
pub async fn convert_all<C>(
    converter: Arc<C>,
    buffer: FrameBuffer,
    delay_cs: u16,
) -> Result<Vec<IndexedFrame>, RecorderError>
where
    C: FrameConverter + 'static,
{
    if buffer.is_empty() {
        return Err(RecorderError::EmptyRecording);
    }

    let total = buffer.len();
    let started = Instant::now();
    info!(frames = total, converter = converter.name(), "converting frames");

    let mut slots: Vec<Option<IndexedFrame>> = (0..total).map(|_| None).collect();
    let mut tasks = JoinSet::new();
    for (index, frame) in buffer.into_frames().into_iter().enumerate() {
        let converter = Arc::clone(&converter);
        tasks.spawn_blocking(move || (index, converter.convert(&frame, delay_cs)));
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| ConversionError::Task(e.to_string()))?;
        match result {
            Ok(frame) => {
                debug!(index, "frame converted");
                slots[index] = Some(frame);
            }
            Err(e) => {
                error!(index, error = %e, "frame conversion failed");
                return Err(e.into());
            }
        }
    }

    let frames = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(ConversionError::MissingFrame(index)))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        frames = frames.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "all frames converted"
    );
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DitherConverter;
    use crate::testing::marked_frame;
    use gifcap_common::frame::RawFrame;
    use gifcap_common::palette::Palette;
    use std::time::Duration;

    /// Copies the marker out of the first pixel and sleeps for a
    /// marker-dependent time so tasks finish out of order.
    struct Scrambling {
        palette: Arc<Palette>,
        frames: usize,
        fail_marker: Option<u8>,
    }

    impl FrameConverter for Scrambling {
        fn convert(&self, frame: &RawFrame, delay_cs: u16) -> Result<IndexedFrame, ConversionError> {
            let marker = frame.pixels.get_pixel(0, 0).0[0];
            let scrambled = (marker as usize * 7 + 3) % self.frames;
            std::thread::sleep(Duration::from_millis(scrambled as u64 * 10));
            if self.fail_marker == Some(marker) {
                return Err(ConversionError::EmptyFrame);
            }
            let (w, h) = frame.pixels.dimensions();
            Ok(IndexedFrame::new(
                w as u16,
                h as u16,
                vec![marker; (w * h) as usize],
                delay_cs,
            )?)
        }

        fn palette(&self) -> Arc<Palette> {
            Arc::clone(&self.palette)
        }
    }

    fn buffer_of(count: u8) -> FrameBuffer {
        let mut buffer = FrameBuffer::new();
        for marker in 0..count {
            buffer.push(marked_frame(4, 3, marker));
        }
        buffer
    }

    #[tokio::test]
    async fn output_follows_capture_order_not_completion_order() {
        let converter = Arc::new(Scrambling {
            palette: Arc::new(Palette::plan9()),
            frames: 8,
            fail_marker: None,
        });

        let frames = convert_all(converter, buffer_of(8), 6).await.unwrap();
        let markers: Vec<u8> = frames.iter().map(|f| f.indices[0]).collect();
        assert_eq!(markers, (0..8).collect::<Vec<u8>>());
        assert!(frames.iter().all(|f| f.delay_cs == 6));
    }

    #[tokio::test]
    async fn one_failed_frame_fails_the_run() {
        let converter = Arc::new(Scrambling {
            palette: Arc::new(Palette::plan9()),
            frames: 5,
            fail_marker: Some(2),
        });

        let result = convert_all(converter, buffer_of(5), 6).await;
        assert!(matches!(
            result,
            Err(RecorderError::Conversion(ConversionError::EmptyFrame))
        ));
    }

    #[tokio::test]
    async fn panicking_conversion_fails_the_run() {
        struct Exploding(Arc<Palette>);
        impl FrameConverter for Exploding {
            fn convert(&self, frame: &RawFrame, delay_cs: u16) -> Result<IndexedFrame, ConversionError> {
                let marker = frame.pixels.get_pixel(0, 0).0[0];
                if marker == 3 {
                    panic!("quantizer blew up on frame {marker}");
                }
                let (w, h) = frame.pixels.dimensions();
                Ok(IndexedFrame::new(w as u16, h as u16, vec![0; (w * h) as usize], delay_cs)?)
            }

            fn palette(&self) -> Arc<Palette> {
                Arc::clone(&self.0)
            }
        }

        let converter = Arc::new(Exploding(Arc::new(Palette::plan9())));
        let result = convert_all(converter, buffer_of(5), 6).await;
        assert!(matches!(
            result,
            Err(RecorderError::Conversion(ConversionError::Task(_)))
        ));
    }

    #[tokio::test]
    async fn empty_buffer_is_rejected() {
        let converter = Arc::new(DitherConverter::new(Arc::new(Palette::plan9())));
        let result = convert_all(converter, FrameBuffer::new(), 6).await;
        assert!(matches!(result, Err(RecorderError::EmptyRecording)));
    }

    #[tokio::test]
    async fn every_frame_gets_the_fixed_delay() {
        let converter = Arc::new(DitherConverter::new(Arc::new(Palette::plan9())));
        let frames = convert_all(converter, buffer_of(5), 9).await.unwrap();
        assert_eq!(frames.len(), 5);
        for frame in &frames {
            assert_eq!((frame.width, frame.height, frame.delay_cs), (4, 3, 9));
            assert_eq!(frame.indices.len(), 12);
        }
    }
}
