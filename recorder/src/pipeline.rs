use std::fmt;
use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;

use gifcap_common::config::Config;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::assemble::{write_gif, Animation, EncodeError};
use crate::cancel::await_handoff;
use crate::capture::{CaptureTask, FrameSource};
use crate::convert::{convert_all, FrameConverter};
use crate::error::RecorderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Capturing,
    Finalizing,
    Converting,
    Assembling,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Capturing => "capturing",
            PipelineState::Finalizing => "finalizing",
            PipelineState::Converting => "converting",
            PipelineState::Assembling => "assembling",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSummary {
    pub frames: usize,
    pub bytes: usize,
}

struct Tracker {
    state: PipelineState,
}

impl Tracker {
    fn advance(&mut self, next: PipelineState) {
        info!(from = %self.state, to = %next, "pipeline state change");
        self.state = next;
    }
}

/// Record until `stop_signal` resolves, then write one GIF to `out`.
///
/// Capture → handoff → parallel conversion → assembly. Nothing reaches
/// `out` unless every earlier stage succeeded; the GIF is encoded in
/// memory first and then written and flushed in one go.
pub async fn run<S, C, F, W>(
    config: &Config,
    source: S,
    converter: Arc<C>,
    stop_signal: F,
    token: CancellationToken,
    out: &mut W,
) -> Result<RecordingSummary, RecorderError>
where
    S: FrameSource + 'static,
    C: FrameConverter + 'static,
    F: Future<Output = io::Result<()>>,
    W: Write,
{
    let mut tracker = Tracker {
        state: PipelineState::Capturing,
    };
    let result = drive(config, source, converter, stop_signal, token, out, &mut tracker).await;
    match &result {
        Ok(_) => tracker.advance(PipelineState::Done),
        Err(e) => {
            error!(state = %tracker.state, error = %e, "pipeline failed");
            tracker.advance(PipelineState::Failed);
        }
    }
    result
}

async fn drive<S, C, F, W>(
    config: &Config,
    source: S,
    converter: Arc<C>,
    stop_signal: F,
    token: CancellationToken,
    out: &mut W,
    tracker: &mut Tracker,
) -> Result<RecordingSummary, RecorderError>
where
    S: FrameSource + 'static,
    C: FrameConverter + 'static,
    F: Future<Output = io::Result<()>>,
    W: Write,
{
    let period = config.capture.period()?;
    let capture = CaptureTask::spawn(source, config.region, period, token);
    let buffer = await_handoff(stop_signal, capture).await?;

    tracker.advance(PipelineState::Finalizing);
    info!(
        frames = buffer.len(),
        span_ms = buffer.span_ms(),
        "recording finalized"
    );

    tracker.advance(PipelineState::Converting);
    let palette = converter.palette();
    let frames = convert_all(converter, buffer, config.animation.frame_delay_cs).await?;

    tracker.advance(PipelineState::Assembling);
    let frame_count = frames.len();
    let animation = Animation::new(palette, frames, config.animation.loop_count)?;
    let bytes = write_gif(&animation, Vec::new())?;

    out.write_all(&bytes).map_err(EncodeError::from)?;
    out.flush().map_err(EncodeError::from)?;

    Ok(RecordingSummary {
        frames: frame_count,
        bytes: bytes.len(),
    })
}
