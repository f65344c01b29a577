mod assemble;
mod cancel;
mod capture;
mod convert;
mod error;
mod pipeline;
#[cfg(test)]
mod testing;

use std::io::BufWriter;
use std::sync::Arc;

use capture::ScreenSource;
use convert::DitherConverter;
use error::RecorderError;
use gifcap_common::config::Config;
use gifcap_common::palette::Palette;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Records the region given by `X`, `Y`, `WIDTH` and `HEIGHT` until
/// interrupted, then writes the recording to stdout as an animated GIF.
/// Diagnostics go to stderr only.
#[tokio::main]
async fn main() {
    let config = match Config::from_env().map_err(RecorderError::from) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // stdout carries the GIF bytes, so logs must never go there.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        x = config.region.x,
        y = config.region.y,
        width = config.region.width,
        height = config.region.height,
        fps = config.capture.fps,
        frame_delay_cs = config.animation.frame_delay_cs,
        "starting gifcap"
    );

    let converter = Arc::new(DitherConverter::new(Arc::new(Palette::plan9())));
    let mut stdout = BufWriter::new(std::io::stdout().lock());

    let result = pipeline::run(
        &config,
        ScreenSource::new(),
        converter,
        tokio::signal::ctrl_c(),
        CancellationToken::new(),
        &mut stdout,
    )
    .await;

    match result {
        Ok(summary) => {
            info!(frames = summary.frames, bytes = summary.bytes, "recording written");
        }
        Err(e) => {
            error!(error = %e, "recording failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
