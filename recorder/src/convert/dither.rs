use std::sync::Arc;

use gifcap_common::frame::{IndexedFrame, RawFrame};
use gifcap_common::palette::Palette;
use image::{imageops, DynamicImage};

use super::traits::FrameConverter;
use super::ConversionError;

/// Floyd–Steinberg error diffusion against a fixed palette.
///
/// Quantization error of each pixel is pushed onto its right and lower
/// neighbours, so flat areas of an off-palette colour come out as a mix of
/// nearby palette entries rather than a single nearest colour.
pub struct DitherConverter {
    palette: Arc<Palette>,
}

impl DitherConverter {
    pub fn new(palette: Arc<Palette>) -> Self {
        Self { palette }
    }
}

impl FrameConverter for DitherConverter {
    fn convert(&self, frame: &RawFrame, delay_cs: u16) -> Result<IndexedFrame, ConversionError> {
        let (width, height) = frame.pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(ConversionError::EmptyFrame);
        }
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(ConversionError::TooLarge { width, height });
        };

        // Captures are opaque; alpha carries nothing a GIF frame can use here.
        let mut rgb = DynamicImage::ImageRgba8(frame.pixels.clone()).into_rgb8();
        imageops::dither(&mut rgb, self.palette.as_ref());
        let indices = imageops::index_colors(&rgb, self.palette.as_ref()).into_raw();

        Ok(IndexedFrame::new(w, h, indices, delay_cs)?)
    }

    fn palette(&self) -> Arc<Palette> {
        Arc::clone(&self.palette)
    }

    fn name(&self) -> &str {
        "floyd-steinberg"
    }
}
