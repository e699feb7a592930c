use std::io::Cursor;

use anyhow::Context;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::foundation::error::{LaminateError, LaminateResult};
use crate::foundation::raster::Raster;

/// Encoded output format of a composition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless, keeps alpha.
    #[default]
    Png,
    /// Lossy; alpha is flattened onto black.
    #[serde(alias = "jpg")]
    Jpeg,
    /// Lossless, keeps alpha.
    Tiff,
    /// Uncompressed; alpha is flattened onto black.
    Bmp,
}

impl OutputFormat {
    /// Parse a format name or file extension (case-insensitive).
    pub fn parse(s: &str) -> LaminateResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "tif" | "tiff" => Ok(Self::Tiff),
            "bmp" => Ok(Self::Bmp),
            other => Err(LaminateError::validation(format!(
                "unsupported output format '{other}' (expected png, jpeg, tiff or bmp)"
            ))),
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Tiff => ImageFormat::Tiff,
            Self::Bmp => ImageFormat::Bmp,
        }
    }

    fn keeps_alpha(self) -> bool {
        matches!(self, Self::Png | Self::Tiff)
    }
}

/// Encode a raster into `format`.
#[tracing::instrument(skip(raster), fields(width = raster.width, height = raster.height))]
pub fn encode_raster(raster: &Raster, format: OutputFormat) -> LaminateResult<Vec<u8>> {
    let img = if format.keeps_alpha() {
        DynamicImage::ImageRgba8(raster.to_rgba_image()?)
    } else {
        // Premultiplied colour is already the pixel composited over black.
        let rgb: Vec<u8> = raster
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let buf = RgbImage::from_raw(raster.width, raster.height, rgb).ok_or_else(|| {
            LaminateError::codec(format!(
                "raster {}x{} has inconsistent buffer length",
                raster.width, raster.height
            ))
        })?;
        DynamicImage::ImageRgb8(buf)
    };

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format.image_format())
        .map_err(|e| LaminateError::codec(format!("encode {}: {e}", format.extension())))?;
    Ok(out.into_inner())
}

/// Decode any image format supported by the `image` crate into a premultiplied raster.
pub fn decode_raster(bytes: &[u8]) -> LaminateResult<Raster> {
    let img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| LaminateError::codec(format!("{e:#}")))?
        .to_rgba8();
    Raster::from_rgba_image(img)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/codec.rs"]
mod tests;
