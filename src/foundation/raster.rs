use image::{ImageBuffer, Rgba, RgbaImage, imageops::FilterType};

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{LaminateError, LaminateResult};

/// Resampling filter used whenever a raster is resized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest-neighbour sampling.
    Nearest,
    /// Bilinear (triangle) filtering.
    #[default]
    Bilinear,
    /// Catmull-Rom bicubic filtering.
    Bicubic,
    /// Lanczos with a window of 3.
    Lanczos3,
}

impl ResizeFilter {
    fn to_image_filter(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
            ResizeFilter::Bicubic => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// An in-memory pixel buffer.
///
/// Pixels are tightly packed, row-major, **premultiplied** RGBA8. Straight alpha only appears at
/// the codec boundary ([`Raster::from_rgba_image`] / [`Raster::to_rgba_image`]).
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl Raster {
    /// Fully transparent raster of the given size.
    pub fn new(width: u32, height: u32) -> LaminateResult<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    /// Raster filled with a single premultiplied colour.
    pub fn filled(width: u32, height: u32, px: Rgba8Premul) -> LaminateResult<Self> {
        let len = byte_len(width, height)?;
        let mut data = vec![0u8; len];
        for c in data.chunks_exact_mut(4) {
            c.copy_from_slice(&px.to_array());
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap already-premultiplied bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> LaminateResult<Self> {
        let len = byte_len(width, height)?;
        if data.len() != len {
            return Err(LaminateError::composite(format!(
                "raster {width}x{height} expects {len} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Take straight-alpha bytes and premultiply them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> LaminateResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul_rgba8(width, height, data)
    }

    /// Convert a decoded straight-alpha image into a raster.
    pub fn from_rgba_image(img: RgbaImage) -> LaminateResult<Self> {
        let (width, height) = img.dimensions();
        Self::from_straight_rgba8(width, height, img.into_raw())
    }

    /// Convert into a straight-alpha image for encoding.
    pub fn to_rgba_image(&self) -> LaminateResult<RgbaImage> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        ImageBuffer::from_raw(self.width, self.height, straight).ok_or_else(|| {
            LaminateError::codec(format!(
                "raster {}x{} has inconsistent buffer length",
                self.width, self.height
            ))
        })
    }

    /// Read one pixel, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some(Rgba8Premul {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        })
    }

    /// Overwrite one pixel. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, px: Rgba8Premul) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&px.to_array());
    }

    /// Resample to a new size.
    pub fn resized(&self, width: u32, height: u32, filter: ResizeFilter) -> LaminateResult<Self> {
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        byte_len(width, height)?;

        let src: ImageBuffer<Rgba<u8>, &[u8]> =
            ImageBuffer::from_raw(self.width, self.height, self.data.as_slice()).ok_or_else(
                || {
                    LaminateError::composite(format!(
                        "raster {}x{} has inconsistent buffer length",
                        self.width, self.height
                    ))
                },
            )?;
        let mut data = image::imageops::resize(&src, width, height, filter.to_image_filter())
            .into_raw();

        // Ringing filters can push colour above alpha; keep the buffer valid premultiplied data.
        for px in data.chunks_exact_mut(4) {
            let a = px[3];
            px[0] = px[0].min(a);
            px[1] = px[1].min(a);
            px[2] = px[2].min(a);
        }

        Self::from_premul_rgba8(width, height, data)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }
}

/// Fail with [`LaminateError::CompositeOperation`] when a `width` x `height` raster would exceed
/// `max_pixels`.
pub(crate) fn ensure_pixel_budget(
    what: &str,
    width: u32,
    height: u32,
    max_pixels: u64,
) -> LaminateResult<()> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > max_pixels {
        return Err(LaminateError::composite(format!(
            "{what} of {width}x{height} ({pixels} pixels) exceeds the limit of {max_pixels} pixels"
        )));
    }
    Ok(())
}

pub(crate) fn byte_len(width: u32, height: u32) -> LaminateResult<usize> {
    if width == 0 || height == 0 {
        return Err(LaminateError::composite(format!(
            "raster dimensions must be > 0 (got {width}x{height})"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| LaminateError::composite("raster buffer size overflow"))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let straight = Rgba8Premul {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
        .to_straight_rgba();
        px.copy_from_slice(&straight);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/raster.rs"]
mod tests;
