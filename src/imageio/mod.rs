//! In-memory bitmaps and the image file formats the renderer reads and writes.

use crate::error::ExportError;
use crate::math::luminance;
use crate::Float;
use std::path::Path;

pub mod exr;
pub mod raster;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Y,
    YA,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn channel_count(self) -> usize {
        match self {
            PixelFormat::Y => 1,
            PixelFormat::YA => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::YA | PixelFormat::Rgba)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentFormat {
    UInt8,
    Float32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Png,
    OpenExr,
    Ppm,
    Rgbe,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(FileFormat::Png),
            "exr" => Some(FileFormat::OpenExr),
            "ppm" => Some(FileFormat::Ppm),
            "hdr" | "rgbe" => Some(FileFormat::Rgbe),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PixelData {
    UInt8(Vec<u8>),
    Float32(Vec<f32>),
}

/// A two dimensional pixel buffer, stored row by row starting at the top left.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    pixel_format: PixelFormat,
    width: u32,
    height: u32,
    /// Whether the stored values are sRGB encoded rather than linear.
    srgb_gamma: bool,
    data: PixelData,
}

impl Bitmap {
    /// A zero filled bitmap. 8-bit bitmaps are tagged as sRGB encoded, float bitmaps as linear.
    pub fn new(pixel_format: PixelFormat, component: ComponentFormat, width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * pixel_format.channel_count();
        let (data, srgb_gamma) = match component {
            ComponentFormat::UInt8 => (PixelData::UInt8(vec![0; len]), true),
            ComponentFormat::Float32 => (PixelData::Float32(vec![0.0; len]), false),
        };
        Self { pixel_format, width, height, srgb_gamma, data }
    }

    /// Wraps linear float data.
    ///
    /// # Panics
    /// If `data` does not hold exactly `width * height` pixels of `pixel_format`.
    pub fn from_f32(pixel_format: PixelFormat, width: u32, height: u32, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * pixel_format.channel_count(),
            "pixel data does not match a {}x{} {:?} bitmap", width, height, pixel_format
        );
        Self { pixel_format, width, height, srgb_gamma: false, data: PixelData::Float32(data) }
    }

    pub fn from_rgb_f32(width: u32, height: u32, data: Vec<f32>) -> Self {
        Self::from_f32(PixelFormat::Rgb, width, height, data)
    }

    /// Wraps 8-bit data, tagged with the given transfer curve.
    ///
    /// # Panics
    /// If `data` does not hold exactly `width * height` pixels of `pixel_format`.
    pub fn from_u8(pixel_format: PixelFormat, width: u32, height: u32, data: Vec<u8>, srgb_gamma: bool) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * pixel_format.channel_count(),
            "pixel data does not match a {}x{} {:?} bitmap", width, height, pixel_format
        );
        Self { pixel_format, width, height, srgb_gamma, data: PixelData::UInt8(data) }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn component_format(&self) -> ComponentFormat {
        match self.data {
            PixelData::UInt8(_) => ComponentFormat::UInt8,
            PixelData::Float32(_) => ComponentFormat::Float32,
        }
    }

    pub fn srgb_gamma(&self) -> bool {
        self.srgb_gamma
    }

    pub fn channel_count(&self) -> usize {
        self.pixel_format.channel_count()
    }

    pub fn data(&self) -> &PixelData {
        &self.data
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            PixelData::Float32(v) => Some(v),
            PixelData::UInt8(_) => None,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.data {
            PixelData::UInt8(v) => Some(v),
            PixelData::Float32(_) => None,
        }
    }

    /// The stored components of pixel `(x, y)` as floats, without undoing any transfer curve.
    /// 8-bit values are normalized to `[0, 1]`.
    pub fn pixel(&self, x: u32, y: u32) -> Vec<Float> {
        let n = self.channel_count();
        let start = (y as usize * self.width as usize + x as usize) * n;
        match &self.data {
            PixelData::Float32(v) => v[start..start + n].to_vec(),
            PixelData::UInt8(v) => v[start..start + n].iter().map(|&c| c as Float / 255.0).collect(),
        }
    }

    /// Linear float components, one pixel at a time.
    fn linear_pixels(&self) -> Vec<f32> {
        let n = self.channel_count();
        let alpha = if self.pixel_format.has_alpha() { Some(n - 1) } else { None };
        let decode = |i: usize, v: Float| {
            if self.srgb_gamma && Some(i % n) != alpha { inverse_gamma_correct(v) } else { v }
        };
        match &self.data {
            PixelData::Float32(v) => v.iter().enumerate().map(|(i, &c)| decode(i, c)).collect(),
            PixelData::UInt8(v) => v.iter().enumerate().map(|(i, &c)| decode(i, c as Float / 255.0)).collect(),
        }
    }

    /// Converts to another pixel format, component format and transfer curve.
    ///
    /// Channel conversion happens on linear values: luminance uses Rec.709 weights and a
    /// missing alpha channel is filled with 1. When `srgb_gamma` is set the color channels of
    /// the result are sRGB encoded, otherwise they are linear. Converting to 8-bit clamps to
    /// `[0, 1]` and rounds.
    pub fn convert(&self, pixel_format: PixelFormat, component: ComponentFormat, srgb_gamma: bool) -> Bitmap {
        let src_n = self.channel_count();
        let dst_n = pixel_format.channel_count();
        let linear = self.linear_pixels();

        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * dst_n);
        for px in linear.chunks_exact(src_n) {
            let (rgb, alpha) = match self.pixel_format {
                PixelFormat::Y => ([px[0]; 3], 1.0),
                PixelFormat::YA => ([px[0]; 3], px[1]),
                PixelFormat::Rgb => ([px[0], px[1], px[2]], 1.0),
                PixelFormat::Rgba => ([px[0], px[1], px[2]], px[3]),
            };
            let encode = |v: Float| if srgb_gamma { gamma_correct(v) } else { v };
            match pixel_format {
                PixelFormat::Y => out.push(encode(luminance(rgb))),
                PixelFormat::YA => {
                    out.push(encode(luminance(rgb)));
                    out.push(alpha);
                }
                PixelFormat::Rgb => out.extend(rgb.iter().map(|&c| encode(c))),
                PixelFormat::Rgba => {
                    out.extend(rgb.iter().map(|&c| encode(c)));
                    out.push(alpha);
                }
            }
        }

        let data = match component {
            ComponentFormat::Float32 => PixelData::Float32(out),
            ComponentFormat::UInt8 => PixelData::UInt8(out.into_iter().map(quantize).collect()),
        };
        Bitmap { pixel_format, width: self.width, height: self.height, srgb_gamma, data }
    }

    /// Linear float copy with the color channels scaled by `2^stops`.
    pub fn with_exposure(&self, stops: Float) -> Bitmap {
        let mut linear = self.convert(self.pixel_format, ComponentFormat::Float32, false);
        if stops == 0.0 {
            return linear;
        }
        let scale = stops.exp2();
        let n = linear.channel_count();
        let alpha = if linear.pixel_format.has_alpha() { Some(n - 1) } else { None };
        if let PixelData::Float32(v) = &mut linear.data {
            for (i, c) in v.iter_mut().enumerate() {
                if Some(i % n) != alpha {
                    *c *= scale;
                }
            }
        }
        linear
    }

    /// Writes the bitmap, picking the file format from the extension of `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)
            .ok_or_else(|| ExportError::UnsupportedFormat(path.to_path_buf()))?;
        self.write_with_format(path, format)
    }

    pub fn write_with_format(&self, path: impl AsRef<Path>, format: FileFormat) -> Result<(), ExportError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), ?format, width = self.width, height = self.height, "writing bitmap");
        match format {
            FileFormat::Png => raster::write_png(self, path),
            FileFormat::Ppm => raster::write_ppm(self, path),
            FileFormat::Rgbe => raster::write_hdr(self, path),
            FileFormat::OpenExr => exr::write_exr(self, path),
        }
    }

    /// Reads a PNG, PPM or OpenEXR file.
    pub fn read(path: impl AsRef<Path>) -> Result<Bitmap, ExportError> {
        let path = path.as_ref();
        match FileFormat::from_path(path) {
            Some(FileFormat::OpenExr) => exr::read_exr(path),
            Some(FileFormat::Png) | Some(FileFormat::Ppm) => raster::read_ldr(path),
            _ => Err(ExportError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

fn quantize(v: Float) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn gamma_correct(v: Float) -> Float {
    if v <= 0.0031308 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

pub fn inverse_gamma_correct(v: Float) -> Float {
    if v <= 0.04045 {
        v * 1.0 / 12.92
    } else {
        ((v + 0.055) * 1.0 / 1.055).powf(2.4)
    }
}
