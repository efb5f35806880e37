use crate::error::ExportError;
use crate::imageio::{Bitmap, ComponentFormat, PixelFormat};
use image::codecs::hdr::HdrEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
    Ok(BufWriter::new(file))
}

/// 8-bit sRGB data, keeping the alpha channel if there is one.
fn to_srgb8(bitmap: &Bitmap, keep_alpha: bool) -> (Bitmap, ExtendedColorType) {
    let (format, color) = match (bitmap.pixel_format(), keep_alpha) {
        (PixelFormat::Y, _) => (PixelFormat::Y, ExtendedColorType::L8),
        (PixelFormat::YA, true) => (PixelFormat::YA, ExtendedColorType::La8),
        (PixelFormat::Rgba, true) => (PixelFormat::Rgba, ExtendedColorType::Rgba8),
        _ => (PixelFormat::Rgb, ExtendedColorType::Rgb8),
    };
    let converted = if bitmap.pixel_format() == format
        && bitmap.component_format() == ComponentFormat::UInt8
        && bitmap.srgb_gamma()
    {
        bitmap.clone()
    } else {
        bitmap.convert(format, ComponentFormat::UInt8, true)
    };
    (converted, color)
}

pub fn write_png(bitmap: &Bitmap, path: &Path) -> Result<(), ExportError> {
    let (converted, color) = match bitmap.component_format() {
        // 8-bit bitmaps are written as they are, whatever their transfer curve
        ComponentFormat::UInt8 => {
            let color = match bitmap.pixel_format() {
                PixelFormat::Y => ExtendedColorType::L8,
                PixelFormat::YA => ExtendedColorType::La8,
                PixelFormat::Rgb => ExtendedColorType::Rgb8,
                PixelFormat::Rgba => ExtendedColorType::Rgba8,
            };
            (bitmap.clone(), color)
        }
        ComponentFormat::Float32 => to_srgb8(bitmap, true),
    };
    let buf = converted.as_u8().unwrap_or(&[]);
    let writer = create(path)?;
    PngEncoder::new(writer).write_image(buf, converted.width(), converted.height(), color)?;
    Ok(())
}

/// Binary PPM, always 8-bit sRGB without alpha.
pub fn write_ppm(bitmap: &Bitmap, path: &Path) -> Result<(), ExportError> {
    let converted = bitmap.convert(PixelFormat::Rgb, ComponentFormat::UInt8, true);
    let buf = converted.as_u8().unwrap_or(&[]);
    let writer = create(path)?;
    PnmEncoder::new(writer)
        .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
        .write_image(buf, converted.width(), converted.height(), ExtendedColorType::Rgb8)?;
    Ok(())
}

/// Radiance RGBE of the linear RGB values.
pub fn write_hdr(bitmap: &Bitmap, path: &Path) -> Result<(), ExportError> {
    let linear = bitmap.convert(PixelFormat::Rgb, ComponentFormat::Float32, false);
    let pixels: Vec<Rgb<f32>> = linear.as_f32()
        .unwrap_or(&[])
        .chunks_exact(3)
        .map(|c| Rgb([c[0], c[1], c[2]]))
        .collect();
    let writer = create(path)?;
    HdrEncoder::new(writer).encode(&pixels, linear.width() as usize, linear.height() as usize)?;
    Ok(())
}

/// Reads an 8-bit image. The result is tagged as sRGB encoded.
pub fn read_ldr(path: &Path) -> Result<Bitmap, ExportError> {
    let img = image::open(path)?;
    let (w, h) = (img.width(), img.height());
    let bitmap = match img {
        DynamicImage::ImageLuma8(buf) => Bitmap::from_u8(PixelFormat::Y, w, h, buf.into_raw(), true),
        DynamicImage::ImageLumaA8(buf) => Bitmap::from_u8(PixelFormat::YA, w, h, buf.into_raw(), true),
        img if img.color().has_alpha() => Bitmap::from_u8(PixelFormat::Rgba, w, h, img.to_rgba8().into_raw(), true),
        img => Bitmap::from_u8(PixelFormat::Rgb, w, h, img.to_rgb8().into_raw(), true),
    };
    Ok(bitmap)
}
