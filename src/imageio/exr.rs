use crate::error::ExportError;
use crate::imageio::{Bitmap, ComponentFormat, PixelFormat};
use exr::prelude::*;
use std::result::Result;
use std::path::Path;

/// Writes the linear float data of `bitmap` as a losslessly compressed OpenEXR file.
/// Luminance images are expanded to RGB; 8-bit data is linearized first.
pub fn write_exr(bitmap: &Bitmap, path: &Path) -> Result<(), ExportError> {
    let (w, h) = (bitmap.width() as usize, bitmap.height() as usize);
    let has_alpha = bitmap.pixel_format().has_alpha();
    let target = if has_alpha { PixelFormat::Rgba } else { PixelFormat::Rgb };
    let linear = if bitmap.pixel_format() == target
        && bitmap.component_format() == ComponentFormat::Float32
        && !bitmap.srgb_gamma()
    {
        bitmap.clone()
    } else {
        bitmap.convert(target, ComponentFormat::Float32, false)
    };
    let data = linear.as_f32().unwrap_or(&[]);
    let n = target.channel_count();

    if has_alpha {
        let channels = SpecificChannels::rgba(|Vec2(x, y)| {
            let i = (y * w + x) * n;
            (data[i], data[i + 1], data[i + 2], data[i + 3])
        });
        Image::from_encoded_channels((w, h), Encoding::SMALL_LOSSLESS, channels)
            .write()
            .to_file(path)?;
    } else {
        let channels = SpecificChannels::rgb(|Vec2(x, y)| {
            let i = (y * w + x) * n;
            (data[i], data[i + 1], data[i + 2])
        });
        Image::from_encoded_channels((w, h), Encoding::SMALL_LOSSLESS, channels)
            .write()
            .to_file(path)?;
    }
    Ok(())
}

/// Reads the first RGBA layer of an OpenEXR file. Files without an alpha channel come
/// back as RGB.
pub fn read_exr(path: &Path) -> Result<Bitmap, ExportError> {
    let image = read_first_rgba_layer_from_file(
        path,
        |resolution, channels| {
            let has_alpha = channels.3.is_some();
            let n = if has_alpha { 4 } else { 3 };
            (vec![0.0f32; resolution.width() * resolution.height() * n], resolution.width(), has_alpha)
        },
        |(pixels, width, has_alpha), position, (r, g, b, a): (f32, f32, f32, f32)| {
            let n = if *has_alpha { 4 } else { 3 };
            let i = (position.y() * *width + position.x()) * n;
            pixels[i] = r;
            pixels[i + 1] = g;
            pixels[i + 2] = b;
            if *has_alpha {
                pixels[i + 3] = a;
            }
        },
    )?;

    let size = image.layer_data.size;
    let (pixels, _, has_alpha) = image.layer_data.channel_data.pixels;
    let format = if has_alpha { PixelFormat::Rgba } else { PixelFormat::Rgb };
    Ok(Bitmap::from_f32(format, size.width() as u32, size.height() as u32, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exr_preserves_float_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.exr");
        let data = vec![0.0, 1.5, 1.0e-3, 42.25, 0.125, 7.0];
        let bitmap = Bitmap::from_rgb_f32(2, 1, data.clone());

        write_exr(&bitmap, &path).unwrap();
        let read = read_exr(&path).unwrap();

        assert_eq!(read.size(), (2, 1));
        assert_eq!(read.pixel_format(), PixelFormat::Rgb);
        assert_eq!(read.as_f32().unwrap(), &data[..]);
    }

    #[test]
    fn test_luminance_is_expanded_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("y.exr");
        let bitmap = Bitmap::from_f32(PixelFormat::Y, 1, 1, vec![0.75]);

        write_exr(&bitmap, &path).unwrap();
        let read = read_exr(&path).unwrap();
        assert_eq!(read.pixel(0, 0), vec![0.75, 0.75, 0.75]);
    }
}
