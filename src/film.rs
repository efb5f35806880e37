use crate::{Bounds2i, Float, Point2f, Point2i};
use crate::filter::Filter;
use crate::imageio::{Bitmap, PixelFormat};
use crate::spectrum::Spectrum;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default)]
struct FilmPixel {
    contrib_sum: [Float; 3],
    alpha_sum: Float,
    filter_weight_sum: Float,
}

impl FilmPixel {
    fn add(&mut self, other: &FilmPixel) {
        for c in 0..3 {
            self.contrib_sum[c] += other.contrib_sum[c];
        }
        self.alpha_sum += other.alpha_sum;
        self.filter_weight_sum += other.filter_weight_sum;
    }
}

/// Film configuration: output resolution, channel layout and reconstruction filter.
#[derive(Clone, Debug)]
pub struct Film {
    pub resolution: Point2i,
    pub pixel_format: PixelFormat,
    pub filter: Arc<dyn Filter>,
}

impl Film {
    pub fn new(resolution: Point2i, pixel_format: PixelFormat, filter: Arc<dyn Filter>) -> Self {
        Self { resolution, pixel_format, filter }
    }

    pub fn pixel_bounds(&self) -> Bounds2i {
        Bounds2i::with_bounds(Point2i::new(0, 0), self.resolution)
    }

    /// A tile accumulating the samples taken inside `sample_bounds`. The tile's pixels extend
    /// past the sample bounds by the filter radius, clipped to the image.
    pub fn get_film_tile(&self, sample_bounds: Bounds2i) -> FilmTile {
        let r = self.filter.radius();
        let p0 = Point2i::new(
            (sample_bounds.min.x as Float - 0.5 - r).ceil() as i32,
            (sample_bounds.min.y as Float - 0.5 - r).ceil() as i32,
        );
        let p1 = Point2i::new(
            (sample_bounds.max.x as Float - 0.5 + r).floor() as i32 + 1,
            (sample_bounds.max.y as Float - 0.5 + r).floor() as i32 + 1,
        );
        let pixel_bounds = Bounds2i::with_bounds(p0, p1).intersection(&self.pixel_bounds());
        let n = if pixel_bounds.is_empty() { 0 } else { pixel_bounds.area() as usize };

        FilmTile {
            pixel_bounds,
            filter: Arc::clone(&self.filter),
            pixels: vec![FilmPixel::default(); n],
        }
    }

    pub fn new_accumulator(&self) -> FilmAccumulator {
        let n = self.resolution.x.max(0) as usize * self.resolution.y.max(0) as usize;
        FilmAccumulator { resolution: self.resolution, pixels: vec![FilmPixel::default(); n] }
    }

    /// Normalizes the accumulated samples into a linear float bitmap in the film's pixel
    /// format.
    pub fn develop(&self, acc: &FilmAccumulator) -> Bitmap {
        let n = self.pixel_format.channel_count();
        let mut data = Vec::with_capacity(acc.pixels.len() * n);
        for p in &acc.pixels {
            let inv_w = if p.filter_weight_sum != 0.0 { 1.0 / p.filter_weight_sum } else { 0.0 };
            let rgb = [
                (p.contrib_sum[0] * inv_w).max(0.0),
                (p.contrib_sum[1] * inv_w).max(0.0),
                (p.contrib_sum[2] * inv_w).max(0.0),
            ];
            let alpha = (p.alpha_sum * inv_w).clamp(0.0, 1.0);
            match self.pixel_format {
                PixelFormat::Y => data.push(crate::math::luminance(rgb)),
                PixelFormat::YA => {
                    data.push(crate::math::luminance(rgb));
                    data.push(alpha);
                }
                PixelFormat::Rgb => data.extend_from_slice(&rgb),
                PixelFormat::Rgba => {
                    data.extend_from_slice(&rgb);
                    data.push(alpha);
                }
            }
        }
        Bitmap::from_f32(self.pixel_format, self.resolution.x as u32, self.resolution.y as u32, data)
    }
}

pub struct FilmTile {
    pixel_bounds: Bounds2i,
    filter: Arc<dyn Filter>,
    pixels: Vec<FilmPixel>,
}

impl FilmTile {
    pub fn pixel_bounds(&self) -> Bounds2i {
        self.pixel_bounds
    }

    /// Splats a radiance sample taken at continuous raster position `p_film` onto every pixel
    /// within the filter radius.
    pub fn add_sample(&mut self, p_film: Point2f, l: Spectrum, alpha: Float, sample_weight: Float) {
        let r = self.filter.radius();
        // pixel (x, y) has its center at (x + 0.5, y + 0.5)
        let x0 = ((p_film.x - 0.5 - r).ceil() as i32).max(self.pixel_bounds.min.x);
        let x1 = ((p_film.x - 0.5 + r).floor() as i32).min(self.pixel_bounds.max.x - 1);
        let y0 = ((p_film.y - 0.5 - r).ceil() as i32).max(self.pixel_bounds.min.y);
        let y1 = ((p_film.y - 0.5 + r).floor() as i32).min(self.pixel_bounds.max.y - 1);

        let width = self.pixel_bounds.width();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let w = self.filter.evaluate(
                    x as Float + 0.5 - p_film.x,
                    y as Float + 0.5 - p_film.y,
                ) * sample_weight;
                if w == 0.0 {
                    continue;
                }
                let idx = pixel_offset(Point2i::new(x, y), self.pixel_bounds.min, width);
                let px = &mut self.pixels[idx];
                for c in 0..3 {
                    px.contrib_sum[c] += l[c] * w;
                }
                px.alpha_sum += alpha * w;
                px.filter_weight_sum += w;
            }
        }
    }
}

/// Row-major index of `p` in a buffer whose first pixel is `origin`. Computed in `usize`
/// since the pixel count of a large film does not fit in `i32`.
fn pixel_offset(p: Point2i, origin: Point2i, width: i32) -> usize {
    (p.y - origin.y) as usize * width as usize + (p.x - origin.x) as usize
}

/// Full-resolution sum of every merged tile.
pub struct FilmAccumulator {
    resolution: Point2i,
    pixels: Vec<FilmPixel>,
}

impl FilmAccumulator {
    pub fn merge_film_tile(&mut self, tile: &FilmTile) {
        let b = tile.pixel_bounds;
        let width = b.width();
        for p in b.iter_points() {
            let src = pixel_offset(p, b.min, width);
            let dst = pixel_offset(p, Point2i::new(0, 0), self.resolution.x);
            self.pixels[dst].add(&tile.pixels[src]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{BoxFilter, GaussianFilter};
    use approx::assert_relative_eq;

    #[test]
    fn test_tile_bounds_include_filter_footprint() {
        let film = Film::new(Point2i::new(64, 64), PixelFormat::Rgb, Arc::new(GaussianFilter::default()));
        let tile = film.get_film_tile(Bounds2i::with_bounds(Point2i::new(16, 16), Point2i::new(32, 32)));
        // radius 2 reaches two pixels past the sample bounds on each side
        assert_eq!(tile.pixel_bounds().min, Point2i::new(14, 14));
        assert_eq!(tile.pixel_bounds().max, Point2i::new(34, 34));

        let corner = film.get_film_tile(Bounds2i::with_bounds(Point2i::new(0, 0), Point2i::new(16, 16)));
        assert_eq!(corner.pixel_bounds().min, Point2i::new(0, 0));
    }

    #[test]
    fn test_pixel_offset_past_i32_range() {
        // last pixel of a 50000x50000 film
        let last = pixel_offset(Point2i::new(49_999, 49_999), Point2i::new(0, 0), 50_000);
        assert_eq!(last, 2_499_999_999);

        let film = Film::new(Point2i::new(50_000, 50_000), PixelFormat::Rgb, Arc::new(BoxFilter { radius: 0.5 }));
        let bounds = Bounds2i::with_bounds(Point2i::new(49_984, 49_984), Point2i::new(50_000, 50_000));
        let mut tile = film.get_film_tile(bounds);
        tile.add_sample(Point2f::new(49_999.5, 49_999.5), Spectrum::uniform(1.0), 1.0, 1.0);
        let tb = tile.pixel_bounds();
        let idx = pixel_offset(Point2i::new(49_999, 49_999), tb.min, tb.width());
        assert_eq!(idx, tile.pixels.len() - 1);
        assert_eq!(tile.pixels[idx].filter_weight_sum, 1.0);
    }

    #[test]
    fn test_constant_radiance_develops_to_itself() {
        let film = Film::new(Point2i::new(8, 4), PixelFormat::Rgba, Arc::new(GaussianFilter::default()));
        let mut acc = film.new_accumulator();
        for tile_bounds in film.pixel_bounds().iter_tiles(4) {
            let mut tile = film.get_film_tile(tile_bounds);
            for p in tile_bounds.iter_points() {
                for (dx, dy) in [(0.25, 0.25), (0.75, 0.5), (0.1, 0.9)] {
                    let p_film = Point2f::new(p.x as Float + dx, p.y as Float + dy);
                    tile.add_sample(p_film, Spectrum::rgb(0.5, 1.0, 2.0), 1.0, 1.0);
                }
            }
            acc.merge_film_tile(&tile);
        }

        let bitmap = film.develop(&acc);
        assert_eq!(bitmap.size(), (8, 4));
        for y in 0..4 {
            for x in 0..8 {
                let px = bitmap.pixel(x, y);
                assert_relative_eq!(px[0], 0.5, epsilon = 1e-5);
                assert_relative_eq!(px[1], 1.0, epsilon = 1e-5);
                assert_relative_eq!(px[2], 2.0, epsilon = 1e-5);
                assert_relative_eq!(px[3], 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_box_filter_only_touches_own_pixel() {
        let film = Film::new(Point2i::new(4, 4), PixelFormat::Rgb, Arc::new(BoxFilter::default()));
        let mut acc = film.new_accumulator();
        let mut tile = film.get_film_tile(film.pixel_bounds());
        tile.add_sample(Point2f::new(1.5, 2.25), Spectrum::uniform(1.0), 1.0, 1.0);
        acc.merge_film_tile(&tile);
        let bitmap = film.develop(&acc);
        assert_eq!(bitmap.pixel(1, 2), vec![1.0, 1.0, 1.0]);
        assert_eq!(bitmap.pixel(2, 2), vec![0.0, 0.0, 0.0]);
        assert_eq!(bitmap.pixel(1, 1), vec![0.0, 0.0, 0.0]);
    }
}
