use crate::{Float, Point2f, Point2i};
use crate::sampler::Sampler;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Uniform random samples with no stratification.
#[derive(Clone, Debug)]
pub struct IndependentSampler {
    rng: Xoshiro256Plus,
    samples_per_pixel: u32,
    current_sample: u32,
    seed: u64,
}

impl IndependentSampler {
    pub fn new(samples_per_pixel: u32, seed: u64) -> Self {
        Self {
            rng: Xoshiro256Plus::seed_from_u64(seed),
            samples_per_pixel: samples_per_pixel.max(1),
            current_sample: 0,
            seed,
        }
    }
}

impl Sampler for IndependentSampler {
    fn start_pixel(&mut self, _pixel: Point2i) {
        self.current_sample = 0;
    }

    fn start_next_sample(&mut self) -> bool {
        if self.current_sample >= self.samples_per_pixel {
            return false;
        }
        self.current_sample += 1;
        true
    }

    fn get_1d(&mut self) -> Float {
        self.rng.gen()
    }

    fn get_2d(&mut self) -> Point2f {
        Point2f::new(self.rng.gen(), self.rng.gen())
    }

    fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self::new(self.samples_per_pixel, seed))
    }
}
