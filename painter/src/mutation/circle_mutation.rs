use rand::{Rng, RngCore};

use super::{Mutation, MutationConfig};
use crate::raster::{RasterBuffer, Rgba};

/// Erases random rectangles and draws random opaque circles.
///
/// Pairing erase with draw lets the search remove shapes as well as add them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CircleMutation {
    config: MutationConfig,
}

impl CircleMutation {
    pub fn new(config: MutationConfig) -> Self {
        CircleMutation { config }
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }
}

impl From<&MutationConfig> for CircleMutation {
    fn from(config: &MutationConfig) -> Self {
        CircleMutation::new(*config)
    }
}

impl Mutation for CircleMutation {
    fn mutate(&self, buffer: &mut RasterBuffer, rng: &mut dyn RngCore) {
        let (width, height) = buffer.dimensions();
        let (width, height) = (width as f64, height as f64);
        let divisor = self.config.erase_divisor as f64;
        let max_radius = self.config.max_radius as f64;

        for _ in 0..self.config.rounds {
            let x = rand_int(rng, width);
            let y = rand_int(rng, height);
            let w = rand_int(rng, width / divisor);
            let h = rand_int(rng, height / divisor);
            buffer.clear_rect(x, y, w, h);

            let cx = rand_int(rng, width);
            let cy = rand_int(rng, height);
            let radius = rand_int(rng, max_radius) as u32;
            buffer.fill_circle(cx, cy, radius, random_color(rng));
        }
    }
}

/// `floor(u * max)` with `u` uniform in `[0, 1)`; always 0 when `max <= 1`.
fn rand_int(rng: &mut dyn RngCore, max: f64) -> i64 {
    (rng.gen::<f64>() * max).floor() as i64
}

fn random_color(rng: &mut dyn RngCore) -> Rgba {
    [rng.gen(), rng.gen(), rng.gen(), u8::MAX]
}
