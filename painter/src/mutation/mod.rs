mod circle_mutation;

pub use circle_mutation::CircleMutation;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::raster::RasterBuffer;

/// Random in-place change applied to a trial copy of the parent.
pub trait Mutation {
    fn mutate(&self, buffer: &mut RasterBuffer, rng: &mut dyn RngCore);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MutationConfig {
    /// Erase-then-draw pairs per mutation.
    #[validate(range(min = 1, max = 1_000))]
    pub rounds: usize,
    /// Exclusive upper bound of circle radii, in pixels.
    #[validate(range(min = 1, max = 65_536))]
    pub max_radius: u32,
    /// Erased rectangles are smaller than width / divisor by height / divisor.
    #[validate(range(min = 1, max = 65_536))]
    pub erase_divisor: u32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        MutationConfig {
            rounds: 5,
            max_radius: 5,
            erase_divisor: 10,
        }
    }
}
