pub mod evolution;
pub mod fitness;
pub mod mutation;
pub mod raster;

pub use fitness::FitnessMetric;
pub use raster::{RasterBuffer, RasterError, RasterSnapshot, Rgba};
