use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::raster::{RasterBuffer, RasterError, CHANNELS};

const ALPHA: usize = 3;

/// Channel weights of the perceptual metric, approximating how much each
/// channel contributes to perceived luminance. Alpha counts in full.
pub const PERCEPTUAL_WEIGHTS: [f64; CHANNELS] = [0.212656, 0.715158, 0.072186, 1.0];

/// Pixel distance between a target and a candidate; lower is better.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum FitnessMetric {
    /// Weighted sum of the per-channel mean squared errors.
    #[default]
    #[serde(rename = "perceptual")]
    #[strum(to_string = "perceptual")]
    Perceptual,
    /// Mean squared error of the alpha channel, ignoring color.
    #[serde(rename = "alpha", alias = "alpha-only")]
    #[strum(to_string = "alpha", serialize = "alpha-only")]
    AlphaOnly,
}

impl FitnessMetric {
    pub fn evaluate(
        self,
        target: &RasterBuffer,
        candidate: &RasterBuffer,
    ) -> Result<f64, RasterError> {
        target.ensure_same_shape(candidate)?;
        let pixel_count = target.pixel_count() as f64;

        let fitness = match self {
            FitnessMetric::Perceptual => squared_errors(target.pixels(), candidate.pixels())
                .iter()
                .zip(PERCEPTUAL_WEIGHTS)
                .map(|(&error, weight)| error as f64 / pixel_count * weight)
                .sum(),
            FitnessMetric::AlphaOnly => {
                channel_squared_error(target.pixels(), candidate.pixels(), ALPHA) as f64
                    / pixel_count
            }
        };
        Ok(fitness)
    }
}

fn squared_errors(a: &[u8], b: &[u8]) -> [u64; CHANNELS] {
    a.chunks_exact(CHANNELS)
        .zip(b.chunks_exact(CHANNELS))
        .fold([0; CHANNELS], |mut errors, (pa, pb)| {
            for (error, (&ca, &cb)) in errors.iter_mut().zip(pa.iter().zip(pb)) {
                *error += squared_diff(ca, cb);
            }
            errors
        })
}

fn channel_squared_error(a: &[u8], b: &[u8], channel: usize) -> u64 {
    a.chunks_exact(CHANNELS)
        .zip(b.chunks_exact(CHANNELS))
        .map(|(pa, pb)| squared_diff(pa[channel], pb[channel]))
        .sum()
}

#[inline]
fn squared_diff(a: u8, b: u8) -> u64 {
    let diff = a.abs_diff(b) as u64;
    diff * diff
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use common_test::{get_seeded_rng, random_rgba};

    use super::{FitnessMetric, PERCEPTUAL_WEIGHTS};
    use crate::raster::{RasterBuffer, RasterError};

    const FULL: f64 = 255.0 * 255.0;

    fn assert_close(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_identical_buffers_have_zero_fitness() {
        // Given
        let mut rng = get_seeded_rng().unwrap();
        let buffer = RasterBuffer::from_rgba(7, 5, random_rgba(&mut rng, 7, 5)).unwrap();

        // Then
        assert_eq!(0.0, FitnessMetric::Perceptual.evaluate(&buffer, &buffer).unwrap());
        assert_eq!(0.0, FitnessMetric::AlphaOnly.evaluate(&buffer, &buffer).unwrap());
    }

    #[test]
    fn test_alpha_only_ignores_color() {
        let target = RasterBuffer::filled(3, 3, [0, 0, 0, 128]).unwrap();
        let candidate = RasterBuffer::filled(3, 3, [200, 10, 90, 128]).unwrap();

        assert_eq!(0.0, FitnessMetric::AlphaOnly.evaluate(&target, &candidate).unwrap());
        assert!(FitnessMetric::Perceptual.evaluate(&target, &candidate).unwrap() > 0.0);
    }

    #[test]
    fn test_transparent_target_against_opaque_red() {
        // Given
        let target = RasterBuffer::new(2, 2).unwrap();
        let candidate = RasterBuffer::filled(2, 2, [255, 0, 0, 255]).unwrap();

        // When
        let alpha = FitnessMetric::AlphaOnly.evaluate(&target, &candidate).unwrap();
        let perceptual = FitnessMetric::Perceptual.evaluate(&target, &candidate).unwrap();

        // Then
        assert_close(FULL, alpha);
        assert_close((PERCEPTUAL_WEIGHTS[0] + PERCEPTUAL_WEIGHTS[3]) * FULL, perceptual);
    }

    #[test]
    fn test_transparent_target_against_opaque_black() {
        let target = RasterBuffer::new(2, 2).unwrap();
        let candidate = RasterBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();

        assert_close(
            FULL,
            FitnessMetric::Perceptual.evaluate(&target, &candidate).unwrap(),
        );
    }

    #[test]
    fn test_perceptual_averages_per_pixel() {
        // Given: a single opaque dark green pixel out of four
        let target = RasterBuffer::new(2, 2).unwrap();
        let mut candidate = target.clone();
        candidate.fill_circle(0, 0, 1, [0, 10, 0, 0]);

        // When
        let result = FitnessMetric::Perceptual.evaluate(&target, &candidate).unwrap();

        // Then
        assert_close((100.0 * PERCEPTUAL_WEIGHTS[1] + FULL) / 4.0, result);
    }

    #[test]
    fn test_shape_mismatch() {
        let result = FitnessMetric::Perceptual.evaluate(
            &RasterBuffer::new(2, 2).unwrap(),
            &RasterBuffer::new(3, 2).unwrap(),
        );
        assert!(matches!(result, Err(RasterError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Ok(FitnessMetric::Perceptual), FitnessMetric::from_str("perceptual"));
        assert_eq!(Ok(FitnessMetric::AlphaOnly), FitnessMetric::from_str("alpha"));
        assert_eq!(Ok(FitnessMetric::AlphaOnly), FitnessMetric::from_str("Alpha-Only"));
        assert!(
            FitnessMetric::from_str("luminance").is_err(),
            "Should reject unknown selectors"
        );
        assert_eq!("alpha", FitnessMetric::AlphaOnly.to_string());
    }
}
