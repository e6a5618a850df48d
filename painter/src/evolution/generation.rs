use std::mem;

use log::trace;
use rand::Rng;

use super::EvolutionError;
use crate::{fitness::FitnessMetric, mutation::Mutation, raster::RasterBuffer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOutcome {
    /// Fitness of the parent the generation started from.
    pub parent_fitness: f64,
    /// Fitness of the parent the generation ended with.
    pub fitness: f64,
}

impl GenerationOutcome {
    pub fn improved(&self) -> bool {
        self.fitness < self.parent_fitness
    }
}

/// Runs one generation of the (1+λ) strategy on `parent`, in place.
///
/// Each of the `population_size` trials mutates its own copy of the same
/// parent, so trials never compound. The best trial replaces the parent only
/// when it is strictly fitter; ties keep the parent.
pub fn run_generation<R: Rng>(
    target: &RasterBuffer,
    parent: &mut RasterBuffer,
    population_size: usize,
    metric: FitnessMetric,
    mutation: &dyn Mutation,
    rng: &mut R,
) -> Result<GenerationOutcome, EvolutionError> {
    if population_size == 0 {
        return Err(EvolutionError::InvalidConfig(
            "population size must be positive".to_string(),
        ));
    }
    let parent_fitness = metric.evaluate(target, parent)?;

    let mut trial = parent.clone();
    let mut best_trial = parent.clone();
    let mut best_fitness = f64::INFINITY;
    for _ in 0..population_size {
        trial.copy_from(parent)?;
        mutation.mutate(&mut trial, rng);
        let fitness = metric.evaluate(target, &trial)?;
        if fitness < best_fitness {
            mem::swap(&mut trial, &mut best_trial);
            best_fitness = fitness;
        }
    }

    if best_fitness < parent_fitness {
        trace!("Offspring replaces parent: {parent_fitness} -> {best_fitness}");
        mem::swap(parent, &mut best_trial);
        Ok(GenerationOutcome {
            parent_fitness,
            fitness: best_fitness,
        })
    } else {
        Ok(GenerationOutcome {
            parent_fitness,
            fitness: parent_fitness,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use common_test::{get_seeded_rng, get_twin_rngs, random_opaque_rgba};
    use rand::RngCore;

    use super::run_generation;
    use crate::{
        evolution::EvolutionError,
        fitness::FitnessMetric,
        mutation::{CircleMutation, Mutation},
        raster::{RasterBuffer, RasterError, Rgba, TRANSPARENT},
    };

    const BLACK: Rgba = [0, 0, 0, 255];

    struct NoopMutation;

    impl Mutation for NoopMutation {
        fn mutate(&self, _: &mut RasterBuffer, _: &mut dyn RngCore) {}
    }

    /// Erases one pixel per call, walking the pixels in order.
    #[derive(Default)]
    struct PixelEraser {
        calls: Cell<u32>,
    }

    impl Mutation for PixelEraser {
        fn mutate(&self, buffer: &mut RasterBuffer, _: &mut dyn RngCore) {
            let index = self.calls.get();
            self.calls.set(index + 1);
            let (x, y) = (index % buffer.width(), index / buffer.width());
            buffer.clear_rect(x as i64, y as i64, 1, 1);
        }
    }

    fn disk_target() -> RasterBuffer {
        let mut target = RasterBuffer::new(24, 24).unwrap();
        target.fill_circle(12, 12, 7, BLACK);
        target
    }

    #[test]
    fn test_run_generation_rejects_empty_population() {
        let target = disk_target();
        let mut parent = RasterBuffer::new(24, 24).unwrap();

        let result = run_generation(
            &target,
            &mut parent,
            0,
            FitnessMetric::Perceptual,
            &CircleMutation::default(),
            &mut get_seeded_rng().unwrap(),
        );

        assert!(matches!(result, Err(EvolutionError::InvalidConfig(_))));
    }

    #[test]
    fn test_run_generation_rejects_shape_mismatch() {
        let target = disk_target();
        let mut parent = RasterBuffer::new(24, 23).unwrap();

        let result = run_generation(
            &target,
            &mut parent,
            4,
            FitnessMetric::AlphaOnly,
            &CircleMutation::default(),
            &mut get_seeded_rng().unwrap(),
        );

        assert!(matches!(
            result,
            Err(EvolutionError::Raster(RasterError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_run_generation_never_increases_fitness() {
        // Given
        let mut rng = get_seeded_rng().unwrap();
        let target = RasterBuffer::from_rgba(16, 12, random_opaque_rgba(&mut rng, 16, 12)).unwrap();
        let mut parent = RasterBuffer::new(16, 12).unwrap();
        let mutation = CircleMutation::default();

        for metric in [FitnessMetric::Perceptual, FitnessMetric::AlphaOnly] {
            for _ in 0..30 {
                // When
                let before = metric.evaluate(&target, &parent).unwrap();
                let outcome =
                    run_generation(&target, &mut parent, 8, metric, &mutation, &mut rng).unwrap();

                // Then
                assert_eq!(before, outcome.parent_fitness);
                assert!(outcome.fitness <= before, "Should never get worse");
                assert_eq!(
                    outcome.fitness,
                    metric.evaluate(&target, &parent).unwrap(),
                    "Should report the fitness of the returned parent"
                );
            }
        }
    }

    #[test]
    fn test_run_generation_is_reproducible() {
        let (mut rng_a, mut rng_b) = get_twin_rngs().unwrap();
        let target = disk_target();
        let mut parent_a = RasterBuffer::new(24, 24).unwrap();
        let mut parent_b = parent_a.clone();
        let mutation = CircleMutation::default();

        for _ in 0..5 {
            let a = run_generation(
                &target,
                &mut parent_a,
                6,
                FitnessMetric::Perceptual,
                &mutation,
                &mut rng_a,
            )
            .unwrap();
            let b = run_generation(
                &target,
                &mut parent_b,
                6,
                FitnessMetric::Perceptual,
                &mutation,
                &mut rng_b,
            )
            .unwrap();
            assert_eq!(a, b);
        }
        assert_eq!(parent_a, parent_b);
    }

    #[test]
    fn test_run_generation_keeps_parent_without_improvement() {
        let target = disk_target();
        let mut parent = RasterBuffer::new(24, 24).unwrap();
        let expected = parent.clone();

        let outcome = run_generation(
            &target,
            &mut parent,
            3,
            FitnessMetric::Perceptual,
            &NoopMutation,
            &mut get_seeded_rng().unwrap(),
        )
        .unwrap();

        assert!(!outcome.improved());
        assert_eq!(outcome.parent_fitness, outcome.fitness);
        assert_eq!(expected, parent);
    }

    #[test]
    fn test_run_generation_keeps_first_of_tied_trials_without_compounding() {
        // Given: erasing either pixel improves the fitness by the same amount
        let target = RasterBuffer::new(2, 1).unwrap();
        let mut parent = RasterBuffer::filled(2, 1, BLACK).unwrap();
        let mutation = PixelEraser::default();

        // When
        let outcome = run_generation(
            &target,
            &mut parent,
            2,
            FitnessMetric::AlphaOnly,
            &mutation,
            &mut get_seeded_rng().unwrap(),
        )
        .unwrap();

        // Then
        assert!(outcome.improved());
        assert_eq!(2, mutation.calls.get());
        assert_eq!(Some(TRANSPARENT), parent.pixel(0, 0), "Should keep the first trial");
        assert_eq!(
            Some(BLACK),
            parent.pixel(1, 0),
            "Should not carry the second trial over the first"
        );
    }
}
