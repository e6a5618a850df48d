use std::{
    collections::HashMap,
    env,
    error::Error,
    sync::{OnceLock, RwLock},
};

use rand::{random, rngs::StdRng, Rng, SeedableRng};

pub const DEFAULT_TEST_SEED_ENV: &str = "DEFAULT_TEST_SEED";

static SEEDS: OnceLock<RwLock<HashMap<&'static str, u64>>> = OnceLock::new();

fn seeds() -> &'static RwLock<HashMap<&'static str, u64>> {
    SEEDS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Seed bound to `key`: read from the env var of the same name, random otherwise.
/// The first resolution is printed so a failing run can be replayed.
pub fn resolve_seed(key: &'static str) -> Result<u64, Box<dyn Error>> {
    if let Some(&seed) = seeds().read()?.get(key) {
        return Ok(seed);
    }
    let mut seeds = seeds().write()?;
    Ok(*seeds.entry(key).or_insert_with(|| {
        let seed = env::var(key)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or_else(random);
        println!("Using seed {seed} for {key}");
        seed
    }))
}

pub fn get_seeded_rng() -> Result<StdRng, Box<dyn Error>> {
    get_seeded_rng_from_scope(DEFAULT_TEST_SEED_ENV)
}

pub fn get_seeded_rng_from_scope(key: &'static str) -> Result<StdRng, Box<dyn Error>> {
    Ok(StdRng::seed_from_u64(resolve_seed(key)?))
}

/// Two generators producing the same stream, for reproducibility checks.
pub fn get_twin_rngs() -> Result<(StdRng, StdRng), Box<dyn Error>> {
    let seed = resolve_seed(DEFAULT_TEST_SEED_ENV)?;
    Ok((StdRng::seed_from_u64(seed), StdRng::seed_from_u64(seed)))
}

/// Random RGBA bytes for a `width` x `height` image.
pub fn random_rgba(rng: &mut impl Rng, width: u32, height: u32) -> Vec<u8> {
    (0..width as usize * height as usize * 4)
        .map(|_| rng.gen())
        .collect()
}

/// Random RGBA bytes where every pixel is fully opaque.
pub fn random_opaque_rgba(rng: &mut impl Rng, width: u32, height: u32) -> Vec<u8> {
    let mut bytes = random_rgba(rng, width, height);
    bytes.chunks_exact_mut(4).for_each(|pixel| pixel[3] = u8::MAX);
    bytes
}
