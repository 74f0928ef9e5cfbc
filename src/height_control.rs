use crate::config::{Config, DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY};

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Picks the height of every node the map creates.
///
/// Heights are in `[1, max_height()]`. A height is drawn once per inserted node
/// and never changes afterwards.
pub trait HeightControl: fmt::Debug {
    fn max_height(&self) -> usize;
    fn get_height(&mut self) -> usize;
    fn box_clone(&self) -> Box<dyn HeightControl>;

    /// A controller for a copy of the map. Unlike `box_clone`, it should not
    /// repeat the heights this controller is about to draw.
    fn fork(&self) -> Box<dyn HeightControl> {
        self.box_clone()
    }
}

impl Clone for Box<dyn HeightControl> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

#[derive(Debug, Clone)]
pub struct GeometricalGenerator<R = StdRng> {
    upgrade_probability_: f64,
    max_height_: usize,
    rng_: R,
}

impl GeometricalGenerator<StdRng> {
    pub fn new(max_height: usize, upgrade_probability: f64) -> Self {
        Self::with_rng(max_height, upgrade_probability, StdRng::from_entropy())
    }

    pub fn with_seed(max_height: usize, upgrade_probability: f64, seed: u64) -> Self {
        Self::with_rng(
            max_height,
            upgrade_probability,
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn from_config(config: &Config) -> Self {
        match config.seed {
            Some(seed) => Self::with_seed(config.max_level, config.probability, seed),
            None => Self::new(config.max_level, config.probability),
        }
    }
}

impl<R: RngCore> GeometricalGenerator<R> {
    pub fn with_rng(max_height: usize, upgrade_probability: f64, rng: R) -> Self {
        GeometricalGenerator {
            upgrade_probability_: upgrade_probability,
            max_height_: max_height,
            rng_: rng,
        }
    }
}

impl Default for GeometricalGenerator<StdRng> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY)
    }
}

impl<R> HeightControl for GeometricalGenerator<R>
where
    R: RngCore + SeedableRng + Clone + fmt::Debug + 'static,
{
    #[inline(always)]
    fn max_height(&self) -> usize {
        self.max_height_
    }

    fn get_height(&mut self) -> usize {
        // Counts coin flips until the first failure, starting at 1. Every loop
        // iteration consumes a draw, so a call takes at most `max_height_`
        // draws.
        let mut h = 1;

        while self.rng_.gen::<f64>() < self.upgrade_probability_ && h < self.max_height_ {
            h += 1;
        }

        h
    }

    fn box_clone(&self) -> Box<dyn HeightControl> {
        Box::new(self.clone())
    }

    /// Seeds the fork from a copy of this generator's stream. The result is
    /// reproducible for seeded generators but diverges from the original.
    fn fork(&self) -> Box<dyn HeightControl> {
        let mut source = self.rng_.clone();
        match R::from_rng(&mut source) {
            Ok(rng) => Box::new(GeometricalGenerator::with_rng(
                self.max_height_,
                self.upgrade_probability_,
                rng,
            )),
            Err(_) => self.box_clone(),
        }
    }
}
