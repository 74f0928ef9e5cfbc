use crate::error::{Error, Result};
use crate::level::Level;

pub const DEFAULT_MAX_LEVEL: usize = 16;
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Construction time settings for a `SkipListMap`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Highest level the height controller may generate. Must not exceed the
    /// map's `MAX_LEVEL` parameter.
    pub max_level: usize,
    /// Probability of promoting a node to the next level.
    pub probability: f64,
    /// Seed for the level generator. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}

impl Config {
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the settings against a map whose levels are capped at `MAX_LEVEL`.
    pub fn validate<const MAX_LEVEL: usize>(&self) -> Result<()> {
        let max_level = Level::<MAX_LEVEL>::new(self.max_level)?;
        if max_level == 0usize {
            return Err(Error::LevelOutOfBounds { max: MAX_LEVEL });
        }

        if !(self.probability > 0.0 && self.probability < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "probability must lie in (0, 1), got {}",
                self.probability
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate::<16>().is_ok());
        assert!(config.validate::<32>().is_ok());
    }

    #[test]
    fn test_max_level_above_parameter() {
        let config = Config::default();
        assert_eq!(
            config.validate::<8>(),
            Err(Error::LevelOutOfBounds { max: 8 })
        );
    }

    #[test]
    fn test_zero_max_level() {
        let config = Config::default().with_max_level(0);
        assert!(config.validate::<16>().is_err());
    }

    #[test]
    fn test_invalid_probability() {
        for probability in &[0.0, 1.0, -0.5, 2.0, f64::NAN] {
            let config = Config::default().with_probability(*probability);
            match config.validate::<16>() {
                Err(Error::InvalidConfig(_)) => {}
                other => panic!("unexpected result {:?} for {}", other, probability),
            }
        }
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_max_level(4)
            .with_probability(0.25)
            .with_seed(7);
        assert_eq!(config.max_level, 4);
        assert_eq!(config.probability, 0.25);
        assert_eq!(config.seed, Some(7));
        assert!(config.validate::<4>().is_ok());
    }
}
