//! Perlin noise-based altitude generation.

use noise::{NoiseFn, Perlin};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Generates plausible altitude readings using Perlin noise.
///
/// Several octaves of noise give both large-scale relief and small-scale
/// variation. The same coordinate always yields the same altitude for a seed.
#[derive(Debug, Clone)]
pub struct ElevationGenerator {
    perlin: Perlin,
    /// Base altitude in meters.
    base_elevation: f64,
    /// Amplitude of terrain variation in meters.
    height_scale: f64,
    /// Spatial frequency in cycles per degree.
    frequency: f64,
    octaves: u32,
}

impl ElevationGenerator {
    pub fn new(seed: u32) -> Self {
        Self::hilly(seed)
    }

    /// Foothills terrain with a few hundred meters of relief.
    pub fn hilly(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 1650.0,
            height_scale: 150.0,
            frequency: 20.0,
            octaves: 4,
        }
    }

    /// Lowland terrain with gentle rolling hills.
    pub fn flat(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 520.0,
            height_scale: 20.0,
            frequency: 20.0,
            octaves: 2,
        }
    }

    /// Altitude at a coordinate, using fractal Brownian motion.
    pub fn elevation_at(&self, lat: f64, lon: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..self.octaves {
            total += self.perlin.get([lat * frequency, lon * frequency]) * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        self.base_elevation + (total / max_amplitude) * self.height_scale
    }

    pub fn base_elevation(&self) -> f64 {
        self.base_elevation
    }

    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }
}

/// Adds receiver noise to an altitude reading.
///
/// Consumer GPS altitude is typically off by 3-20 m.
pub fn add_elevation_jitter(elevation: f64, rng: &mut impl Rng, std_dev: f64) -> f64 {
    match Normal::new(0.0, std_dev) {
        Ok(normal) if std_dev > 0.0 => elevation + normal.sample(rng),
        _ => elevation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevation_consistency() {
        let elev_gen = ElevationGenerator::new(42);
        let elev1 = elev_gen.elevation_at(48.137, 11.575);
        let elev2 = elev_gen.elevation_at(48.137, 11.575);
        assert!((elev1 - elev2).abs() < 0.001);
    }

    #[test]
    fn test_elevation_range() {
        let elev_gen = ElevationGenerator::flat(7);
        for i in 0..20 {
            let elev = elev_gen.elevation_at(48.1 + i as f64 * 0.003, 11.5);
            assert!(elev >= elev_gen.base_elevation() - elev_gen.height_scale());
            assert!(elev <= elev_gen.base_elevation() + elev_gen.height_scale());
        }
    }

    #[test]
    fn test_zero_jitter_is_identity() {
        let mut rng = rand::thread_rng();
        assert_eq!(add_elevation_jitter(500.0, &mut rng, 0.0), 500.0);
    }
}
