//! Movement profiles per transportation mode.
//!
//! Profiles define typical cruising speeds, how strongly terrain affects them,
//! and how much speed drifts from sample to sample. Generators use them to space
//! samples and to fill in device-reported velocity.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracks::CanonicalMode;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    pub mode: CanonicalMode,
    /// Cruising speed on flat terrain in m/s.
    pub base_speed_mps: f64,
    /// Speed loss per unit of uphill grade (0 for motorized modes).
    pub grade_sensitivity: f64,
    /// Sample-to-sample speed variation as a coefficient of variation.
    pub variance: f64,
}

impl ModeProfile {
    pub const STATIONARY: Self = Self::new(CanonicalMode::Stationary, 0.0, 0.0, 0.0);
    pub const WALKING: Self = Self::new(CanonicalMode::Walking, 1.4, 10.0, 0.08);
    pub const RUNNING: Self = Self::new(CanonicalMode::Running, 3.0, 15.0, 0.08);
    pub const CYCLING: Self = Self::new(CanonicalMode::Cycling, 5.0, 20.0, 0.12);
    pub const DRIVING: Self = Self::new(CanonicalMode::Driving, 14.0, 0.0, 0.15);
    pub const MOTORCYCLE: Self = Self::new(CanonicalMode::Motorcycle, 16.0, 0.0, 0.2);
    pub const BUS: Self = Self::new(CanonicalMode::Bus, 9.0, 0.0, 0.2);
    pub const TRAIN: Self = Self::new(CanonicalMode::Train, 30.0, 0.0, 0.03);
    pub const BOAT: Self = Self::new(CanonicalMode::Boat, 8.0, 0.0, 0.05);
    pub const FLYING: Self = Self::new(CanonicalMode::Flying, 230.0, 0.0, 0.03);

    pub const fn new(
        mode: CanonicalMode,
        base_speed_mps: f64,
        grade_sensitivity: f64,
        variance: f64,
    ) -> Self {
        Self {
            mode,
            base_speed_mps,
            grade_sensitivity,
            variance,
        }
    }

    /// Profile for a mode; `Unknown` moves like walking.
    pub fn for_mode(mode: CanonicalMode) -> Self {
        match mode {
            CanonicalMode::Stationary => Self::STATIONARY,
            CanonicalMode::Walking | CanonicalMode::Unknown => Self::WALKING,
            CanonicalMode::Running => Self::RUNNING,
            CanonicalMode::Cycling => Self::CYCLING,
            CanonicalMode::Driving => Self::DRIVING,
            CanonicalMode::Motorcycle => Self::MOTORCYCLE,
            CanonicalMode::Bus => Self::BUS,
            CanonicalMode::Train => Self::TRAIN,
            CanonicalMode::Boat => Self::BOAT,
            CanonicalMode::Flying => Self::FLYING,
        }
    }

    /// Overrides the cruising speed.
    pub fn with_speed(mut self, base_speed_mps: f64) -> Self {
        self.base_speed_mps = base_speed_mps;
        self
    }

    /// Removes sample-to-sample speed variation.
    pub fn steady(mut self) -> Self {
        self.variance = 0.0;
        self
    }

    /// Speed multiplier for a grade (fraction, e.g. 0.05 = 5%).
    ///
    /// Uphill slows human-powered modes; downhill helps them by half as much,
    /// capped at 1.5x.
    pub fn grade_factor(&self, grade: f64) -> f64 {
        if grade >= 0.0 {
            (1.0 - grade * self.grade_sensitivity).max(0.2)
        } else {
            (1.0 - grade * self.grade_sensitivity * 0.5).min(1.5)
        }
    }
}

/// Speed in m/s on the given grade with a sampled variance factor applied.
pub fn speed_at_grade(profile: &ModeProfile, grade: f64, variance_factor: f64) -> f64 {
    (profile.base_speed_mps * profile.grade_factor(grade) * variance_factor).max(0.0)
}

/// Samples a variance factor around 1.0.
pub fn sample_variance(profile: &ModeProfile, rng: &mut impl Rng) -> f64 {
    match Normal::new(1.0, profile.variance) {
        Ok(normal) if profile.variance > 0.0 => normal.sample(rng).clamp(0.7, 1.4),
        _ => 1.0,
    }
}
