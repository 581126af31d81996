//! Power demand sources: deterministic sinusoid and stochastic forecast.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Generates Gaussian noise via the Box-Muller transform.
///
/// Returns a sample from a zero-mean Gaussian with the given standard
/// deviation, or 0.0 when the deviation is non-positive.
pub(crate) fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}

/// Demand source selected by configuration.
///
/// Dispatches between the deterministic sinusoid and the stochastic
/// forecast; both produce a non-negative demand in kW per step.
#[derive(Debug, Clone)]
pub enum DemandSource {
    /// Deterministic periodic profile.
    Sinusoid(SinusoidDemand),
    /// Stochastic one-step-ahead forecast.
    Forecast(ForecastDemand),
}

impl DemandSource {
    /// Returns the demand for the given step (kW, >= 0).
    pub fn next_kw(&mut self, timestep: usize) -> f32 {
        match self {
            DemandSource::Sinusoid(s) => s.next_kw(timestep),
            DemandSource::Forecast(f) => f.next_kw(),
        }
    }
}

/// Deterministic sinusoidal demand over the full simulation horizon.
#[derive(Debug, Clone)]
pub struct SinusoidDemand {
    /// Baseline demand (kW).
    pub base_kw: f32,
    /// Amplitude of the sinusoidal swing (kW).
    pub amplitude_kw: f32,
    /// Total simulation steps, defining one full period.
    total_steps: usize,
}

impl SinusoidDemand {
    /// Creates a sinusoid spanning one full period over `total_steps`.
    pub fn new(base_kw: f32, amplitude_kw: f32, total_steps: usize) -> Self {
        Self {
            base_kw,
            amplitude_kw,
            total_steps: total_steps.max(1),
        }
    }

    /// Demand at the given step, floored at zero.
    pub fn next_kw(&self, timestep: usize) -> f32 {
        let angle = 2.0 * std::f32::consts::PI * timestep as f32 / self.total_steps as f32;
        (self.base_kw + self.amplitude_kw * angle.sin()).max(0.0)
    }
}

/// Stochastic one-step-ahead demand forecast.
///
/// Maintains an (estimate, control) pair: each call perturbs the previous
/// estimate by a cosine swing driven by the control signal plus seeded
/// Gaussian noise, clips into `[0, max_kw]`, and advances the control by a
/// fixed increment. This is a forecast stub modeling sensor uncertainty,
/// not a Kalman filter — there is no covariance propagation and no
/// measurement correction.
#[derive(Debug, Clone)]
pub struct ForecastDemand {
    /// Cosine swing magnitude (kW).
    pub swing_kw: f32,
    /// Standard deviation of the perturbation noise (kW).
    pub noise_std: f32,
    /// Upper clip of the plausible demand range (kW).
    pub max_kw: f32,
    /// Per-call advance of the control signal.
    pub control_increment: f32,

    estimate_kw: f32,
    control: f32,
    rng: StdRng,
}

impl ForecastDemand {
    /// Creates a forecast starting from `initial_kw` with the given seed.
    ///
    /// # Panics
    ///
    /// Panics if `max_kw` is non-positive.
    pub fn new(
        initial_kw: f32,
        swing_kw: f32,
        noise_std: f32,
        max_kw: f32,
        control_increment: f32,
        seed: u64,
    ) -> Self {
        assert!(max_kw > 0.0, "max_kw must be > 0");
        Self {
            swing_kw,
            noise_std: noise_std.max(0.0),
            max_kw,
            control_increment,
            estimate_kw: initial_kw.clamp(0.0, max_kw),
            control: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Advances the forecast one step and returns the new estimate (kW).
    ///
    /// Mutates the internal (estimate, control) pair; calls are strictly
    /// sequential and single-threaded.
    pub fn next_kw(&mut self) -> f32 {
        let swing = self.swing_kw * self.control.cos();
        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        self.estimate_kw = (self.estimate_kw + swing + noise).clamp(0.0, self.max_kw);
        self.control += self.control_increment;
        self.estimate_kw
    }
}
