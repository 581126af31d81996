//! Shared test fixtures for integration tests.

use hybrid_sim::accounting::CostModel;
use hybrid_sim::allocator::{MpcAllocator, MpcSettings, RuleAllocator, RuleSettings};
use hybrid_sim::battery::{Battery, DegradationCoeffs, DegradationModel};
use hybrid_sim::demand::{DemandSource, ForecastDemand, SinusoidDemand};
use hybrid_sim::sim::engine::Engine;
use hybrid_sim::sim::types::SimTiming;

/// Default timing (100 hourly steps).
pub fn default_timing() -> SimTiming {
    SimTiming::new(100, 3600.0)
}

/// Default battery (3.7 V, 100 Ah, full SOC bounds) at the given start.
pub fn default_battery(soc_start: f32, soh_start: f32) -> Battery {
    Battery::new(3.7, 100.0, 0.01, 0.0, 1.0, 1.0, soc_start, soh_start)
}

/// Default degradation model with the standard coefficient profile.
pub fn default_degradation() -> DegradationModel {
    DegradationModel::new(100.0, 298.0, DegradationCoeffs::standard())
}

/// Default cost model without life-cycle tracking.
pub fn default_costing() -> CostModel {
    CostModel::new(0.1, 0.5, 0.02, None)
}

/// Deterministic sinusoidal demand `10 + 40·sin(2πt/steps)`.
pub fn sinusoid_demand(timing: &SimTiming) -> DemandSource {
    DemandSource::Sinusoid(SinusoidDemand::new(10.0, 40.0, timing.steps))
}

/// Stochastic forecast demand with the given seed.
pub fn forecast_demand(seed: u64) -> DemandSource {
    DemandSource::Forecast(ForecastDemand::new(10.0, 40.0, 0.5, 50.0, 0.1, seed))
}

/// Rule-based engine over the default sinusoidal scenario.
pub fn rule_engine(soc_start: f32, soh_start: f32) -> Engine<RuleAllocator> {
    let timing = default_timing();
    let demand = sinusoid_demand(&timing);
    let allocator = RuleAllocator::new(RuleSettings::default(), timing.dt_hours);
    Engine::new(
        timing,
        demand,
        allocator,
        default_degradation(),
        default_costing(),
        default_battery(soc_start, soh_start),
    )
}

/// MPC engine over the given demand source.
pub fn mpc_engine(demand: DemandSource, soc_start: f32) -> Engine<MpcAllocator> {
    let timing = default_timing();
    let allocator = MpcAllocator::new(
        default_degradation(),
        default_costing(),
        MpcSettings::default(),
        timing.step_seconds,
    );
    Engine::new(
        timing,
        demand,
        allocator,
        default_degradation(),
        default_costing(),
        default_battery(soc_start, 1.0),
    )
}
