//! Core simulation types: timing and per-step records.

use std::fmt;

/// Simulation horizon and step duration.
///
/// # Examples
///
/// ```
/// use hybrid_sim::sim::types::SimTiming;
///
/// let timing = SimTiming::new(100, 3600.0);
/// assert_eq!(timing.dt_hours, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct SimTiming {
    /// Number of simulation steps.
    pub steps: usize,
    /// Duration of one step in seconds.
    pub step_seconds: f32,
    /// Duration of one step in hours, derived as `step_seconds / 3600`.
    pub dt_hours: f32,
}

impl SimTiming {
    /// Creates the simulation timing.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is zero or `step_seconds` is non-positive.
    pub fn new(steps: usize, step_seconds: f32) -> Self {
        assert!(steps >= 1, "steps must be >= 1");
        assert!(step_seconds > 0.0, "step_seconds must be > 0");
        Self {
            steps,
            step_seconds,
            dt_hours: step_seconds / 3600.0,
        }
    }
}

/// Complete record of one simulation step.
///
/// Carries both the per-step quantities and the running totals evaluated
/// at that step; the ordered sequence of these records is the sole data
/// contract with the reporting and plotting boundary.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Step index.
    pub step: usize,
    /// Simulation time in hours.
    pub time_hr: f32,
    /// Power demand (kW).
    pub demand_kw: f32,
    /// Power supplied by the battery (kW).
    pub battery_kw: f32,
    /// Power supplied by the fuel source (kW).
    pub fuel_kw: f32,
    /// Implied battery current (A; positive = discharge).
    pub current_a: f32,
    /// Change in state of charge this step.
    pub delta_soc: f32,
    /// Change in state of health this step (<= 0).
    pub delta_soh: f32,
    /// State of charge after this step, clamped into bounds.
    pub soc: f32,
    /// State of health after this step, clamped into bounds.
    pub soh: f32,
    /// Fuel cost for this step ($).
    pub fuel_cost: f32,
    /// CO2 emitted this step (kg).
    pub co2_kg: f32,
    /// NOx emitted this step (kg).
    pub nox_kg: f32,
    /// Life-cycle cost for this step ($), when tracked.
    pub lifecycle_cost: Option<f32>,
    /// Cumulative operating cost through this step ($).
    pub total_cost: f32,
    /// Cumulative CO2 through this step (kg).
    pub total_co2_kg: f32,
    /// Cumulative NOx through this step (kg).
    pub total_nox_kg: f32,
    /// Cumulative life-cycle cost through this step ($), when tracked.
    pub total_lifecycle_cost: Option<f32>,
    /// Whether the allocation covered the full demand.
    pub demand_met: bool,
    /// Whether the allocator's safe fallback replaced a failed solve.
    pub solver_fallback: bool,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>3} ({:>6.1}h) | demand={:>6.2} kW  batt={:>6.2} kW  fuel={:>6.2} kW | \
             SOC={:>5.1}%  SOH={:>6.2}% | cost={:>8.2}  CO2={:>7.2} kg | met={} fb={}",
            self.step,
            self.time_hr,
            self.demand_kw,
            self.battery_kw,
            self.fuel_kw,
            self.soc * 100.0,
            self.soh * 100.0,
            self.total_cost,
            self.total_co2_kg,
            self.demand_met,
            self.solver_fallback,
        )
    }
}
