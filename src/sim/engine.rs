//! Simulation engine wiring demand, allocation, degradation, and accounting.

use crate::accounting::{CostModel, RunningTotals};
use crate::allocator::Allocator;
use crate::battery::{Battery, DegradationModel};
use crate::demand::DemandSource;

use super::types::{SimTiming, StepRecord};

/// Slack below which a split still counts as meeting demand, absorbing
/// floating-point residue in the balance.
const DEMAND_EPS_KW: f32 = 1e-4;

/// Completed run: the full step history plus the final battery state.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    /// Timing the run was executed with.
    pub timing: SimTiming,
    /// One record per step, in time order.
    pub history: Vec<StepRecord>,
    /// Battery state after the final step.
    pub battery: Battery,
}

/// Simulation engine owning the demand source, allocator, models, and all
/// mutable run state.
///
/// Generic over `A: Allocator` for static dispatch. Steps are strictly
/// sequential: each decision depends on the battery state left by the
/// previous step, so the loop must not be parallelized.
pub struct Engine<A: Allocator> {
    timing: SimTiming,
    demand: DemandSource,
    allocator: A,
    degradation: DegradationModel,
    costing: CostModel,
    battery: Battery,
    totals: RunningTotals,
}

impl<A: Allocator> Engine<A> {
    /// Creates an engine ready to run.
    pub fn new(
        timing: SimTiming,
        demand: DemandSource,
        allocator: A,
        degradation: DegradationModel,
        costing: CostModel,
        battery: Battery,
    ) -> Self {
        Self {
            timing,
            demand,
            allocator,
            degradation,
            costing,
            battery,
            totals: RunningTotals::default(),
        }
    }

    /// Executes one step and returns its record.
    fn step(&mut self, t: usize) -> StepRecord {
        // 1. Demand for this step
        let demand_kw = self.demand.next_kw(t);

        // 2. Power split
        let decision = self.allocator.decide(demand_kw, &self.battery);

        // 3. Implied current and degradation deltas
        let current_a = self.battery.current_a(decision.battery_kw);
        let (delta_soc, delta_soh) = self.degradation.apply(current_a, self.timing.step_seconds);

        // 4. Advance and clamp physical state
        self.battery.apply_wear(delta_soc, delta_soh);

        // 5. Cost and emission accumulation
        let costs = self
            .costing
            .step(decision.fuel_kw, current_a, self.timing.step_seconds);
        self.totals.add(&costs);

        // 6. Record
        let demand_met = decision.battery_kw + decision.fuel_kw >= demand_kw - DEMAND_EPS_KW;
        StepRecord {
            step: t,
            time_hr: t as f32 * self.timing.dt_hours,
            demand_kw,
            battery_kw: decision.battery_kw,
            fuel_kw: decision.fuel_kw,
            current_a,
            delta_soc,
            delta_soh,
            soc: self.battery.soc,
            soh: self.battery.soh,
            fuel_cost: costs.fuel_cost,
            co2_kg: costs.co2_kg,
            nox_kg: costs.nox_kg,
            lifecycle_cost: costs.lifecycle_cost,
            total_cost: self.totals.cost,
            total_co2_kg: self.totals.co2_kg,
            total_nox_kg: self.totals.nox_kg,
            total_lifecycle_cost: costs.lifecycle_cost.map(|_| self.totals.lifecycle_cost),
            demand_met,
            solver_fallback: decision.used_fallback,
        }
    }

    /// Runs every step and returns the completed run.
    ///
    /// Consumes the engine: a finished run cannot be resumed or re-run,
    /// construct a new engine instead.
    pub fn run(mut self) -> SimulationRun {
        let mut history = Vec::with_capacity(self.timing.steps);
        for t in 0..self.timing.steps {
            history.push(self.step(t));
        }
        SimulationRun {
            timing: self.timing,
            history,
            battery: self.battery,
        }
    }

    /// Returns the current battery state.
    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    /// Returns the simulation timing.
    pub fn timing(&self) -> &SimTiming {
        &self.timing
    }
}
