//! Power allocation strategies splitting demand between battery and fuel.

use crate::accounting::CostModel;
use crate::battery::{Battery, DegradationModel};
use crate::solver::{SolverOptions, minimize2};

/// One step's power split between the battery and the fuel source.
///
/// Invariant: `battery_kw + fuel_kw >= demand` — exact equality on the
/// rule-based path, where fuel absorbs the residual by construction.
#[derive(Debug, Clone, Copy)]
pub struct AllocationDecision {
    /// Power supplied by the battery (kW, >= 0).
    pub battery_kw: f32,
    /// Power supplied by the fuel source (kW, >= 0).
    pub fuel_kw: f32,
    /// Whether the safe fallback replaced a failed solve.
    pub used_fallback: bool,
}

/// Strategy deciding the per-step power split.
pub trait Allocator {
    /// Splits `demand_kw` between battery and fuel for the current state.
    fn decide(&self, demand_kw: f32, battery: &Battery) -> AllocationDecision;

    /// Returns a human-readable strategy name.
    fn strategy(&self) -> &'static str;
}

/// Thresholds and fractions for the tiered rule-based strategy.
#[derive(Debug, Clone)]
pub struct RuleSettings {
    /// SOC above which the battery may carry the high fraction.
    pub soc_high: f32,
    /// SOH required alongside `soc_high` for the high tier.
    pub soh_healthy: f32,
    /// SOC above which the battery may carry the moderate fraction.
    pub soc_moderate: f32,
    /// SOC below which the protective override sheds battery load.
    pub soc_critical: f32,
    /// SOH below which the protective override sheds battery load.
    pub soh_degraded: f32,
    /// Battery share of demand in the high tier.
    pub battery_frac_high: f32,
    /// Battery share of demand in the moderate tier.
    pub battery_frac_moderate: f32,
    /// Battery share of demand in the low tier.
    pub battery_frac_low: f32,
    /// Fraction of the battery share shed back onto fuel by the override.
    pub shed_frac: f32,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            soc_high: 0.7,
            soh_healthy: 0.9,
            soc_moderate: 0.5,
            soc_critical: 0.3,
            soh_degraded: 0.85,
            battery_frac_high: 0.9,
            battery_frac_moderate: 0.7,
            battery_frac_low: 0.4,
            shed_frac: 0.7,
        }
    }
}

/// Tiered heuristic allocator with a health-aware override.
///
/// Tiers are checked from least to most restrictive SOC requirement and
/// the first match wins; the degraded-health / critical-SOC override then
/// applies last as a correction to whichever tier was chosen. Fuel is
/// always assigned the residual, so demand is met exactly.
#[derive(Debug, Clone)]
pub struct RuleAllocator {
    settings: RuleSettings,
    dt_hours: f32,
}

impl RuleAllocator {
    /// Creates a rule-based allocator for the given step duration.
    ///
    /// # Panics
    ///
    /// Panics if any fraction lies outside `[0, 1]` or `dt_hours` is
    /// non-positive.
    pub fn new(settings: RuleSettings, dt_hours: f32) -> Self {
        assert!(dt_hours > 0.0, "dt_hours must be > 0");
        for frac in [
            settings.battery_frac_high,
            settings.battery_frac_moderate,
            settings.battery_frac_low,
            settings.shed_frac,
        ] {
            assert!((0.0..=1.0).contains(&frac), "fractions must be in [0, 1]");
        }
        Self { settings, dt_hours }
    }
}

impl Allocator for RuleAllocator {
    fn decide(&self, demand_kw: f32, battery: &Battery) -> AllocationDecision {
        let s = &self.settings;
        let ceiling_kw = battery.available_power_kw(self.dt_hours);

        let tier_kw = if battery.soc > s.soc_high && battery.soh > s.soh_healthy {
            (demand_kw * s.battery_frac_high).min(ceiling_kw)
        } else if battery.soc > s.soc_moderate {
            (demand_kw * s.battery_frac_moderate).min(ceiling_kw)
        } else {
            demand_kw * s.battery_frac_low
        };

        // Protective override: a weak battery gives most of its share back.
        let battery_kw = if battery.soh < s.soh_degraded || battery.soc < s.soc_critical {
            tier_kw * (1.0 - s.shed_frac)
        } else {
            tier_kw
        };

        AllocationDecision {
            battery_kw,
            fuel_kw: demand_kw - battery_kw,
            used_fallback: false,
        }
    }

    fn strategy(&self) -> &'static str {
        "rule"
    }
}

/// Weights, bounds, and solver budget for the optimizing strategy.
#[derive(Debug, Clone)]
pub struct MpcSettings {
    /// Weight on positive SOH loss in the cost functional.
    pub soh_penalty_weight: f32,
    /// Weight on the projected-SOC shortfall below `soc_floor`.
    pub soc_penalty_weight: f32,
    /// SOC level below which the low-charge penalty engages.
    pub soc_floor: f32,
    /// Fixed penalty applied while the split leaves demand unmet.
    pub unmet_penalty: f32,
    /// Iteration cap and tolerance handed to the bounded solver.
    pub solver: SolverOptions,
}

impl Default for MpcSettings {
    fn default() -> Self {
        Self {
            soh_penalty_weight: 1e4,
            soc_penalty_weight: 1e3,
            soc_floor: 0.2,
            unmet_penalty: 1e6,
            solver: SolverOptions::default(),
        }
    }
}

/// Single-step receding-horizon allocator.
///
/// Each call minimizes an additive cost functional over the box
/// `[0, demand]²`, warm-started at the half-and-half split. The unmet-demand
/// penalty makes the feasible region effectively the half-space where demand
/// is met; the remaining terms trade fuel cost and emissions against battery
/// wear and low charge. A failed solve recovers to the safe split
/// `(fuel = demand, battery = 0)` rather than surfacing an error.
#[derive(Debug, Clone)]
pub struct MpcAllocator {
    degradation: DegradationModel,
    costing: CostModel,
    settings: MpcSettings,
    step_seconds: f32,
}

impl MpcAllocator {
    /// Creates an optimizing allocator.
    ///
    /// The degradation model and cost model mirror the ones the engine
    /// applies after the decision, so the functional prices the same
    /// physics the step will realize.
    ///
    /// # Panics
    ///
    /// Panics if `step_seconds` is non-positive.
    pub fn new(
        degradation: DegradationModel,
        costing: CostModel,
        settings: MpcSettings,
        step_seconds: f32,
    ) -> Self {
        assert!(step_seconds > 0.0, "step_seconds must be > 0");
        Self {
            degradation,
            costing,
            settings,
            step_seconds,
        }
    }

    fn cost(&self, split: [f32; 2], demand_kw: f32, battery: &Battery) -> f32 {
        let [fuel_kw, battery_kw] = split;
        let s = &self.settings;
        let mut total = 0.0;

        if fuel_kw + battery_kw < demand_kw {
            total += s.unmet_penalty;
        }

        let costs = self.costing.step(fuel_kw, 0.0, self.step_seconds);
        total += costs.fuel_cost + costs.co2_kg + costs.nox_kg;

        let current_a = battery.current_a(battery_kw);
        let (delta_soc, delta_soh) = self.degradation.apply(current_a, self.step_seconds);
        total += (-delta_soh).max(0.0) * s.soh_penalty_weight;

        let projected_soc = battery.soc + delta_soc;
        total += (s.soc_floor - projected_soc).max(0.0) * s.soc_penalty_weight;

        total
    }
}

impl Allocator for MpcAllocator {
    fn decide(&self, demand_kw: f32, battery: &Battery) -> AllocationDecision {
        // Zero demand leaves a degenerate box whose only feasible point is
        // the zero split.
        if demand_kw <= 0.0 {
            return AllocationDecision {
                battery_kw: 0.0,
                fuel_kw: 0.0,
                used_fallback: false,
            };
        }

        let warm = [0.5 * demand_kw, 0.5 * demand_kw];
        let result = minimize2(
            |split| self.cost(split, demand_kw, battery),
            warm,
            [0.0, 0.0],
            [demand_kw, demand_kw],
            &self.settings.solver,
        );

        match result {
            Ok([fuel_kw, battery_kw]) if fuel_kw.is_finite() && battery_kw.is_finite() => {
                AllocationDecision {
                    battery_kw,
                    fuel_kw,
                    used_fallback: false,
                }
            }
            _ => AllocationDecision {
                battery_kw: 0.0,
                fuel_kw: demand_kw,
                used_fallback: true,
            },
        }
    }

    fn strategy(&self) -> &'static str {
        "mpc"
    }
}
