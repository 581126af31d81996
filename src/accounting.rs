//! Fuel cost, emissions, and optional life-cycle cost accounting.

/// Imputed cost factors for the life-cycle accounting variant.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleCosting {
    /// Imputed cost per amp-hour of battery throughput ($/Ah).
    pub degradation_cost_per_ah: f32,
    /// Externality cost per kilogram of CO2 ($/kg).
    pub co2_cost_per_kg: f32,
}

/// One step's cost and emission breakdown.
#[derive(Debug, Clone, Copy)]
pub struct StepCosts {
    /// Fuel cost for the step ($).
    pub fuel_cost: f32,
    /// CO2 emitted during the step (kg).
    pub co2_kg: f32,
    /// NOx emitted during the step (kg).
    pub nox_kg: f32,
    /// Life-cycle cost for the step, when tracked ($).
    pub lifecycle_cost: Option<f32>,
}

/// Converts fuel-sourced power into cost and emissions.
///
/// All outputs are non-negative given non-negative fuel power, which the
/// allocators enforce upstream.
#[derive(Debug, Clone)]
pub struct CostModel {
    /// Fuel price per kWh ($).
    pub price_per_kwh: f32,
    /// CO2 emission factor (kg per kWh).
    pub co2_kg_per_kwh: f32,
    /// NOx emission factor (kg per kWh).
    pub nox_kg_per_kwh: f32,
    /// Life-cycle costing, when enabled.
    pub lifecycle: Option<LifecycleCosting>,
}

impl CostModel {
    /// Creates a cost model from the fuel price and emission factors.
    ///
    /// # Panics
    ///
    /// Panics if any factor is negative.
    pub fn new(
        price_per_kwh: f32,
        co2_kg_per_kwh: f32,
        nox_kg_per_kwh: f32,
        lifecycle: Option<LifecycleCosting>,
    ) -> Self {
        assert!(price_per_kwh >= 0.0);
        assert!(co2_kg_per_kwh >= 0.0);
        assert!(nox_kg_per_kwh >= 0.0);
        if let Some(lc) = &lifecycle {
            assert!(lc.degradation_cost_per_ah >= 0.0);
            assert!(lc.co2_cost_per_kg >= 0.0);
        }
        Self {
            price_per_kwh,
            co2_kg_per_kwh,
            nox_kg_per_kwh,
            lifecycle,
        }
    }

    /// Computes the step breakdown for the given fuel power and battery
    /// current over one step.
    pub fn step(&self, fuel_kw: f32, current_a: f32, step_seconds: f32) -> StepCosts {
        let dt_hours = step_seconds / 3600.0;
        let energy_kwh = fuel_kw * dt_hours;

        let fuel_cost = energy_kwh * self.price_per_kwh;
        let co2_kg = energy_kwh * self.co2_kg_per_kwh;
        let nox_kg = energy_kwh * self.nox_kg_per_kwh;

        let lifecycle_cost = self.lifecycle.as_ref().map(|lc| {
            let degradation_cost = current_a.abs() * dt_hours * lc.degradation_cost_per_ah;
            let co2_cost = co2_kg * lc.co2_cost_per_kg;
            fuel_cost + degradation_cost + co2_cost
        });

        StepCosts {
            fuel_cost,
            co2_kg,
            nox_kg,
            lifecycle_cost,
        }
    }
}

/// Running totals accumulated over a simulation run.
///
/// All four totals are monotonically non-decreasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningTotals {
    /// Cumulative operating cost ($).
    pub cost: f32,
    /// Cumulative CO2 mass (kg).
    pub co2_kg: f32,
    /// Cumulative NOx mass (kg).
    pub nox_kg: f32,
    /// Cumulative life-cycle cost ($), meaningful only when tracked.
    pub lifecycle_cost: f32,
}

impl RunningTotals {
    /// Adds one step's breakdown to the totals.
    pub fn add(&mut self, costs: &StepCosts) {
        self.cost += costs.fuel_cost;
        self.co2_kg += costs.co2_kg;
        self.nox_kg += costs.nox_kg;
        self.lifecycle_cost += costs.lifecycle_cost.unwrap_or(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> CostModel {
        CostModel::new(0.1, 0.5, 0.02, None)
    }

    #[test]
    fn step_costs_scale_with_energy() {
        let costs = model().step(20.0, 0.0, 3600.0);
        // 20 kW over one hour = 20 kWh
        assert!((costs.fuel_cost - 2.0).abs() < 1e-5);
        assert!((costs.co2_kg - 10.0).abs() < 1e-5);
        assert!((costs.nox_kg - 0.4).abs() < 1e-5);
        assert!(costs.lifecycle_cost.is_none());
    }

    #[test]
    fn half_step_halves_the_energy() {
        let full = model().step(20.0, 0.0, 3600.0);
        let half = model().step(20.0, 0.0, 1800.0);
        assert!((half.fuel_cost * 2.0 - full.fuel_cost).abs() < 1e-5);
    }

    #[test]
    fn zero_fuel_power_costs_nothing() {
        let costs = model().step(0.0, 0.0, 3600.0);
        assert_eq!(costs.fuel_cost, 0.0);
        assert_eq!(costs.co2_kg, 0.0);
        assert_eq!(costs.nox_kg, 0.0);
    }

    #[test]
    fn lifecycle_adds_degradation_and_externality() {
        let model = CostModel::new(
            0.1,
            0.5,
            0.02,
            Some(LifecycleCosting {
                degradation_cost_per_ah: 0.05,
                co2_cost_per_kg: 0.025,
            }),
        );
        let costs = model.step(20.0, 10.0, 3600.0);
        // fuel 2.0, degradation 10 Ah * 0.05 = 0.5, co2 10 kg * 0.025 = 0.25
        let lcc = costs.lifecycle_cost.expect("lifecycle should be tracked");
        assert!((lcc - 2.75).abs() < 1e-5);
    }

    #[test]
    fn lifecycle_charges_for_charge_current_too() {
        let model = CostModel::new(
            0.0,
            0.0,
            0.0,
            Some(LifecycleCosting {
                degradation_cost_per_ah: 1.0,
                co2_cost_per_kg: 0.0,
            }),
        );
        let discharge = model.step(0.0, 5.0, 3600.0);
        let charge = model.step(0.0, -5.0, 3600.0);
        assert_eq!(discharge.lifecycle_cost, charge.lifecycle_cost);
    }

    #[test]
    fn totals_accumulate_monotonically() {
        let model = model();
        let mut totals = RunningTotals::default();
        let mut last = totals;
        for kw in [5.0, 0.0, 12.5, 3.0] {
            totals.add(&model.step(kw, 0.0, 3600.0));
            assert!(totals.cost >= last.cost);
            assert!(totals.co2_kg >= last.co2_kg);
            assert!(totals.nox_kg >= last.nox_kg);
            last = totals;
        }
    }

    #[test]
    #[should_panic]
    fn negative_price_panics() {
        CostModel::new(-0.1, 0.5, 0.02, None);
    }
}
