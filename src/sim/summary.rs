//! Post-hoc summary of a completed simulation run.

use std::fmt;

use super::engine::SimulationRun;

/// Aggregate results derived from a completed run.
///
/// Computed post-hoc from the step history so the reported numbers always
/// agree with the exported telemetry.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of steps executed.
    pub steps: usize,
    /// State of charge after the final step.
    pub final_soc: f32,
    /// State of health after the final step.
    pub final_soh: f32,
    /// Cumulative operating cost ($).
    pub total_cost: f32,
    /// Cumulative CO2 mass (kg).
    pub total_co2_kg: f32,
    /// Cumulative NOx mass (kg).
    pub total_nox_kg: f32,
    /// Cumulative life-cycle cost ($), when tracked.
    pub total_lifecycle_cost: Option<f32>,
    /// Total battery charge throughput (Ah, sum of |current| * dt).
    pub battery_throughput_ah: f32,
    /// Steps where the allocation left demand unmet.
    pub unmet_demand_steps: usize,
    /// Steps where the optimizing allocator fell back to all-fuel.
    pub solver_fallback_steps: usize,
}

impl RunSummary {
    /// Computes the summary from a completed run.
    pub fn from_run(run: &SimulationRun) -> Self {
        let mut throughput_ah = 0.0_f32;
        let mut unmet = 0_usize;
        let mut fallbacks = 0_usize;

        for r in &run.history {
            throughput_ah += r.current_a.abs() * run.timing.dt_hours;
            if !r.demand_met {
                unmet += 1;
            }
            if r.solver_fallback {
                fallbacks += 1;
            }
        }

        let last = run.history.last();

        Self {
            steps: run.history.len(),
            final_soc: run.battery.soc,
            final_soh: run.battery.soh,
            total_cost: last.map_or(0.0, |r| r.total_cost),
            total_co2_kg: last.map_or(0.0, |r| r.total_co2_kg),
            total_nox_kg: last.map_or(0.0, |r| r.total_nox_kg),
            total_lifecycle_cost: last.and_then(|r| r.total_lifecycle_cost),
            battery_throughput_ah: throughput_ah,
            unmet_demand_steps: unmet,
            solver_fallback_steps: fallbacks,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Steps completed:      {}", self.steps)?;
        writeln!(f, "Final SOC:            {:.1}%", self.final_soc * 100.0)?;
        writeln!(f, "Final SOH:            {:.2}%", self.final_soh * 100.0)?;
        writeln!(f, "Total cost:           ${:.2}", self.total_cost)?;
        writeln!(f, "Total CO2:            {:.2} kg", self.total_co2_kg)?;
        writeln!(f, "Total NOx:            {:.3} kg", self.total_nox_kg)?;
        if let Some(lcc) = self.total_lifecycle_cost {
            writeln!(f, "Life-cycle cost:      ${:.2}", lcc)?;
        }
        writeln!(
            f,
            "Battery throughput:   {:.1} Ah",
            self.battery_throughput_ah
        )?;
        writeln!(f, "Unmet-demand steps:   {}", self.unmet_demand_steps)?;
        write!(f, "Solver fallbacks:     {}", self.solver_fallback_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::Battery;
    use crate::sim::types::{SimTiming, StepRecord};

    fn record(t: usize, current_a: f32, total_cost: f32, demand_met: bool) -> StepRecord {
        StepRecord {
            step: t,
            time_hr: t as f32,
            demand_kw: 10.0,
            battery_kw: 5.0,
            fuel_kw: 5.0,
            current_a,
            delta_soc: 0.0,
            delta_soh: 0.0,
            soc: 0.5,
            soh: 1.0,
            fuel_cost: 0.5,
            co2_kg: 2.5,
            nox_kg: 0.1,
            lifecycle_cost: None,
            total_cost,
            total_co2_kg: 2.5 * (t + 1) as f32,
            total_nox_kg: 0.1 * (t + 1) as f32,
            total_lifecycle_cost: None,
            demand_met,
            solver_fallback: false,
        }
    }

    fn run_with(history: Vec<StepRecord>) -> SimulationRun {
        SimulationRun {
            timing: SimTiming::new(history.len().max(1), 3600.0),
            history,
            battery: Battery::new(3.7, 100.0, 0.01, 0.0, 1.0, 1.0, 0.5, 1.0),
        }
    }

    #[test]
    fn totals_come_from_last_record() {
        let run = run_with(vec![
            record(0, 2.0, 1.0, true),
            record(1, -3.0, 2.5, true),
            record(2, 1.0, 4.0, true),
        ]);
        let summary = RunSummary::from_run(&run);
        assert_eq!(summary.steps, 3);
        assert!((summary.total_cost - 4.0).abs() < 1e-6);
    }

    #[test]
    fn throughput_sums_absolute_current() {
        let run = run_with(vec![
            record(0, 2.0, 1.0, true),
            record(1, -3.0, 2.0, true),
            record(2, 1.0, 3.0, true),
        ]);
        let summary = RunSummary::from_run(&run);
        assert!((summary.battery_throughput_ah - 6.0).abs() < 1e-5);
    }

    #[test]
    fn unmet_steps_are_counted() {
        let run = run_with(vec![
            record(0, 0.0, 1.0, true),
            record(1, 0.0, 2.0, false),
            record(2, 0.0, 3.0, false),
        ]);
        let summary = RunSummary::from_run(&run);
        assert_eq!(summary.unmet_demand_steps, 2);
    }

    #[test]
    fn empty_history_yields_zero_totals() {
        let run = run_with(Vec::new());
        let summary = RunSummary::from_run(&run);
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.total_cost, 0.0);
        assert_eq!(summary.battery_throughput_ah, 0.0);
    }

    #[test]
    fn display_renders_full_report() {
        let run = run_with(vec![record(0, 1.0, 1.0, true)]);
        let summary = RunSummary::from_run(&run);
        let text = format!("{summary}");
        assert!(text.contains("Run Summary"));
        assert!(text.contains("Final SOC"));
        assert!(text.contains("Solver fallbacks"));
    }
}
