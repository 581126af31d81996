//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation horizon, timing, and starting state.
    #[serde(default)]
    pub simulation: SimulationSection,
    /// Battery pack parameters.
    #[serde(default)]
    pub battery: BatterySection,
    /// Degradation model profile.
    #[serde(default)]
    pub degradation: DegradationSection,
    /// Fuel price and emission factors.
    #[serde(default)]
    pub fuel: FuelSection,
    /// Life-cycle costing parameters.
    #[serde(default)]
    pub lifecycle: LifecycleSection,
    /// Demand source parameters.
    #[serde(default)]
    pub demand: DemandSection,
    /// Allocation strategy parameters.
    #[serde(default)]
    pub allocator: AllocatorSection,
}

/// Simulation horizon, timing, and starting state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Number of simulation steps (must be >= 1).
    pub steps: usize,
    /// Duration of one step in seconds (must be > 0).
    pub step_seconds: f32,
    /// Master random seed for the stochastic demand path.
    pub seed: u64,
    /// Initial state of charge.
    pub soc_start: f32,
    /// Initial state of health.
    pub soh_start: f32,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            steps: 100,
            step_seconds: 3600.0,
            seed: 42,
            soc_start: 1.0,
            soh_start: 1.0,
        }
    }
}

/// Battery pack parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatterySection {
    /// Open-circuit voltage (V, must be > 0).
    pub voltage_v: f32,
    /// Capacity (Ah, must be > 0).
    pub capacity_ah: f32,
    /// Internal resistance (Ohm, must be >= 0).
    pub internal_resistance_ohm: f32,
    /// Cell temperature (K, must be > 0).
    pub temperature_k: f32,
    /// Lower SOC bound.
    pub soc_min: f32,
    /// Upper SOC bound.
    pub soc_max: f32,
    /// Upper SOH bound.
    pub soh_max: f32,
}

impl Default for BatterySection {
    fn default() -> Self {
        Self {
            voltage_v: 3.7,
            capacity_ah: 100.0,
            internal_resistance_ohm: 0.01,
            temperature_k: 298.0,
            soc_min: 0.0,
            soc_max: 1.0,
            soh_max: 1.0,
        }
    }
}

/// Degradation model profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DegradationSection {
    /// Coefficient profile: `"standard"` or `"conservative"`.
    pub profile: String,
}

impl Default for DegradationSection {
    fn default() -> Self {
        Self {
            profile: "standard".to_string(),
        }
    }
}

/// Fuel price and emission factors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelSection {
    /// Fuel price per kWh ($).
    pub price_per_kwh: f32,
    /// CO2 emission factor (kg per kWh).
    pub co2_kg_per_kwh: f32,
    /// NOx emission factor (kg per kWh).
    pub nox_kg_per_kwh: f32,
}

impl Default for FuelSection {
    fn default() -> Self {
        Self {
            price_per_kwh: 0.10,
            co2_kg_per_kwh: 0.50,
            nox_kg_per_kwh: 0.02,
        }
    }
}

/// Life-cycle costing parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifecycleSection {
    /// Whether life-cycle cost is tracked.
    pub enabled: bool,
    /// Imputed cost per amp-hour of battery throughput ($/Ah).
    pub degradation_cost_per_ah: f32,
    /// Externality cost per kilogram of CO2 ($/kg).
    pub co2_cost_per_kg: f32,
}

impl Default for LifecycleSection {
    fn default() -> Self {
        Self {
            enabled: false,
            degradation_cost_per_ah: 0.05,
            co2_cost_per_kg: 0.025,
        }
    }
}

/// Demand source parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandSection {
    /// Demand model: `"sinusoid"` (deterministic) or `"forecast"`
    /// (stochastic one-step-ahead predictor).
    pub model: String,
    /// Baseline demand (kW); also the forecast's starting estimate.
    pub base_kw: f32,
    /// Sinusoid amplitude (kW).
    pub amplitude_kw: f32,
    /// Upper clip of the forecast's plausible range (kW, must be > 0).
    pub max_kw: f32,
    /// Forecast perturbation noise standard deviation (kW).
    pub noise_std: f32,
    /// Forecast cosine swing magnitude (kW).
    pub swing_kw: f32,
    /// Forecast control-signal increment per step.
    pub control_increment: f32,
}

impl Default for DemandSection {
    fn default() -> Self {
        Self {
            model: "sinusoid".to_string(),
            base_kw: 10.0,
            amplitude_kw: 40.0,
            max_kw: 50.0,
            noise_std: 0.5,
            swing_kw: 40.0,
            control_increment: 0.1,
        }
    }
}

/// Allocation strategy parameters.
///
/// Carries the tunables of both strategies; only the fields of the
/// selected `strategy` take effect.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocatorSection {
    /// Strategy: `"rule"` (tiered heuristic) or `"mpc"` (per-step
    /// bounded optimization).
    pub strategy: String,
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
    /// Battery share of demand in the high tier (0.0-1.0).
    pub battery_frac_high: f32,
    /// Battery share of demand in the moderate tier (0.0-1.0).
    pub battery_frac_moderate: f32,
    /// Battery share of demand in the low tier (0.0-1.0).
    pub battery_frac_low: f32,
    /// Fraction of the battery share shed back onto fuel (0.0-1.0).
    pub shed_frac: f32,
    /// MPC weight on positive SOH loss.
    pub soh_penalty_weight: f32,
    /// MPC weight on the projected-SOC shortfall.
    pub soc_penalty_weight: f32,
    /// MPC SOC level below which the low-charge penalty engages.
    pub soc_floor: f32,
    /// MPC fixed penalty while demand is unmet.
    pub unmet_penalty: f32,
    /// MPC solver iteration cap (must be >= 1).
    pub max_iters: usize,
    /// MPC solver convergence tolerance (kW, must be > 0).
    pub tolerance_kw: f32,
}

impl Default for AllocatorSection {
    fn default() -> Self {
        Self {
            strategy: "rule".to_string(),
            soc_high: 0.7,
            soh_healthy: 0.9,
            soc_moderate: 0.5,
            soc_critical: 0.3,
            soh_degraded: 0.85,
            battery_frac_high: 0.9,
            battery_frac_moderate: 0.7,
            battery_frac_low: 0.4,
            shed_frac: 0.7,
            soh_penalty_weight: 1e4,
            soc_penalty_weight: 1e3,
            soc_floor: 0.2,
            unmet_penalty: 1e6,
            max_iters: 200,
            tolerance_kw: 1e-4,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.steps"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: rule-based allocation of a
    /// deterministic sinusoidal demand with the standard wear profile.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationSection::default(),
            battery: BatterySection::default(),
            degradation: DegradationSection::default(),
            fuel: FuelSection::default(),
            lifecycle: LifecycleSection::default(),
            demand: DemandSection::default(),
            allocator: AllocatorSection::default(),
        }
    }

    /// Returns the conservative preset: slower fitted wear profile with
    /// life-cycle costing enabled.
    pub fn conservative() -> Self {
        Self {
            degradation: DegradationSection {
                profile: "conservative".to_string(),
            },
            lifecycle: LifecycleSection {
                enabled: true,
                ..LifecycleSection::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the MPC preset: per-step bounded optimization driven by
    /// the stochastic demand forecast.
    pub fn mpc() -> Self {
        Self {
            demand: DemandSection {
                model: "forecast".to_string(),
                ..DemandSection::default()
            },
            allocator: AllocatorSection {
                strategy: "mpc".to_string(),
                ..AllocatorSection::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "conservative", "mpc"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "conservative" => Ok(Self::conservative()),
            "mpc" => Ok(Self::mpc()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid. Violations
    /// are reported, never silently clamped.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let push = |errors: &mut Vec<ConfigError>, field: &str, message: String| {
            errors.push(ConfigError {
                field: field.to_string(),
                message,
            });
        };

        let s = &self.simulation;
        if s.steps == 0 {
            push(&mut errors, "simulation.steps", "must be >= 1".into());
        }
        if s.step_seconds <= 0.0 {
            push(&mut errors, "simulation.step_seconds", "must be > 0".into());
        }

        let b = &self.battery;
        if b.voltage_v <= 0.0 {
            push(&mut errors, "battery.voltage_v", "must be > 0".into());
        }
        if b.capacity_ah <= 0.0 {
            push(&mut errors, "battery.capacity_ah", "must be > 0".into());
        }
        if b.internal_resistance_ohm < 0.0 {
            push(
                &mut errors,
                "battery.internal_resistance_ohm",
                "must be >= 0".into(),
            );
        }
        if b.temperature_k <= 0.0 {
            push(&mut errors, "battery.temperature_k", "must be > 0".into());
        }
        if !(0.0 <= b.soc_min && b.soc_min <= b.soc_max && b.soc_max <= 1.0) {
            push(
                &mut errors,
                "battery.soc_min",
                "SOC bounds must satisfy 0 <= min <= max <= 1".into(),
            );
        }
        if !(b.soh_max > 0.0 && b.soh_max <= 1.0) {
            push(&mut errors, "battery.soh_max", "must be in (0, 1]".into());
        }
        if !(b.soc_min..=b.soc_max).contains(&s.soc_start) {
            push(
                &mut errors,
                "simulation.soc_start",
                "must be within [battery.soc_min, battery.soc_max]".into(),
            );
        }
        if !(0.0..=b.soh_max).contains(&s.soh_start) {
            push(
                &mut errors,
                "simulation.soh_start",
                "must be within [0, battery.soh_max]".into(),
            );
        }

        let d = &self.degradation;
        if d.profile != "standard" && d.profile != "conservative" {
            push(
                &mut errors,
                "degradation.profile",
                format!(
                    "must be \"standard\" or \"conservative\", got \"{}\"",
                    d.profile
                ),
            );
        }

        let f = &self.fuel;
        for (field, value) in [
            ("fuel.price_per_kwh", f.price_per_kwh),
            ("fuel.co2_kg_per_kwh", f.co2_kg_per_kwh),
            ("fuel.nox_kg_per_kwh", f.nox_kg_per_kwh),
        ] {
            if value < 0.0 {
                push(&mut errors, field, "must be >= 0".into());
            }
        }

        let lc = &self.lifecycle;
        if lc.degradation_cost_per_ah < 0.0 {
            push(
                &mut errors,
                "lifecycle.degradation_cost_per_ah",
                "must be >= 0".into(),
            );
        }
        if lc.co2_cost_per_kg < 0.0 {
            push(&mut errors, "lifecycle.co2_cost_per_kg", "must be >= 0".into());
        }

        let dm = &self.demand;
        if dm.model != "sinusoid" && dm.model != "forecast" {
            push(
                &mut errors,
                "demand.model",
                format!("must be \"sinusoid\" or \"forecast\", got \"{}\"", dm.model),
            );
        }
        if dm.max_kw <= 0.0 {
            push(&mut errors, "demand.max_kw", "must be > 0".into());
        }
        if dm.noise_std < 0.0 {
            push(&mut errors, "demand.noise_std", "must be >= 0".into());
        }

        let a = &self.allocator;
        if a.strategy != "rule" && a.strategy != "mpc" {
            push(
                &mut errors,
                "allocator.strategy",
                format!("must be \"rule\" or \"mpc\", got \"{}\"", a.strategy),
            );
        }
        for (field, value) in [
            ("allocator.battery_frac_high", a.battery_frac_high),
            ("allocator.battery_frac_moderate", a.battery_frac_moderate),
            ("allocator.battery_frac_low", a.battery_frac_low),
            ("allocator.shed_frac", a.shed_frac),
            ("allocator.soc_floor", a.soc_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                push(&mut errors, field, "must be in [0, 1]".into());
            }
        }
        for (field, value) in [
            ("allocator.soh_penalty_weight", a.soh_penalty_weight),
            ("allocator.soc_penalty_weight", a.soc_penalty_weight),
            ("allocator.unmet_penalty", a.unmet_penalty),
        ] {
            if value < 0.0 {
                push(&mut errors, field, "must be >= 0".into());
            }
        }
        if a.max_iters == 0 {
            push(&mut errors, "allocator.max_iters", "must be >= 1".into());
        }
        if a.tolerance_kw <= 0.0 {
            push(&mut errors, "allocator.tolerance_kw", "must be > 0".into());
        }

        errors
    }
}
