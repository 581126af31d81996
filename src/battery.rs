//! Battery state and the phenomenological degradation model.

/// Ideal gas constant (J/(mol·K)).
pub const R_GAS: f32 = 8.314;

/// Named coefficient set for the degradation law.
///
/// The wear law is `Δsoh = -A · exp(-(B + C·|I|) / (R·T)) · |I|^D`; the two
/// fitted sets below come from different tunings of the same system and are
/// kept as swappable profiles rather than collapsed into one canonical set.
#[derive(Debug, Clone, Copy)]
pub struct DegradationCoeffs {
    /// Pre-exponential factor `A`.
    pub pre_exp_factor: f32,
    /// Activation-like offset `B` (J/mol).
    pub activation_offset_j: f32,
    /// Current-scaling factor `C` (J/mol per ampere).
    pub current_scale_j: f32,
    /// Current exponent `D` (must be > 0).
    pub current_exponent: f32,
}

impl DegradationCoeffs {
    /// Standard fitted profile.
    pub fn standard() -> Self {
        Self {
            pre_exp_factor: 1e-5,
            activation_offset_j: 1000.0,
            current_scale_j: 0.5,
            current_exponent: 1.1,
        }
    }

    /// Conservative profile with a slower fitted wear rate.
    pub fn conservative() -> Self {
        Self {
            pre_exp_factor: 5e-7,
            activation_offset_j: 1400.0,
            current_scale_j: 1.0,
            current_exponent: 1.1,
        }
    }
}

/// Pure mapping from battery current to charge and health deltas.
///
/// Stateless and deterministic; callers are responsible for clamping the
/// resulting SOC/SOH into their configured bounds.
#[derive(Debug, Clone)]
pub struct DegradationModel {
    capacity_ah: f32,
    temperature_k: f32,
    coeffs: DegradationCoeffs,
}

impl DegradationModel {
    /// Creates a degradation model for the given cell parameters.
    ///
    /// # Panics
    ///
    /// Panics if capacity or temperature is non-positive, or the current
    /// exponent is non-positive.
    pub fn new(capacity_ah: f32, temperature_k: f32, coeffs: DegradationCoeffs) -> Self {
        assert!(capacity_ah > 0.0, "capacity_ah must be > 0");
        assert!(temperature_k > 0.0, "temperature_k must be > 0");
        assert!(coeffs.current_exponent > 0.0, "current_exponent must be > 0");
        Self {
            capacity_ah,
            temperature_k,
            coeffs,
        }
    }

    /// Returns `(delta_soc, delta_soh)` for one step at the given current.
    ///
    /// Positive current is discharge, which decreases SOC. The health delta
    /// is never positive, and a zero current yields exactly `(0, 0)` since
    /// `0^D = 0` for `D > 0`.
    pub fn apply(&self, current_a: f32, step_seconds: f32) -> (f32, f32) {
        let delta_soc = -current_a * (step_seconds / 3600.0) / self.capacity_ah;

        let i_abs = current_a.abs();
        let c = &self.coeffs;
        let arrhenius =
            (-(c.activation_offset_j + c.current_scale_j * i_abs) / (R_GAS * self.temperature_k))
                .exp();
        let delta_soh = -c.pre_exp_factor * arrhenius * i_abs.powf(c.current_exponent);

        (delta_soc, delta_soh)
    }
}

/// Battery pack state: state of charge, state of health, and the physical
/// parameters that bound them.
///
/// Owned exclusively by the simulation engine and updated once per step via
/// [`Battery::apply_wear`], which clamps into the configured bounds.
#[derive(Debug, Clone)]
pub struct Battery {
    /// Open-circuit voltage (V).
    pub voltage_v: f32,
    /// Capacity (Ah).
    pub capacity_ah: f32,
    /// Internal resistance (Ohm). Recognized and validated, but not yet
    /// consumed by the reduced-order current derivation.
    // TODO: fold internal resistance into current_a via a terminal-voltage
    // correction (solve P = I·(Voc − I·R0) for I).
    pub internal_resistance_ohm: f32,
    /// Lower SOC bound.
    pub soc_min: f32,
    /// Upper SOC bound.
    pub soc_max: f32,
    /// Upper SOH bound.
    pub soh_max: f32,
    /// State of charge, kept within `[soc_min, soc_max]`.
    pub soc: f32,
    /// State of health, kept within `[0, soh_max]`.
    pub soh: f32,
}

impl Battery {
    /// Creates a battery pack with the given parameters and starting state.
    ///
    /// # Panics
    ///
    /// Panics if voltage or capacity is non-positive, the resistance is
    /// negative, the bounds are inverted or outside `[0, 1]`, or the
    /// starting state falls outside the bounds.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        voltage_v: f32,
        capacity_ah: f32,
        internal_resistance_ohm: f32,
        soc_min: f32,
        soc_max: f32,
        soh_max: f32,
        soc_start: f32,
        soh_start: f32,
    ) -> Self {
        assert!(voltage_v > 0.0, "voltage_v must be > 0");
        assert!(capacity_ah > 0.0, "capacity_ah must be > 0");
        assert!(internal_resistance_ohm >= 0.0);
        assert!(
            0.0 <= soc_min && soc_min <= soc_max && soc_max <= 1.0,
            "SOC bounds must satisfy 0 <= min <= max <= 1"
        );
        assert!(soh_max > 0.0 && soh_max <= 1.0, "soh_max must be in (0, 1]");
        assert!((soc_min..=soc_max).contains(&soc_start));
        assert!((0.0..=soh_max).contains(&soh_start));

        Self {
            voltage_v,
            capacity_ah,
            internal_resistance_ohm,
            soc_min,
            soc_max,
            soh_max,
            soc: soc_start,
            soh: soh_start,
        }
    }

    /// Implied battery current for a power draw, `P / Voc`.
    ///
    /// Positive power (discharge) gives positive current.
    pub fn current_a(&self, power_kw: f32) -> f32 {
        power_kw / self.voltage_v
    }

    /// Power ceiling the pack can sustain at the present charge over one
    /// step of `dt_hours` (kW).
    pub fn available_power_kw(&self, dt_hours: f32) -> f32 {
        self.soc * self.capacity_ah * self.voltage_v / dt_hours
    }

    /// Applies one step's charge/health deltas and clamps into bounds.
    ///
    /// Floating-point drift outside the bounds is recovered here rather
    /// than propagated into the cost or degradation formulas.
    pub fn apply_wear(&mut self, delta_soc: f32, delta_soh: f32) {
        self.soc = (self.soc + delta_soc).clamp(self.soc_min, self.soc_max);
        self.soh = (self.soh + delta_soh).clamp(0.0, self.soh_max);
    }
}
