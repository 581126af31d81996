//! Bounded two-variable Nelder-Mead minimization.

use std::fmt;

/// Reflection coefficient.
const ALPHA: f32 = 1.0;
/// Expansion coefficient.
const GAMMA: f32 = 2.0;
/// Contraction coefficient.
const RHO: f32 = 0.5;
/// Shrink coefficient.
const SIGMA: f32 = 0.5;

/// Iteration cap and convergence tolerance for one bounded solve.
///
/// Tolerances are fixed per run so worst-case latency is bounded and
/// convergence behavior is reproducible across identical inputs.
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    /// Maximum Nelder-Mead iterations before giving up.
    pub max_iters: usize,
    /// Simplex diameter below which the solve is considered converged,
    /// in the units of the decision variables (kW here).
    pub tolerance: f32,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iters: 200,
            tolerance: 1e-4,
        }
    }
}

/// Failure modes of a bounded solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    /// The iteration budget was exhausted before the simplex collapsed.
    IterationsExhausted,
    /// The objective produced a NaN value.
    NonFinite,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::IterationsExhausted => write!(f, "iteration budget exhausted"),
            SolverError::NonFinite => write!(f, "objective returned a non-finite value"),
        }
    }
}

fn distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

fn diameter(simplex: &[[f32; 2]; 3]) -> f32 {
    distance(simplex[0], simplex[1])
        .max(distance(simplex[0], simplex[2]))
        .max(distance(simplex[1], simplex[2]))
}

/// Minimizes `f` over the box `[lo, hi]` starting from `x0`.
///
/// Derivative-free Nelder-Mead with every candidate projected back into
/// the box. The best-so-far value never increases, so the result is never
/// worse than the starting point.
///
/// # Errors
///
/// Returns [`SolverError::IterationsExhausted`] when the simplex has not
/// collapsed below `opts.tolerance` within `opts.max_iters` iterations,
/// and [`SolverError::NonFinite`] if the objective yields NaN.
///
/// # Panics
///
/// Panics if any `lo[d] > hi[d]`.
pub fn minimize2(
    f: impl Fn([f32; 2]) -> f32,
    x0: [f32; 2],
    lo: [f32; 2],
    hi: [f32; 2],
    opts: &SolverOptions,
) -> Result<[f32; 2], SolverError> {
    assert!(lo[0] <= hi[0] && lo[1] <= hi[1], "bounds must satisfy lo <= hi");

    let project =
        |p: [f32; 2]| -> [f32; 2] { [p[0].clamp(lo[0], hi[0]), p[1].clamp(lo[1], hi[1])] };

    // Initial simplex: the start point plus a 5%-of-box step along each
    // axis, stepping inward when the start sits on the upper bound.
    let start = project(x0);
    let mut simplex = [start; 3];
    for d in 0..2 {
        let step = 0.05 * (hi[d] - lo[d]);
        let mut v = start;
        let up = (v[d] + step).clamp(lo[d], hi[d]);
        v[d] = if up > start[d] {
            up
        } else {
            (v[d] - step).clamp(lo[d], hi[d])
        };
        simplex[d + 1] = v;
    }

    let mut values = [f(simplex[0]), f(simplex[1]), f(simplex[2])];
    if values.iter().any(|v| v.is_nan()) {
        return Err(SolverError::NonFinite);
    }

    for _ in 0..opts.max_iters {
        // Order vertices best-to-worst.
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let (b, m, w) = (order[0], order[1], order[2]);

        if diameter(&simplex) <= opts.tolerance {
            return Ok(simplex[b]);
        }

        let centroid = [
            (simplex[b][0] + simplex[m][0]) / 2.0,
            (simplex[b][1] + simplex[m][1]) / 2.0,
        ];

        let reflected = project([
            centroid[0] + ALPHA * (centroid[0] - simplex[w][0]),
            centroid[1] + ALPHA * (centroid[1] - simplex[w][1]),
        ]);
        let fr = f(reflected);
        if fr.is_nan() {
            return Err(SolverError::NonFinite);
        }

        if fr < values[b] {
            // Best so far: try expanding further in the same direction.
            let expanded = project([
                centroid[0] + GAMMA * (centroid[0] - simplex[w][0]),
                centroid[1] + GAMMA * (centroid[1] - simplex[w][1]),
            ]);
            let fe = f(expanded);
            if fe.is_nan() {
                return Err(SolverError::NonFinite);
            }
            if fe < fr {
                simplex[w] = expanded;
                values[w] = fe;
            } else {
                simplex[w] = reflected;
                values[w] = fr;
            }
        } else if fr < values[m] {
            simplex[w] = reflected;
            values[w] = fr;
        } else {
            // Contract toward the worst vertex.
            let contracted = project([
                centroid[0] + RHO * (simplex[w][0] - centroid[0]),
                centroid[1] + RHO * (simplex[w][1] - centroid[1]),
            ]);
            let fc = f(contracted);
            if fc.is_nan() {
                return Err(SolverError::NonFinite);
            }
            if fc < values[w] {
                simplex[w] = contracted;
                values[w] = fc;
            } else {
                // Shrink everything toward the best vertex.
                for &i in &[m, w] {
                    simplex[i] = project([
                        simplex[b][0] + SIGMA * (simplex[i][0] - simplex[b][0]),
                        simplex[b][1] + SIGMA * (simplex[i][1] - simplex[b][1]),
                    ]);
                    values[i] = f(simplex[i]);
                    if values[i].is_nan() {
                        return Err(SolverError::NonFinite);
                    }
                }
            }
        }
    }

    Err(SolverError::IterationsExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SolverOptions {
        SolverOptions::default()
    }

    #[test]
    fn converges_on_convex_quadratic() {
        let f = |x: [f32; 2]| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2);
        let best = minimize2(f, [4.0, 4.0], [0.0, 0.0], [5.0, 5.0], &opts());
        let best = best.expect("quadratic should converge");
        assert!((best[0] - 1.0).abs() < 1e-2, "x0 = {}", best[0]);
        assert!((best[1] - 2.0).abs() < 1e-2, "x1 = {}", best[1]);
    }

    #[test]
    fn respects_lower_bounds() {
        let f = |x: [f32; 2]| x[0] + x[1];
        let best = minimize2(f, [2.0, 2.0], [1.0, 1.0], [3.0, 3.0], &opts());
        let best = best.expect("linear objective should converge");
        assert!((best[0] - 1.0).abs() < 1e-2);
        assert!((best[1] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn unconstrained_minimum_outside_box_lands_on_boundary() {
        let f = |x: [f32; 2]| (x[0] - 10.0).powi(2) + x[1].powi(2);
        let best = minimize2(f, [2.0, 2.0], [0.0, 0.0], [5.0, 5.0], &opts());
        let best = best.expect("should converge to the boundary");
        assert!((best[0] - 5.0).abs() < 1e-2);
        assert!(best[1].abs() < 1e-2);
    }

    #[test]
    fn iterates_stay_inside_box() {
        let f = |x: [f32; 2]| {
            assert!((-0.001..=5.001).contains(&x[0]), "x0 escaped: {}", x[0]);
            assert!((-0.001..=5.001).contains(&x[1]), "x1 escaped: {}", x[1]);
            (x[0] - 3.0).powi(2) + (x[1] - 3.0).powi(2)
        };
        minimize2(f, [1.0, 1.0], [0.0, 0.0], [5.0, 5.0], &opts()).expect("should converge");
    }

    #[test]
    fn result_never_worse_than_start() {
        let f = |x: [f32; 2]| x[0].powi(2) + x[1].powi(2) + (x[0] * 3.0).sin();
        let start = [4.0, 4.0];
        let best = minimize2(f, start, [0.0, 0.0], [5.0, 5.0], &opts());
        let best = best.expect("should converge");
        assert!(f(best) <= f(start));
    }

    #[test]
    fn zero_iteration_budget_errors() {
        let f = |x: [f32; 2]| x[0] + x[1];
        let result = minimize2(
            f,
            [2.0, 2.0],
            [0.0, 0.0],
            [5.0, 5.0],
            &SolverOptions {
                max_iters: 0,
                tolerance: 1e-4,
            },
        );
        assert_eq!(result, Err(SolverError::IterationsExhausted));
    }

    #[test]
    fn nan_objective_errors() {
        let f = |_: [f32; 2]| f32::NAN;
        let result = minimize2(f, [2.0, 2.0], [0.0, 0.0], [5.0, 5.0], &opts());
        assert_eq!(result, Err(SolverError::NonFinite));
    }

    #[test]
    #[should_panic]
    fn inverted_bounds_panic() {
        minimize2(|x| x[0], [0.0, 0.0], [1.0, 0.0], [0.0, 1.0], &opts()).ok();
    }
}
