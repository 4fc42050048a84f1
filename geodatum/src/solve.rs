//! Iterative solver results.
//!
//! None of the inversions in this crate have closed forms, and all of
//! them stop after a fixed number of iterations. Rather than quietly
//! handing back whatever the last iteration produced, solvers return
//! an [`Estimate`] recording how the iteration ended.

use crate::error::GeoError;
use log::warn;

/// The result of an iterative solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate<T> {
    /// Best available value.
    pub value: T,
    /// Iterations performed.
    pub iterations: usize,
    /// Magnitude of the last correction step.
    pub residual: f64,
    /// Whether `residual` fell below the solver's tolerance.
    pub converged: bool,
}

impl<T> Estimate<T> {
    /// A closed form result.
    pub(crate) fn exact(value: T) -> Self {
        Self {
            value,
            iterations: 0,
            residual: 0.0,
            converged: true,
        }
    }

    pub(crate) fn converged(value: T, iterations: usize, residual: f64) -> Self {
        Self {
            value,
            iterations,
            residual,
            converged: true,
        }
    }

    pub(crate) fn exhausted(value: T, iterations: usize, residual: f64) -> Self {
        Self {
            value,
            iterations,
            residual,
            converged: false,
        }
    }

    /// Transforms the value, keeping the convergence record.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Estimate<U> {
        Estimate {
            value: f(self.value),
            iterations: self.iterations,
            residual: self.residual,
            converged: self.converged,
        }
    }

    /// Unwraps the estimate.
    ///
    /// An unconverged estimate is an error when `strict`, and is
    /// logged and returned otherwise.
    pub fn accept(self, solver: &'static str, strict: bool) -> Result<T, GeoError> {
        if !self.converged {
            if strict {
                return Err(GeoError::NotConverged {
                    solver,
                    iterations: self.iterations,
                    residual: self.residual,
                });
            }
            warn!(
                "{solver} stopped after {} iterations with residual {:e}",
                self.iterations, self.residual
            );
        }
        Ok(self.value)
    }
}

/// Inverts `forward` at `target` by fixed-point iteration.
///
/// Starting from `start`, each step evaluates `forward` at the
/// current candidate and subtracts its offset from `target`. Stops
/// once both axis offsets are below `tolerance` or after
/// `max_iterations` steps.
pub(crate) fn invert(
    forward: impl Fn(f64, f64) -> (f64, f64),
    target: (f64, f64),
    start: (f64, f64),
    tolerance: (f64, f64),
    max_iterations: usize,
) -> Estimate<(f64, f64)> {
    let (mut x, mut y) = start;
    let mut residual = f64::INFINITY;
    for iteration in 1..=max_iterations {
        let (fx, fy) = forward(x, y);
        let (dx, dy) = (fx - target.0, fy - target.1);
        x -= dx;
        y -= dy;
        residual = dx.abs().max(dy.abs());
        if dx.abs() < tolerance.0 && dy.abs() < tolerance.1 {
            return Estimate::converged((x, y), iteration, residual);
        }
    }
    Estimate::exhausted((x, y), max_iterations, residual)
}
