//! Graph layout.
//!
//! The force engine assigns every node a position on the canvas. A run that
//! does not settle within its step budget still yields positions; the
//! [`LayoutReport`] then carries a [`Warning::LayoutDivergence`].

pub mod force;

use std::fmt;

pub use force::Engine;

/// Non-fatal layout conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Warning {
    /// The simulation used its whole step budget without settling.
    LayoutDivergence { steps: usize, energy: f32 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayoutDivergence { steps, energy } => write!(
                f,
                "layout did not converge after {steps} steps (kinetic energy {energy:.4}); positions may be unstable"
            ),
        }
    }
}

/// Outcome of a layout run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutReport {
    steps: usize,
    energy: f32,
    converged: bool,
}

impl LayoutReport {
    /// Creates a report for a finished simulation.
    pub fn new(steps: usize, energy: f32, converged: bool) -> Self {
        Self {
            steps,
            energy,
            converged,
        }
    }

    /// Simulation steps taken
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Kinetic energy after the last step
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Whether the kinetic energy fell below the threshold.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// The divergence warning, if the run did not converge.
    pub fn warning(&self) -> Option<Warning> {
        (!self.converged).then_some(Warning::LayoutDivergence {
            steps: self.steps,
            energy: self.energy,
        })
    }
}
