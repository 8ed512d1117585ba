//! Discrete-time simulation of logic gate circuits.
//!
//! A [`Circuit`] is a list of gates that name each other as inputs. [`simulate`] builds the
//! dependency graph, schedules it, and then either settles the combinational logic once or clocks
//! the flip-flops through the requested number of cycles.

pub mod circuit;
pub mod classify;
pub mod error;
pub mod eval;
pub mod graph;
pub mod sequential;
pub mod simulation;
pub(crate) mod utils;

pub use circuit::{Circuit, Gate, GateId, GateKey, GateKind};
pub use error::{DocumentError, Result, SimulationError};
pub use simulation::{simulate, simulate_traced, Mode, Simulation};
