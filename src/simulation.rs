use std::collections::BTreeMap;

use tracing::debug;

use crate::circuit::{Circuit, GateId};
use crate::error::{Result, SimulationError};
use crate::eval::Settle;
use crate::sequential::{CycleSnapshot, Simulator};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Combinational,
    Sequential,
}

/// The circuit after simulation, every gate's `output` holding its final value.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub circuit: Circuit,
    pub mode: Mode,
    /// How the combinational settling went, only for combinational circuits.
    pub settle: Option<Settle>,
    /// One snapshot per clock cycle, only for sequential circuits run through [`simulate_traced`].
    pub trace: Vec<CycleSnapshot>,
}

/// Runs a circuit from its current gate states.
///
/// Combinational circuits (no flip-flops or latches) need exactly one input value per INPUT gate and are settled once; `cycles` is ignored.
/// Sequential circuits are clocked for `cycles` clock half-periods starting from the stored gate outputs; `inputs` is not read for them.
/// Hosts that want to drive inputs between cycles use [`Simulator`] directly.
pub fn simulate(circuit: Circuit, inputs: &BTreeMap<GateId, bool>, cycles: usize) -> Result<Simulation> {
    run(circuit, inputs, cycles, false)
}

/// [`simulate`], additionally keeping a snapshot of every clock cycle in [`Simulation::trace`].
pub fn simulate_traced(circuit: Circuit, inputs: &BTreeMap<GateId, bool>, cycles: usize) -> Result<Simulation> {
    run(circuit, inputs, cycles, true)
}

fn run(circuit: Circuit, inputs: &BTreeMap<GateId, bool>, cycles: usize, traced: bool) -> Result<Simulation> {
    let mut simulator = Simulator::new(circuit);
    let classes = simulator.classification();
    debug!(gates = simulator.circuit().len(), cyclic = simulator.schedule().cyclic, inputs = classes.inputs.len(), sequential = classes.sequential.len(), "scheduled circuit");

    if classes.is_combinational() {
        if inputs.len() != classes.inputs.len() {
            return Err(SimulationError::InputCount { expected: classes.inputs.len(), got: inputs.len() });
        }
        for (id, &value) in inputs {
            simulator.set_input(id, value)?;
        }

        let settle = simulator.settle();
        Ok(Simulation { circuit: simulator.into_circuit(), mode: Mode::Combinational, settle: Some(settle), trace: Vec::new() })
    } else {
        if !inputs.is_empty() {
            debug!(count = inputs.len(), "sequential circuits run from their stored outputs, ignoring request inputs");
        }

        let trace = if traced {
            simulator.trace(cycles)
        } else {
            simulator.run(cycles);
            Vec::new()
        };
        Ok(Simulation { circuit: simulator.into_circuit(), mode: Mode::Sequential, settle: None, trace })
    }
}
