use tracing::trace;

use crate::circuit::{Circuit, GateId, GateKey, GateKind};
use crate::classify::Classification;
use crate::error::{Result, SimulationError};
use crate::eval::{self, Settle};
use crate::graph::{DependencyGraph, Schedule};

// simulator {{{1
/// Gate values observed at the end of one clock cycle.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CycleSnapshot {
    /// counts from 1
    pub cycle: usize,
    pub clock: bool,
    pub inputs: Vec<(GateId, bool)>,
    pub sequential: Vec<(GateId, bool)>,
    pub outputs: Vec<(GateId, bool)>,
}

/// Owns a circuit together with everything derived from it for one simulation run.
pub struct Simulator {
    circuit: Circuit,
    schedule: Schedule,
    classes: Classification,
    clock: bool,
    cycle: usize,
}

impl Simulator {
    pub fn new(circuit: Circuit) -> Simulator {
        let classes = Classification::of(&circuit);
        let schedule = DependencyGraph::build(&circuit).schedule();
        Simulator { circuit, schedule, classes, clock: false, cycle: 0 }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }
    pub fn classification(&self) -> &Classification {
        &self.classes
    }
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Drives an INPUT gate.
    pub fn set_input(&mut self, id: &str, value: bool) -> Result<()> {
        let gate = self.circuit.gate_mut(id).ok_or_else(|| SimulationError::UnknownInput(id.to_string()))?;
        if gate.kind != GateKind::Input {
            return Err(SimulationError::NotAnInput { id: id.to_string(), kind: gate.kind });
        }
        gate.output = value;
        Ok(())
    }

    pub fn settle(&mut self) -> Settle {
        eval::settle(&mut self.circuit, &self.schedule)
    }

    /// Clocks the circuit without keeping any history.
    pub fn run(&mut self, cycles: usize) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Like [`Simulator::run`] but records a snapshot after every cycle.
    pub fn trace(&mut self, cycles: usize) -> Vec<CycleSnapshot> {
        (0..cycles)
            .map(|_| {
                self.step();
                self.snapshot()
            })
            .collect()
    }

    /// One clock half-period: flip the clock, settle the combinational logic, then clock every flip-flop at once.
    pub fn step(&mut self) {
        self.clock = !self.clock;
        self.cycle += 1;
        if let Some(clock) = self.classes.clock {
            self.circuit[clock].output = self.clock;
        }
        self.settle();

        // without a clock gate the flip-flops see the engine's own clock
        let level = self.classes.clock.map_or(self.clock, |clock| self.circuit[clock].output);

        // every flip-flop reads its peers before any of them commits
        for &key in &self.classes.sequential {
            let staged = next_state(&self.circuit, key, level);
            let gate = &mut self.circuit[key];
            gate.prev_clk = level;
            if let Some(staged) = staged {
                gate.next_state = staged;
            }
        }
        for &key in &self.classes.sequential {
            let gate = &mut self.circuit[key];
            if gate.kind != GateKind::DLatch {
                gate.output = gate.next_state;
            }
        }

        trace!(cycle = self.cycle, clock = self.clock, "clocked");
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        let values = |keys: &[GateKey]| -> Vec<(GateId, bool)> { keys.iter().map(|&key| (self.circuit[key].id.clone(), self.circuit[key].output)).collect() };
        CycleSnapshot { cycle: self.cycle, clock: self.clock, inputs: values(&self.classes.inputs), sequential: values(&self.classes.sequential), outputs: values(&self.classes.outputs) }
    }
}

// flip-flops {{{1
/// The state a gate takes at the end of this cycle, or None to keep its staged state.
fn next_state(circuit: &Circuit, key: GateKey, level: bool) -> Option<bool> {
    let gate = &circuit[key];
    let rising = level && !gate.prev_clk;
    let falling = !level && gate.prev_clk;

    match gate.kind {
        GateKind::Dff => rising.then(|| circuit.input(key, 0)),
        GateKind::Dffn => falling.then(|| circuit.input(key, 0)),
        GateKind::Tff => rising.then(|| if circuit.input(key, 0) { !gate.output } else { gate.output }),
        GateKind::Jkff => rising.then(|| match (circuit.input(key, 0), circuit.operand(key, 1)) {
            (false, false) => gate.output,
            (true, false) => true,
            (false, true) => false,
            (true, true) => !gate.output,
        }),
        // level sensitive, handled by the combinational evaluator
        GateKind::DLatch => None,
        GateKind::Input | GateKind::Clock | GateKind::Output => None,
        GateKind::And | GateKind::Or | GateKind::Xor | GateKind::Xnor | GateKind::Nand | GateKind::Nor | GateKind::Not => None,
    }
}
