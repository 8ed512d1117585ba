use crate::circuit::{Circuit, GateKey, GateKind};

/// Gates bucketed by the role they play when a simulation is set up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub inputs: Vec<GateKey>,
    pub outputs: Vec<GateKey>,
    /// If the circuit has several clock gates the last one in the gate list is used.
    pub clock: Option<GateKey>,
    pub sequential: Vec<GateKey>,
}

impl Classification {
    pub fn of(circuit: &Circuit) -> Classification {
        let mut classes = Classification::default();
        for key in circuit.keys() {
            match circuit[key].kind {
                GateKind::Input => classes.inputs.push(key),
                GateKind::Output => classes.outputs.push(key),
                GateKind::Clock => classes.clock = Some(key),
                GateKind::Dff | GateKind::Dffn | GateKind::DLatch | GateKind::Tff | GateKind::Jkff => classes.sequential.push(key),
                GateKind::And | GateKind::Or | GateKind::Xor | GateKind::Xnor | GateKind::Nand | GateKind::Nor | GateKind::Not => {}
            }
        }
        classes
    }

    /// A single stateful gate is enough to make the whole circuit go through the clocked engine.
    pub fn is_combinational(&self) -> bool {
        self.sequential.is_empty()
    }
}
