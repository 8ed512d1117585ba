pub mod document;

use std::collections::HashMap;

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a gate inside a [`Circuit`]. Handles are never invalidated because gates are never removed.
    pub struct GateKey;
}

pub type GateId = String;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GateKind {
    Input,
    Clock,
    Output,
    And,
    Or,
    Xor,
    Xnor,
    Nand,
    Nor,
    Not,
    /// rising edge D flip-flop
    Dff,
    /// falling edge D flip-flop
    Dffn,
    /// transparent latch, input 0 is data and input 1 is enable
    DLatch,
    Tff,
    /// input 0 is J, input 1 is K
    Jkff,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Gate {
    pub id: GateId,
    pub kind: GateKind,
    /// Advisory arity: only input slots below this are read as operands.
    pub num_inputs: usize,
    pub inputs: Vec<GateId>,
    pub output: bool,
    pub next_state: bool,
    pub prev_clk: bool,
}

/// A circuit owns its gates in an arena. Gate order is insertion order; evaluation order is decided separately by [`crate::graph`].
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Opaque reference to whoever stored the circuit.
    pub owner: String,
    gates: SlotMap<GateKey, Gate>,
    order: Vec<GateKey>,
    by_id: HashMap<GateId, GateKey>,
}

impl GateKind {
    pub const ALL: [GateKind; 15] = [
        GateKind::Input,
        GateKind::Clock,
        GateKind::Output,
        GateKind::And,
        GateKind::Or,
        GateKind::Xor,
        GateKind::Xnor,
        GateKind::Nand,
        GateKind::Nor,
        GateKind::Not,
        GateKind::Dff,
        GateKind::Dffn,
        GateKind::DLatch,
        GateKind::Tff,
        GateKind::Jkff,
    ];

    /// The name a gate type is stored under.
    pub fn name(self) -> &'static str {
        match self {
            GateKind::Input => "INPUT",
            GateKind::Clock => "CLOCK",
            GateKind::Output => "OUTPUT",
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Xor => "XOR",
            GateKind::Xnor => "XNOR",
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
            GateKind::Not => "NOT",
            GateKind::Dff => "DFF",
            GateKind::Dffn => "DFFN",
            GateKind::DLatch => "DLATCH",
            GateKind::Tff => "TFF",
            GateKind::Jkff => "JKFF",
        }
    }

    pub fn from_name(name: &str) -> Option<GateKind> {
        GateKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Gates that hold state between clock cycles.
    pub fn is_sequential(self) -> bool {
        matches!(self, GateKind::Dff | GateKind::Dffn | GateKind::DLatch | GateKind::Tff | GateKind::Jkff)
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Gate {
    pub fn new(id: impl Into<GateId>, kind: GateKind, inputs: &[&str]) -> Gate {
        Gate { id: id.into(), kind, num_inputs: inputs.len(), inputs: inputs.iter().map(|input| input.to_string()).collect(), output: false, next_state: false, prev_clk: false }
    }

    pub fn with_output(mut self, output: bool) -> Gate {
        self.output = output;
        self
    }
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Circuit {
        Circuit { name: name.into(), ..Circuit::default() }
    }

    /// Adds a gate at the end of the gate list. If another gate already uses the same identifier, lookups by identifier resolve to the newer gate from now on.
    pub fn add_gate(&mut self, gate: Gate) -> GateKey {
        let id = gate.id.clone();
        let key = self.gates.insert(gate);
        self.order.push(key);
        self.by_id.insert(id, key);
        key
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn key(&self, id: &str) -> Option<GateKey> {
        self.by_id.get(id).copied()
    }

    pub fn gate(&self, id: &str) -> Option<&Gate> {
        self.key(id).map(|key| &self.gates[key])
    }
    pub fn gate_mut(&mut self, id: &str) -> Option<&mut Gate> {
        let key = self.key(id)?;
        Some(&mut self.gates[key])
    }

    /// Gate handles in insertion order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = GateKey> + '_ {
        self.order.iter().copied()
    }
    /// Gates in insertion order.
    pub fn gates(&self) -> impl ExactSizeIterator<Item = &Gate> + '_ {
        self.order.iter().map(|&key| &self.gates[key])
    }

    /// Output of the gate named `id`. A reference to a gate that does not exist reads as false.
    pub fn read(&self, id: &str) -> bool {
        self.gate(id).map_or(false, |gate| gate.output)
    }

    /// Value on input slot `slot` of a gate, regardless of its declared arity. Missing slots read as false.
    pub fn input(&self, key: GateKey, slot: usize) -> bool {
        self.gates[key].inputs.get(slot).map_or(false, |id| self.read(id))
    }

    /// Value on input slot `slot` if the gate declares at least `slot + 1` inputs, otherwise false.
    pub fn operand(&self, key: GateKey, slot: usize) -> bool {
        if slot < self.gates[key].num_inputs {
            self.input(key, slot)
        } else {
            false
        }
    }
}

impl std::ops::Index<GateKey> for Circuit {
    type Output = Gate;

    fn index(&self, key: GateKey) -> &Gate {
        &self.gates[key]
    }
}
impl std::ops::IndexMut<GateKey> for Circuit {
    fn index_mut(&mut self, key: GateKey) -> &mut Gate {
        &mut self.gates[key]
    }
}

impl FromIterator<Gate> for Circuit {
    fn from_iter<I: IntoIterator<Item = Gate>>(gates: I) -> Circuit {
        let mut circuit = Circuit::default();
        for gate in gates {
            circuit.add_gate(gate);
        }
        circuit
    }
}

#[cfg(test)]
mod test {
    use super::{Circuit, Gate, GateKind};

    #[test]
    fn kind_names() {
        for kind in GateKind::ALL {
            assert_eq!(GateKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(GateKind::from_name("and"), None);
        assert_eq!(GateKind::from_name("MUX"), None);
    }

    #[test]
    fn dangling_reads_are_false() {
        let circuit: Circuit = [Gate::new("a", GateKind::Input, &[]).with_output(true), Gate::new("n", GateKind::Not, &["missing"])].into_iter().collect();
        let n = circuit.key("n").unwrap();

        assert!(circuit.read("a"));
        assert!(!circuit.read("missing"));
        assert!(!circuit.input(n, 0));
        assert!(!circuit.input(n, 5));
    }

    #[test]
    fn operands_respect_declared_arity() {
        let mut gate = Gate::new("g", GateKind::And, &["a", "b"]);
        gate.num_inputs = 1;
        let circuit: Circuit = [Gate::new("a", GateKind::Input, &[]).with_output(true), Gate::new("b", GateKind::Input, &[]).with_output(true), gate].into_iter().collect();
        let g = circuit.key("g").unwrap();

        assert!(circuit.operand(g, 0));
        assert!(!circuit.operand(g, 1));
        assert!(circuit.input(g, 1));
    }

    #[test]
    fn duplicate_ids_resolve_to_latest() {
        let circuit: Circuit = [Gate::new("x", GateKind::Input, &[]), Gate::new("x", GateKind::Clock, &[]).with_output(true)].into_iter().collect();

        assert_eq!(circuit.len(), 2);
        assert_eq!(circuit.gate("x").map(|gate| gate.kind), Some(GateKind::Clock));
        assert_eq!(circuit.gates().map(|gate| gate.kind).collect::<Vec<_>>(), vec![GateKind::Input, GateKind::Clock]);
    }
}
