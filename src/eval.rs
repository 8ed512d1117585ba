use tracing::{debug, warn};

use crate::circuit::{Circuit, GateId, GateKey, GateKind};
use crate::classify::Classification;
use crate::error::{Result, SimulationError};
use crate::graph::{DependencyGraph, Schedule};
use crate::utils;

/// Number of full passes over a cyclic circuit before giving up on it reaching a fixed point.
/// Oscillating circuits are left with whatever the last pass computed.
pub const MAX_SETTLE_PASSES: usize = 100;

/// Truth tables have one row per input combination, so they stop at this many inputs.
pub const MAX_TRUTH_TABLE_INPUTS: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Settle {
    Settled { passes: usize },
    /// [`MAX_SETTLE_PASSES`] passes ran and the last one still changed something.
    Unsettled,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TruthTable {
    pub inputs: Vec<GateId>,
    pub outputs: Vec<GateId>,
    pub rows: Vec<(Vec<bool>, Vec<bool>)>,
}

// settling {{{1
/// Propagates values through every combinational gate in schedule order. Inputs, clocks and flip-flops are left alone.
pub fn settle(circuit: &mut Circuit, schedule: &Schedule) -> Settle {
    if !schedule.cyclic {
        // every gate comes after everything it reads, so one pass is exact
        pass(circuit, &schedule.order);
        return Settle::Settled { passes: 1 };
    }

    for passes in 1..=MAX_SETTLE_PASSES {
        if !pass(circuit, &schedule.order) {
            debug!(passes, "cyclic circuit settled");
            return Settle::Settled { passes };
        }
    }

    warn!(passes = MAX_SETTLE_PASSES, "circuit did not converge");
    Settle::Unsettled
}

/// Returns whether any output changed.
fn pass(circuit: &mut Circuit, order: &[GateKey]) -> bool {
    let mut changed = false;
    for &key in order {
        if let Some(new_value) = next_output(circuit, key) {
            let gate = &mut circuit[key];
            if gate.output != new_value {
                gate.output = new_value;
                changed = true;
            }
        }
    }
    changed
}

/// What a gate would output given the current values of its inputs, or None if this evaluator does not drive it.
pub(crate) fn next_output(circuit: &Circuit, key: GateKey) -> Option<bool> {
    let a = || circuit.operand(key, 0);
    let b = || circuit.operand(key, 1);

    match circuit[key].kind {
        GateKind::Input | GateKind::Clock => None,
        GateKind::Dff | GateKind::Dffn | GateKind::Tff | GateKind::Jkff => None,
        // transparent while enabled, otherwise holds
        GateKind::DLatch => b().then(|| circuit.input(key, 0)),
        GateKind::Not => Some(!a()),
        GateKind::Output => Some(a()),
        GateKind::And => Some(a() && b()),
        GateKind::Or => Some(a() || b()),
        GateKind::Xor => Some(a() != b()),
        GateKind::Xnor => Some(a() == b()),
        GateKind::Nand => Some(!(a() && b())),
        GateKind::Nor => Some(!(a() || b())),
    }
}

// truth tables {{{1
pub fn truth_table(circuit: &Circuit) -> Result<TruthTable> {
    let classes = Classification::of(circuit);
    if classes.inputs.len() > MAX_TRUTH_TABLE_INPUTS {
        return Err(SimulationError::TooManyInputs { count: classes.inputs.len(), max: MAX_TRUTH_TABLE_INPUTS });
    }
    if !classes.is_combinational() {
        warn!("truth table of a circuit with sequential gates uses their current outputs");
    }
    let schedule = DependencyGraph::build(circuit).schedule();

    let rows: Vec<_> = utils::enumerate_inputs(classes.inputs.len())
        .map(|row| {
            let mut circuit = circuit.clone();
            for (&input, &value) in classes.inputs.iter().zip(row.iter()) {
                circuit[input].output = value;
            }
            settle(&mut circuit, &schedule);
            let outputs: Vec<bool> = classes.outputs.iter().map(|&output| circuit[output].output).collect();
            (row, outputs)
        })
        .collect();

    let ids = |keys: &[GateKey]| -> Vec<GateId> { keys.iter().map(|&key| circuit[key].id.clone()).collect() };
    Ok(TruthTable { inputs: ids(&classes.inputs), outputs: ids(&classes.outputs), rows })
}

impl std::fmt::Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = |id: &GateId| id.len().max(1);
        let bit = |value: bool| if value { "1" } else { "0" };

        let header: Vec<_> = self.inputs.iter().map(|id| format!("{:>w$}", id, w = width(id))).collect();
        let outputs: Vec<_> = self.outputs.iter().map(|id| format!("{:>w$}", id, w = width(id))).collect();
        writeln!(f, "{} | {}", header.join(" "), outputs.join(" "))?;
        let rule = |ids: &[GateId]| ids.iter().map(|id| "-".repeat(width(id))).collect::<Vec<_>>().join("-");
        writeln!(f, "{}-+-{}", rule(&self.inputs), rule(&self.outputs))?;

        for (inputs, outputs) in &self.rows {
            let inputs: Vec<_> = self.inputs.iter().zip(inputs).map(|(id, &value)| format!("{:>w$}", bit(value), w = width(id))).collect();
            let outputs: Vec<_> = self.outputs.iter().zip(outputs).map(|(id, &value)| format!("{:>w$}", bit(value), w = width(id))).collect();
            writeln!(f, "{} | {}", inputs.join(" "), outputs.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{settle, truth_table, Settle, MAX_TRUTH_TABLE_INPUTS};
    use crate::circuit::{Circuit, Gate, GateKind};
    use crate::error::SimulationError;
    use crate::graph::DependencyGraph;

    fn settled(mut circuit: Circuit) -> (Circuit, Settle) {
        let schedule = DependencyGraph::build(&circuit).schedule();
        let result = settle(&mut circuit, &schedule);
        (circuit, result)
    }

    fn inputs(a: bool, b: bool) -> [Gate; 2] {
        [Gate::new("a", GateKind::Input, &[]).with_output(a), Gate::new("b", GateKind::Input, &[]).with_output(b)]
    }

    #[test]
    fn binary_gates() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let gates = [GateKind::And, GateKind::Or, GateKind::Xor, GateKind::Xnor, GateKind::Nand, GateKind::Nor].map(|kind| Gate::new(kind.name(), kind, &["a", "b"]));
            let (circuit, result) = settled(inputs(a, b).into_iter().chain(gates).collect());

            assert_eq!(result, Settle::Settled { passes: 1 });
            assert_eq!(circuit.read("AND"), a && b);
            assert_eq!(circuit.read("OR"), a || b);
            assert_eq!(circuit.read("XOR"), a ^ b);
            assert_eq!(circuit.read("XNOR"), a == b);
            assert_eq!(circuit.read("NAND"), !(a && b));
            assert_eq!(circuit.read("NOR"), !(a || b));
        }
    }

    #[test]
    fn missing_second_operand_is_false() {
        let mut or = Gate::new("or", GateKind::Or, &["a", "b"]);
        or.num_inputs = 1;
        let nand = Gate::new("nand", GateKind::Nand, &["a"]);
        let (circuit, _) = settled(inputs(false, true).into_iter().chain([or, nand]).collect());

        assert!(!circuit.read("or"));
        assert!(circuit.read("nand"));
    }

    #[test]
    fn not_and_output_probe() {
        let (circuit, _) = settled(inputs(true, false).into_iter().chain([Gate::new("n", GateKind::Not, &["a"]), Gate::new("out", GateKind::Output, &["n"]), Gate::new("ghost_out", GateKind::Output, &["nowhere"])]).collect());

        assert!(!circuit.read("n"));
        assert!(!circuit.read("out"));
        assert!(!circuit.read("ghost_out"));
    }

    #[test]
    fn externally_driven_gates_are_untouched() {
        let (circuit, _) = settled(
            [
                Gate::new("clk", GateKind::Clock, &[]).with_output(true),
                Gate::new("i", GateKind::Input, &["clk"]),
                Gate::new("d", GateKind::Dff, &["clk"]),
                Gate::new("t", GateKind::Tff, &["clk"]).with_output(true),
            ]
            .into_iter()
            .collect(),
        );

        assert!(circuit.read("clk"));
        assert!(!circuit.read("i"));
        assert!(!circuit.read("d"));
        assert!(circuit.read("t"));
    }

    #[test]
    fn latch_is_transparent_only_while_enabled() {
        let latch = |d, en, held| [Gate::new("d", GateKind::Input, &[]).with_output(d), Gate::new("en", GateKind::Input, &[]).with_output(en), Gate::new("l", GateKind::DLatch, &["d", "en"]).with_output(held), Gate::new("out", GateKind::Output, &["l"])];

        let (circuit, _) = settled(latch(true, true, false).into_iter().collect());
        assert!(circuit.read("l"));
        assert!(circuit.read("out"), "downstream gates see the latched value in the same pass");

        let (circuit, _) = settled(latch(true, false, false).into_iter().collect());
        assert!(!circuit.read("l"));
        let (circuit, _) = settled(latch(false, false, true).into_iter().collect());
        assert!(circuit.read("l"));
    }

    fn sr_latch(s_n: bool, r_n: bool, q: bool) -> Circuit {
        [
            Gate::new("s_n", GateKind::Input, &[]).with_output(s_n),
            Gate::new("r_n", GateKind::Input, &[]).with_output(r_n),
            Gate::new("q", GateKind::Nand, &["s_n", "q_n"]).with_output(q),
            Gate::new("q_n", GateKind::Nand, &["r_n", "q"]).with_output(!q),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn cross_coupled_nands_settle() {
        let (circuit, result) = settled(sr_latch(false, true, false));
        assert!(matches!(result, Settle::Settled { .. }));
        assert!(circuit.read("q"));
        assert!(!circuit.read("q_n"));

        let (circuit, result) = settled(sr_latch(true, false, true));
        assert!(matches!(result, Settle::Settled { .. }));
        assert!(!circuit.read("q"));
        assert!(circuit.read("q_n"));

        // holding keeps whichever state the latch was in
        for q in [false, true] {
            let (circuit, result) = settled(sr_latch(true, true, q));
            assert_eq!(result, Settle::Settled { passes: 1 });
            assert_eq!(circuit.read("q"), q);
            assert_eq!(circuit.read("q_n"), !q);
        }
    }

    #[test]
    fn oscillation_stops_at_the_pass_limit() {
        let (circuit, result) = settled([Gate::new("n", GateKind::Nand, &["n", "n"])].into_iter().collect());

        assert_eq!(result, Settle::Unsettled);
        // an even number of flips starting from false
        assert!(!circuit.read("n"));
    }

    #[test]
    fn every_kind_is_handled() {
        for kind in GateKind::ALL {
            let circuit: Circuit = [Gate::new("g", kind, &[])].into_iter().collect();
            let driven = super::next_output(&circuit, circuit.key("g").unwrap()).is_some();
            // a latch with nothing on its enable holds, like the flip-flops
            assert_eq!(driven, !matches!(kind, GateKind::Input | GateKind::Clock) && !kind.is_sequential(), "{kind}");
        }
    }

    #[test]
    fn truth_table_of_half_adder() {
        let circuit: Circuit = inputs(false, false)
            .into_iter()
            .chain([Gate::new("x", GateKind::Xor, &["a", "b"]), Gate::new("c", GateKind::And, &["a", "b"]), Gate::new("sum", GateKind::Output, &["x"]), Gate::new("carry", GateKind::Output, &["c"])])
            .collect();
        let table = truth_table(&circuit).unwrap();

        assert_eq!(table.inputs, vec!["a", "b"]);
        assert_eq!(table.outputs, vec!["sum", "carry"]);
        assert_eq!(
            table.rows,
            vec![(vec![false, false], vec![false, false]), (vec![false, true], vec![true, false]), (vec![true, false], vec![true, false]), (vec![true, true], vec![false, true])]
        );
        assert!(!circuit.read("x"), "the circuit itself is not modified");
        assert_eq!(table.to_string().lines().nth(5), Some("1 1 |   0     1"));
    }

    #[test]
    fn truth_table_input_limit() {
        let circuit: Circuit = (0..=MAX_TRUTH_TABLE_INPUTS).map(|i| Gate::new(format!("i{i}"), GateKind::Input, &[])).collect();
        assert!(matches!(truth_table(&circuit), Err(SimulationError::TooManyInputs { count: 11, max: 10 })));
    }
}
