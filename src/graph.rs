use std::collections::VecDeque;

use slotmap::SecondaryMap;
use tracing::warn;

use crate::circuit::{Circuit, GateKey};

// graph {{{1
/// Signal flow between gates: an edge runs from the gate driving a signal to every gate that reads it.
pub struct DependencyGraph {
    order: Vec<GateKey>,
    successors: SecondaryMap<GateKey, Vec<GateKey>>,
}

impl DependencyGraph {
    /// References to identifiers that are not in the circuit add no edge.
    pub fn build(circuit: &Circuit) -> DependencyGraph {
        let order: Vec<_> = circuit.keys().collect();
        let mut successors = SecondaryMap::new();
        for &key in &order {
            successors.insert(key, Vec::new());
        }

        for &key in &order {
            let gate = &circuit[key];
            for input in &gate.inputs {
                match circuit.key(input) {
                    Some(driver) => successors[driver].push(key),
                    None => warn!(gate = %gate.id, input = %input, "gate reads from a gate that does not exist, treating it as false"),
                }
            }
        }

        DependencyGraph { order, successors }
    }

    pub fn successors(&self, key: GateKey) -> &[GateKey] {
        self.successors.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

// cycles and scheduling {{{1
/// The order gates are evaluated in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub order: Vec<GateKey>,
    /// When this is set the order is only a best effort and evaluation has to iterate to a fixed point.
    pub cyclic: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    OnStack,
    Done,
}

impl DependencyGraph {
    /// Depth first search looking for an edge back into a gate that is still being explored.
    pub fn has_cycle(&self) -> bool {
        let mut visits: SecondaryMap<GateKey, Visit> = SecondaryMap::new();

        for &root in &self.order {
            if visits.contains_key(root) {
                continue;
            }

            // each frame is a gate and the index of the next successor to look at
            let mut stack = vec![(root, 0)];
            visits.insert(root, Visit::OnStack);
            while let Some(&(gate, next)) = stack.last() {
                match self.successors(gate).get(next) {
                    Some(&successor) => {
                        let top = stack.len() - 1;
                        stack[top].1 += 1;
                        match visits.get(successor) {
                            None => {
                                visits.insert(successor, Visit::OnStack);
                                stack.push((successor, 0));
                            }
                            Some(Visit::OnStack) => return true,
                            Some(Visit::Done) => {}
                        }
                    }
                    None => {
                        visits.insert(gate, Visit::Done);
                        stack.pop();
                    }
                }
            }
        }

        false
    }

    /// Kahn's algorithm with a FIFO queue. Gates caught in or behind a cycle never reach indegree zero; they go at the end in their original order.
    pub fn schedule(&self) -> Schedule {
        let mut indegree: SecondaryMap<GateKey, usize> = SecondaryMap::new();
        for &key in &self.order {
            indegree.insert(key, 0);
        }
        for &key in &self.order {
            for &successor in self.successors(key) {
                indegree[successor] += 1;
            }
        }

        let mut queue: VecDeque<GateKey> = self.order.iter().copied().filter(|&key| indegree[key] == 0).collect();
        let mut order = Vec::with_capacity(self.order.len());
        let mut placed = SecondaryMap::new();
        while let Some(key) = queue.pop_front() {
            order.push(key);
            placed.insert(key, ());
            for &successor in self.successors(key) {
                indegree[successor] -= 1;
                if indegree[successor] == 0 {
                    queue.push_back(successor);
                }
            }
        }

        let ordered_all = order.len() == self.order.len();
        order.extend(self.order.iter().copied().filter(|&key| !placed.contains_key(key)));

        let cyclic = self.has_cycle();
        debug_assert_eq!(cyclic, !ordered_all, "cycle detection and topological sort disagree");
        Schedule { order, cyclic }
    }
}
