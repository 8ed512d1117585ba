//! Circuits and simulation requests as stored JSON documents.
//!
//! A circuit document looks like
//! `{"id": .., "name": .., "description": .., "userId": .., "gates": [{"id": "a", "type": "AND", "numInputs": 2, "inputs": ["x", "y"], "output": false, "nextState": false, "prevClk": false}]}`.
//! Everything apart from `gates` and each gate's `id` and `type` is optional.

use std::collections::BTreeMap;

use json::{object::Object, JsonValue};

use crate::circuit::{Circuit, Gate, GateId, GateKind};
use crate::error::DocumentError;
use crate::eval::Settle;
use crate::sequential::CycleSnapshot;
use crate::simulation::{Mode, Simulation};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    pub inputs: BTreeMap<GateId, bool>,
    pub cycles: usize,
}

// import {{{1
pub fn parse_circuit(document: &str) -> Result<Circuit, DocumentError> {
    circuit_from_json(json::parse(document)?)
}

pub fn circuit_from_json(document: JsonValue) -> Result<Circuit, DocumentError> {
    let JsonValue::Object(mut document) = document else { return Err(DocumentError::malformed("circuit document must be an object")) };

    let mut circuit = Circuit::new(optional_string(&mut document, "name", "circuit")?);
    circuit.id = optional_string(&mut document, "id", "circuit")?;
    circuit.description = optional_string(&mut document, "description", "circuit")?;
    circuit.owner = optional_string(&mut document, "userId", "circuit")?;

    let JsonValue::Array(gates) = document.remove("gates").ok_or_else(|| DocumentError::malformed("circuit document must have field 'gates'"))? else {
        return Err(DocumentError::malformed("circuit gates must be an array"));
    };
    for gate in gates {
        circuit.add_gate(parse_gate(gate)?);
    }

    Ok(circuit)
}

fn parse_gate(gate: JsonValue) -> Result<Gate, DocumentError> {
    let JsonValue::Object(mut gate) = gate else { return Err(DocumentError::malformed("gate must be an object")) };

    let id = gate.remove("id").and_then(|mut id| id.take_string()).ok_or_else(|| DocumentError::malformed("gate must have string field 'id'"))?;
    let kind = gate.remove("type").and_then(|mut kind| kind.take_string()).ok_or_else(|| DocumentError::malformed(format!("gate '{id}' must have string field 'type'")))?;
    let kind = GateKind::from_name(&kind).ok_or(DocumentError::UnknownGateType(kind))?;

    let inputs = match gate.remove("inputs") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(inputs)) => inputs.into_iter().map(|mut input| input.take_string().ok_or_else(|| DocumentError::malformed(format!("inputs of gate '{id}' must be strings")))).collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(DocumentError::malformed(format!("inputs of gate '{id}' must be an array"))),
    };
    let num_inputs = match gate.remove("numInputs") {
        None | Some(JsonValue::Null) => inputs.len(),
        Some(num_inputs) => num_inputs.as_usize().ok_or_else(|| DocumentError::malformed(format!("numInputs of gate '{id}' must be a non-negative integer")))?,
    };
    let output = flag(&mut gate, "output", &id)?;
    let next_state = flag(&mut gate, "nextState", &id)?;
    let prev_clk = flag(&mut gate, "prevClk", &id)?;

    Ok(Gate { id, kind, num_inputs, inputs, output, next_state, prev_clk })
}

pub fn parse_request(document: &str) -> Result<Request, DocumentError> {
    let JsonValue::Object(mut document) = json::parse(document)? else { return Err(DocumentError::malformed("simulation request must be an object")) };

    let inputs: BTreeMap<GateId, bool> = match document.remove("inputs") {
        None | Some(JsonValue::Null) => BTreeMap::new(),
        Some(JsonValue::Object(inputs)) => inputs.iter().map(|(id, value)| value.as_bool().map(|value| (id.to_string(), value)).ok_or_else(|| DocumentError::malformed(format!("input '{id}' must be a boolean")))).collect::<Result<_, _>>()?,
        Some(_) => return Err(DocumentError::malformed("request inputs must be an object")),
    };
    let cycles = match document.remove("cycles") {
        None | Some(JsonValue::Null) => 0,
        Some(cycles) => cycles.as_usize().ok_or_else(|| DocumentError::malformed("request cycles must be a non-negative integer"))?,
    };

    Ok(Request { inputs, cycles })
}

fn optional_string(object: &mut Object, key: &str, what: &str) -> Result<String, DocumentError> {
    match object.remove(key) {
        None | Some(JsonValue::Null) => Ok(String::new()),
        Some(mut value) => value.take_string().ok_or_else(|| DocumentError::malformed(format!("{what} field '{key}' must be a string"))),
    }
}

fn flag(gate: &mut Object, key: &str, id: &str) -> Result<bool, DocumentError> {
    match gate.remove(key) {
        None | Some(JsonValue::Null) => Ok(false),
        Some(value) => value.as_bool().ok_or_else(|| DocumentError::malformed(format!("field '{key}' of gate '{id}' must be a boolean"))),
    }
}

// export {{{1
pub fn circuit_to_json(circuit: &Circuit) -> JsonValue {
    let mut document = JsonValue::new_object();
    document["id"] = circuit.id.as_str().into();
    document["name"] = circuit.name.as_str().into();
    document["description"] = circuit.description.as_str().into();
    document["userId"] = circuit.owner.as_str().into();
    document["gates"] = JsonValue::Array(circuit.gates().map(gate_to_json).collect());
    document
}

fn gate_to_json(gate: &Gate) -> JsonValue {
    let mut value = JsonValue::new_object();
    value["id"] = gate.id.as_str().into();
    value["type"] = gate.kind.name().into();
    value["numInputs"] = gate.num_inputs.into();
    value["inputs"] = gate.inputs.clone().into();
    value["output"] = gate.output.into();
    value["nextState"] = gate.next_state.into();
    value["prevClk"] = gate.prev_clk.into();
    value
}

pub fn simulation_to_json(simulation: &Simulation) -> JsonValue {
    let mut document = JsonValue::new_object();
    document["mode"] = match simulation.mode {
        Mode::Combinational => "combinational",
        Mode::Sequential => "sequential",
    }
    .into();
    if let Some(settle) = simulation.settle {
        document["settled"] = matches!(settle, Settle::Settled { .. }).into();
    }
    document["circuit"] = circuit_to_json(&simulation.circuit);
    document["trace"] = JsonValue::Array(simulation.trace.iter().map(snapshot_to_json).collect());
    document
}

fn snapshot_to_json(snapshot: &CycleSnapshot) -> JsonValue {
    let mut values = JsonValue::new_object();
    for (id, value) in snapshot.inputs.iter().chain(&snapshot.sequential).chain(&snapshot.outputs) {
        values[id.as_str()] = (*value).into();
    }

    let mut cycle = JsonValue::new_object();
    cycle["cycle"] = snapshot.cycle.into();
    cycle["clock"] = snapshot.clock.into();
    cycle["values"] = values;
    cycle
}
