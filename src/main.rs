use logicsim::circuit::document;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: logicsim [--truth-table | --trace] <circuit.json> [request.json]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))).with_writer(std::io::stderr).init();

    let (flags, paths): (Vec<String>, Vec<String>) = std::env::args().skip(1).partition(|arg| arg.starts_with("--"));
    let (truth_table, traced) = match &flags[..] {
        [] => (false, false),
        [flag] if flag == "--truth-table" => (true, false),
        [flag] if flag == "--trace" => (false, true),
        _ => return Err(USAGE.into()),
    };
    let (circuit_path, request_path) = match &paths[..] {
        [circuit] => (circuit, None),
        [circuit, request] => (circuit, Some(request)),
        _ => return Err(USAGE.into()),
    };

    let circuit = document::parse_circuit(&std::fs::read_to_string(circuit_path)?)?;
    if truth_table {
        print!("{}", logicsim::eval::truth_table(&circuit)?);
        return Ok(());
    }

    let request = match request_path {
        Some(path) => document::parse_request(&std::fs::read_to_string(path)?)?,
        None => document::Request::default(),
    };
    let simulation = if traced { logicsim::simulate_traced(circuit, &request.inputs, request.cycles)? } else { logicsim::simulate(circuit, &request.inputs, request.cycles)? };
    println!("{}", document::simulation_to_json(&simulation).pretty(2));

    Ok(())
}
