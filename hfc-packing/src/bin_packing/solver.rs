use super::{BinPackingModel, BinUtilization, Qubo};
use anyhow::{anyhow, Context, Result};
use hfc_utils::jsonify;
use log::info;
use serde::Deserialize;
use std::{
    io::Write,
    process::{Command, Stdio},
};

/// Boundary to an external QUBO solver (exact classical, QAOA, ...). Returns
/// one binary value per QUBO variable.
pub trait QuboSolver {
    fn solve(&self, qubo: &Qubo) -> Result<Vec<u8>>;
}

/// Runs a program that reads the QUBO as json on stdin and writes its solution
/// as json on stdout, either `[0, 1, ...]` or `{"x": [0, 1, ...]}`.
#[derive(Debug, Clone)]
pub struct CommandSolver {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSolver {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl QuboSolver for CommandSolver {
    fn solve(&self, qubo: &Qubo) -> Result<Vec<u8>> {
        let input = jsonify(qubo)?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start solver '{}'", self.program))?;
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("Solver stdin unavailable"))?;
            stdin
                .write_all(input.as_bytes())
                .with_context(|| format!("Failed to send qubo to solver '{}'", self.program))?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(anyhow!(
                "Solver '{}' failed ({}): {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        parse_solution(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SolutionData {
    Vector(Vec<f64>),
    Object { x: Vec<f64> },
}

/// Parses a solver's json output. Values must be 0 or 1; floats such as `1.0`
/// are accepted.
pub fn parse_solution(json: &str) -> Result<Vec<u8>> {
    let values = match serde_json::from_str::<SolutionData>(json.trim())
        .context("Failed to parse solution")?
    {
        SolutionData::Vector(x) | SolutionData::Object { x } => x,
    };
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| match v {
            v if v == 0.0 => Ok(0),
            v if v == 1.0 => Ok(1),
            _ => Err(anyhow!("Solution value {} at index {} is not binary", v, i)),
        })
        .collect()
}

/// Converts the model, hands the QUBO to `solver` and evaluates the model
/// part of the returned vector.
pub fn solve_bin_packing(
    model: &BinPackingModel,
    solver: &dyn QuboSolver,
) -> Result<BinUtilization> {
    let qubo = model.to_qubo()?;
    let x = solver.solve(&qubo)?;
    if x.len() != qubo.num_vars() {
        return Err(anyhow!(
            "Solver returned {} values, expected {}",
            x.len(),
            qubo.num_vars()
        ));
    }
    info!("solver objective: {}", qubo.evaluate(&x)?);
    Ok(model.evaluate_solution(&x[..model.num_variables()])?)
}
