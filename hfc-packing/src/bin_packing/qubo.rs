use super::{BinPackingModel, Sense};
use crate::{PackingError, PackingResult};
use log::debug;
use logging_timer::time;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unconstrained binary quadratic objective:
/// `offset + sum_i linear[i] x_i + sum_{i<j} quadratic[[i, j]] x_i x_j`.
///
/// Serialized with the quadratic matrix as nested rows so external solvers can
/// read it without knowing ndarray's layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(into = "QuboData", try_from = "QuboData")]
pub struct Qubo {
    pub variables: Vec<String>,
    pub linear: Array1<f64>,
    /// Upper triangular, zero diagonal.
    pub quadratic: Array2<f64>,
    pub offset: f64,
}

#[derive(Serialize, Deserialize)]
struct QuboData {
    variables: Vec<String>,
    linear: Vec<f64>,
    quadratic: Vec<Vec<f64>>,
    offset: f64,
}

impl From<Qubo> for QuboData {
    fn from(qubo: Qubo) -> Self {
        QuboData {
            variables: qubo.variables,
            linear: qubo.linear.to_vec(),
            quadratic: qubo.quadratic.outer_iter().map(|row| row.to_vec()).collect(),
            offset: qubo.offset,
        }
    }
}

impl TryFrom<QuboData> for Qubo {
    type Error = String;

    fn try_from(data: QuboData) -> Result<Self, Self::Error> {
        let n = data.variables.len();
        if data.linear.len() != n {
            return Err(format!(
                "Expected {} linear coefficients, got {}",
                n,
                data.linear.len()
            ));
        }
        if data.quadratic.len() != n || data.quadratic.iter().any(|row| row.len() != n) {
            return Err(format!("Expected a {}x{} quadratic matrix", n, n));
        }
        let flat: Vec<f64> = data.quadratic.into_iter().flatten().collect();
        Ok(Qubo {
            variables: data.variables,
            linear: Array1::from(data.linear),
            quadratic: Array2::from_shape_vec((n, n), flat).map_err(|e| e.to_string())?,
            offset: data.offset,
        })
    }
}

impl Qubo {
    fn zeros(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            linear: Array1::zeros(n),
            quadratic: Array2::zeros((n, n)),
            offset: 0.0,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn evaluate(&self, x: &[u8]) -> PackingResult<f64> {
        if x.len() != self.num_vars() {
            return Err(PackingError::SolutionLength {
                expected: self.num_vars(),
                actual: x.len(),
            });
        }
        if let Some(index) = x.iter().position(|&v| v > 1) {
            return Err(PackingError::NonBinaryValue {
                index,
                value: x[index],
            });
        }
        let mut value = self.offset;
        for i in 0..x.len() {
            if x[i] == 0 {
                continue;
            }
            value += self.linear[i];
            for j in (i + 1)..x.len() {
                if x[j] == 1 {
                    value += self.quadratic[[i, j]];
                }
            }
        }
        Ok(value)
    }

    /// Adds `penalty * (sum_k a_k z_k - rhs)^2`, using `z^2 = z` for binaries.
    fn add_squared_penalty(&mut self, terms: &BTreeMap<usize, f64>, rhs: f64, penalty: f64) {
        let terms: Vec<(usize, f64)> = terms.iter().map(|(&k, &a)| (k, a)).collect();
        for (idx, &(k, a)) in terms.iter().enumerate() {
            self.linear[k] += penalty * (a * a - 2.0 * rhs * a);
            for &(l, b) in &terms[idx + 1..] {
                self.quadratic[[k, l]] += 2.0 * penalty * a * b;
            }
        }
        self.offset += penalty * rhs * rhs;
    }
}

/// Coefficients of a binary encoding for an integer in `[0, upper]`: powers of
/// two and a remainder, so every value in range is reachable and none above.
pub fn slack_coefficients(upper: u64) -> Vec<u64> {
    if upper == 0 {
        return Vec::new();
    }
    let power = 63 - upper.leading_zeros();
    let mut coefficients: Vec<u64> = (0..power).map(|k| 1u64 << k).collect();
    coefficients.push(upper - ((1u64 << power) - 1));
    coefficients
}

fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

impl BinPackingModel {
    /// Penalty applied to each squared constraint violation.
    pub fn penalty(&self) -> f64 {
        self.config.penalty.unwrap_or_else(|| {
            1.0 + self
                .objective
                .iter()
                .map(|(_, c)| c.abs())
                .sum::<f64>()
        })
    }

    /// Converts the model to a QUBO. Inequalities get an integer slack in
    /// binary encoding, then every equality is moved into the objective as a
    /// squared penalty. Model variables keep their indices; slack bits follow.
    #[time]
    pub fn to_qubo(&self) -> PackingResult<Qubo> {
        let mut variables = self.variables.clone();
        let mut equalities: Vec<(BTreeMap<usize, f64>, f64)> = Vec::new();

        for constraint in &self.constraints {
            if !is_integral(constraint.rhs)
                || constraint.terms.iter().any(|&(_, c)| !is_integral(c))
            {
                return Err(PackingError::NonIntegralConstraint {
                    constraint: constraint.name.clone(),
                });
            }
            let mut terms = BTreeMap::new();
            for &(var, coef) in &constraint.terms {
                *terms.entry(var).or_insert(0.0) += coef;
            }
            if constraint.sense == Sense::LessEqual {
                let min_lhs: f64 = terms.values().filter(|&&c| c < 0.0).sum();
                let upper = constraint.rhs - min_lhs;
                if upper < 0.0 {
                    return Err(PackingError::InfeasibleConstraint {
                        constraint: constraint.name.clone(),
                    });
                }
                for (k, coef) in slack_coefficients(upper as u64).into_iter().enumerate() {
                    terms.insert(variables.len(), coef as f64);
                    variables.push(format!("{}@slack{}", constraint.name, k));
                }
            }
            equalities.push((terms, constraint.rhs));
        }

        let penalty = self.penalty();
        let mut qubo = Qubo::zeros(variables);
        for &(var, coef) in &self.objective {
            qubo.linear[var] += coef;
        }
        for (terms, rhs) in &equalities {
            qubo.add_squared_penalty(terms, *rhs, penalty);
        }
        debug!(
            "qubo built: {} variables ({} slack), penalty {}",
            qubo.num_vars(),
            qubo.num_vars() - self.num_variables(),
            penalty
        );
        Ok(qubo)
    }
}
