//! Binary linear model of the N-bin packing problem.
//!
//! The model is only built and exported here. Solving it is left to external
//! solvers, reached through [`QuboSolver`].
mod evaluate;
pub use evaluate::*;
mod qubo;
pub use qubo::*;
mod solver;
pub use solver::*;

use crate::{PackingError, PackingResult};
use hfc_structs::{config::BinPackingConfig, core::CargoBox};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = "==")]
    Equal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    /// (variable index, coefficient)
    pub terms: Vec<(usize, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BinPackingModel {
    pub config: BinPackingConfig,
    /// Manifest index of each model item, largest volume first.
    pub items: Vec<usize>,
    pub base_areas: Vec<f64>,
    pub volumes: Vec<f64>,
    pub variables: Vec<String>,
    /// Minimized. (variable index, coefficient)
    pub objective: Vec<(usize, f64)>,
    pub constraints: Vec<LinearConstraint>,
}

impl BinPackingModel {
    pub fn build(boxes: &[CargoBox], config: &BinPackingConfig) -> PackingResult<Self> {
        if config.num_bins == 0 {
            return Err(PackingError::NoBins);
        }
        for (name, value) in [
            ("base_area_capacity", config.base_area_capacity),
            ("volume_capacity", config.volume_capacity),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PackingError::NonPositiveCapacity { name, value });
            }
        }
        if let Some(index) = boxes.iter().position(|b| !b.has_positive_dimensions()) {
            return Err(PackingError::NonPositiveBoxDimension {
                index,
                dimensions: boxes[index].dimensions(),
            });
        }

        let mut items: Vec<usize> = (0..boxes.len()).collect();
        items.sort_by(|&a, &b| boxes[b].volume.total_cmp(&boxes[a].volume));
        let base_areas: Vec<f64> = items.iter().map(|&j| boxes[j].base_area).collect();
        let volumes: Vec<f64> = items.iter().map(|&j| boxes[j].volume).collect();

        let n = config.num_bins;
        let m = items.len();
        let mut variables: Vec<String> = (0..n).map(|i| format!("x{}", i)).collect();
        for i in 0..n {
            for j in 0..m {
                variables.push(format!("e{},{}", i, j));
            }
        }

        let mut model = Self {
            config: config.clone(),
            items,
            base_areas,
            volumes,
            variables,
            objective: (0..n).map(|i| (i, 1.0)).collect(),
            constraints: Vec::new(),
        };

        let mut constraints = Vec::with_capacity(m + 2 * n);
        for j in 0..m {
            constraints.push(LinearConstraint {
                name: format!("assign{}", j),
                terms: (0..n).map(|i| (model.item_var(i, j), 1.0)).collect(),
                sense: Sense::Equal,
                rhs: 1.0,
            });
        }
        for i in 0..n {
            constraints.push(model.capacity_constraint(
                format!("base{}", i),
                i,
                &model.base_areas,
                config.base_area_capacity,
            ));
            constraints.push(model.capacity_constraint(
                format!("volume{}", i),
                i,
                &model.volumes,
                config.volume_capacity,
            ));
        }
        model.constraints = constraints;
        Ok(model)
    }

    // sum_j size_j * e{bin},{j} - capacity * x{bin} <= 0
    fn capacity_constraint(
        &self,
        name: String,
        bin: usize,
        sizes: &[f64],
        capacity: f64,
    ) -> LinearConstraint {
        let mut terms: Vec<(usize, f64)> = sizes
            .iter()
            .enumerate()
            .map(|(j, &size)| (self.item_var(bin, j), size))
            .collect();
        terms.push((self.bin_var(bin), -capacity));
        LinearConstraint {
            name,
            terms,
            sense: Sense::LessEqual,
            rhs: 0.0,
        }
    }

    pub fn num_bins(&self) -> usize {
        self.config.num_bins
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn bin_var(&self, bin: usize) -> usize {
        bin
    }

    pub fn item_var(&self, bin: usize, item: usize) -> usize {
        self.num_bins() + bin * self.num_items() + item
    }

    /// CPLEX LP text of the model.
    pub fn export_as_lp_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "\\ Problem name: BinPacking");
        let _ = writeln!(out);
        let _ = writeln!(out, "Minimize");
        let _ = writeln!(out, " obj: {}", self.format_terms(&self.objective));
        let _ = writeln!(out, "Subject To");
        for constraint in &self.constraints {
            let sense = match constraint.sense {
                Sense::LessEqual => "<=",
                Sense::Equal => "=",
            };
            let _ = writeln!(
                out,
                " {}: {} {} {}",
                constraint.name,
                self.format_terms(&constraint.terms),
                sense,
                constraint.rhs
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Binaries");
        for variable in &self.variables {
            let _ = writeln!(out, " {}", variable);
        }
        let _ = writeln!(out, "End");
        out
    }

    fn format_terms(&self, terms: &[(usize, f64)]) -> String {
        let mut out = String::new();
        for (k, &(var, coef)) in terms.iter().enumerate() {
            match (k, coef < 0.0) {
                (0, true) => out.push_str("- "),
                (0, false) => {}
                (_, true) => out.push_str(" - "),
                (_, false) => out.push_str(" + "),
            }
            if coef.abs() != 1.0 {
                let _ = write!(out, "{} ", coef.abs());
            }
            out.push_str(&self.variables[var]);
        }
        if out.is_empty() {
            out.push('0');
        }
        out
    }
}
