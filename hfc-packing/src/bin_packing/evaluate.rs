use super::BinPackingModel;
use crate::{PackingError, PackingResult};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BinLoad {
    pub bin: usize,
    pub used: bool,
    /// Manifest indices of the boxes in this bin.
    pub items: Vec<usize>,
    pub base_area: f64,
    pub volume: f64,
    pub base_area_ratio: f64,
    pub volume_ratio: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BinUtilization {
    pub bins: Vec<BinLoad>,
    pub num_bins_used: usize,
}

impl BinPackingModel {
    /// Checks a solution over the model variables (`x{i}` then `e{i},{j}`) and
    /// reports how full each bin is.
    pub fn evaluate_solution(&self, x: &[u8]) -> PackingResult<BinUtilization> {
        if x.len() != self.num_variables() {
            return Err(PackingError::SolutionLength {
                expected: self.num_variables(),
                actual: x.len(),
            });
        }
        if let Some(index) = x.iter().position(|&v| v > 1) {
            return Err(PackingError::NonBinaryValue {
                index,
                value: x[index],
            });
        }

        for j in 0..self.num_items() {
            let assignments = (0..self.num_bins())
                .filter(|&i| x[self.item_var(i, j)] == 1)
                .count();
            if assignments != 1 {
                return Err(PackingError::ItemNotAssignedOnce {
                    item: self.items[j],
                    assignments,
                });
            }
        }

        let config = &self.config;
        let mut bins = Vec::with_capacity(self.num_bins());
        for i in 0..self.num_bins() {
            let used = x[self.bin_var(i)] == 1;
            let members: Vec<usize> = (0..self.num_items())
                .filter(|&j| x[self.item_var(i, j)] == 1)
                .collect();
            if let Some(&j) = members.first() {
                if !used {
                    return Err(PackingError::ItemInUnusedBin {
                        item: self.items[j],
                        bin: i,
                    });
                }
            }
            let base_area: f64 = members.iter().map(|&j| self.base_areas[j]).sum();
            let volume: f64 = members.iter().map(|&j| self.volumes[j]).sum();
            if base_area > config.base_area_capacity {
                return Err(PackingError::CapacityExceeded {
                    bin: i,
                    resource: "base area",
                    load: base_area,
                    capacity: config.base_area_capacity,
                });
            }
            if volume > config.volume_capacity {
                return Err(PackingError::CapacityExceeded {
                    bin: i,
                    resource: "volume",
                    load: volume,
                    capacity: config.volume_capacity,
                });
            }
            bins.push(BinLoad {
                bin: i,
                used,
                items: members.iter().map(|&j| self.items[j]).collect(),
                base_area,
                volume,
                base_area_ratio: base_area / config.base_area_capacity,
                volume_ratio: volume / config.volume_capacity,
            });
        }

        Ok(BinUtilization {
            num_bins_used: bins.iter().filter(|b| b.used).count(),
            bins,
        })
    }

    /// Like [`Self::evaluate_solution`], but also accepts a full QUBO vector
    /// and drops its slack bits. The QUBO is only built when the length is
    /// not the model's own.
    pub fn evaluate_full_solution(&self, x: &[u8]) -> PackingResult<BinUtilization> {
        let n = self.num_variables();
        if x.len() > n && self.to_qubo().map_or(false, |qubo| qubo.num_vars() == x.len()) {
            return self.evaluate_solution(&x[..n]);
        }
        self.evaluate_solution(x)
    }
}
