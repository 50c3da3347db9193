//! Greedy space-utilization estimate for an ordered cargo sequence.
//!
//! Boxes are loaded strictly in input order into a container of fixed size.
//! Each container tracks the base length and volume it has left; once the
//! remaining volume drops below the volume of the box just loaded, the
//! container is closed and a fresh one takes the rest of the sequence. The
//! result is the sum of the per-container ratios, so runs that need several
//! containers score above 1.
use crate::{PackingError, PackingResult};
use hfc_structs::core::{CargoBox, Container};
use log::{debug, trace};
use logging_timer::time;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContainerLoad {
    /// Indices into the cargo sequence.
    pub loaded: Vec<usize>,
    /// Boxes larger than the container, skipped while this container was open.
    pub discarded: Vec<usize>,
    pub remaining_base: f64,
    pub remaining_volume: f64,
    pub utilization: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Estimate {
    pub container: Container,
    pub containers: Vec<ContainerLoad>,
}

impl Estimate {
    pub fn total_utilization(&self) -> f64 {
        // Summed from the last container back.
        self.containers
            .iter()
            .rev()
            .fold(0.0, |acc, load| load.utilization + acc)
    }

    pub fn num_containers(&self) -> usize {
        self.containers.len()
    }
}

struct LoadState {
    remaining_base: f64,
    remaining_volume: f64,
    loaded: Vec<usize>,
    discarded: Vec<usize>,
}

impl LoadState {
    fn new(container: &Container) -> Self {
        Self {
            remaining_base: container.length,
            remaining_volume: container.volume(),
            loaded: Vec::new(),
            discarded: Vec::new(),
        }
    }

    fn close(self, container_volume: f64) -> ContainerLoad {
        ContainerLoad {
            utilization: (container_volume - self.remaining_volume) / container_volume,
            loaded: self.loaded,
            discarded: self.discarded,
            remaining_base: self.remaining_base,
            remaining_volume: self.remaining_volume,
        }
    }
}

pub fn validate_inputs(container: &Container, boxes: &[CargoBox]) -> PackingResult<()> {
    if !container.has_positive_dimensions() {
        return Err(PackingError::NonPositiveContainerDimension {
            dimensions: container.dimensions(),
        });
    }
    match boxes.iter().position(|b| !b.has_positive_dimensions()) {
        Some(index) => Err(PackingError::NonPositiveBoxDimension {
            index,
            dimensions: boxes[index].dimensions(),
        }),
        None => Ok(()),
    }
}

/// Runs the estimate and keeps the per-container breakdown.
///
/// A container closed by the last box of the sequence is followed by one
/// empty container with utilization 0.
#[time]
pub fn estimate_containers(container: &Container, boxes: &[CargoBox]) -> PackingResult<Estimate> {
    validate_inputs(container, boxes)?;

    let vc = container.volume();
    let mut containers = Vec::new();
    let mut state = LoadState::new(container);

    for (index, cargo) in boxes.iter().enumerate() {
        let vcr = cargo.dimension_volume();

        if container.is_filled_by(cargo) {
            state.loaded.push(index);
            state.remaining_volume -= vcr;
            continue;
        }

        let (_, base) = cargo.base_dimension();

        if vcr > vc {
            trace!(
                "box {} discarded: volume {} exceeds container volume {}",
                index,
                vcr,
                vc
            );
            state.discarded.push(index);
            continue;
        }

        state.loaded.push(index);
        state.remaining_volume -= vcr;

        // volume is charged a second time on both branches
        if state.remaining_base >= base {
            state.remaining_base -= base;
        }
        state.remaining_volume -= vcr;

        if state.remaining_volume < vcr {
            let closed = std::mem::replace(&mut state, LoadState::new(container)).close(vc);
            debug!(
                "container {} closed after box {}: {} boxes, utilization {:.3}",
                containers.len(),
                index,
                closed.loaded.len(),
                closed.utilization
            );
            containers.push(closed);
        }
    }

    let last = state.close(vc);
    debug!(
        "container {} finished: {} boxes, utilization {:.3}",
        containers.len(),
        last.loaded.len(),
        last.utilization
    );
    containers.push(last);

    Ok(Estimate {
        container: *container,
        containers,
    })
}

/// Sum of per-container utilization ratios for `boxes` loaded in order.
pub fn estimate(container: &Container, boxes: &[CargoBox]) -> PackingResult<f64> {
    Ok(estimate_containers(container, boxes)?.total_utilization())
}
