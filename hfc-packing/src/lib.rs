pub mod bin_packing;
mod error;
pub use error::*;
pub mod manifest;
pub mod space_utilization;

pub use hfc_structs::{
    config::{BinPackingConfig, RunConfig},
    core::{CargoBox, Container},
};
