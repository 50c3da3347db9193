use crate::{core::Container, serializable_struct_with_defaults};
use serde::{Deserialize, Serialize};

serializable_struct_with_defaults! {
    RunConfig {
        container: Container = Container::new(70.0, 70.0, 70.0),
        bin_packing: BinPackingConfig = BinPackingConfig::default(),
    }
}

serializable_struct_with_defaults! {
    BinPackingConfig {
        num_bins: usize = 2,
        base_area_capacity: f64 = 2000.0,
        volume_capacity: f64 = 400000.0,
        /// Weight of the constraint penalty terms in the QUBO. Derived from the
        /// objective when unset.
        #[serde(skip_serializing_if = "Option::is_none")]
        penalty: Option<f64> = None,
    }
}
