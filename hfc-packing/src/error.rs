#[derive(Debug, Clone, PartialEq)]
pub enum PackingError {
    NonPositiveContainerDimension {
        dimensions: [f64; 3],
    },
    NonPositiveBoxDimension {
        index: usize,
        dimensions: [f64; 3],
    },
    NoBins,
    NonPositiveCapacity {
        name: &'static str,
        value: f64,
    },
    NonIntegralConstraint {
        constraint: String,
    },
    InfeasibleConstraint {
        constraint: String,
    },
    SolutionLength {
        expected: usize,
        actual: usize,
    },
    NonBinaryValue {
        index: usize,
        value: u8,
    },
    ItemNotAssignedOnce {
        item: usize,
        assignments: usize,
    },
    ItemInUnusedBin {
        item: usize,
        bin: usize,
    },
    CapacityExceeded {
        bin: usize,
        resource: &'static str,
        load: f64,
        capacity: f64,
    },
}

pub type PackingResult<T> = std::result::Result<T, PackingError>;

impl std::fmt::Display for PackingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackingError::NonPositiveContainerDimension { dimensions } => write!(
                f,
                "Container dimensions must be positive and finite, got {:?}",
                dimensions
            ),
            PackingError::NonPositiveBoxDimension { index, dimensions } => write!(
                f,
                "Box {} has a non-positive or non-finite dimension: {:?}",
                index, dimensions
            ),
            PackingError::NoBins => write!(f, "Number of bins must be at least 1"),
            PackingError::NonPositiveCapacity { name, value } => {
                write!(f, "Capacity '{}' must be positive, got {}", name, value)
            }
            PackingError::NonIntegralConstraint { constraint } => write!(
                f,
                "Constraint '{}' has non-integral coefficients and cannot be converted to a QUBO",
                constraint
            ),
            PackingError::InfeasibleConstraint { constraint } => {
                write!(f, "Constraint '{}' can never be satisfied", constraint)
            }
            PackingError::SolutionLength { expected, actual } => write!(
                f,
                "Solution has {} values but the model has {} variables",
                actual, expected
            ),
            PackingError::NonBinaryValue { index, value } => write!(
                f,
                "Solution value {} at index {} is not binary",
                value, index
            ),
            PackingError::ItemNotAssignedOnce { item, assignments } => write!(
                f,
                "Item {} is assigned to {} bins instead of exactly one",
                item, assignments
            ),
            PackingError::ItemInUnusedBin { item, bin } => {
                write!(f, "Item {} is placed in bin {} which is not used", item, bin)
            }
            PackingError::CapacityExceeded {
                bin,
                resource,
                load,
                capacity,
            } => write!(
                f,
                "Bin {} {} load ({}) exceeds capacity ({})",
                bin, resource, load, capacity
            ),
        }
    }
}

impl std::error::Error for PackingError {}
